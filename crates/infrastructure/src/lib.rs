//! Network side of dnsclient: the Do53, DoT, DoH and DoQ transport clients.
pub mod dns;

pub use dns::transport::{create_client, Client, TransportClientFactory};
