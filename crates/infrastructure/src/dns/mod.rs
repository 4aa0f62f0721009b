pub mod transport;

pub use transport::{create_client, Client, TransportClientFactory};
