mod dns_client;

pub use dns_client::{DnsClient, DnsClientFactory};
