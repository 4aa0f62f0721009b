//! dnsclient domain layer: client configuration, error taxonomy and result records.
pub mod config;
pub mod dns_protocol;
pub mod errors;
pub mod records;

pub use config::{CliConfig, CliOverrides, ClientConfig, ConfigError, LoggingConfig};
pub use dns_protocol::{DnsProtocol, ServerAddr};
pub use errors::{ClientError, DnsError, DnsErrorKind};
pub use records::{
    NameServer, ServiceEnumeration, ServiceInstance, ServiceInstanceInfo, ServiceListing,
};
