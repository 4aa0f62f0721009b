pub mod client;
pub mod errors;
pub mod logging;
pub mod root;

pub use client::{
    ClientConfig, DEFAULT_DOH_PORT, DEFAULT_DOQ_PORT, DEFAULT_DOT_PORT, DEFAULT_DO53_PORT,
    DEFAULT_HTTP_ENDPOINT, DEFAULT_UDP_BUF_SIZE, MAX_CNAMES_LIMIT, MAX_UDP_BUF_SIZE,
};
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use root::{CliConfig, CliOverrides};
