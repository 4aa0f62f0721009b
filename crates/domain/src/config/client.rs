use super::errors::ConfigError;
use crate::dns_protocol::DnsProtocol;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

pub const DEFAULT_DO53_PORT: u16 = 53;
pub const DEFAULT_DOT_PORT: u16 = 853;
pub const DEFAULT_DOQ_PORT: u16 = 853;
pub const DEFAULT_DOH_PORT: u16 = 443;
pub const DEFAULT_HTTP_ENDPOINT: &str = "/dns-query";

/// Payload size advertised in the OPT record when EDNS0 is needed but no
/// explicit buffer size was configured.
pub const DEFAULT_UDP_BUF_SIZE: u16 = 4096;
pub const MAX_UDP_BUF_SIZE: u32 = 65535;
pub const MAX_CNAMES_LIMIT: u8 = 10;

/// Settings shared by every transport client.
///
/// A config is validated once when a client is constructed and is never
/// mutated afterwards; [`ClientConfig::with_tcp`] produces the copy used for
/// the UDP truncation fallback.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host[:port]`, or a full `https://` URL for DNS-over-HTTPS.
    pub server: String,

    pub recursion_desired: bool,
    pub authentic_data: bool,
    pub checking_disabled: bool,
    pub dnssec_ok: bool,

    pub tcp: bool,
    pub tls: bool,
    pub quic: bool,
    pub http_endpoint: Option<String>,
    pub http_use_get: bool,

    pub ignore_truncation: bool,
    pub ipv4_only: bool,
    pub ipv6_only: bool,
    pub keep_open: bool,
    pub keep_alive: bool,

    pub nsid: bool,
    pub client_subnet: Option<IpAddr>,

    pub udp_buf_size: u32,
    pub max_cnames: u8,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: "1.1.1.1".to_string(),
            recursion_desired: true,
            authentic_data: false,
            checking_disabled: false,
            dnssec_ok: false,
            tcp: false,
            tls: false,
            quic: false,
            http_endpoint: None,
            http_use_get: false,
            ignore_truncation: false,
            ipv4_only: false,
            ipv6_only: false,
            keep_open: false,
            keep_alive: false,
            nsid: false,
            client_subnet: None,
            udp_buf_size: 0,
            max_cnames: 0,
            timeout_ms: 5000,
        }
    }
}

impl ClientConfig {
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.trim().is_empty() {
            return Err(ConfigError::Validation(
                "server must not be empty".to_string(),
            ));
        }
        if self.udp_buf_size > MAX_UDP_BUF_SIZE {
            return Err(ConfigError::Validation(format!(
                "udp_buf_size {} exceeds {}",
                self.udp_buf_size, MAX_UDP_BUF_SIZE
            )));
        }
        if self.max_cnames > MAX_CNAMES_LIMIT {
            return Err(ConfigError::Validation(format!(
                "max_cnames {} exceeds {}",
                self.max_cnames, MAX_CNAMES_LIMIT
            )));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout must be greater than zero".to_string(),
            ));
        }

        let has_endpoint = self.uses_https();
        if has_endpoint && self.tls {
            return Err(ConfigError::Validation(
                "http_endpoint and tls are mutually exclusive".to_string(),
            ));
        }
        if self.http_use_get && !has_endpoint {
            return Err(ConfigError::Validation(
                "http_use_get requires an http_endpoint or an https:// server".to_string(),
            ));
        }
        if self.quic && (self.tls || has_endpoint) {
            return Err(ConfigError::Validation(
                "quic cannot be combined with tls or http_endpoint".to_string(),
            ));
        }
        if self.ipv4_only && self.ipv6_only {
            return Err(ConfigError::Validation(
                "ipv4_only and ipv6_only are mutually exclusive".to_string(),
            ));
        }

        Ok(())
    }

    pub fn has_http_endpoint(&self) -> bool {
        self.http_endpoint
            .as_deref()
            .is_some_and(|endpoint| !endpoint.trim().is_empty())
    }

    /// A full `https://` URL as server selects DNS-over-HTTPS on its own.
    pub fn server_is_url(&self) -> bool {
        self.server.trim_start().starts_with("https://")
    }

    pub fn uses_https(&self) -> bool {
        self.has_http_endpoint() || self.server_is_url()
    }

    pub fn protocol(&self) -> DnsProtocol {
        if self.uses_https() {
            DnsProtocol::Https
        } else if self.quic {
            DnsProtocol::Quic
        } else if self.tls {
            DnsProtocol::Tls
        } else if self.tcp {
            DnsProtocol::Tcp
        } else {
            DnsProtocol::Udp
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Whether queries built from this config carry an OPT record.
    pub fn uses_edns(&self) -> bool {
        self.dnssec_ok || self.nsid || self.client_subnet.is_some() || self.udp_buf_size > 0
    }

    /// Payload size to advertise when an OPT record is attached.
    pub fn edns_payload_size(&self) -> u16 {
        match u16::try_from(self.udp_buf_size) {
            Ok(0) | Err(_) => DEFAULT_UDP_BUF_SIZE,
            Ok(size) => size,
        }
    }

    /// Deep copy switched to plain TCP, used to retry a truncated UDP answer.
    pub fn with_tcp(&self) -> Self {
        Self {
            tcp: true,
            ..self.clone()
        }
    }
}
