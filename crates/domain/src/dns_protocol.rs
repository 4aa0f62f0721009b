use crate::config::{
    ConfigError, DEFAULT_DOH_PORT, DEFAULT_DOQ_PORT, DEFAULT_DOT_PORT, DEFAULT_DO53_PORT,
};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Wire transport selected by a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsProtocol {
    Udp,
    Tcp,
    Tls,
    Https,
    Quic,
}

impl DnsProtocol {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            DnsProtocol::Udp => "UDP",
            DnsProtocol::Tcp => "TCP",
            DnsProtocol::Tls => "TLS",
            DnsProtocol::Https => "HTTPS",
            DnsProtocol::Quic => "QUIC",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            DnsProtocol::Udp | DnsProtocol::Tcp => DEFAULT_DO53_PORT,
            DnsProtocol::Tls => DEFAULT_DOT_PORT,
            DnsProtocol::Https => DEFAULT_DOH_PORT,
            DnsProtocol::Quic => DEFAULT_DOQ_PORT,
        }
    }

    /// Stream transports frame messages with a two byte length prefix.
    pub fn is_stream(&self) -> bool {
        matches!(self, DnsProtocol::Tcp | DnsProtocol::Tls | DnsProtocol::Quic)
    }
}

impl fmt::Display for DnsProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.protocol_name())
    }
}

/// Represents a server address that may or may not be resolved to an IP.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ServerAddr {
    Resolved(SocketAddr),
    Unresolved { hostname: Arc<str>, port: u16 },
}

impl ServerAddr {
    /// Parses `host`, `host:port`, `ip`, `ip:port`, `[v6]` or `[v6]:port`,
    /// filling in `default_port` when none is given.
    pub fn parse(s: &str, default_port: u16) -> Result<Self, ConfigError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ConfigError::Validation("empty server address".to_string()));
        }

        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(ServerAddr::Resolved(addr));
        }
        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(ServerAddr::Resolved(SocketAddr::new(ip, default_port)));
        }
        if let Some(inner) = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            let ip = inner
                .parse::<IpAddr>()
                .map_err(|e| ConfigError::Validation(format!("Invalid address '{}': {}", s, e)))?;
            return Ok(ServerAddr::Resolved(SocketAddr::new(ip, default_port)));
        }

        let (host, port) = match parse_host_port(s) {
            Some(parts) => parts,
            None if !s.contains(':') => (s, default_port),
            None => return Err(ConfigError::Validation(format!("Invalid address '{}'", s))),
        };

        if host.is_empty() || host.contains('/') || host.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(format!("Invalid host in '{}'", s)));
        }

        Ok(ServerAddr::Unresolved {
            hostname: host.into(),
            port,
        })
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            ServerAddr::Resolved(addr) => Some(*addr),
            ServerAddr::Unresolved { .. } => None,
        }
    }

    pub fn port(&self) -> u16 {
        match self {
            ServerAddr::Resolved(addr) => addr.port(),
            ServerAddr::Unresolved { port, .. } => *port,
        }
    }

    /// Host part without the port, as used for TLS server name indication.
    pub fn host(&self) -> String {
        match self {
            ServerAddr::Resolved(addr) => addr.ip().to_string(),
            ServerAddr::Unresolved { hostname, .. } => hostname.to_string(),
        }
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerAddr::Resolved(addr) => write!(f, "{}", addr),
            ServerAddr::Unresolved { hostname, port } => write!(f, "{}:{}", hostname, port),
        }
    }
}

fn parse_host_port(s: &str) -> Option<(&str, u16)> {
    if s.starts_with('[') {
        let end = s.find(']')?;
        let host = &s[1..end];
        let rest = &s[end + 1..];
        let port_str = rest.strip_prefix(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    } else {
        let (host, port_str) = s.rsplit_once(':')?;
        let port = port_str.parse::<u16>().ok()?;
        Some((host, port))
    }
}
