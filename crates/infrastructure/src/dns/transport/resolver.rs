use dnsclient_domain::{ClientConfig, ClientError, ServerAddr};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    timeout: Duration,
) -> Result<Vec<SocketAddr>, ClientError> {
    let target = format!("{}:{}", hostname, port);

    let addrs_iter = tokio::time::timeout(timeout, tokio::net::lookup_host(&target))
        .await
        .map_err(|_| ClientError::TransportTimeout {
            server: target.clone(),
        })?
        .map_err(|e| ClientError::TransportConnectionRefused {
            server: target.clone(),
            reason: format!("name resolution failed: {}", e),
        })?;

    let addrs: Vec<SocketAddr> = addrs_iter.collect();

    if addrs.is_empty() {
        return Err(ClientError::TransportConnectionRefused {
            server: target,
            reason: "no addresses found".to_string(),
        });
    }

    Ok(addrs)
}

/// First address of `server` allowed by the config's address family
/// restriction. Literal addresses are checked against it as well.
pub async fn resolve_server(
    server: &ServerAddr,
    config: &ClientConfig,
) -> Result<SocketAddr, ClientError> {
    let candidates = match server {
        ServerAddr::Resolved(addr) => vec![*addr],
        ServerAddr::Unresolved { hostname, port } => {
            resolve_all(hostname, *port, config.timeout()).await?
        }
    };

    let chosen = candidates.into_iter().find(|addr| family_allowed(addr, config));
    match chosen {
        Some(addr) => {
            debug!(server = %server, resolved = %addr, "Server address selected");
            Ok(addr)
        }
        None => Err(ClientError::TransportConnectionRefused {
            server: server.to_string(),
            reason: format!("no address matches the {} restriction", family_label(config)),
        }),
    }
}

fn family_allowed(addr: &SocketAddr, config: &ClientConfig) -> bool {
    if config.ipv4_only {
        addr.is_ipv4()
    } else if config.ipv6_only {
        addr.is_ipv6()
    } else {
        true
    }
}

fn family_label(config: &ClientConfig) -> &'static str {
    if config.ipv4_only {
        "IPv4-only"
    } else {
        "IPv6-only"
    }
}
