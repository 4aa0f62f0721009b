use serde::Serialize;
use std::net::IpAddr;

/// An authoritative name server and the addresses it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameServer {
    pub name: String,
    pub ips: Vec<IpAddr>,
}

/// Connection details of a DNS-SD service instance (SRV plus optional TXT).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInstanceInfo {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
    pub text: Option<Vec<String>>,
}

/// A discovered instance; `info` is `None` when its SRV lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceInstance {
    pub name: String,
    pub info: Option<ServiceInstanceInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceListing {
    pub service: String,
    pub browsing_domain: String,
    pub instances: Vec<ServiceInstance>,
}

/// Result of walking browsing domains, services and instances of a zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceEnumeration {
    pub browsing_domains: Vec<String>,
    pub services: Vec<ServiceListing>,
}

impl ServiceEnumeration {
    pub fn instance_count(&self) -> usize {
        self.services.iter().map(|s| s.instances.len()).sum()
    }
}
