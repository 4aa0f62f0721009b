use super::lookup::lookup;
use crate::ports::DnsClient;
use crate::services::collect_rdata;
use dnsclient_domain::{ClientError, DnsError, DnsErrorKind};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::RecordType;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{debug, error};

pub async fn get_ip4s<C>(client: &mut C, name: &str) -> Result<Vec<Ipv4Addr>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let response = lookup(client, name, RecordType::A).await?;
    let addrs: Vec<Ipv4Addr> = collect_rdata::<A>(response.answers())
        .into_iter()
        .map(|a| a.0)
        .collect();

    if addrs.is_empty() {
        return Err(DnsError::new(DnsErrorKind::BadFormatAnswer, response).into());
    }
    Ok(addrs)
}

pub async fn get_ip6s<C>(client: &mut C, name: &str) -> Result<Vec<Ipv6Addr>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let response = lookup(client, name, RecordType::AAAA).await?;
    let addrs: Vec<Ipv6Addr> = collect_rdata::<AAAA>(response.answers())
        .into_iter()
        .map(|aaaa| aaaa.0)
        .collect();

    if addrs.is_empty() {
        return Err(DnsError::new(DnsErrorKind::BadFormatAnswer, response).into());
    }
    Ok(addrs)
}

/// IPv4 then IPv6 addresses of `name`; fails only when both lookups fail.
pub async fn get_ips<C>(client: &mut C, name: &str) -> Result<Vec<IpAddr>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let mut addrs = Vec::new();
    let mut errors = Vec::new();

    match get_ip4s(client, name).await {
        Ok(v4) => addrs.extend(v4.into_iter().map(IpAddr::V4)),
        Err(e) => {
            debug!(name, error = %e, "A lookup failed");
            errors.push(e);
        }
    }
    match get_ip6s(client, name).await {
        Ok(v6) => addrs.extend(v6.into_iter().map(IpAddr::V6)),
        Err(e) => {
            debug!(name, error = %e, "AAAA lookup failed");
            errors.push(e);
        }
    }

    if !addrs.is_empty() {
        return Ok(addrs);
    }
    if !errors.is_empty() {
        return Err(ClientError::aggregate(errors));
    }

    error!(name, "Address lookup produced neither addresses nor errors");
    Err(ClientError::Internal(format!(
        "no addresses and no errors for {}",
        name
    )))
}
