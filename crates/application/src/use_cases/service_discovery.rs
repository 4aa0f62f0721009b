//! DNS-based Service Discovery (RFC 6763) on top of [`lookup`].

use super::lookup::lookup;
use crate::ports::DnsClient;
use crate::services::{collect_rdata, MessageBuilder};
use dnsclient_domain::{
    ClientError, DnsError, DnsErrorKind, ServiceEnumeration, ServiceInstance, ServiceInstanceInfo,
    ServiceListing,
};
use hickory_proto::rr::rdata::{PTR, SRV, TXT};
use hickory_proto::rr::RecordType;
use std::collections::HashSet;
use tracing::{debug, error, info, instrument, warn};

const BROWSE_PREFIX: &str = "b._dns-sd._udp";
const DEFAULT_BROWSE_PREFIX: &str = "db._dns-sd._udp";
const LEGACY_BROWSE_PREFIX: &str = "lb._dns-sd._udp";
const SERVICES_PREFIX: &str = "_services._dns-sd._udp";

fn under(prefix: &str, domain: &str) -> String {
    format!("{}.{}", prefix, domain.trim_end_matches('.'))
}

fn dedup_key(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

async fn ptr_targets<C>(client: &mut C, qname: &str) -> Result<Vec<String>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let response = lookup(client, qname, RecordType::PTR).await?;
    let targets: Vec<String> = collect_rdata::<PTR>(response.answers())
        .into_iter()
        .map(|ptr| ptr.0.to_utf8())
        .collect();

    if targets.is_empty() {
        return Err(DnsError::new(DnsErrorKind::BadFormatAnswer, response).into());
    }
    Ok(targets)
}

async fn first_ptr_target<C>(client: &mut C, qname: &str) -> Result<String, ClientError>
where
    C: DnsClient + ?Sized,
{
    let mut targets = ptr_targets(client, qname).await?;
    Ok(targets.swap_remove(0))
}

/// Browsing domains listed under `b._dns-sd._udp.<domain>`.
pub async fn get_service_browser_domains<C>(
    client: &mut C,
    domain: &str,
) -> Result<Vec<String>, ClientError>
where
    C: DnsClient + ?Sized,
{
    ptr_targets(client, &under(BROWSE_PREFIX, domain)).await
}

/// The default browsing domain (`db._dns-sd._udp.<domain>`).
pub async fn get_default_service_browser_domain<C>(
    client: &mut C,
    domain: &str,
) -> Result<String, ClientError>
where
    C: DnsClient + ?Sized,
{
    first_ptr_target(client, &under(DEFAULT_BROWSE_PREFIX, domain)).await
}

/// The legacy browsing domain (`lb._dns-sd._udp.<domain>`).
pub async fn get_legacy_service_browser_domain<C>(
    client: &mut C,
    domain: &str,
) -> Result<String, ClientError>
where
    C: DnsClient + ?Sized,
{
    first_ptr_target(client, &under(LEGACY_BROWSE_PREFIX, domain)).await
}

/// Union of the three browsing-domain queries, first occurrence order kept.
///
/// Fails only if every query fails.
#[instrument(skip(client))]
pub async fn get_all_service_browser_domains<C>(
    client: &mut C,
    domain: &str,
) -> Result<Vec<String>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let mut domains = Vec::new();
    let mut errors = Vec::new();

    match get_service_browser_domains(client, domain).await {
        Ok(names) => domains.extend(names),
        Err(e) => {
            debug!(error = %e, "Browsing domain query failed");
            errors.push(e);
        }
    }
    match get_default_service_browser_domain(client, domain).await {
        Ok(name) => domains.push(name),
        Err(e) => {
            debug!(error = %e, "Default browsing domain query failed");
            errors.push(e);
        }
    }
    match get_legacy_service_browser_domain(client, domain).await {
        Ok(name) => domains.push(name),
        Err(e) => {
            debug!(error = %e, "Legacy browsing domain query failed");
            errors.push(e);
        }
    }

    let mut seen = HashSet::new();
    domains.retain(|name| seen.insert(dedup_key(name)));

    if !domains.is_empty() {
        return Ok(domains);
    }
    if !errors.is_empty() {
        return Err(ClientError::aggregate(errors));
    }

    error!("Browsing domain discovery produced neither domains nor errors");
    Err(ClientError::Internal(format!(
        "no browsing domains and no errors for {}",
        domain
    )))
}

/// Service types registered in `domain` (`_services._dns-sd._udp.<domain>`).
pub async fn get_services<C>(client: &mut C, domain: &str) -> Result<Vec<String>, ClientError>
where
    C: DnsClient + ?Sized,
{
    ptr_targets(client, &under(SERVICES_PREFIX, domain)).await
}

/// Instances of `service` (e.g. `_ssh._tcp`) in `domain`.
///
/// A service name that already lies inside `domain`, as returned by
/// [`get_services`], is queried unchanged.
pub async fn get_service_instances<C>(
    client: &mut C,
    service: &str,
    domain: &str,
) -> Result<Vec<String>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let service_name = MessageBuilder::parse_name(service)?;
    let domain_name = MessageBuilder::parse_name(domain)?;

    let qname = if domain_name.zone_of(&service_name) {
        service_name.to_utf8()
    } else {
        under(service.trim_end_matches('.'), domain)
    };
    ptr_targets(client, &qname).await
}

/// SRV data of `instance`, plus the strings of its first TXT record when
/// one can be fetched.
pub async fn get_service_instance_info<C>(
    client: &mut C,
    instance: &str,
) -> Result<ServiceInstanceInfo, ClientError>
where
    C: DnsClient + ?Sized,
{
    let response = lookup(client, instance, RecordType::SRV).await?;
    let (priority, weight, port, target) = match collect_rdata::<SRV>(response.answers()).first()
    {
        Some(srv) => (
            srv.priority(),
            srv.weight(),
            srv.port(),
            srv.target().to_utf8(),
        ),
        None => return Err(DnsError::new(DnsErrorKind::BadFormatAnswer, response).into()),
    };

    let text = match lookup(client, instance, RecordType::TXT).await {
        Ok(response) => collect_rdata::<TXT>(response.answers())
            .first()
            .map(|txt| txt_strings(txt)),
        Err(e) => {
            debug!(instance, error = %e, "No TXT data for instance");
            None
        }
    };

    Ok(ServiceInstanceInfo {
        priority,
        weight,
        port,
        target,
        text,
    })
}

fn txt_strings(txt: &TXT) -> Vec<String> {
    txt.txt_data()
        .iter()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect()
}

/// Walks browsing domains, their services and every instance of each
/// service. Individual failures are logged and skipped.
#[instrument(skip(client))]
pub async fn enumerate_services<C>(
    client: &mut C,
    domain: &str,
) -> Result<ServiceEnumeration, ClientError>
where
    C: DnsClient + ?Sized,
{
    let browsing_domains = match get_all_service_browser_domains(client, domain).await {
        Ok(domains) => domains,
        Err(e) => {
            debug!(error = %e, "No browsing domains advertised, using the domain itself");
            vec![MessageBuilder::parse_name(domain)?.to_utf8()]
        }
    };

    let mut enumeration = ServiceEnumeration {
        browsing_domains: browsing_domains.clone(),
        services: Vec::new(),
    };
    let mut seen_services = HashSet::new();

    for browsing_domain in &browsing_domains {
        let services = match get_services(client, browsing_domain).await {
            Ok(services) => services,
            Err(e) => {
                warn!(browsing_domain = %browsing_domain, error = %e, "Service listing failed");
                continue;
            }
        };

        for service in services {
            if !seen_services.insert(dedup_key(&service)) {
                continue;
            }

            let instance_names =
                match get_service_instances(client, &service, browsing_domain).await {
                    Ok(names) => names,
                    Err(e) => {
                        warn!(service = %service, error = %e, "Instance listing failed");
                        continue;
                    }
                };

            let mut instances = Vec::with_capacity(instance_names.len());
            for name in instance_names {
                let info = match get_service_instance_info(client, &name).await {
                    Ok(info) => Some(info),
                    Err(e) => {
                        debug!(instance = %name, error = %e, "Instance info unavailable");
                        None
                    }
                };
                instances.push(ServiceInstance { name, info });
            }

            enumeration.services.push(ServiceListing {
                service,
                browsing_domain: browsing_domain.clone(),
                instances,
            });
        }
    }

    info!(
        browsing_domains = enumeration.browsing_domains.len(),
        services = enumeration.services.len(),
        instances = enumeration.instance_count(),
        "Service enumeration finished"
    );
    Ok(enumeration)
}
