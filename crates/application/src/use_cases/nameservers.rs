use super::addresses::get_ips;
use super::lookup::lookup;
use crate::ports::DnsClient;
use crate::services::collect_rdata;
use dnsclient_domain::{ClientError, DnsError, DnsErrorKind, NameServer};
use hickory_proto::rr::rdata::{NS, SOA};
use hickory_proto::rr::{Name, RecordType};
use tracing::{debug, error, warn};

/// Name servers of `domain` with their addresses.
///
/// When the NS lookup is answered without usable NS records, the primary
/// name server (MNAME) of an SOA record in the authority section is used
/// instead. Name servers whose addresses cannot be resolved are skipped;
/// the call fails only when none resolves.
pub async fn get_name_servers<C>(client: &mut C, domain: &str) -> Result<Vec<NameServer>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let names = name_server_names(client, domain).await?;

    let mut servers = Vec::with_capacity(names.len());
    let mut errors = Vec::new();

    for name in names {
        let name = name.to_utf8();
        match get_ips(client, &name).await {
            Ok(ips) => servers.push(NameServer { name, ips }),
            Err(e) => {
                warn!(nameserver = %name, error = %e, "Failed to resolve name server");
                errors.push(e);
            }
        }
    }

    if !servers.is_empty() {
        return Ok(servers);
    }
    if !errors.is_empty() {
        return Err(ClientError::aggregate(errors));
    }

    error!(domain, "Name server lookup produced neither servers nor errors");
    Err(ClientError::Internal(format!(
        "no name servers and no errors for {}",
        domain
    )))
}

async fn name_server_names<C>(client: &mut C, domain: &str) -> Result<Vec<Name>, ClientError>
where
    C: DnsClient + ?Sized,
{
    match lookup(client, domain, RecordType::NS).await {
        Ok(response) => {
            let names: Vec<Name> = collect_rdata::<NS>(response.answers())
                .into_iter()
                .map(|ns| ns.0.clone())
                .collect();
            if names.is_empty() {
                return Err(DnsError::new(DnsErrorKind::BadFormatAnswer, response).into());
            }
            Ok(names)
        }
        Err(ClientError::Dns(err)) if err.kind() != DnsErrorKind::RcodeNotSuccess => {
            let mnames: Vec<Name> = collect_rdata::<SOA>(err.response().name_servers())
                .into_iter()
                .map(|soa| soa.mname().clone())
                .collect();
            if mnames.is_empty() {
                return Err(err.into());
            }
            debug!(domain, kind = %err.kind(), "Using SOA MNAME as name server");
            Ok(mnames)
        }
        Err(e) => Err(e),
    }
}
