//! Server capability probes using EDNS0 options on an SOA query.

use super::lookup::exchange;
use crate::ports::DnsClient;
use crate::services::edns::{self, client_subnet_option, nsid_option};
use crate::services::MessageBuilder;
use dnsclient_domain::{ClientError, DnsError, DnsErrorKind};
use hickory_proto::op::{Edns, Message};
use hickory_proto::rr::rdata::opt::EdnsOption;
use hickory_proto::rr::RecordType;
use std::net::{IpAddr, Ipv4Addr};
use tracing::debug;

const PROBE_SUBNET_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const PROBE_SUBNET_PREFIX: u8 = 24;

fn soa_query_with<C>(client: &C, domain: &str, option: EdnsOption) -> Result<Message, ClientError>
where
    C: DnsClient + ?Sized,
{
    let config = client.config();
    let name = MessageBuilder::parse_name(domain)?;
    let mut request = MessageBuilder::build_query(config, &name, RecordType::SOA);

    let mut opt = request.extensions().clone().unwrap_or_else(|| {
        let mut opt = Edns::new();
        opt.set_max_payload(config.edns_payload_size());
        opt
    });
    opt.options_mut().insert(option);
    request.set_edns(opt);

    Ok(request)
}

/// Asks the server to identify itself (RFC 5001) and returns the raw NSID.
pub async fn probe_nsid<C>(client: &mut C, domain: &str) -> Result<Vec<u8>, ClientError>
where
    C: DnsClient + ?Sized,
{
    let request = soa_query_with(client, domain, nsid_option())?;
    let response = exchange(client, &request).await?;

    match edns::response_nsid(&response) {
        Some(nsid) => Ok(nsid),
        None => {
            debug!(domain, "Response carries no NSID option");
            Err(DnsError::new(DnsErrorKind::MissingAnswer, response).into())
        }
    }
}

/// Whether the server echoes a client subnet option (RFC 7871).
pub async fn probe_client_subnet<C>(client: &mut C, domain: &str) -> Result<bool, ClientError>
where
    C: DnsClient + ?Sized,
{
    let option = client_subnet_option(PROBE_SUBNET_ADDR, PROBE_SUBNET_PREFIX);
    let request = soa_query_with(client, domain, option)?;
    let response = exchange(client, &request).await?;

    Ok(edns::has_client_subnet(&response))
}
