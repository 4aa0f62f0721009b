//! Resolution engine: one logical query, following CNAME chains up to the
//! configured limit and classifying every way the answer can be unusable.

use crate::ports::DnsClient;
use crate::services::cname_chain::{chain_loops, order_cname_chain, CnameLink};
use crate::services::MessageBuilder;
use dnsclient_domain::{ClientError, DnsError, DnsErrorKind};
use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::{Name, RecordType};
use tracing::{debug, error, instrument};

/// Outcome of inspecting a single response for the current target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    Answered,
    Follow(Name),
    Failed(DnsErrorKind),
}

/// Sends `request` as is and returns the raw response.
pub async fn exchange<C>(client: &mut C, request: &Message) -> Result<Message, ClientError>
where
    C: DnsClient + ?Sized,
{
    let response = client.exchange(request).await?;
    debug!(
        id = response.id(),
        rcode = %response.response_code(),
        answers = response.answers().len(),
        "Exchange completed"
    );
    Ok(response)
}

/// Resolves `qname`/`record_type`, returning the response that holds the
/// answer.
pub async fn lookup<C>(
    client: &mut C,
    qname: &str,
    record_type: RecordType,
) -> Result<Message, ClientError>
where
    C: DnsClient + ?Sized,
{
    let name = MessageBuilder::parse_name(qname)?;
    lookup_name(client, &name, record_type).await
}

#[instrument(skip_all, fields(qname = %qname, qtype = %record_type))]
pub async fn lookup_name<C>(
    client: &mut C,
    qname: &Name,
    record_type: RecordType,
) -> Result<Message, ClientError>
where
    C: DnsClient + ?Sized,
{
    let max_cnames = client.config().max_cnames;
    let mut target = qname.clone();
    let mut last_response = None;

    for hop in 0..=max_cnames {
        let request = MessageBuilder::build_query(client.config(), &target, record_type);
        let response = exchange(client, &request).await?;

        match inspect_response(&response, &target, record_type) {
            Step::Answered => return Ok(response),
            Step::Failed(kind) => {
                debug!(hop, kind = %kind, "Lookup failed");
                return Err(DnsError::new(kind, response).into());
            }
            Step::Follow(_) if max_cnames == 0 => {
                debug!("Alias needs another round trip but following is disabled");
                return Err(DnsError::new(DnsErrorKind::MissingAnswer, response).into());
            }
            Step::Follow(next) => {
                debug!(hop, from = %target, to = %next, "Following CNAME chain");
                target = next;
                last_response = Some(response);
            }
        }
    }

    match last_response {
        Some(response) => Err(DnsError::new(DnsErrorKind::MaxCnames, response).into()),
        None => {
            error!("CNAME loop ended without a response");
            Err(ClientError::Internal(
                "lookup finished without a response".to_string(),
            ))
        }
    }
}

/// Classifies one response for `target`.
///
/// A CNAME chain in the answer section is ordered and must start at
/// `target`; the answer counts when the chain ends at a record of the
/// requested type. A chain whose final target is one of its own owners is
/// a [`DnsErrorKind::InvalidCnameChain`] right away instead of burning the
/// hop budget until [`DnsErrorKind::MaxCnames`].
pub(crate) fn inspect_response(response: &Message, target: &Name, record_type: RecordType) -> Step {
    if response.response_code() != ResponseCode::NoError {
        return Step::Failed(DnsErrorKind::RcodeNotSuccess);
    }

    let answers = response.answers();
    let matching_owner = |owner: &Name| {
        answers
            .iter()
            .any(|record| record.record_type() == record_type && record.name() == owner)
    };

    if matching_owner(target) {
        return Step::Answered;
    }

    let mut links = CnameLink::from_records(answers);
    if links.is_empty() {
        return Step::Failed(DnsErrorKind::MissingAnswer);
    }
    if !order_cname_chain(&mut links) || links[0].owner != *target || chain_loops(&links) {
        return Step::Failed(DnsErrorKind::InvalidCnameChain);
    }

    let final_target = match links.last() {
        Some(link) => &link.target,
        None => return Step::Failed(DnsErrorKind::MissingAnswer),
    };
    if matching_owner(final_target) {
        return Step::Answered;
    }
    if answers
        .iter()
        .any(|record| record.record_type() == record_type)
    {
        return Step::Failed(DnsErrorKind::InvalidAnswer);
    }

    Step::Follow(final_target.clone())
}
