use super::record_filter::collect_records;
use hickory_proto::rr::rdata::CNAME;
use hickory_proto::rr::{Name, Record};

/// One alias hop: `owner` is an alias for `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnameLink {
    pub owner: Name,
    pub target: Name,
}

impl CnameLink {
    pub fn new(owner: Name, target: Name) -> Self {
        Self { owner, target }
    }

    /// CNAME links of a section, in section order.
    pub fn from_records(records: &[Record]) -> Vec<CnameLink> {
        collect_records::<CNAME>(records)
            .into_iter()
            .map(|record| CnameLink::new(record.name.clone(), record.data.0.clone()))
            .collect()
    }
}

/// Reorders `links` in place so that each link's target is the next link's
/// owner.
///
/// Links are absorbed into a sorted prefix either in front of its first owner
/// or behind its last target until a pass makes no progress. Returns `false`
/// when some link could not be attached, i.e. the input is not one chain.
pub fn order_cname_chain(links: &mut [CnameLink]) -> bool {
    if links.len() <= 1 {
        return true;
    }

    let mut sorted = 1;
    loop {
        let before = sorted;
        let mut i = sorted;
        while i < links.len() {
            if links[i].target == links[0].owner {
                links[..=i].rotate_right(1);
                sorted += 1;
            } else if links[sorted - 1].target == links[i].owner {
                links.swap(sorted, i);
                sorted += 1;
            }
            i += 1;
        }
        if sorted == links.len() || sorted == before {
            break;
        }
    }

    sorted == links.len()
}

/// Whether the chain's final target points back at one of its own owners.
pub fn chain_loops(links: &[CnameLink]) -> bool {
    links
        .last()
        .is_some_and(|last| links.iter().any(|link| link.owner == last.target))
}
