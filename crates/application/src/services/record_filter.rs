//! Typed views over resource record sections.
//!
//! `collect_records::<A>(message.answers())` yields every A record of a
//! section in order, each with its owner name and TTL.

use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, PTR, SOA, SRV, TXT};
use hickory_proto::rr::{Name, RData, Record};

/// Record data type that can be picked out of a section.
pub trait RecordShape {
    fn from_rdata(rdata: &RData) -> Option<&Self>;
}

macro_rules! record_shape {
    ($($variant:ident),+ $(,)?) => {
        $(
            impl RecordShape for $variant {
                fn from_rdata(rdata: &RData) -> Option<&Self> {
                    match rdata {
                        RData::$variant(data) => Some(data),
                        _ => None,
                    }
                }
            }
        )+
    };
}

record_shape!(A, AAAA, CNAME, MX, NS, PTR, SOA, SRV, TXT);

#[derive(Debug, Clone, Copy)]
pub struct TypedRecord<'a, T> {
    pub name: &'a Name,
    pub ttl: u32,
    pub data: &'a T,
}

/// Records of shape `T`, in section order. Empty when none match.
pub fn collect_records<'a, T: RecordShape>(records: &'a [Record]) -> Vec<TypedRecord<'a, T>> {
    records
        .iter()
        .filter_map(|record| {
            T::from_rdata(record.data()).map(|data| TypedRecord {
                name: record.name(),
                ttl: record.ttl(),
                data,
            })
        })
        .collect()
}

/// Like [`collect_records`] but keeps only the record data.
pub fn collect_rdata<'a, T: RecordShape>(records: &'a [Record]) -> Vec<&'a T> {
    records
        .iter()
        .filter_map(|record| T::from_rdata(record.data()))
        .collect()
}
