pub mod cname_chain;
pub mod edns;
pub mod message_builder;
pub mod record_filter;

pub use cname_chain::{order_cname_chain, CnameLink};
pub use message_builder::MessageBuilder;
pub use record_filter::{collect_rdata, collect_records, RecordShape, TypedRecord};
