#![allow(dead_code)]
#![allow(unused_imports)]

pub mod builders;
pub mod mock_client;

pub use builders::*;
pub use mock_client::{MockClientFactory, MockDnsClient, MockReply};
