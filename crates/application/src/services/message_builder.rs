//! DNS Message Builder
//!
//! Constructs query messages from a [`ClientConfig`] and converts them to and
//! from wire format using `hickory-proto`.

use super::edns;
use dnsclient_domain::{ClientConfig, ClientError};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages
pub struct MessageBuilder;

impl MessageBuilder {
    /// Parse a domain name, treating it as fully qualified.
    pub fn parse_name(domain: &str) -> Result<Name, ClientError> {
        let domain = domain.trim();
        if domain.is_empty() {
            return Err(ClientError::InvalidDomainName(
                "empty domain name".to_string(),
            ));
        }

        let fqdn = if domain.ends_with('.') {
            domain.to_string()
        } else {
            format!("{}.", domain)
        };

        Name::from_str(&fqdn).map_err(|e| {
            ClientError::InvalidDomainName(format!("Invalid domain '{}': {}", domain, e))
        })
    }

    /// Build a query for `name`/`record_type` carrying the header bits and
    /// EDNS0 options requested by `config`.
    ///
    /// Every message gets a fresh random ID; transports that require a zero
    /// ID (DoH, DoQ) rewrite it themselves.
    pub fn build_query(config: &ClientConfig, name: &Name, record_type: RecordType) -> Message {
        let mut query = Query::new();
        query.set_name(name.clone());
        query.set_query_type(record_type);
        query.set_query_class(DNSClass::IN);

        let mut message = Message::new(fastrand::u16(..), MessageType::Query, OpCode::Query);
        message.set_recursion_desired(config.recursion_desired);
        message.set_authentic_data(config.authentic_data);
        message.set_checking_disabled(config.checking_disabled);
        message.add_query(query);

        if let Some(opt) = edns::build_edns(config) {
            message.set_edns(opt);
        }

        message
    }

    /// Serialize a Message to wire format bytes
    pub fn serialize(message: &Message) -> Result<Vec<u8>, ClientError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message
            .emit(&mut encoder)
            .map_err(|e| ClientError::Encode(e.to_string()))?;

        Ok(buf)
    }

    /// Parse wire format bytes into a Message
    pub fn parse(bytes: &[u8]) -> Result<Message, ClientError> {
        Message::from_vec(bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
