#![allow(dead_code)]
use dnsclient_application::services::MessageBuilder;
use dnsclient_domain::ClientConfig;
use hickory_proto::op::Message;
use hickory_proto::rr::RecordType;
use std::net::SocketAddr;

pub struct ConfigBuilder;

impl ConfigBuilder {
    /// Plain UDP against a local mock server with a short timeout.
    pub fn udp(addr: SocketAddr) -> ClientConfig {
        ClientConfig {
            timeout_ms: 1000,
            ..ClientConfig::new(addr.to_string())
        }
    }

    pub fn tcp(addr: SocketAddr) -> ClientConfig {
        Self::udp(addr).with_tcp()
    }

    pub fn tcp_keep_open(addr: SocketAddr) -> ClientConfig {
        ClientConfig {
            keep_open: true,
            ..Self::tcp(addr)
        }
    }
}

pub fn a_query(config: &ClientConfig, name: &str) -> Message {
    let name = MessageBuilder::parse_name(name).unwrap();
    MessageBuilder::build_query(config, &name, RecordType::A)
}
