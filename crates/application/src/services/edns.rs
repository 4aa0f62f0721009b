//! EDNS0 (RFC 6891) options attached to outgoing queries.

use dnsclient_domain::ClientConfig;
use hickory_proto::op::{Edns, Message};
use hickory_proto::rr::rdata::opt::{EdnsCode, EdnsOption};
use std::net::IpAddr;

pub const NSID_OPTION_CODE: u16 = 3;
pub const CLIENT_SUBNET_OPTION_CODE: u16 = 8;
pub const TCP_KEEPALIVE_OPTION_CODE: u16 = 11;

const FAMILY_IPV4: u16 = 1;
const FAMILY_IPV6: u16 = 2;

/// OPT record for `config`, or `None` when the query needs no EDNS0.
///
/// The TCP keepalive option (RFC 7828) is only meaningful on stream
/// transports and is skipped for UDP and HTTPS.
pub fn build_edns(config: &ClientConfig) -> Option<Edns> {
    let keep_alive = config.keep_alive && config.protocol().is_stream();
    if !config.uses_edns() && !keep_alive {
        return None;
    }

    let mut edns = Edns::new();
    edns.set_max_payload(config.edns_payload_size());
    edns.set_dnssec_ok(config.dnssec_ok);

    if config.nsid {
        edns.options_mut().insert(nsid_option());
    }
    if let Some(addr) = config.client_subnet {
        edns.options_mut()
            .insert(client_subnet_option(addr, full_prefix(addr)));
    }
    if keep_alive {
        edns.options_mut().insert(keepalive_option());
    }

    Some(edns)
}

/// Empty NSID request (RFC 5001).
pub fn nsid_option() -> EdnsOption {
    EdnsOption::Unknown(NSID_OPTION_CODE, Vec::new())
}

pub fn keepalive_option() -> EdnsOption {
    EdnsOption::Unknown(TCP_KEEPALIVE_OPTION_CODE, Vec::new())
}

/// Client subnet option (RFC 7871): family, source prefix, scope prefix 0,
/// then the address truncated to the bytes the prefix covers.
pub fn client_subnet_option(addr: IpAddr, source_prefix: u8) -> EdnsOption {
    let (family, octets) = match addr {
        IpAddr::V4(v4) => (FAMILY_IPV4, v4.octets().to_vec()),
        IpAddr::V6(v6) => (FAMILY_IPV6, v6.octets().to_vec()),
    };
    let source_prefix = source_prefix.min(full_prefix(addr));
    let address_len = usize::from(source_prefix).div_ceil(8);

    let mut payload = Vec::with_capacity(4 + address_len);
    payload.extend_from_slice(&family.to_be_bytes());
    payload.push(source_prefix);
    payload.push(0);
    payload.extend_from_slice(&octets[..address_len]);

    EdnsOption::Unknown(CLIENT_SUBNET_OPTION_CODE, payload)
}

pub fn full_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}

/// Raw NSID payload echoed by the server, if any.
pub fn response_nsid(message: &Message) -> Option<Vec<u8>> {
    let edns = message.extensions().as_ref()?;
    edns.option(EdnsCode::NSID).and_then(|o| Vec::<u8>::try_from(o).ok())
}

pub fn has_client_subnet(message: &Message) -> bool {
    message
        .extensions()
        .as_ref()
        .is_some_and(|edns| edns.option(EdnsCode::Subnet).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option_payload(edns: &Edns, code: EdnsCode) -> Option<Vec<u8>> {
        edns.option(code).and_then(|o| Vec::<u8>::try_from(o).ok())
    }

    #[test]
    fn test_no_edns_by_default() {
        assert!(build_edns(&ClientConfig::default()).is_none());
    }

    #[test]
    fn test_dnssec_ok_and_payload() {
        let config = ClientConfig {
            dnssec_ok: true,
            ..ClientConfig::default()
        };
        let edns = build_edns(&config).unwrap();
        assert!(edns.flags().dnssec_ok);
        assert_eq!(edns.max_payload(), 4096);

        let sized = ClientConfig {
            udp_buf_size: 1232,
            ..ClientConfig::default()
        };
        let edns = build_edns(&sized).unwrap();
        assert!(!edns.flags().dnssec_ok);
        assert_eq!(edns.max_payload(), 1232);
    }

    #[test]
    fn test_nsid_option_is_empty() {
        let config = ClientConfig {
            nsid: true,
            ..ClientConfig::default()
        };
        let edns = build_edns(&config).unwrap();
        assert_eq!(option_payload(&edns, EdnsCode::NSID), Some(Vec::new()));
        assert!(edns.option(EdnsCode::Subnet).is_none());
    }

    #[test]
    fn test_client_subnet_ipv4_payload() {
        let option = client_subnet_option("192.0.2.55".parse().unwrap(), 32);
        assert_eq!(
            Vec::<u8>::try_from(&option).unwrap(),
            vec![0, 1, 32, 0, 192, 0, 2, 55]
        );
    }

    #[test]
    fn test_client_subnet_truncates_to_prefix() {
        let option = client_subnet_option("127.0.0.1".parse().unwrap(), 24);
        assert_eq!(Vec::<u8>::try_from(&option).unwrap(), vec![0, 1, 24, 0, 127, 0, 0]);
    }

    #[test]
    fn test_client_subnet_ipv6_payload() {
        let option = client_subnet_option("2001:db8::1".parse().unwrap(), 128);
        let payload = Vec::<u8>::try_from(&option).unwrap();
        assert_eq!(&payload[..4], &[0, 2, 128, 0]);
        assert_eq!(payload.len(), 4 + 16);
        assert_eq!(&payload[4..6], &[0x20, 0x01]);
    }

    #[test]
    fn test_keepalive_only_on_stream_transports() {
        let udp = ClientConfig {
            keep_alive: true,
            ..ClientConfig::default()
        };
        assert!(build_edns(&udp).is_none());

        let tcp = ClientConfig {
            keep_alive: true,
            tcp: true,
            ..ClientConfig::default()
        };
        let edns = build_edns(&tcp).unwrap();
        assert!(edns
            .option(EdnsCode::from(TCP_KEEPALIVE_OPTION_CODE))
            .is_some());
    }
}
