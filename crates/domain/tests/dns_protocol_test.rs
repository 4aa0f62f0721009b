use dnsclient_domain::{ClientConfig, DnsProtocol, ServerAddr};

#[test]
fn test_parse_ip_without_port_uses_default() {
    let addr = ServerAddr::parse("8.8.8.8", 53).unwrap();
    assert_eq!(addr.socket_addr(), Some("8.8.8.8:53".parse().unwrap()));
}

#[test]
fn test_parse_ip_with_port() {
    let addr = ServerAddr::parse("9.9.9.9:5353", 53).unwrap();
    assert_eq!(addr.port(), 5353);
    assert!(addr.socket_addr().is_some());
}

#[test]
fn test_parse_bare_ipv6() {
    let addr = ServerAddr::parse("2606:4700:4700::1111", 853).unwrap();
    assert_eq!(addr.port(), 853);
    assert_eq!(addr.host(), "2606:4700:4700::1111");
}

#[test]
fn test_parse_bracketed_ipv6() {
    let with_port = ServerAddr::parse("[::1]:5300", 53).unwrap();
    assert_eq!(with_port.socket_addr(), Some("[::1]:5300".parse().unwrap()));

    let without_port = ServerAddr::parse("[::1]", 853).unwrap();
    assert_eq!(without_port.port(), 853);
}

#[test]
fn test_parse_hostname() {
    let addr = ServerAddr::parse("dns.google", 853).unwrap();
    if let ServerAddr::Unresolved { hostname, port } = &addr {
        assert_eq!(&**hostname, "dns.google");
        assert_eq!(*port, 853);
    } else {
        panic!("Expected Unresolved variant");
    }
    assert_eq!(addr.host(), "dns.google");
    assert_eq!(format!("{}", addr), "dns.google:853");
}

#[test]
fn test_parse_hostname_with_port() {
    let addr = ServerAddr::parse("dns.quad9.net:8853", 853).unwrap();
    assert_eq!(addr.port(), 8853);
    assert!(addr.socket_addr().is_none());
}

#[test]
fn test_invalid_server_addresses() {
    assert!(ServerAddr::parse("", 53).is_err());
    assert!(ServerAddr::parse("dns.google:port", 53).is_err());
    assert!(ServerAddr::parse("https://dns.google/dns-query", 443).is_err());
    assert!(ServerAddr::parse("[::1", 53).is_err());
}

#[test]
fn test_protocol_selection_from_config() {
    let mut config = ClientConfig::default();
    assert_eq!(config.protocol(), DnsProtocol::Udp);

    config.tcp = true;
    assert_eq!(config.protocol(), DnsProtocol::Tcp);

    config.tls = true;
    assert_eq!(config.protocol(), DnsProtocol::Tls);

    let doh = ClientConfig {
        http_endpoint: Some("/dns-query".to_string()),
        ..ClientConfig::default()
    };
    assert_eq!(doh.protocol(), DnsProtocol::Https);

    let doq = ClientConfig {
        quic: true,
        ..ClientConfig::default()
    };
    assert_eq!(doq.protocol(), DnsProtocol::Quic);
}

#[test]
fn test_default_ports() {
    assert_eq!(DnsProtocol::Udp.default_port(), 53);
    assert_eq!(DnsProtocol::Tcp.default_port(), 53);
    assert_eq!(DnsProtocol::Tls.default_port(), 853);
    assert_eq!(DnsProtocol::Quic.default_port(), 853);
    assert_eq!(DnsProtocol::Https.default_port(), 443);
}

#[test]
fn test_protocol_name() {
    assert_eq!(DnsProtocol::Udp.protocol_name(), "UDP");
    assert_eq!(DnsProtocol::Https.to_string(), "HTTPS");
    assert!(DnsProtocol::Quic.is_stream());
    assert!(!DnsProtocol::Udp.is_stream());
    assert!(!DnsProtocol::Https.is_stream());
}
