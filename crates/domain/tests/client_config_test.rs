use dnsclient_domain::{CliConfig, CliOverrides, ClientConfig, ConfigError};
use std::io::Write;

fn assert_invalid(config: ClientConfig) {
    match config.validate() {
        Err(ConfigError::Validation(_)) => {}
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_default_config_is_valid() {
    let config = ClientConfig::default();
    assert!(config.validate().is_ok());
    assert!(config.recursion_desired);
    assert_eq!(config.timeout_ms, 5000);
    assert_eq!(config.max_cnames, 0);
    assert!(!config.uses_edns());
}

#[test]
fn test_rejects_udp_buffer_out_of_range() {
    assert_invalid(ClientConfig {
        udp_buf_size: 65536,
        ..ClientConfig::default()
    });

    let max = ClientConfig {
        udp_buf_size: 65535,
        ..ClientConfig::default()
    };
    assert!(max.validate().is_ok());
}

#[test]
fn test_rejects_max_cnames_above_limit() {
    assert_invalid(ClientConfig {
        max_cnames: 11,
        ..ClientConfig::default()
    });

    let limit = ClientConfig {
        max_cnames: 10,
        ..ClientConfig::default()
    };
    assert!(limit.validate().is_ok());
}

#[test]
fn test_rejects_http_endpoint_with_tls() {
    assert_invalid(ClientConfig {
        http_endpoint: Some("/dns-query".to_string()),
        tls: true,
        ..ClientConfig::default()
    });
}

#[test]
fn test_rejects_get_without_endpoint() {
    assert_invalid(ClientConfig {
        http_use_get: true,
        ..ClientConfig::default()
    });
    assert_invalid(ClientConfig {
        http_use_get: true,
        http_endpoint: Some("   ".to_string()),
        ..ClientConfig::default()
    });
}

#[test]
fn test_rejects_quic_with_tls_or_http() {
    assert_invalid(ClientConfig {
        quic: true,
        tls: true,
        ..ClientConfig::default()
    });
    assert_invalid(ClientConfig {
        quic: true,
        http_endpoint: Some("/dns-query".to_string()),
        ..ClientConfig::default()
    });
}

#[test]
fn test_rejects_conflicting_address_families() {
    assert_invalid(ClientConfig {
        ipv4_only: true,
        ipv6_only: true,
        ..ClientConfig::default()
    });
}

#[test]
fn test_rejects_empty_server() {
    assert_invalid(ClientConfig::new(""));
}

#[test]
fn test_uses_edns_when_any_extension_requested() {
    let dnssec = ClientConfig {
        dnssec_ok: true,
        ..ClientConfig::default()
    };
    assert!(dnssec.uses_edns());

    let nsid = ClientConfig {
        nsid: true,
        ..ClientConfig::default()
    };
    assert!(nsid.uses_edns());

    let subnet = ClientConfig {
        client_subnet: Some("203.0.113.7".parse().unwrap()),
        ..ClientConfig::default()
    };
    assert!(subnet.uses_edns());

    let bufsize = ClientConfig {
        udp_buf_size: 1232,
        ..ClientConfig::default()
    };
    assert!(bufsize.uses_edns());
}

#[test]
fn test_toml_deserialization_fills_defaults() {
    let config = CliConfig::from_toml(
        r#"
        [client]
        server = "dns.quad9.net"
        tls = true
        max_cnames = 4
        client_subnet = "2001:db8::1"

        [logging]
        level = "debug"
    "#,
    )
    .unwrap();

    assert_eq!(config.client.server, "dns.quad9.net");
    assert!(config.client.tls);
    assert!(config.client.recursion_desired);
    assert_eq!(config.client.max_cnames, 4);
    assert_eq!(config.client.timeout_ms, 5000);
    assert!(config.client.client_subnet.unwrap().is_ipv6());
    assert_eq!(config.logging.level, "debug");
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_rejects_bad_subnet() {
    let result = CliConfig::from_toml(
        r#"
        [client]
        client_subnet = "not-an-address"
    "#,
    );
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn test_load_applies_cli_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[client]\nserver = \"9.9.9.9\"\ntimeout_ms = 1000").unwrap();

    let config = CliConfig::load(
        Some(file.path().to_str().unwrap()),
        CliOverrides {
            server: Some("8.8.8.8".to_string()),
            max_cnames: Some(2),
            log_level: Some("trace".to_string()),
            ..Default::default()
        },
    )
    .unwrap();

    assert_eq!(config.client.server, "8.8.8.8");
    assert_eq!(config.client.timeout_ms, 1000);
    assert_eq!(config.client.max_cnames, 2);
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn test_load_missing_file() {
    let result = CliConfig::load(Some("/nonexistent/dnsclient.toml"), CliOverrides::default());
    assert!(matches!(result, Err(ConfigError::FileRead(_, _))));
}
