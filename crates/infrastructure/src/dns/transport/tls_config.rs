//! Shared rustls client configs, built once and reused for every connection
//! so TLS session resumption works across clients.

use std::sync::{Arc, LazyLock};

#[cfg(feature = "dns-over-rustls")]
pub(crate) const DOT_ALPN: &[u8] = b"dot";
#[cfg(feature = "dns-over-quic")]
pub(crate) const DOQ_ALPN: &[u8] = b"doq";

fn install_crypto_provider() {
    // ring (through reqwest) and aws-lc-rs are both linked, so the process
    // default must be chosen explicitly. A second install is a no-op.
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

fn build_client_config(alpn: &[u8]) -> rustls::ClientConfig {
    install_crypto_provider();

    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let mut config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();
    config.alpn_protocols = vec![alpn.to_vec()];
    config.resumption = rustls::client::Resumption::in_memory_sessions(64);
    config
}

#[cfg(feature = "dns-over-rustls")]
pub(crate) static SHARED_DOT_CONFIG: LazyLock<Arc<rustls::ClientConfig>> =
    LazyLock::new(|| Arc::new(build_client_config(DOT_ALPN)));

#[cfg(feature = "dns-over-quic")]
pub(crate) static SHARED_DOQ_CONFIG: LazyLock<Arc<rustls::ClientConfig>> =
    LazyLock::new(|| Arc::new(build_client_config(DOQ_ALPN)));
