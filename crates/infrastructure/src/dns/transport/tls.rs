//! DNS-over-TLS (RFC 7858).
//!
//! The connection stays open between exchanges; a server that hangs up on an
//! idle connection costs one redial.

use super::resolver::resolve_server;
use super::session::{Connector, ReconnectingSession};
use super::tcp::{connect_tcp, framed_round_trip};
use super::tls_config::SHARED_DOT_CONFIG;
use super::check_response_id;
use async_trait::async_trait;
use dnsclient_application::ports::DnsClient;
use dnsclient_application::services::MessageBuilder;
use dnsclient_domain::config::DEFAULT_DOT_PORT;
use dnsclient_domain::{ClientConfig, ClientError, ServerAddr};
use hickory_proto::op::Message;
use rustls::pki_types::ServerName;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tracing::debug;

pub struct TlsConnector {
    server: ServerAddr,
    config: ClientConfig,
    label: String,
}

impl TlsConnector {
    pub fn new(server: ServerAddr, config: ClientConfig) -> Self {
        let label = server.to_string();
        Self {
            server,
            config,
            label,
        }
    }

    fn server_name(&self) -> Result<ServerName<'static>, ClientError> {
        ServerName::try_from(self.server.host()).map_err(|e| ClientError::Tls {
            server: self.label.clone(),
            reason: format!("invalid TLS server name '{}': {}", self.server.host(), e),
        })
    }
}

#[async_trait]
impl Connector for TlsConnector {
    type Connection = TlsStream<TcpStream>;

    fn server(&self) -> &str {
        &self.label
    }

    async fn connect(&mut self) -> Result<Self::Connection, ClientError> {
        let server_name = self.server_name()?;
        let addr = resolve_server(&self.server, &self.config).await?;
        let timeout = self.config.timeout();

        let tcp_stream = connect_tcp(&self.label, addr, timeout).await?;

        let connector = tokio_rustls::TlsConnector::from(SHARED_DOT_CONFIG.clone());
        let tls_stream = tokio::time::timeout(timeout, connector.connect(server_name, tcp_stream))
            .await
            .map_err(|_| ClientError::TransportTimeout {
                server: self.label.clone(),
            })?
            .map_err(|e| ClientError::Tls {
                server: self.label.clone(),
                reason: format!("handshake failed: {}", e),
            })?;

        debug!(server = %self.label, "TLS connection established");
        Ok(tls_stream)
    }

    async fn round_trip(
        &mut self,
        conn: &mut Self::Connection,
        request: &[u8],
    ) -> Result<Vec<u8>, ClientError> {
        framed_round_trip(&self.label, conn, request, self.config.timeout()).await
    }

    async fn shutdown(&mut self, mut conn: Self::Connection) {
        if let Err(e) = conn.shutdown().await {
            debug!(server = %self.label, error = %e, "TLS shutdown failed");
        }
    }
}

pub struct DotClient {
    config: ClientConfig,
    session: ReconnectingSession<TlsConnector>,
}

impl DotClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let server = ServerAddr::parse(&config.server, DEFAULT_DOT_PORT)?;
        let session = ReconnectingSession::new(TlsConnector::new(server, config.clone()), true);
        Ok(Self { config, session })
    }
}

#[async_trait]
impl DnsClient for DotClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn dial(&mut self) -> Result<(), ClientError> {
        self.session.dial().await
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        let wire = MessageBuilder::serialize(request)?;
        let response_bytes = self.session.exchange(&wire).await?;
        let response = MessageBuilder::parse(&response_bytes)?;
        check_response_id(request.id(), &response)?;
        Ok(response)
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.session.close().await
    }
}
