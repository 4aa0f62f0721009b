//! DNS-over-QUIC (RFC 9250): one bidirectional stream per query on a shared
//! connection, length-prefixed like TCP, message ID zero.

use super::resolver::resolve_server;
use super::session::{Connector, ReconnectingSession};
use super::tcp::{read_with_length_prefix, send_with_length_prefix};
use super::tls_config::SHARED_DOQ_CONFIG;
use super::{io_error, restore_request_id, with_timeout, zero_id_wire};
use async_trait::async_trait;
use dnsclient_application::ports::DnsClient;
use dnsclient_application::services::MessageBuilder;
use dnsclient_domain::config::DEFAULT_DOQ_PORT;
use dnsclient_domain::{ClientConfig, ClientError, ServerAddr};
use hickory_proto::op::Message;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// DOQ_NO_ERROR (RFC 9250 §4.3).
const DOQ_NO_ERROR: u32 = 0;

/// An endpoint is bound per connection so closing the client releases the
/// UDP socket.
pub struct QuicConnection {
    endpoint: quinn::Endpoint,
    connection: quinn::Connection,
}

pub struct QuicConnector {
    server: ServerAddr,
    config: ClientConfig,
    label: String,
}

impl QuicConnector {
    pub fn new(server: ServerAddr, config: ClientConfig) -> Self {
        let label = server.to_string();
        Self {
            server,
            config,
            label,
        }
    }

    fn client_config(&self) -> Result<quinn::ClientConfig, ClientError> {
        let crypto = quinn::crypto::rustls::QuicClientConfig::try_from(Arc::clone(
            &SHARED_DOQ_CONFIG,
        ))
        .map_err(|e| ClientError::Tls {
            server: self.label.clone(),
            reason: format!("unusable QUIC TLS config: {}", e),
        })?;
        Ok(quinn::ClientConfig::new(Arc::new(crypto)))
    }

    fn connection_error(&self, e: quinn::ConnectionError) -> ClientError {
        use quinn::ConnectionError::*;
        match e {
            TimedOut | ConnectionClosed(_) | ApplicationClosed(_) | Reset | LocallyClosed => {
                ClientError::TransportConnectionClosed {
                    server: self.label.clone(),
                }
            }
            other => ClientError::TransportConnectionRefused {
                server: self.label.clone(),
                reason: other.to_string(),
            },
        }
    }
}

#[async_trait]
impl Connector for QuicConnector {
    type Connection = QuicConnection;

    fn server(&self) -> &str {
        &self.label
    }

    async fn connect(&mut self) -> Result<QuicConnection, ClientError> {
        let addr = resolve_server(&self.server, &self.config).await?;
        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let endpoint = quinn::Endpoint::client(bind_addr).map_err(|e| io_error(&self.label, e))?;
        let server_name = self.server.host();
        let connecting = endpoint
            .connect_with(self.client_config()?, addr, &server_name)
            .map_err(|e| ClientError::TransportConnectionRefused {
                server: self.label.clone(),
                reason: e.to_string(),
            })?;

        let connection = tokio::time::timeout(self.config.timeout(), connecting)
            .await
            .map_err(|_| ClientError::TransportTimeout {
                server: self.label.clone(),
            })?
            .map_err(|e| ClientError::TransportConnectionRefused {
                server: self.label.clone(),
                reason: e.to_string(),
            })?;

        debug!(server = %self.label, "QUIC connection established");
        Ok(QuicConnection {
            endpoint,
            connection,
        })
    }

    async fn round_trip(
        &mut self,
        conn: &mut QuicConnection,
        request: &[u8],
    ) -> Result<Vec<u8>, ClientError> {
        let timeout = self.config.timeout();
        let deadline = Instant::now() + timeout;

        let (mut send_stream, mut recv_stream) =
            tokio::time::timeout(timeout, conn.connection.open_bi())
                .await
                .map_err(|_| ClientError::TransportTimeout {
                    server: self.label.clone(),
                })?
                .map_err(|e| self.connection_error(e))?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        with_timeout(
            &self.label,
            remaining,
            send_with_length_prefix(&mut send_stream, request),
        )
        .await?;

        // RFC 9250 §4.2: the client signals the end of its query with FIN.
        send_stream
            .finish()
            .map_err(|_| ClientError::TransportConnectionClosed {
                server: self.label.clone(),
            })?;

        let remaining = deadline.saturating_duration_since(Instant::now());
        let response =
            with_timeout(&self.label, remaining, read_with_length_prefix(&mut recv_stream))
                .await?;

        debug!(server = %self.label, response_len = response.len(), "QUIC response received");
        Ok(response)
    }

    async fn shutdown(&mut self, conn: QuicConnection) {
        conn.connection.close(quinn::VarInt::from_u32(DOQ_NO_ERROR), b"");
        conn.endpoint.close(quinn::VarInt::from_u32(DOQ_NO_ERROR), b"");
        debug!(server = %self.label, "QUIC connection closed");
    }
}

pub struct DoqClient {
    config: ClientConfig,
    session: ReconnectingSession<QuicConnector>,
}

impl DoqClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let server = ServerAddr::parse(&config.server, DEFAULT_DOQ_PORT)?;
        let session = ReconnectingSession::new(QuicConnector::new(server, config.clone()), true);
        Ok(Self { config, session })
    }
}

#[async_trait]
impl DnsClient for DoqClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn dial(&mut self) -> Result<(), ClientError> {
        self.session.dial().await
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        // RFC 9250 §4.2.1: the Message ID MUST be 0.
        let wire = zero_id_wire(request)?;

        let response_bytes = self.session.exchange(&wire).await?;
        let response = MessageBuilder::parse(&response_bytes)?;
        restore_request_id(response, request.id())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.session.close().await
    }
}
