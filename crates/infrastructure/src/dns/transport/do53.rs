//! Classic DNS (RFC 1035 §4.2) over UDP or TCP.
//!
//! UDP responses with the TC bit set are re-asked over a throwaway TCP client
//! unless the config says to ignore truncation.

use super::resolver::resolve_server;
use super::session::ReconnectingSession;
use super::tcp::TcpConnector;
use super::{check_response_id, io_error, with_timeout};
use async_trait::async_trait;
use dnsclient_application::ports::DnsClient;
use dnsclient_application::services::MessageBuilder;
use dnsclient_domain::config::DEFAULT_DO53_PORT;
use dnsclient_domain::{ClientConfig, ClientError, DnsProtocol, ServerAddr};
use hickory_proto::op::Message;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tracing::{debug, warn};

/// Large enough for any UDP payload; the advertised EDNS0 size may be anything
/// up to 65535.
const UDP_RECV_BUFFER_SIZE: usize = 65535;

enum Mode {
    Udp(Option<UdpSocket>),
    Tcp(ReconnectingSession<TcpConnector>),
}

pub struct Do53Client {
    config: ClientConfig,
    server: ServerAddr,
    label: String,
    mode: Mode,
}

impl Do53Client {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let server = ServerAddr::parse(&config.server, DEFAULT_DO53_PORT)?;
        let label = server.to_string();
        let mode = match config.protocol() {
            DnsProtocol::Tcp => Mode::Tcp(ReconnectingSession::new(
                TcpConnector::new(server.clone(), config.clone()),
                config.keep_open,
            )),
            _ => Mode::Udp(None),
        };

        Ok(Self {
            config,
            server,
            label,
            mode,
        })
    }

    pub fn protocol_name(&self) -> &'static str {
        match self.mode {
            Mode::Udp(_) => "UDP",
            Mode::Tcp(_) => "TCP",
        }
    }

    async fn bind_udp(&self) -> Result<UdpSocket, ClientError> {
        let addr = resolve_server(&self.server, &self.config).await?;
        let bind_addr: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| io_error(&self.label, e))?;
        socket
            .connect(addr)
            .await
            .map_err(|e| io_error(&self.label, e))?;

        debug!(server = %self.label, local = ?socket.local_addr().ok(), "UDP socket connected");
        Ok(socket)
    }

    async fn exchange_udp(&mut self, request: &Message) -> Result<Message, ClientError> {
        let wire = MessageBuilder::serialize(request)?;
        let timeout = self.config.timeout();

        if matches!(self.mode, Mode::Udp(None)) {
            let socket = self.bind_udp().await?;
            self.mode = Mode::Udp(Some(socket));
        }
        let Mode::Udp(Some(socket)) = &self.mode else {
            return Err(ClientError::Internal("UDP socket missing".to_string()));
        };

        let bytes_sent = with_timeout(&self.label, timeout, socket.send(&wire)).await?;
        debug!(server = %self.label, bytes_sent, "UDP query sent");

        let mut recv_buf = vec![0u8; UDP_RECV_BUFFER_SIZE];
        let bytes_received = with_timeout(&self.label, timeout, socket.recv(&mut recv_buf)).await?;
        recv_buf.truncate(bytes_received);
        debug!(server = %self.label, bytes_received, "UDP response received");

        let response = MessageBuilder::parse(&recv_buf)?;
        check_response_id(request.id(), &response)?;

        if response.truncated() {
            if self.config.ignore_truncation {
                warn!(server = %self.label, "Truncated UDP response accepted as is");
            } else {
                debug!(server = %self.label, "UDP response truncated, retrying over TCP");
                return self.exchange_over_fresh_tcp(request).await;
            }
        }

        Ok(response)
    }

    async fn exchange_over_fresh_tcp(&self, request: &Message) -> Result<Message, ClientError> {
        let mut tcp = Do53Client::new(self.config.with_tcp())?;
        let result = tcp.exchange(request).await;
        if let Err(e) = tcp.close().await {
            debug!(server = %self.label, error = %e, "Closing TCP fallback client failed");
        }
        result
    }
}

#[async_trait]
impl DnsClient for Do53Client {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn dial(&mut self) -> Result<(), ClientError> {
        if let Mode::Tcp(session) = &mut self.mode {
            return session.dial().await;
        }
        if matches!(self.mode, Mode::Udp(None)) {
            let socket = self.bind_udp().await?;
            self.mode = Mode::Udp(Some(socket));
        }
        Ok(())
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        if let Mode::Tcp(session) = &mut self.mode {
            let wire = MessageBuilder::serialize(request)?;
            let response_bytes = session.exchange(&wire).await?;
            let response = MessageBuilder::parse(&response_bytes)?;
            check_response_id(request.id(), &response)?;
            return Ok(response);
        }
        self.exchange_udp(request).await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        match &mut self.mode {
            Mode::Udp(socket) => {
                if socket.take().is_some() {
                    debug!(server = %self.label, "UDP socket closed");
                }
                Ok(())
            }
            Mode::Tcp(session) => session.close().await,
        }
    }
}
