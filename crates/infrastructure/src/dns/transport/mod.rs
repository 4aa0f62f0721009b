pub mod do53;
#[cfg(feature = "dns-over-https")]
pub mod https;
#[cfg(feature = "dns-over-quic")]
pub mod quic;
pub mod resolver;
pub mod session;
pub mod tcp;
#[cfg(feature = "dns-over-rustls")]
pub mod tls;
#[cfg(any(feature = "dns-over-rustls", feature = "dns-over-quic"))]
mod tls_config;

use async_trait::async_trait;
use dnsclient_application::ports::{DnsClient, DnsClientFactory};
use dnsclient_domain::{ClientConfig, ClientError, DnsProtocol};
#[cfg(any(feature = "dns-over-https", feature = "dns-over-quic"))]
use dnsclient_application::services::MessageBuilder;
use hickory_proto::op::Message;
use std::future::Future;
use std::io;
use std::time::Duration;
use tracing::debug;

pub use session::{Connector, ReconnectingSession};

/// Concrete client for one [`ClientConfig`], chosen by its protocol.
pub enum Client {
    Do53(do53::Do53Client),
    #[cfg(feature = "dns-over-rustls")]
    Tls(tls::DotClient),
    #[cfg(feature = "dns-over-https")]
    Https(https::DohClient),
    #[cfg(feature = "dns-over-quic")]
    Quic(quic::DoqClient),
}

impl Client {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Do53(c) => c.protocol_name(),
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(_) => "TLS",
            #[cfg(feature = "dns-over-https")]
            Self::Https(_) => "HTTPS",
            #[cfg(feature = "dns-over-quic")]
            Self::Quic(_) => "QUIC",
        }
    }

    fn inner(&mut self) -> &mut dyn DnsClient {
        match self {
            Self::Do53(c) => c,
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(c) => c,
            #[cfg(feature = "dns-over-https")]
            Self::Https(c) => c,
            #[cfg(feature = "dns-over-quic")]
            Self::Quic(c) => c,
        }
    }
}

#[async_trait]
impl DnsClient for Client {
    fn config(&self) -> &ClientConfig {
        match self {
            Self::Do53(c) => c.config(),
            #[cfg(feature = "dns-over-rustls")]
            Self::Tls(c) => c.config(),
            #[cfg(feature = "dns-over-https")]
            Self::Https(c) => c.config(),
            #[cfg(feature = "dns-over-quic")]
            Self::Quic(c) => c.config(),
        }
    }

    async fn dial(&mut self) -> Result<(), ClientError> {
        self.inner().dial().await
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        self.inner().exchange(request).await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        self.inner().close().await
    }
}

/// Validates `config` and builds the matching transport client. Nothing is
/// dialed yet.
pub fn create_client(config: ClientConfig) -> Result<Client, ClientError> {
    config.validate()?;
    let protocol = config.protocol();
    debug!(server = %config.server, protocol = protocol.protocol_name(), "Creating client");

    match protocol {
        DnsProtocol::Udp | DnsProtocol::Tcp => Ok(Client::Do53(do53::Do53Client::new(config)?)),

        #[cfg(feature = "dns-over-rustls")]
        DnsProtocol::Tls => Ok(Client::Tls(tls::DotClient::new(config)?)),

        #[cfg(feature = "dns-over-https")]
        DnsProtocol::Https => Ok(Client::Https(https::DohClient::new(config)?)),

        #[cfg(feature = "dns-over-quic")]
        DnsProtocol::Quic => Ok(Client::Quic(quic::DoqClient::new(config)?)),

        #[allow(unreachable_patterns)]
        other => Err(ClientError::Config(
            dnsclient_domain::ConfigError::Validation(format!(
                "{} support is not compiled in",
                other.protocol_name()
            )),
        )),
    }
}

/// Builds independent clients from one config, one per scan worker.
pub struct TransportClientFactory {
    config: ClientConfig,
}

impl TransportClientFactory {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl DnsClientFactory for TransportClientFactory {
    fn create(&self) -> Result<Box<dyn DnsClient>, ClientError> {
        Ok(Box::new(create_client(self.config.clone())?))
    }
}

/// Maps socket errors onto the transport error kinds; peer hang-ups become
/// [`ClientError::TransportConnectionClosed`] so sessions can redial.
pub(crate) fn io_error(server: &str, e: io::Error) -> ClientError {
    let server = server.to_string();
    match e.kind() {
        io::ErrorKind::UnexpectedEof
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::NotConnected => ClientError::TransportConnectionClosed { server },
        io::ErrorKind::TimedOut => ClientError::TransportTimeout { server },
        io::ErrorKind::ConnectionRefused => ClientError::TransportConnectionRefused {
            server,
            reason: e.to_string(),
        },
        _ => ClientError::IoError(format!("{}: {}", server, e)),
    }
}

/// Runs one network step under `timeout`.
pub(crate) async fn with_timeout<T, F>(
    server: &str,
    timeout: Duration,
    step: F,
) -> Result<T, ClientError>
where
    F: Future<Output = io::Result<T>>,
{
    tokio::time::timeout(timeout, step)
        .await
        .map_err(|_| ClientError::TransportTimeout {
            server: server.to_string(),
        })?
        .map_err(|e| io_error(server, e))
}

pub(crate) fn check_response_id(expected: u16, response: &Message) -> Result<(), ClientError> {
    if response.id() != expected {
        return Err(ClientError::Decode(format!(
            "response ID {} does not match request ID {}",
            response.id(),
            expected
        )));
    }
    Ok(())
}

/// Copy of `message` carrying `id`; `Message` only exposes the ID through
/// its header.
#[cfg(any(feature = "dns-over-https", feature = "dns-over-quic"))]
pub(crate) fn with_message_id(message: &Message, id: u16) -> Message {
    let mut copy = message.clone();
    let mut header = *copy.header();
    header.set_id(id);
    copy.set_header(header);
    copy
}

/// Wire form of `request` with the ID zeroed, as DoH and DoQ send it.
#[cfg(any(feature = "dns-over-https", feature = "dns-over-quic"))]
pub(crate) fn zero_id_wire(request: &Message) -> Result<Vec<u8>, ClientError> {
    MessageBuilder::serialize(&with_message_id(request, 0))
}

/// Accepts a zero-ID reply and hands it back under the caller's ID.
#[cfg(any(feature = "dns-over-https", feature = "dns-over-quic"))]
pub(crate) fn restore_request_id(reply: Message, request_id: u16) -> Result<Message, ClientError> {
    check_response_id(0, &reply)?;
    Ok(with_message_id(&reply, request_id))
}
