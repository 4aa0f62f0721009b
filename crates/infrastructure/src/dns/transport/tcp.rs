//! Plain TCP connector and the RFC 1035 §4.2.2 length-prefix framing shared
//! by every stream transport.

use super::resolver::resolve_server;
use super::session::Connector;
use super::{io_error, with_timeout};
use async_trait::async_trait;
use dnsclient_domain::{ClientConfig, ClientError, ServerAddr};
use std::io;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

const MAX_TCP_MESSAGE_SIZE: usize = 65535;

pub struct TcpConnector {
    server: ServerAddr,
    config: ClientConfig,
    label: String,
}

impl TcpConnector {
    pub fn new(server: ServerAddr, config: ClientConfig) -> Self {
        let label = server.to_string();
        Self {
            server,
            config,
            label,
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Connection = TcpStream;

    fn server(&self) -> &str {
        &self.label
    }

    async fn connect(&mut self) -> Result<TcpStream, ClientError> {
        let addr = resolve_server(&self.server, &self.config).await?;
        let stream = connect_tcp(&self.label, addr, self.config.timeout()).await?;
        debug!(server = %self.label, "TCP connection established");
        Ok(stream)
    }

    async fn round_trip(
        &mut self,
        conn: &mut TcpStream,
        request: &[u8],
    ) -> Result<Vec<u8>, ClientError> {
        framed_round_trip(&self.label, conn, request, self.config.timeout()).await
    }

    async fn shutdown(&mut self, mut conn: TcpStream) {
        if let Err(e) = conn.shutdown().await {
            debug!(server = %self.label, error = %e, "TCP shutdown failed");
        }
    }
}

pub(crate) async fn connect_tcp(
    server: &str,
    addr: std::net::SocketAddr,
    timeout: Duration,
) -> Result<TcpStream, ClientError> {
    let stream = with_timeout(server, timeout, TcpStream::connect(addr)).await?;
    stream.set_nodelay(true).map_err(|e| io_error(server, e))?;
    Ok(stream)
}

/// Writes one framed request and reads one framed response, each step
/// bounded by `timeout`.
pub(crate) async fn framed_round_trip<S>(
    server: &str,
    stream: &mut S,
    request: &[u8],
    timeout: Duration,
) -> Result<Vec<u8>, ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    with_timeout(server, timeout, send_with_length_prefix(stream, request)).await?;
    debug!(server, message_len = request.len(), "Stream query sent");

    let response = with_timeout(server, timeout, read_with_length_prefix(stream)).await?;
    debug!(server, response_len = response.len(), "Stream response received");
    Ok(response)
}

pub(crate) async fn send_with_length_prefix<S>(stream: &mut S, message_bytes: &[u8]) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "message of {} bytes exceeds {}",
                message_bytes.len(),
                MAX_TCP_MESSAGE_SIZE
            ),
        )
    })?;

    let mut framed = Vec::with_capacity(message_bytes.len() + 2);
    framed.extend_from_slice(&length.to_be_bytes());
    framed.extend_from_slice(message_bytes);

    stream.write_all(&framed).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_framing_prefixes_length() {
        let (mut client, mut server) = tokio::io::duplex(1024);

        send_with_length_prefix(&mut client, &[0xab, 0xcd, 0xef])
            .await
            .unwrap();

        let mut raw = [0u8; 5];
        server.read_exact(&mut raw).await.unwrap();
        assert_eq!(raw, [0x00, 0x03, 0xab, 0xcd, 0xef]);
    }

    #[tokio::test]
    async fn test_read_framed_message() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        server.write_all(&[0x00, 0x02, 0x12, 0x34]).await.unwrap();

        let message = read_with_length_prefix(&mut client).await.unwrap();
        assert_eq!(message, vec![0x12, 0x34]);
    }

    #[tokio::test]
    async fn test_truncated_frame_is_eof() {
        let (mut client, mut server) = tokio::io::duplex(1024);
        server.write_all(&[0x00, 0x08, 0x01]).await.unwrap();
        drop(server);

        let err = read_with_length_prefix(&mut client).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_oversized_message_rejected() {
        let (mut client, _server) = tokio::io::duplex(16);
        let huge = vec![0u8; MAX_TCP_MESSAGE_SIZE + 1];

        let err = send_with_length_prefix(&mut client, &huge)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
