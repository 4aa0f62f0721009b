use async_trait::async_trait;
use dnsclient_domain::{ClientConfig, ClientError};
use hickory_proto::op::Message;

/// A single-owner connection to one configured DNS server.
///
/// Clients are not internally synchronized; concurrent callers each own
/// their own client (see [`DnsClientFactory`]).
#[async_trait]
pub trait DnsClient: Send {
    fn config(&self) -> &ClientConfig;

    /// Opens the underlying connection ahead of the first exchange.
    /// Exchanges dial lazily when this is never called.
    async fn dial(&mut self) -> Result<(), ClientError> {
        Ok(())
    }

    /// Sends one request and returns the matching response.
    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError>;

    async fn close(&mut self) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: DnsClient + ?Sized> DnsClient for Box<T> {
    fn config(&self) -> &ClientConfig {
        (**self).config()
    }

    async fn dial(&mut self) -> Result<(), ClientError> {
        (**self).dial().await
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        (**self).exchange(request).await
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        (**self).close().await
    }
}

/// Builds fresh clients for workers that each need their own connection.
pub trait DnsClientFactory: Send + Sync {
    fn create(&self) -> Result<Box<dyn DnsClient>, ClientError>;
}
