//! Connection ownership and the reconnect-once policy shared by the stream
//! transports (TCP, TLS, QUIC).

use async_trait::async_trait;
use dnsclient_domain::ClientError;
use tracing::debug;

/// Opens connections to one server and performs a single framed round trip
/// on them.
#[async_trait]
pub trait Connector: Send {
    type Connection: Send;

    /// Server label used in logs and errors.
    fn server(&self) -> &str;

    async fn connect(&mut self) -> Result<Self::Connection, ClientError>;

    async fn round_trip(
        &mut self,
        conn: &mut Self::Connection,
        request: &[u8],
    ) -> Result<Vec<u8>, ClientError>;

    async fn shutdown(&mut self, conn: Self::Connection);
}

/// Holds at most one connection. A failed round trip always drops it, and a
/// peer close on a reused connection is retried once on a fresh one.
pub struct ReconnectingSession<C: Connector> {
    connector: C,
    conn: Option<C::Connection>,
    keep_open: bool,
}

impl<C: Connector> ReconnectingSession<C> {
    pub fn new(connector: C, keep_open: bool) -> Self {
        Self {
            connector,
            conn: None,
            keep_open,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    pub async fn dial(&mut self) -> Result<(), ClientError> {
        if self.conn.is_none() {
            debug!(server = %self.connector.server(), "Dialing");
            self.conn = Some(self.connector.connect().await?);
        }
        Ok(())
    }

    pub async fn exchange(&mut self, request: &[u8]) -> Result<Vec<u8>, ClientError> {
        let mut retried = false;

        loop {
            let (mut conn, reused) = match self.conn.take() {
                Some(conn) => (conn, true),
                None => {
                    debug!(server = %self.connector.server(), "Dialing");
                    (self.connector.connect().await?, false)
                }
            };

            match self.connector.round_trip(&mut conn, request).await {
                Ok(response) => {
                    if self.keep_open {
                        self.conn = Some(conn);
                    } else {
                        self.connector.shutdown(conn).await;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    self.connector.shutdown(conn).await;
                    if reused && !retried && e.is_connection_closed() {
                        debug!(
                            server = %self.connector.server(),
                            "Connection closed by peer, redialing once"
                        );
                        retried = true;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    pub async fn close(&mut self) -> Result<(), ClientError> {
        if let Some(conn) = self.conn.take() {
            debug!(server = %self.connector.server(), "Closing connection");
            self.connector.shutdown(conn).await;
        }
        Ok(())
    }
}
