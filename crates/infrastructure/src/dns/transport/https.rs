//! HTTPS Transport for DNS queries — DNS-over-HTTPS (RFC 8484)
//!
//! Sends DNS queries as HTTP POST requests with `application/dns-message`
//! content type, or as GET requests carrying the message base64url-encoded
//! in the `dns` query parameter. No connection state is kept by the client;
//! reqwest pools connections underneath.
//!
//! Wire format (HTTP):
//! ```text
//! POST /dns-query HTTP/2
//! Content-Type: application/dns-message
//! Accept: application/dns-message
//!
//! <raw DNS message bytes>
//! ```

use super::{restore_request_id, zero_id_wire};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use dnsclient_application::ports::DnsClient;
use dnsclient_application::services::MessageBuilder;
use dnsclient_domain::config::DEFAULT_HTTP_ENDPOINT;
use dnsclient_domain::{ClientConfig, ClientError};
use hickory_proto::op::Message;
use tracing::debug;

/// Expected content type for DNS-over-HTTPS (RFC 8484 §4.2.1)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

pub struct DohClient {
    config: ClientConfig,
    url: String,
    http: reqwest::Client,
}

impl DohClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let url = endpoint_url(&config);
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| ClientError::Http(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, url, http })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_request(&self, wire: Vec<u8>) -> reqwest::RequestBuilder {
        if self.config.http_use_get {
            let url = get_url(&self.url, &wire);
            self.http
                .get(url)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
        } else {
            self.http
                .post(&self.url)
                .header("Content-Type", DNS_MESSAGE_CONTENT_TYPE)
                .header("Accept", DNS_MESSAGE_CONTENT_TYPE)
                .body(wire)
        }
    }
}

/// `server` may already be a full URL; otherwise it is a host to which the
/// configured endpoint path is appended.
pub(crate) fn endpoint_url(config: &ClientConfig) -> String {
    let server = config.server.trim();
    if server.starts_with("https://") || server.starts_with("http://") {
        return server.to_string();
    }

    let endpoint = config
        .http_endpoint
        .as_deref()
        .map(str::trim)
        .filter(|endpoint| !endpoint.is_empty())
        .unwrap_or(DEFAULT_HTTP_ENDPOINT);
    if endpoint.starts_with('/') {
        format!("https://{}{}", server, endpoint)
    } else {
        format!("https://{}/{}", server, endpoint)
    }
}

/// RFC 8484 §4.1: `dns` parameter, base64url without padding.
pub(crate) fn get_url(base: &str, wire: &[u8]) -> String {
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{}{}dns={}", base, separator, URL_SAFE_NO_PAD.encode(wire))
}

#[async_trait]
impl DnsClient for DohClient {
    fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn exchange(&mut self, request: &Message) -> Result<Message, ClientError> {
        // RFC 8484 §4.1: the ID SHOULD be 0 for cache friendliness.
        let wire = zero_id_wire(request)?;

        debug!(
            url = %self.url,
            get = self.config.http_use_get,
            message_len = wire.len(),
            "Sending DoH query"
        );

        let timeout = self.config.timeout();
        let response = tokio::time::timeout(timeout, self.build_request(wire).send())
            .await
            .map_err(|_| ClientError::TransportTimeout {
                server: self.url.clone(),
            })?
            .map_err(|e| classify_reqwest_error(&self.url, e))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(ClientError::HttpStatus {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let body = tokio::time::timeout(timeout, response.bytes())
            .await
            .map_err(|_| ClientError::TransportTimeout {
                server: self.url.clone(),
            })?
            .map_err(|e| classify_reqwest_error(&self.url, e))?;

        debug!(url = %self.url, response_len = body.len(), "DoH response received");

        let reply = MessageBuilder::parse(&body)?;
        restore_request_id(reply, request.id())
    }

    async fn close(&mut self) -> Result<(), ClientError> {
        Ok(())
    }
}

fn classify_reqwest_error(url: &str, e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::TransportTimeout {
            server: url.to_string(),
        }
    } else if e.is_connect() {
        ClientError::TransportConnectionRefused {
            server: url.to_string(),
            reason: e.to_string(),
        }
    } else {
        ClientError::Http(format!("request to {} failed: {}", url, e))
    }
}
