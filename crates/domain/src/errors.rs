use crate::config::ConfigError;
use hickory_proto::op::{Message, ResponseCode};
use std::fmt;
use thiserror::Error;

/// Classification of a DNS-level failure, as opposed to a network failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsErrorKind {
    RcodeNotSuccess,
    MissingAnswer,
    InvalidAnswer,
    InvalidCnameChain,
    MaxCnames,
    BadFormatAnswer,
}

impl DnsErrorKind {
    pub fn description(self) -> &'static str {
        match self {
            DnsErrorKind::RcodeNotSuccess => "response code is not success",
            DnsErrorKind::MissingAnswer => "response does not contain an answer",
            DnsErrorKind::InvalidAnswer => "response contains an invalid answer",
            DnsErrorKind::InvalidCnameChain => "response contains an invalid CNAME chain",
            DnsErrorKind::MaxCnames => "maximum number of CNAMEs exceeded",
            DnsErrorKind::BadFormatAnswer => "response contains an answer in a bad format",
        }
    }
}

impl fmt::Display for DnsErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// A DNS-level failure together with the response that triggered it.
#[derive(Debug, Clone)]
pub struct DnsError {
    kind: DnsErrorKind,
    response: Box<Message>,
}

impl DnsError {
    pub fn new(kind: DnsErrorKind, response: Message) -> Self {
        Self {
            kind,
            response: Box::new(response),
        }
    }

    pub fn kind(&self) -> DnsErrorKind {
        self.kind
    }

    pub fn response(&self) -> &Message {
        &self.response
    }

    pub fn into_response(self) -> Message {
        *self.response
    }
}

impl fmt::Display for DnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DnsErrorKind::RcodeNotSuccess => {
                let rcode = self.response.response_code();
                write!(
                    f,
                    "{}: {} (rcode={})",
                    self.kind,
                    rcode_name(rcode),
                    u16::from(rcode)
                )
            }
            kind => write!(f, "{}", kind),
        }
    }
}

impl std::error::Error for DnsError {}

pub fn rcode_name(rcode: ResponseCode) -> &'static str {
    match rcode {
        ResponseCode::NoError => "NOERROR",
        ResponseCode::FormErr => "FORMERR",
        ResponseCode::ServFail => "SERVFAIL",
        ResponseCode::NXDomain => "NXDOMAIN",
        ResponseCode::NotImp => "NOTIMP",
        ResponseCode::Refused => "REFUSED",
        ResponseCode::YXDomain => "YXDOMAIN",
        ResponseCode::YXRRSet => "YXRRSET",
        ResponseCode::NXRRSet => "NXRRSET",
        ResponseCode::NotAuth => "NOTAUTH",
        ResponseCode::NotZone => "NOTZONE",
        ResponseCode::BADVERS => "BADVERS",
        _ => "UNKNOWN",
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dns(#[from] DnsError),

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}: {reason}")]
    TransportConnectionRefused { server: String, reason: String },

    #[error("Transport connection closed by {server}")]
    TransportConnectionClosed { server: String },

    #[error("TLS error with {server}: {reason}")]
    Tls { server: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to encode DNS message: {0}")]
    Encode(String),

    #[error("Failed to decode DNS message: {0}")]
    Decode(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("{}", join_errors(.0))]
    Aggregate(Vec<ClientError>),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Kind of the DNS-level failure, if this is one.
    pub fn dns_kind(&self) -> Option<DnsErrorKind> {
        match self {
            ClientError::Dns(err) => Some(err.kind()),
            _ => None,
        }
    }

    pub fn is_connection_closed(&self) -> bool {
        matches!(self, ClientError::TransportConnectionClosed { .. })
    }

    /// Collapses a list of sub-errors; a single error is returned unwrapped.
    pub fn aggregate(mut errors: Vec<ClientError>) -> ClientError {
        if errors.len() == 1 {
            if let Some(err) = errors.pop() {
                return err;
            }
        }
        ClientError::Aggregate(errors)
    }
}

fn join_errors(errors: &[ClientError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
