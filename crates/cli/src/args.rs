use clap::Args;
use dnsclient_domain::ClientConfig;
use hickory_proto::rr::RecordType;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

/// Transport and header options shared by every subcommand.
#[derive(Args, Debug, Default, Clone)]
pub struct ClientArgs {
    /// Server to query: HOST[:PORT], or a full https:// URL for DoH
    #[arg(short, long)]
    pub server: Option<String>,

    /// Per-step network timeout (e.g. 500ms, 2s)
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Maximum number of CNAME hops to follow (0 disables following)
    #[arg(long, value_name = "N")]
    pub max_cnames: Option<u8>,

    /// Only use IPv4 to reach the server
    #[arg(short = '4', conflicts_with = "ipv6_only")]
    pub ipv4_only: bool,

    /// Only use IPv6 to reach the server
    #[arg(short = '6')]
    pub ipv6_only: bool,

    /// Set the AD (authentic data) bit
    #[arg(long)]
    pub adflag: bool,

    /// Set the CD (checking disabled) bit
    #[arg(long)]
    pub cdflag: bool,

    /// Set or clear the RD (recursion desired) bit
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    pub rdflag: Option<bool>,

    /// Set the DNSSEC OK bit in the OPT record
    #[arg(long)]
    pub dnssec: bool,

    /// EDNS0 UDP payload size to advertise
    #[arg(long, value_name = "SIZE")]
    pub bufsize: Option<u32>,

    /// DNS-over-HTTPS with POST to ENDPOINT (e.g. /dns-query)
    #[arg(long, value_name = "ENDPOINT", conflicts_with_all = ["https_get", "tls", "quic", "tcp"])]
    pub https: Option<String>,

    /// DNS-over-HTTPS with GET to ENDPOINT
    #[arg(long, value_name = "ENDPOINT", conflicts_with_all = ["tls", "quic", "tcp"])]
    pub https_get: Option<String>,

    /// DNS-over-TLS
    #[arg(long, conflicts_with_all = ["quic", "tcp"])]
    pub tls: bool,

    /// DNS-over-QUIC
    #[arg(long, conflicts_with = "tcp")]
    pub quic: bool,

    /// Plain DNS over TCP instead of UDP
    #[arg(long)]
    pub tcp: bool,

    /// Accept truncated UDP answers instead of retrying over TCP
    #[arg(long)]
    pub ignore: bool,

    /// Keep the TCP connection open between queries
    #[arg(long)]
    pub keepopen: bool,

    /// Send the EDNS0 TCP keepalive option on stream transports
    #[arg(long)]
    pub keepalive: bool,
}

/// EDNS0 options attached to ordinary queries. Kept apart from
/// [`ClientArgs`] because `probe` uses the same flag names to pick a probe.
#[derive(Args, Debug, Default, Clone)]
pub struct EdnsArgs {
    /// Request the server's NSID
    #[arg(long)]
    pub nsid: bool,

    /// Send an EDNS0 client subnet option for ADDR
    #[arg(long, value_name = "ADDR")]
    pub subnet: Option<IpAddr>,
}

impl EdnsArgs {
    pub fn apply(&self, config: &mut ClientConfig) {
        config.nsid |= self.nsid;
        if let Some(subnet) = self.subnet {
            config.client_subnet = Some(subnet);
        }
    }
}

impl ClientArgs {
    /// Milliseconds for the config override; sub-millisecond values round up.
    pub fn timeout_ms(&self) -> Option<u64> {
        self.timeout
            .map(|t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX).max(1))
    }

    /// Layers the flags on top of the file configuration. Flags only ever
    /// switch options on; the server, timeout and CNAME budget arrive through
    /// the config overrides.
    pub fn apply(&self, config: &mut ClientConfig) {
        config.ipv4_only |= self.ipv4_only;
        config.ipv6_only |= self.ipv6_only;
        config.authentic_data |= self.adflag;
        config.checking_disabled |= self.cdflag;
        if let Some(rd) = self.rdflag {
            config.recursion_desired = rd;
        }
        config.dnssec_ok |= self.dnssec;
        if let Some(size) = self.bufsize {
            config.udp_buf_size = size;
        }

        if let Some(endpoint) = &self.https {
            config.http_endpoint = Some(endpoint.clone());
            config.http_use_get = false;
        }
        if let Some(endpoint) = &self.https_get {
            config.http_endpoint = Some(endpoint.clone());
            config.http_use_get = true;
        }
        config.tls |= self.tls;
        config.quic |= self.quic;
        config.tcp |= self.tcp;

        config.ignore_truncation |= self.ignore;
        config.keep_open |= self.keepopen;
        config.keep_alive |= self.keepalive;
    }
}

/// What `query --type` asks for: one record type or a composite lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Record(RecordType),
    Ips,
    NameServers,
    Services,
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "@IPS" => return Ok(QueryType::Ips),
            "@NAMESERVERS" => return Ok(QueryType::NameServers),
            "@SERVICES" => return Ok(QueryType::Services),
            _ => {}
        }

        if let Some(code) = upper.strip_prefix("TYPE") {
            if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
                let code: u16 = code
                    .parse()
                    .map_err(|_| format!("type code out of range: {}", s))?;
                return Ok(QueryType::Record(RecordType::from(code)));
            }
        }

        RecordType::from_str(&upper)
            .map(QueryType::Record)
            .map_err(|_| format!("unknown query type: {}", s))
    }
}
