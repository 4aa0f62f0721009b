use super::Output;
use clap::Args;
use dnsclient_application::ports::DnsClient;
use dnsclient_application::use_cases::{probe_client_subnet, probe_nsid};
use dnsclient_domain::ClientConfig;
use dnsclient_infrastructure::create_client;
use serde::Serialize;
use std::process::ExitCode;
use tracing::warn;

#[derive(Args, Debug, Clone, Copy)]
#[group(required = true, multiple = false)]
pub struct ProbeKind {
    /// Ask the server for its NSID
    #[arg(long)]
    pub nsid: bool,

    /// Check whether the server echoes a client subnet option
    #[arg(long)]
    pub subnet: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum ProbeResult {
    Nsid { hex: String, text: String },
    ClientSubnet { supported: bool },
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub async fn run(
    config: ClientConfig,
    qname: &str,
    kind: ProbeKind,
    output: Output,
) -> anyhow::Result<ExitCode> {
    let mut client = create_client(config)?;
    let result = probe(&mut client, qname, kind).await;
    if let Err(e) = client.close().await {
        warn!(error = %e, "Failed to close client");
    }

    let result = result?;
    output.print(&result, || match &result {
        ProbeResult::Nsid { hex, text } => format!("NSID: {} ({})", hex, text),
        ProbeResult::ClientSubnet { supported } => format!(
            "client subnet: {}",
            if *supported { "supported" } else { "not supported" }
        ),
    })?;
    Ok(ExitCode::SUCCESS)
}

async fn probe<C>(client: &mut C, qname: &str, kind: ProbeKind) -> anyhow::Result<ProbeResult>
where
    C: DnsClient + ?Sized,
{
    if kind.nsid {
        let nsid = probe_nsid(client, qname).await?;
        return Ok(ProbeResult::Nsid {
            hex: hex(&nsid),
            text: String::from_utf8_lossy(&nsid).into_owned(),
        });
    }
    let supported = probe_client_subnet(client, qname).await?;
    Ok(ProbeResult::ClientSubnet { supported })
}
