use super::{format_records, Output, ResponseView};
use crate::args::QueryType;
use dnsclient_application::ports::DnsClient;
use dnsclient_application::use_cases::{enumerate_services, get_ips, get_name_servers, lookup};
use dnsclient_domain::{ClientConfig, ServiceEnumeration};
use dnsclient_infrastructure::create_client;
use std::process::ExitCode;
use tracing::{info, warn};

pub async fn run(
    config: ClientConfig,
    qname: &str,
    query_type: QueryType,
    output: Output,
) -> anyhow::Result<ExitCode> {
    let mut client = create_client(config)?;
    info!(qname, protocol = client.protocol_name(), "Querying");

    let result = query(&mut client, qname, query_type, output).await;
    if let Err(e) = client.close().await {
        warn!(error = %e, "Failed to close client");
    }
    result?;
    Ok(ExitCode::SUCCESS)
}

async fn query<C>(
    client: &mut C,
    qname: &str,
    query_type: QueryType,
    output: Output,
) -> anyhow::Result<()>
where
    C: DnsClient + ?Sized,
{
    match query_type {
        QueryType::Record(record_type) => {
            let response = lookup(client, qname, record_type).await?;
            output.print(&ResponseView::from(&response), || {
                format_records(response.answers())
            })
        }
        QueryType::Ips => {
            let ips = get_ips(client, qname).await?;
            output.print(&ips, || {
                ips.iter()
                    .map(|ip| ip.to_string())
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        QueryType::NameServers => {
            let servers = get_name_servers(client, qname).await?;
            output.print(&servers, || {
                servers
                    .iter()
                    .map(|ns| {
                        let ips: Vec<String> = ns.ips.iter().map(|ip| ip.to_string()).collect();
                        format!("{}\t{}", ns.name, ips.join(" "))
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        QueryType::Services => {
            let enumeration = enumerate_services(client, qname).await?;
            output.print(&enumeration, || format_enumeration(&enumeration))
        }
    }
}

fn format_enumeration(enumeration: &ServiceEnumeration) -> String {
    let mut lines = Vec::new();
    for listing in &enumeration.services {
        lines.push(format!("{} ({})", listing.service, listing.browsing_domain));
        for instance in &listing.instances {
            let Some(info) = &instance.info else {
                lines.push(format!("  {}", instance.name));
                continue;
            };
            let mut line = format!(
                "  {}\t{}:{} priority={} weight={}",
                instance.name, info.target, info.port, info.priority, info.weight
            );
            if let Some(text) = &info.text {
                line.push(' ');
                line.push_str(&text.join(" "));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}
