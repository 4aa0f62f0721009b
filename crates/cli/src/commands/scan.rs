use super::{Output, ResponseView};
use crate::args::QueryType;
use anyhow::{bail, Context};
use dnsclient_application::use_cases::ScanUseCase;
use dnsclient_domain::ClientConfig;
use dnsclient_infrastructure::TransportClientFactory;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

#[derive(Serialize)]
struct ScanLine {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<ResponseView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Names to scan: one per line, blank lines and `#` comments skipped.
pub fn parse_names(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub async fn run(
    config: ClientConfig,
    input_file: &str,
    query_type: QueryType,
    workers: usize,
    output: Output,
) -> anyhow::Result<ExitCode> {
    let QueryType::Record(record_type) = query_type else {
        bail!("scan supports plain record types only");
    };

    let contents = tokio::fs::read_to_string(input_file)
        .await
        .with_context(|| format!("failed to read {}", input_file))?;
    let names = parse_names(&contents);

    let factory = Arc::new(TransportClientFactory::new(config)?);
    let mut results = ScanUseCase::new(factory, record_type)
        .with_workers(workers)
        .execute(names);

    let mut failures = 0usize;
    let mut total = 0usize;
    while let Some(record) = results.recv().await {
        total += 1;
        let line = match &record.result {
            Ok(response) => ScanLine {
                name: record.name.clone(),
                response: Some(ResponseView::from(response)),
                error: None,
            },
            Err(e) => {
                failures += 1;
                ScanLine {
                    name: record.name.clone(),
                    response: None,
                    error: Some(e.to_string()),
                }
            }
        };

        if output.json {
            println!("{}", serde_json::to_string(&line)?);
        } else {
            match &record.result {
                Ok(response) => {
                    for answer in response.answers() {
                        println!("{}\t{}", record.name, answer);
                    }
                }
                Err(e) => eprintln!("{}\terror: {}", record.name, e),
            }
        }
    }

    info!(total, failures, "Scan finished");
    if failures > 0 {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
