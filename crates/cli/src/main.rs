use clap::{Parser, Subcommand};
use dnsclient_domain::config::CliOverrides;
use std::process::ExitCode;
use tracing::{debug, error};

mod args;
mod bootstrap;
mod commands;

use args::{ClientArgs, EdnsArgs, QueryType};

#[derive(Parser)]
#[command(name = "dnsclient")]
#[command(version)]
#[command(about = "DNS client for Do53, DoT, DoH and DoQ servers")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one name
    Query {
        qname: String,

        /// Record type: mnemonic, TYPE###, @ips, @nameservers or @services
        #[arg(short = 't', long = "type", default_value = "A")]
        query_type: QueryType,

        #[command(flatten)]
        edns: EdnsArgs,

        #[command(flatten)]
        client: ClientArgs,
    },
    /// Resolve every name listed in a file
    Scan {
        input_file: String,

        /// Number of concurrent workers, each with its own connection
        #[arg(short, long, default_value_t = dnsclient_application::use_cases::scan::DEFAULT_SCAN_WORKERS)]
        workers: usize,

        #[arg(short = 't', long = "type", default_value = "A")]
        query_type: QueryType,

        #[command(flatten)]
        edns: EdnsArgs,

        #[command(flatten)]
        client: ClientArgs,
    },
    /// Check which EDNS0 extensions a server supports
    Probe {
        qname: String,

        #[command(flatten)]
        probe: commands::probe::ProbeKind,

        #[command(flatten)]
        client: ClientArgs,
    },
}

impl Command {
    fn client_args(&self) -> &ClientArgs {
        match self {
            Command::Query { client, .. }
            | Command::Scan { client, .. }
            | Command::Probe { client, .. } => client,
        }
    }

    fn edns_args(&self) -> Option<&EdnsArgs> {
        match self {
            Command::Query { edns, .. } | Command::Scan { edns, .. } => Some(edns),
            Command::Probe { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let client_args = cli.command.client_args();
    let overrides = CliOverrides {
        server: client_args.server.clone(),
        timeout_ms: client_args.timeout_ms(),
        max_cnames: client_args.max_cnames,
        log_level: cli.log_level.clone(),
    };

    let mut config = bootstrap::load_config(cli.config.as_deref(), overrides)?;
    bootstrap::init_logging(&config.logging);
    client_args.apply(&mut config.client);
    if let Some(edns) = cli.command.edns_args() {
        edns.apply(&mut config.client);
    }
    debug!(
        server = %config.client.server,
        protocol = ?config.client.protocol(),
        "Configuration loaded"
    );

    let output = commands::Output { json: cli.json };
    match cli.command {
        Command::Query {
            qname, query_type, ..
        } => commands::query::run(config.client, &qname, query_type, output).await,
        Command::Scan {
            input_file,
            workers,
            query_type,
            ..
        } => commands::scan::run(config.client, &input_file, query_type, workers, output).await,
        Command::Probe { qname, probe, .. } => {
            commands::probe::run(config.client, &qname, probe, output).await
        }
    }
}
