// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::Result;
use clap::Parser;
use dnset::api::PveClient;
use dnset::constants::{ENV_API_TOKEN, ENV_ENDPOINT, ENV_INSECURE, TOKIO_WORKER_THREADS};
use dnset::resolver::SystemResolver;
use dnset::walker::sync_all;
use tracing::{debug, info, warn};

/// Synchronize Proxmox VE firewall IP sets with DNS.
///
/// Scans every IP set in the cluster (cluster, node, VM and container scope)
/// for an `auto_dns_<domain>[_<domain>...]` comment and replaces the members
/// of each tagged set with the current A/AAAA resolution of its domains.
#[derive(Parser, Debug)]
#[command(name = "dnset", version, about)]
struct Cli {
    /// Proxmox VE API endpoint; a bare host gets https:// and port 8006
    #[arg(long, env = ENV_ENDPOINT)]
    endpoint: String,

    /// API token in user@realm!tokenid=secret form
    #[arg(long, env = ENV_API_TOKEN, hide_env_values = true)]
    token: String,

    /// Accept invalid or self-signed TLS certificates
    #[arg(long, env = ENV_INSECURE)]
    insecure: bool,

    /// Log every API call and inspected resource
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging with custom format
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to
    // INFO level (DEBUG with --verbose)
    // Example: RUST_LOG=debug dnset --endpoint pve1
    //
    // Respects RUST_LOG_FORMAT environment variable for output format
    // Example: RUST_LOG_FORMAT=json dnset --endpoint pve1
    let default_filter = if cli.verbose { "dnset=debug,info" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    // Build Tokio runtime with custom thread names
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(TOKIO_WORKER_THREADS)
        .thread_name("dnset-sync")
        .enable_all()
        .build()?;

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting DNS-driven IP set synchronization");

    if cli.insecure {
        warn!("TLS certificate verification is disabled");
    }

    // Setup failures are the only non-zero exits; per-item failures inside
    // the pass are logged and absorbed
    let client = PveClient::new(&cli.endpoint, &cli.token, cli.insecure)?;
    let resolver = SystemResolver::new();
    debug!(endpoint = %cli.endpoint, "Gateway and resolver initialized");

    let summary = sync_all(&client, &resolver).await;

    info!(
        sets = summary.sets_seen,
        applied = summary.sets_applied,
        addresses = summary.addresses_applied,
        failures = summary.member_failures,
        "Synchronization run finished"
    );

    Ok(())
}
