//! asinfo-exporter - Aerospike info-protocol statistics collector
//!
//! Serves node-level and per-namespace statistics collected from every
//! cluster node over the info protocol.

use std::io::Write;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use asinfo_exporter::cli::Cli;
use asinfo_exporter::config::Config;
use asinfo_exporter::output::{render_collection, render_validation, CollectionReport};
use asinfo_exporter::server;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    asinfo_exporter::init_logging(&cli.log_level.to_string())?;

    // Load configuration; CLI and env values win over the file
    let config = Config::load_or_default(&cli.config)?.apply_cli(&cli)?;

    if cli.validate {
        print(&render_validation(&config, cli.output_format)?)?;
        return Ok(());
    }

    if cli.collect_once {
        let client = server::connect(&config).await?;
        let cluster = client.info().await;
        let namespaces = if config.cluster.collect_namespaces {
            client.namespace_info().await
        } else {
            Default::default()
        };
        client.close().await;

        let report = CollectionReport {
            cluster: &cluster,
            namespaces: &namespaces,
        };
        print(&render_collection(&report, cli.output_format)?)?;
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting asinfo-exporter"
    );

    // Start server
    server::run(config).await?;

    Ok(())
}

fn print(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
