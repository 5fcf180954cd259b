//! Prometheus exporter for desired Elasticsearch cluster sizes.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use es_node_data_exporter::args::LogFormat;
use es_node_data_exporter::{Args, ClusterRegistry, ExporterConfig, HttpServer};

fn init_logging(args: &Args) -> anyhow::Result<()> {
    let log_level = args.log_level.parse().unwrap_or(Level::INFO);
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("es_node_data_exporter={}", log_level).parse()?);

    match args.log_format {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stdout)
                .json()
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stdout)
                .init();
        }
    }

    Ok(())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = ExporterConfig::load_from_file(&args.config_file).with_context(|| {
        format!("Cannot parse config file {}", args.config_file.display())
    })?;

    let registry = Arc::new(ClusterRegistry::new());
    registry.populate(&config);

    info!(
        config = %args.config_file.display(),
        clusters = config.clusters.len(),
        series = registry.series_count(),
        names = ?config.cluster_names(),
        "Registered desired cluster sizes"
    );

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.listen_address,
        "Starting"
    );

    HttpServer::new(registry, args.listen_address, args.telemetry_path)
        .run()
        .await?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("Failed to initialize logging: {e:#}");
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
