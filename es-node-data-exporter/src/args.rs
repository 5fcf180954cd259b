//! CLI argument parsing.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/es-node-data-exporter.yaml";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Prometheus exporter for desired Elasticsearch cluster sizes.
#[derive(Parser, Debug, Clone)]
#[command(name = "es-node-data-exporter")]
#[command(about = "Export desired Elasticsearch node counts as Prometheus metrics")]
#[command(version)]
pub struct Args {
    /// Address to listen on for web interface and telemetry.
    #[arg(long = "web.listen-address", default_value = ":9500")]
    pub listen_address: String,

    /// Path under which to expose metrics.
    #[arg(long = "web.telemetry-path", default_value = "/metrics")]
    pub telemetry_path: String,

    /// Path to config file.
    #[arg(long = "config.file", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log.level", default_value = "info")]
    pub log_level: String,

    /// Log output format.
    #[arg(long = "log.format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
