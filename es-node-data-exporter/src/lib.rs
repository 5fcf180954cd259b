//! Prometheus exporter for desired Elasticsearch cluster sizes.
//!
//! The exporter reads a static YAML file describing how many nodes and data
//! nodes each cluster should have, and publishes those numbers as gauges so
//! alerting rules can compare them with the sizes actually observed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │   YAML config   │────>│    Registry     │────>│   HTTP Server   │
//! │  (read once)    │     │ (two gauges)    │     │   (/metrics)    │
//! └─────────────────┘     └─────────────────┘     └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! es-node-data-exporter --config.file /etc/es-node-data-exporter.yaml
//! ```
//!
//! # Configuration
//!
//! See [`config::ExporterConfig`] for the file format.

pub mod args;
pub mod config;
pub mod http;
pub mod registry;

pub use args::Args;
pub use config::{ClusterSpec, ConfigError, ExporterConfig};
pub use http::{BoundServer, HttpServer, ServerError};
pub use registry::{ClusterRegistry, SharedRegistry};
