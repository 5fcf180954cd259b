//! Registry of the desired cluster size gauges.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use parking_lot::RwLock;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tracing::debug;

use crate::config::ExporterConfig;

/// Name of the desired total node count family.
pub const NODE_COUNT_METRIC: &str = "desired_node_count";

/// Name of the desired data node count family.
pub const DATA_NODE_COUNT_METRIC: &str = "desired_data_node_count";

/// Label set shared by both gauge families.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EncodeLabelSet)]
pub struct ClusterLabels {
    pub cluster: String,
}

impl ClusterLabels {
    /// Build the label set, escaping the value for the text exposition format.
    fn new(cluster: &str) -> Self {
        Self {
            cluster: escape_label_value(cluster),
        }
    }
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

type ClusterGauge = Family<ClusterLabels, Gauge<f64, AtomicU64>>;

/// Owns the gauge families exposed on the metrics endpoint.
///
/// Values are written once at startup by [`ClusterRegistry::populate`] and
/// only read afterwards. Gauges are atomics, so scrapes never block each other.
#[derive(Debug)]
pub struct ClusterRegistry {
    registry: Registry,
    node_count: ClusterGauge,
    data_node_count: ClusterGauge,
    /// Cluster label values that have a series in both families.
    clusters: RwLock<BTreeSet<String>>,
}

/// Create a shareable registry handle.
pub type SharedRegistry = Arc<ClusterRegistry>;

impl ClusterRegistry {
    /// Create a registry with both families registered and no series.
    pub fn new() -> Self {
        let mut registry = Registry::default();
        let node_count = ClusterGauge::default();
        let data_node_count = ClusterGauge::default();

        registry.register(
            NODE_COUNT_METRIC,
            "Elasticsearch desirable number of nodes",
            node_count.clone(),
        );
        registry.register(
            DATA_NODE_COUNT_METRIC,
            "Elasticsearch desirable number of data nodes",
            data_node_count.clone(),
        );

        Self {
            registry,
            node_count,
            data_node_count,
            clusters: RwLock::new(BTreeSet::new()),
        }
    }

    /// Set both gauges for every configured cluster, in configuration order.
    ///
    /// A name that appears more than once keeps the values of its last entry.
    pub fn populate(&self, config: &ExporterConfig) {
        let mut clusters = self.clusters.write();

        for spec in &config.clusters {
            let labels = ClusterLabels::new(&spec.name);

            self.node_count
                .get_or_create(&labels)
                .set(spec.nodes_count as f64);
            self.data_node_count
                .get_or_create(&labels)
                .set(spec.data_nodes_count as f64);

            if !clusters.insert(spec.name.clone()) {
                debug!(
                    cluster = %spec.name,
                    nodes = spec.nodes_count,
                    data_nodes = spec.data_nodes_count,
                    "Duplicate cluster name, overwriting earlier values"
                );
            }
        }
    }

    /// Current desired node count for a cluster.
    pub fn node_count(&self, cluster: &str) -> Option<f64> {
        self.node_count
            .get(&ClusterLabels::new(cluster))
            .map(|gauge| gauge.get())
    }

    /// Current desired data node count for a cluster.
    pub fn data_node_count(&self, cluster: &str) -> Option<f64> {
        self.data_node_count
            .get(&ClusterLabels::new(cluster))
            .map(|gauge| gauge.get())
    }

    /// Number of distinct cluster label values in each family.
    pub fn series_count(&self) -> usize {
        self.clusters.read().len()
    }

    /// Render the registry in text exposition format.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut output = String::new();
        encode(&mut output, &self.registry)?;
        Ok(output)
    }
}

impl Default for ClusterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
