//! Configuration for the exporter.
//!
//! The configuration file is YAML and lists the clusters whose desired sizes
//! are published:
//!
//! ```yaml
//! elasticsearch_clusters:
//!   - name: prod
//!     nodes_count: 9
//!     data_nodes_count: 3
//! ```
//!
//! Unknown keys are ignored so older binaries keep working with newer files.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Complete exporter configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Clusters to publish, in file order.
    #[serde(default, rename = "elasticsearch_clusters")]
    pub clusters: Vec<ClusterSpec>,
}

/// Desired size of a single cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterSpec {
    /// Cluster name, exported as the `cluster` label.
    pub name: String,

    /// Desired total number of nodes (default: 0).
    #[serde(default, deserialize_with = "count_or_zero")]
    pub nodes_count: u64,

    /// Desired number of data nodes (default: 0).
    #[serde(default, deserialize_with = "count_or_zero")]
    pub data_nodes_count: u64,
}

/// An explicitly empty count (`nodes_count:`) counts as 0.
fn count_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

impl ClusterSpec {
    pub fn new(name: impl Into<String>, nodes_count: u64, data_nodes_count: u64) -> Self {
        Self {
            name: name.into(),
            nodes_count,
            data_nodes_count,
        }
    }
}

impl ExporterConfig {
    /// Load configuration from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    ///
    /// An empty document is a valid configuration with no clusters.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: ExporterConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Serialize the configuration back to YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Distinct cluster names, sorted.
    pub fn cluster_names(&self) -> BTreeSet<&str> {
        self.clusters.iter().map(|c| c.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_cluster() {
        let yaml = r#"
elasticsearch_clusters:
  - name: prod
    nodes_count: 9
    data_nodes_count: 3
"#;
        let config = ExporterConfig::parse(yaml).unwrap();

        assert_eq!(config.clusters, vec![ClusterSpec::new("prod", 9, 3)]);
    }

    #[test]
    fn test_parse_preserves_order() {
        let yaml = r#"
elasticsearch_clusters:
  - name: zeta
    nodes_count: 1
  - name: alpha
    nodes_count: 2
  - name: mid
    nodes_count: 3
"#;
        let config = ExporterConfig::parse(yaml).unwrap();
        let names: Vec<_> = config.clusters.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let yaml = r#"
elasticsearch_clusters:
  - name: staging
  - name: logs
    data_nodes_count: 4
"#;
        let config = ExporterConfig::parse(yaml).unwrap();

        assert_eq!(config.clusters[0], ClusterSpec::new("staging", 0, 0));
        assert_eq!(config.clusters[1], ClusterSpec::new("logs", 0, 4));
    }

    #[test]
    fn test_empty_counts_default_to_zero() {
        let yaml = r#"
elasticsearch_clusters:
  - name: prod
    nodes_count:
    data_nodes_count: ~
  - name: logs
    nodes_count: null
    data_nodes_count: 2
"#;
        let config = ExporterConfig::parse(yaml).unwrap();

        assert_eq!(config.clusters[0], ClusterSpec::new("prod", 0, 0));
        assert_eq!(config.clusters[1], ClusterSpec::new("logs", 0, 2));
    }

    #[test]
    fn test_empty_cluster_list() {
        let config = ExporterConfig::parse("elasticsearch_clusters: []\n").unwrap();
        assert!(config.clusters.is_empty());
    }

    #[test]
    fn test_empty_document() {
        assert!(ExporterConfig::parse("").unwrap().clusters.is_empty());
        assert!(ExporterConfig::parse("\n  \n").unwrap().clusters.is_empty());
    }

    #[test]
    fn test_missing_top_level_key() {
        let config = ExporterConfig::parse("something_else: true\n").unwrap();
        assert!(config.clusters.is_empty());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let yaml = r#"
version: 2
elasticsearch_clusters:
  - name: prod
    nodes_count: 5
    data_nodes_count: 2
    region: eu-west-1
    tags: [a, b]
"#;
        let config = ExporterConfig::parse(yaml).unwrap();
        assert_eq!(config.clusters, vec![ClusterSpec::new("prod", 5, 2)]);
    }

    #[test]
    fn test_non_numeric_count_is_parse_error() {
        let yaml = r#"
elasticsearch_clusters:
  - name: prod
    nodes_count: nine
"#;
        let result = ExporterConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_negative_count_is_parse_error() {
        let yaml = r#"
elasticsearch_clusters:
  - name: prod
    nodes_count: -1
"#;
        assert!(matches!(
            ExporterConfig::parse(yaml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_name_is_parse_error() {
        let yaml = r#"
elasticsearch_clusters:
  - nodes_count: 3
"#;
        let result = ExporterConfig::parse(yaml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("name"));
    }

    #[test]
    fn test_malformed_structure() {
        let result = ExporterConfig::parse("elasticsearch_clusters: {name: [}\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ExporterConfig::load_from_file("/nonexistent/es-node-data-exporter.yaml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ExporterConfig {
            clusters: vec![
                ClusterSpec::new("prod", 9, 3),
                ClusterSpec::new("staging", 3, 1),
                ClusterSpec::new("prod", 12, 6),
            ],
        };

        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("elasticsearch_clusters"));

        let parsed = ExporterConfig::parse(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_cluster_names_deduplicated() {
        let config = ExporterConfig {
            clusters: vec![
                ClusterSpec::new("b", 1, 1),
                ClusterSpec::new("a", 1, 1),
                ClusterSpec::new("b", 2, 2),
            ],
        };

        let names: Vec<_> = config.cluster_names().into_iter().collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
