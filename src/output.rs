//! Rendering for `--validate` and `--collect-once`
//!
//! Text output is sorted so repeated runs diff cleanly.

use std::collections::BTreeMap;

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::collector::{ClusterInfo, NamespaceInfo};
use crate::config::Config;

/// One collection cycle as printed by `--collect-once`
#[derive(Debug, Serialize)]
pub struct CollectionReport<'a> {
    /// Node-level statistics
    pub cluster: &'a ClusterInfo,
    /// Per-namespace statistics
    pub namespaces: &'a NamespaceInfo,
}

/// Configuration summary printed by `--validate`
#[derive(Debug, Serialize)]
struct ValidationReport<'a> {
    valid: bool,
    config: &'a Config,
}

/// Render a collection cycle
pub fn render_collection(report: &CollectionReport<'_>, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Text => Ok(render_collection_text(report)),
    }
}

fn render_collection_text(report: &CollectionReport<'_>) -> String {
    let mut out = String::new();

    let cluster: BTreeMap<_, _> = report.cluster.iter().collect();
    for (node, metrics) in cluster {
        let metrics: BTreeMap<_, _> = metrics.iter().collect();
        for (key, value) in metrics {
            out.push_str(&format!("{} {}={}\n", node, key, value));
        }
    }

    let namespaces: BTreeMap<_, _> = report.namespaces.iter().collect();
    for (node, per_namespace) in namespaces {
        let per_namespace: BTreeMap<_, _> = per_namespace.iter().collect();
        for (namespace, metrics) in per_namespace {
            let metrics: BTreeMap<_, _> = metrics.iter().collect();
            for (key, value) in metrics {
                out.push_str(&format!("{} {} {}={}\n", node, namespace, key, value));
            }
        }
    }

    out
}

/// Render the result of `--validate`
pub fn render_validation(config: &Config, format: OutputFormat) -> Result<String> {
    let report = ValidationReport {
        valid: true,
        config,
    };

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&report)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(&report)?),
        OutputFormat::Text => Ok(format!(
            "Configuration is valid\n  hosts: {}\n  timeout_ms: {}\n  max_concurrent_nodes: {}\n  listen: {}:{}\n",
            config.cluster.hosts.join(","),
            config.cluster.timeout_ms,
            config.cluster.max_concurrent_nodes,
            config.server.bind_address,
            config.server.port,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::{parse_flat, MetricsMap};
    use std::collections::HashMap;

    fn sample() -> (ClusterInfo, NamespaceInfo) {
        let cluster = ClusterInfo::from([
            ("B2".to_string(), parse_flat("uptime=5;cluster_size=2")),
            ("A1".to_string(), MetricsMap::new()),
        ]);
        let namespaces = NamespaceInfo::from([(
            "B2".to_string(),
            HashMap::from([("test".to_string(), parse_flat("objects=3"))]),
        )]);
        (cluster, namespaces)
    }

    #[test]
    fn test_render_text_sorted() {
        let (cluster, namespaces) = sample();
        let report = CollectionReport {
            cluster: &cluster,
            namespaces: &namespaces,
        };

        let text = render_collection(&report, OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "B2 cluster_size=2\nB2 uptime=5\nB2 test objects=3\n"
        );
    }

    #[test]
    fn test_render_json() {
        let (cluster, namespaces) = sample();
        let report = CollectionReport {
            cluster: &cluster,
            namespaces: &namespaces,
        };

        let json = render_collection(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["cluster"]["B2"]["uptime"], "5");
        assert!(value["cluster"]["A1"].as_object().unwrap().is_empty());
        assert_eq!(value["namespaces"]["B2"]["test"]["objects"], "3");
    }

    #[test]
    fn test_render_validation_text() {
        let text = render_validation(&Config::default(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("Configuration is valid"));
        assert!(text.contains("127.0.0.1:3000"));
    }
}
