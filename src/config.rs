//! Configuration management for asinfo-exporter
//!
//! Handles loading and validating configuration from YAML files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::cli::Cli;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error reading the configuration file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Error parsing the configuration file
    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Cluster connection configuration
    #[serde(default)]
    pub cluster: ClusterConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

/// Cluster connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Seed hosts as `host:port`
    #[serde(default = "default_hosts")]
    pub hosts: Vec<String>,

    /// Per-request timeout in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,

    /// Maximum number of nodes queried at once
    #[serde(default = "default_max_concurrent_nodes")]
    pub max_concurrent_nodes: usize,

    /// Whether per-namespace statistics are collected
    #[serde(default = "default_collect_namespaces")]
    pub collect_namespaces: bool,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Server bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Node statistics endpoint path
    #[serde(default = "default_info_path")]
    pub info_path: String,

    /// Namespace statistics endpoint path
    #[serde(default = "default_namespaces_path")]
    pub namespaces_path: String,
}

// Default value functions
fn default_hosts() -> Vec<String> {
    vec!["127.0.0.1:3000".to_string()]
}

fn default_timeout() -> u64 {
    5000
}

fn default_max_concurrent_nodes() -> usize {
    16
}

fn default_collect_namespaces() -> bool {
    true
}

fn default_port() -> u16 {
    9145
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_info_path() -> String {
    "/info".to_string()
}

fn default_namespaces_path() -> String {
    "/namespaces".to_string()
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            hosts: default_hosts(),
            timeout_ms: default_timeout(),
            max_concurrent_nodes: default_max_concurrent_nodes(),
            collect_namespaces: default_collect_namespaces(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            info_path: default_info_path(),
            namespaces_path: default_namespaces_path(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    ///
    /// # Note
    /// - If the file doesn't exist, returns `ConfigError::ReadError`
    /// - Use `Config::load_or_default()` if you want fallback to defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file, falling back to defaults if not found
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        Self::load(path)
    }

    /// Apply CLI overrides and re-validate
    ///
    /// CLI arguments (and their environment variables) win over file values.
    pub fn apply_cli(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(port) = cli.port {
            self.server.port = port;
        }
        if let Some(ref bind_address) = cli.bind_address {
            self.server.bind_address = bind_address.clone();
        }
        if let Some(ref hosts) = cli.hosts {
            self.cluster.hosts = hosts.clone();
        }
        if let Some(timeout) = cli.timeout {
            self.cluster.timeout_ms = timeout;
        }
        if let Some(limit) = cli.max_concurrent_nodes {
            self.cluster.max_concurrent_nodes = limit;
        }

        self.validate()?;
        Ok(self)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        for (field, path) in [
            ("info_path", &self.server.info_path),
            ("namespaces_path", &self.server.namespaces_path),
        ] {
            if !path.starts_with('/') {
                return Err(ConfigError::ValidationError(format!(
                    "{} must start with '/'",
                    field
                )));
            }
            if path == "/" || path == "/health" {
                return Err(ConfigError::ValidationError(format!(
                    "{} '{}' conflicts with a built-in route",
                    field, path
                )));
            }
        }

        if self.server.info_path == self.server.namespaces_path {
            return Err(ConfigError::ValidationError(
                "info_path and namespaces_path must differ".to_string(),
            ));
        }

        if self.cluster.hosts.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one cluster host is required".to_string(),
            ));
        }

        for host in &self.cluster.hosts {
            validate_host(host)?;
        }

        if self.cluster.timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "Cluster timeout_ms must be greater than 0".to_string(),
            ));
        }

        if self.cluster.max_concurrent_nodes == 0 {
            return Err(ConfigError::ValidationError(
                "max_concurrent_nodes must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn validate_host(host: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::ValidationError(format!("Invalid host '{}': expected host:port", host));

    let (name, port) = host.rsplit_once(':').ok_or_else(invalid)?;
    if name.is_empty() {
        return Err(invalid());
    }
    match port.parse::<u16>() {
        Ok(p) if p > 0 => Ok(()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 9145);
        assert_eq!(config.server.info_path, "/info");
        assert_eq!(config.cluster.hosts, vec!["127.0.0.1:3000".to_string()]);
        assert!(config.cluster.collect_namespaces);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.info_path = "info".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.namespaces_path = "/health".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.namespaces_path = "/info".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.cluster.max_concurrent_nodes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_host_validation() {
        assert!(validate_host("127.0.0.1:3000").is_ok());
        assert!(validate_host("aerospike-0.aerospike:3000").is_ok());
        assert!(validate_host("[::1]:3000").is_ok());
        assert!(validate_host("127.0.0.1").is_err());
        assert!(validate_host(":3000").is_err());
        assert!(validate_host("host:0").is_err());
        assert!(validate_host("host:abc").is_err());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
cluster:
  hosts: ["10.0.0.1:3000", "10.0.0.2:3000"]
  timeout_ms: 1500
server:
  port: 9200
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cluster.hosts.len(), 2);
        assert_eq!(config.cluster.timeout_ms, 1500);
        assert_eq!(config.cluster.max_concurrent_nodes, 16);
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.server.namespaces_path, "/namespaces");
    }

    #[test]
    fn test_apply_cli_overrides() {
        let cli = Cli::parse_from([
            "asinfo-exporter",
            "--port",
            "9300",
            "--hosts",
            "10.0.0.5:3000,10.0.0.6:3000",
            "--timeout",
            "250",
        ]);

        let config = Config::default().apply_cli(&cli).unwrap();
        assert_eq!(config.server.port, 9300);
        assert_eq!(
            config.cluster.hosts,
            vec!["10.0.0.5:3000".to_string(), "10.0.0.6:3000".to_string()]
        );
        assert_eq!(config.cluster.timeout_ms, 250);
    }

    #[test]
    fn test_apply_cli_revalidates() {
        let cli = Cli::parse_from(["asinfo-exporter", "--hosts", "not-a-host"]);
        assert!(Config::default().apply_cli(&cli).is_err());
    }
}
