//! CLI argument parsing for asinfo-exporter
//!
//! This module provides the command-line interface using clap derive macros.
//!
//! # Options
//!
//! - `--config` / `-c`: Configuration file path (default: config.yaml, env: ASINFO_CONFIG)
//! - `--port` / `-p`: Server port (overrides config file, env: ASINFO_PORT)
//! - `--bind-address`: Server bind address (env: ASINFO_BIND_ADDRESS)
//! - `--hosts`: Comma-separated seed hosts as host:port (env: ASINFO_HOSTS)
//! - `--timeout`: Per-request timeout in milliseconds (env: ASINFO_TIMEOUT)
//! - `--max-concurrent-nodes`: Nodes queried at once (env: ASINFO_MAX_CONCURRENT_NODES)
//! - `--validate`: Validate configuration without starting server
//! - `--collect-once`: Collect once, print the result and exit
//! - `--log-level` / `-l`: Log level (trace/debug/info/warn/error, env: ASINFO_LOG_LEVEL)
//! - `--output-format`: Output format for validate/collect-once (text/json/yaml)
//!
//! # Precedence
//!
//! Configuration values are resolved in the following order (highest to lowest priority):
//! 1. CLI arguments
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// asinfo-exporter - Aerospike info-protocol statistics collector
///
/// Queries every cluster node over the info protocol and serves
/// node-level and per-namespace statistics as JSON.
#[derive(Parser, Debug)]
#[command(name = "asinfo-exporter")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config.yaml",
        env = "ASINFO_CONFIG"
    )]
    pub config: PathBuf,

    /// Server port (overrides config file)
    #[arg(short, long, value_name = "PORT", env = "ASINFO_PORT")]
    pub port: Option<u16>,

    /// Server bind address (overrides config file)
    /// Supported values: IP addresses (0.0.0.0, 127.0.0.1, ::1) or "localhost"
    #[arg(long, value_name = "ADDRESS", env = "ASINFO_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Seed hosts, comma-separated host:port (overrides config file)
    #[arg(long, value_name = "HOSTS", value_delimiter = ',', env = "ASINFO_HOSTS")]
    pub hosts: Option<Vec<String>>,

    /// Per-request timeout in milliseconds (overrides config file)
    #[arg(long, value_name = "MS", env = "ASINFO_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Maximum number of nodes queried at once (overrides config file)
    #[arg(long, value_name = "N", env = "ASINFO_MAX_CONCURRENT_NODES")]
    pub max_concurrent_nodes: Option<usize>,

    /// Validate configuration without starting server
    #[arg(long, conflicts_with = "collect_once")]
    pub validate: bool,

    /// Collect once, print the result and exit
    #[arg(long)]
    pub collect_once: bool,

    /// Log level
    #[arg(
        short,
        long,
        value_enum,
        default_value = "info",
        env = "ASINFO_LOG_LEVEL"
    )]
    pub log_level: LogLevel,

    /// Output format for --validate and --collect-once
    #[arg(long, value_enum, default_value = "text")]
    pub output_format: OutputFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level - most verbose
    Trace,
    /// Debug level
    Debug,
    /// Info level - default
    Info,
    /// Warn level
    Warn,
    /// Error level - least verbose
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// Output format options for validate and collect-once modes
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}
