//! CLI arguments and subcommands for cephfs-subvolume-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "cephfs-subvolume-exporter",
    about = "Prometheus exporter for CephFS subvolume usage and quota",
    long_about = "Prometheus exporter for CephFS subvolume usage and quota.\n\n\
                  Periodically lists the subvolumes under one path of a CephFS filesystem \
                  with the ceph CLI, queries each subvolume's used bytes and quota, and \
                  serves the values on /metrics.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level (overrides log_level from the config file, default: info)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// CephFS filesystem name
    #[arg(short = 'f', long)]
    pub filesystem: Option<String>,

    /// Path whose subvolumes are listed
    #[arg(long)]
    pub subvolume_path: Option<String>,

    /// Seconds between collection cycles
    #[arg(short = 'i', long)]
    pub interval: Option<u64>,

    /// Path or name of the ceph binary
    #[arg(long)]
    pub ceph_binary: Option<PathBuf>,

    /// Kill ceph commands running longer than N seconds (default: wait forever)
    #[arg(long)]
    pub command_timeout: Option<u64>,

    /// What to do with gauges of subvolumes that disappear: retain or remove
    #[arg(long)]
    pub stale_subvolumes: Option<String>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Disable internal cephfs_exporter_* metrics
    #[arg(long)]
    pub disable_telemetry: bool,

    /// Enable TLS/SSL for HTTPS
    #[arg(long)]
    pub enable_tls: bool,

    /// Path to TLS certificate file (PEM format)
    #[arg(long)]
    pub tls_cert: Option<PathBuf>,

    /// Path to TLS private key file (PEM format)
    #[arg(long)]
    pub tls_key: Option<PathBuf>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify that the ceph CLI works and the configured path can be listed
    Check,

    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Run collection cycles once and print the resulting metrics
    Test {
        /// Number of collection cycles
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Print the full Prometheus exposition after each cycle
        #[arg(long)]
        verbose: bool,
    },
}
