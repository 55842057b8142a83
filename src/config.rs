//! Configuration management for cephfs-subvolume-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use cephfs_subvolume_exporter::StalePolicy;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::cli::{Args, ConfigFormat, LogLevel};

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_FILESYSTEM: &str = "k8s-fs";
pub const DEFAULT_SUBVOLUME_PATH: &str = "/volumes/csi";
pub const DEFAULT_INTERVAL_SECONDS: u64 = 60;
pub const DEFAULT_CEPH_BINARY: &str = "ceph";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Locations searched when no --config is given.
const DEFAULT_CONFIG_PATHS: [&str; 6] = [
    "/etc/cephfs-subvolume-exporter/config.yaml",
    "/etc/cephfs-subvolume-exporter/config.yml",
    "/etc/cephfs-subvolume-exporter/config.json",
    "./cephfs-subvolume-exporter.yaml",
    "./cephfs-subvolume-exporter.yml",
    "./cephfs-subvolume-exporter.json",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Collection
    pub filesystem: Option<String>,
    #[serde(alias = "subvolume-path")]
    pub subvolume_path: Option<String>,
    #[serde(alias = "interval-seconds")]
    pub interval_seconds: Option<u64>,
    #[serde(alias = "ceph-binary")]
    pub ceph_binary: Option<PathBuf>,
    /// Unset means ceph commands may run forever.
    #[serde(alias = "command-timeout-seconds")]
    pub command_timeout_seconds: Option<u64>,
    #[serde(alias = "stale-subvolumes")]
    pub stale_subvolumes: Option<StalePolicy>,

    // Feature flags
    pub enable_health: Option<bool>,
    pub enable_telemetry: Option<bool>,

    // Logging
    pub log_level: Option<String>,

    // TLS/SSL Configuration
    #[serde(alias = "enable-tls")]
    pub enable_tls: Option<bool>,
    #[serde(alias = "tls-cert-path")]
    pub tls_cert_path: Option<String>,
    #[serde(alias = "tls-key-path")]
    pub tls_key_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            filesystem: Some(DEFAULT_FILESYSTEM.to_string()),
            subvolume_path: Some(DEFAULT_SUBVOLUME_PATH.to_string()),
            interval_seconds: Some(DEFAULT_INTERVAL_SECONDS),
            ceph_binary: Some(PathBuf::from(DEFAULT_CEPH_BINARY)),
            command_timeout_seconds: None,
            stale_subvolumes: Some(StalePolicy::Retain),
            enable_health: Some(true),
            enable_telemetry: Some(true),
            log_level: Some(DEFAULT_LOG_LEVEL.into()),
            enable_tls: Some(false),
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Config {
    pub fn filesystem(&self) -> &str {
        self.filesystem.as_deref().unwrap_or(DEFAULT_FILESYSTEM)
    }

    pub fn subvolume_path(&self) -> &str {
        self.subvolume_path
            .as_deref()
            .unwrap_or(DEFAULT_SUBVOLUME_PATH)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds.unwrap_or(DEFAULT_INTERVAL_SECONDS))
    }

    pub fn ceph_binary(&self) -> PathBuf {
        self.ceph_binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CEPH_BINARY))
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_seconds.map(Duration::from_secs)
    }

    pub fn stale_policy(&self) -> StalePolicy {
        self.stale_subvolumes.unwrap_or_default()
    }

    pub fn log_level(&self) -> Result<LogLevel, String> {
        let level = self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL);
        <LogLevel as ValueEnum>::from_str(level, true).map_err(|_| {
            format!(
                "Invalid log_level '{}', expected one of off, error, warn, info, debug, trace",
                level
            )
        })
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if cfg.filesystem().trim().is_empty() {
        return Err("filesystem must not be empty".into());
    }

    let path = cfg.subvolume_path();
    if path.trim().is_empty() {
        return Err("subvolume_path must not be empty".into());
    }
    if path.ends_with('/') && path.len() > 1 {
        return Err(format!(
            "subvolume_path '{}' must not end with '/', subvolume paths are built as <path>/<name>",
            path
        )
        .into());
    }

    if cfg.interval_seconds == Some(0) {
        return Err("interval_seconds must be greater than 0".into());
    }

    if cfg.command_timeout_seconds == Some(0) {
        return Err("command_timeout_seconds must be greater than 0 when set".into());
    }

    if cfg.ceph_binary().as_os_str().is_empty() {
        return Err("ceph_binary must not be empty".into());
    }

    cfg.log_level()?;

    // TLS validation
    if cfg.enable_tls.unwrap_or(false) {
        let cert_path = cfg.tls_cert_path.as_deref();
        let key_path = cfg.tls_key_path.as_deref();

        match (cert_path, key_path) {
            (None, None) => {
                return Err(
                    "TLS is enabled but neither tls_cert_path nor tls_key_path are set".into(),
                );
            }
            (Some(_), None) => {
                return Err("TLS is enabled but tls_key_path is not set".into());
            }
            (None, Some(_)) => {
                return Err("TLS is enabled but tls_cert_path is not set".into());
            }
            (Some(cert), Some(key)) => {
                check_pem_file(cert, "certificate")?;
                check_pem_file(key, "private key")?;
            }
        }
    }

    Ok(())
}

fn check_pem_file(path: &str, what: &str) -> Result<(), Box<dyn std::error::Error>> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() == 0 => Err(format!("TLS {} file is empty: {}", what, path).into()),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("TLS {} file not found: {}", what, path).into())
        }
        Err(e) => Err(format!("TLS {} file is not readable: {} ({})", what, path, e).into()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = args.log_level.as_ref().and_then(|l| l.to_possible_value()) {
        config.log_level = Some(level.get_name().to_string());
    }

    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    if let Some(fs_name) = &args.filesystem {
        config.filesystem = Some(fs_name.clone());
    }
    if let Some(path) = &args.subvolume_path {
        config.subvolume_path = Some(path.clone());
    }
    if let Some(interval) = args.interval {
        config.interval_seconds = Some(interval);
    }
    if let Some(binary) = &args.ceph_binary {
        config.ceph_binary = Some(binary.clone());
    }
    if let Some(timeout) = args.command_timeout {
        config.command_timeout_seconds = Some(timeout);
    }
    if let Some(policy) = &args.stale_subvolumes {
        config.stale_subvolumes = Some(policy.parse::<StalePolicy>()?);
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_telemetry {
        config.enable_telemetry = Some(false);
    }

    // TLS configuration: CLI wins if provided
    if args.enable_tls {
        config.enable_tls = Some(true);
    }
    if let Some(cert_path) = &args.tls_cert {
        config.tls_cert_path = Some(cert_path.to_string_lossy().to_string());
    }
    if let Some(key_path) = &args.tls_key {
        config.tls_key_path = Some(key_path.to_string_lossy().to_string());
    }

    Ok(config)
}

/// Loads the configuration file at `path`, or the first existing default
/// location. Missing files fall back to [`Config::default`].
///
/// Keys absent from the file keep their default values.
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => match DEFAULT_CONFIG_PATHS.iter().find(|p| Path::new(p).exists()) {
            Some(p) => PathBuf::from(p),
            None => return Ok(Config::default()),
        },
    };

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    let file_config: Config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("toml") => toml::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };
    info!("Loaded configuration from: {}", path.display());

    Ok(merge_with_defaults(file_config))
}

/// Fills unset keys of a file-loaded config from [`Config::default`].
fn merge_with_defaults(file: Config) -> Config {
    let d = Config::default();
    Config {
        port: file.port.or(d.port),
        bind: file.bind.or(d.bind),
        filesystem: file.filesystem.or(d.filesystem),
        subvolume_path: file.subvolume_path.or(d.subvolume_path),
        interval_seconds: file.interval_seconds.or(d.interval_seconds),
        ceph_binary: file.ceph_binary.or(d.ceph_binary),
        command_timeout_seconds: file.command_timeout_seconds.or(d.command_timeout_seconds),
        stale_subvolumes: file.stale_subvolumes.or(d.stale_subvolumes),
        enable_health: file.enable_health.or(d.enable_health),
        enable_telemetry: file.enable_telemetry.or(d.enable_telemetry),
        log_level: file.log_level.or(d.log_level),
        enable_tls: file.enable_tls.or(d.enable_tls),
        tls_cert_path: file.tls_cert_path.or(d.tls_cert_path),
        tls_key_path: file.tls_key_path.or(d.tls_key_path),
    }
}

/// Renders configuration in the requested format.
pub fn render_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    Ok(match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    })
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render_config(config, &format)?);
    Ok(())
}
