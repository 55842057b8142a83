//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{render_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = output.unwrap_or_else(|| PathBuf::from("cephfs-subvolume-exporter.yaml"));

    let mut content = render_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# CephFS Subvolume Exporter Configuration
# ========================================
#
# Server Configuration
# --------------------
# bind: "0.0.0.0"              # Bind IP (0.0.0.0 = all interfaces)
# port: 8000                   # HTTP port
#
# Collection
# ----------
# filesystem: "k8s-fs"         # CephFS filesystem name
# subvolume_path: "/volumes/csi" # Subvolumes are listed under this path
# interval_seconds: 60         # Seconds between collection cycles
# ceph_binary: "ceph"          # ceph CLI, looked up in PATH unless absolute
# command_timeout_seconds: null # Kill ceph commands after N seconds (null = wait forever)
# stale_subvolumes: retain     # retain | remove gauges of vanished subvolumes
#
# Feature Flags
# -------------
# enable_health: true          # Enable /health endpoint
# enable_telemetry: true       # Enable cephfs_exporter_* metrics
#
# Logging
# -------
# log_level: "info"            # off, error, warn, info, debug, trace
#
# TLS/SSL Configuration
# ---------------------
# enable_tls: false            # Enable HTTPS (default: false)
# tls_cert_path: null          # Path to TLS certificate (PEM format)
# tls_key_path: null           # Path to TLS private key (PEM format)
#
# Note: a quota of 0 is exported both for subvolumes without a quota and
# for subvolumes whose quota is really 0.
"#;

    format!("{comments}\n{yaml}")
}
