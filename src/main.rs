//! cephfs-subvolume-exporter - version 0.1.0
//!
//! Prometheus exporter for CephFS subvolume usage and quota.
//! This is the main entry point that initializes the server and handles subcommands.

mod cli;
mod commands;
mod config;
mod handlers;
mod state;

use axum_server::tls_rustls::RustlsConfig;
use cephfs_subvolume_exporter::{
    run_collector, CephCli, Collector, ExporterMetrics, HealthStats, SubvolumeMetrics,
};
use clap::Parser;
use prometheus::Registry;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, Level};

use cli::{Args, Commands, LogLevel};
use commands::{command_check, command_config, command_test};
use config::{resolve_config, show_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT};
use handlers::router;
use state::{AppState, SharedState};

/// Initializes tracing logging subsystem with the effective log level
/// (`--log-level`, else `log_level` from the config file).
fn setup_logging(config: &Config) {
    let level = config.log_level().unwrap_or(LogLevel::Info);
    let log_level = match level {
        LogLevel::Off => None,
        LogLevel::Error => Some(Level::ERROR),
        LogLevel::Warn => Some(Level::WARN),
        LogLevel::Info => Some(Level::INFO),
        LogLevel::Debug => Some(Level::DEBUG),
        LogLevel::Trace => Some(Level::TRACE),
    };

    let Some(log_level) = log_level else {
        return;
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    info!("Logging initialized with level: {:?}", level);
}

/// Helper function to load and validate configuration.
/// Exits the process with error code 1 if validation fails.
fn load_validated_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let config = resolve_config(args)?;
    if let Err(e) = validate_effective_config(&config) {
        eprintln!("❌ Configuration invalid: {}", e);
        std::process::exit(1);
    }
    Ok(config)
}

/// Resolves once SIGINT or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), shutting down gracefully...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }
}

/// Main application entry point.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Early config resolution for show/check modes
    if args.show_config || args.check_config {
        let config = resolve_config(&args)?;

        if args.check_config {
            if let Err(e) = validate_effective_config(&config) {
                eprintln!("❌ Configuration invalid: {}", e);
                std::process::exit(1);
            }
            println!("✅ Configuration is valid");
            return Ok(());
        }

        return show_config(&config, args.config_format);
    }

    // Handle subcommands
    if let Some(command) = &args.command {
        if let Commands::Config {
            output,
            format,
            commented,
        } = command
        {
            return command_config(output.clone(), format.clone(), *commented);
        }

        let config = load_validated_config(&args)?;
        setup_logging(&config);

        return match command {
            Commands::Check => command_check(&config).await,
            Commands::Test {
                iterations,
                verbose,
            } => command_test(*iterations, *verbose, &config).await,
            Commands::Config { .. } => unreachable!("Config handled above"),
        };
    }

    // Load configuration for main server mode
    let config = load_validated_config(&args)?;

    setup_logging(&config);

    info!("Starting cephfs-subvolume-exporter");

    let bind_ip_str = config.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
    let port = config.port.unwrap_or(DEFAULT_PORT);

    // Initialize Prometheus metrics registry
    let registry = Registry::new();
    debug!("Prometheus registry initialized");

    let subvolume_metrics = SubvolumeMetrics::new(&registry)?;
    let telemetry = if config.enable_telemetry.unwrap_or(true) {
        Some(ExporterMetrics::new(&registry)?)
    } else {
        debug!("Internal telemetry disabled");
        None
    };

    debug!("All metrics registered successfully");

    let health_stats = Arc::new(HealthStats::new());

    let runner = CephCli::new(config.ceph_binary()).with_timeout(config.command_timeout());
    match config.command_timeout() {
        Some(timeout) => info!("ceph commands are killed after {:?}", timeout),
        None => debug!("ceph commands run without timeout"),
    }

    let mut collector = Collector::new(
        Box::new(runner),
        config.filesystem(),
        config.subvolume_path(),
        subvolume_metrics,
    )
    .with_stale_policy(config.stale_policy())
    .with_health_stats(health_stats.clone());
    if let Some(t) = &telemetry {
        collector = collector.with_telemetry(t.clone());
    }
    let collector = Arc::new(collector);

    info!(
        "Collecting {}:{} every {}s (stale subvolumes: {})",
        config.filesystem(),
        config.subvolume_path(),
        config.interval().as_secs(),
        config.stale_policy()
    );

    let state: SharedState = Arc::new(AppState {
        registry,
        telemetry,
        config: Arc::new(config.clone()),
        health_stats,
        start_time: Instant::now(),
    });

    // Configure HTTP server routes
    let addr: SocketAddr = format!("{}:{}", bind_ip_str, port).parse()?;

    let app = router(state, config.enable_health.unwrap_or(true));

    // Bind before the collector starts so a busy port fails fast.
    let enable_tls = config.enable_tls.unwrap_or(false);
    let listener = if enable_tls {
        None
    } else {
        Some(TcpListener::bind(addr).await.map_err(|e| {
            error!("Failed to bind {}: {}", addr, e);
            e
        })?)
    };

    let collector_task = tokio::spawn(run_collector(collector, config.interval()));

    if let Some(listener) = listener {
        info!(
            "cephfs-subvolume-exporter listening on http://{}:{}",
            bind_ip_str, port
        );

        let server = axum::serve(listener, app);

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    collector_task.abort();
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    } else {
        // Paths are guaranteed by validate_effective_config().
        let (Some(cert_path), Some(key_path)) =
            (config.tls_cert_path.as_ref(), config.tls_key_path.as_ref())
        else {
            collector_task.abort();
            return Err("TLS enabled without tls_cert_path/tls_key_path".into());
        };

        info!("Loading TLS certificate from: {}", cert_path);
        info!("Loading TLS private key from: {}", key_path);

        let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
            .await
            .map_err(|e| {
                error!("Failed to load TLS configuration: {}", e);
                e
            })?;

        info!(
            "cephfs-subvolume-exporter listening on https://{}:{}",
            bind_ip_str, port
        );

        let server = axum_server::bind_rustls(addr, tls_config).serve(app.into_make_service());

        tokio::select! {
            result = server => {
                if let Err(e) = result {
                    error!("Server error: {}", e);
                    collector_task.abort();
                    return Err(e.into());
                }
            }
            _ = shutdown_signal() => {
                info!("Shutdown signal received, exiting...");
            }
        }
    }

    collector_task.abort();
    info!("cephfs-subvolume-exporter stopped gracefully");
    Ok(())
}
