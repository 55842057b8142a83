//! Root endpoint handler for the landing page.
//!
//! This module provides the `/` endpoint handler that displays
//! a landing page with all available endpoints.

use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the root `/` endpoint.
#[instrument(skip(state))]
pub async fn root_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing / request");
    state.health_stats.record_http_request();

    let version = env!("CARGO_PKG_VERSION");

    let uptime_secs = state.start_time.elapsed().as_secs();
    let hours = uptime_secs / 3600;
    let minutes = (uptime_secs % 3600) / 60;
    let seconds = uptime_secs % 60;
    let uptime_str = format!("{}h {}m {}s", hours, minutes, seconds);

    let health_link = if state.config.enable_health.unwrap_or(true) {
        r#"<li><a href="/health">/health</a> - collection loop statistics</li>"#
    } else {
        ""
    };

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>CephFS Subvolume Exporter</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 40px; color: #333; }}
        code {{ background: #e9ecef; padding: 2px 4px; border-radius: 3px; }}
    </style>
</head>
<body>
    <h1>CephFS Subvolume Exporter</h1>
    <p>Version {version} &middot; uptime {uptime_str}</p>
    <p>Filesystem <code>{filesystem}</code>, path <code>{path}</code>, every {interval}s</p>
    <ul>
        <li><a href="/metrics">/metrics</a> - Prometheus metrics</li>
        {health_link}
        <li><a href="/config">/config</a> - effective configuration</li>
    </ul>
</body>
</html>
"#,
        filesystem = state.config.filesystem(),
        path = state.config.subvolume_path(),
        interval = state.config.interval().as_secs(),
    );

    Html(html)
}
