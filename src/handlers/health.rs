//! Health check endpoint handler.
//!
//! This module provides the `/health` endpoint handler that returns
//! collection-loop statistics as plain text.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::atomic::Ordering;
use tracing::{debug, instrument};

use crate::state::SharedState;

// Time conversion constants
const SECONDS_PER_HOUR: f64 = 3600.0;
const MINUTES_PER_HOUR: f64 = 60.0;
const HOURS_PER_DAY: f64 = 24.0;

/// Handler for the /health endpoint.
///
/// Returns 200 once a cycle has listed subvolumes and the latest cycle did
/// so successfully, 503 otherwise. Individual subvolume query failures do
/// not affect the status.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /health request");
    state.health_stats.record_http_request();

    let stats = &state.health_stats;
    let (status, message) = if stats.is_healthy() {
        (StatusCode::OK, "OK")
    } else if stats.total_cycles.load(Ordering::Relaxed) == 0 {
        (StatusCode::SERVICE_UNAVAILABLE, "Waiting for first collection cycle")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Last subvolume discovery failed")
    };

    let uptime_str = format_uptime(stats.get_uptime_seconds());
    let table = stats.render_table();

    debug!("Health check: {} - {}", status, message);
    (
        status,
        [("Content-Type", "text/plain; charset=utf-8")],
        format!(
            "{message}\n\nFilesystem: {}\nPath: {}\nUptime: {uptime_str}\n\n{table}",
            state.config.filesystem(),
            state.config.subvolume_path()
        ),
    )
}

fn format_uptime(uptime_seconds: u64) -> String {
    let uptime_hours = uptime_seconds as f64 / SECONDS_PER_HOUR;
    if uptime_hours < 1.0 {
        format!("{:.1} minutes", uptime_hours * MINUTES_PER_HOUR)
    } else if uptime_hours < HOURS_PER_DAY {
        format!("{:.1} hours", uptime_hours)
    } else {
        format!("{:.1} days", uptime_hours / HOURS_PER_DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(90), "1.5 minutes");
        assert_eq!(format_uptime(2 * 3600), "2.0 hours");
        assert_eq!(format_uptime(3 * 86400), "3.0 days");
    }
}
