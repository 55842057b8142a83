//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler. It only reads the
//! registry; values are written by the background collector, so a scrape
//! never waits for a collection cycle and never triggers one.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
};
use cephfs_subvolume_exporter::metrics::encode_text;
use prometheus::{Encoder, TextEncoder};
use std::time::Instant;
use tracing::{debug, error, instrument};

use crate::state::SharedState;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(
    State(state): State<SharedState>,
) -> Result<impl IntoResponse, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");

    let body = encode_text(&state.registry).map_err(|e| {
        error!("Failed to encode Prometheus metrics: {}", e);
        MetricsError::EncodingFailed
    })?;

    let duration = start.elapsed();
    state.health_stats.record_http_request();
    state.health_stats.record_metrics_endpoint_call();
    state
        .health_stats
        .record_scrape_duration_ms(duration.as_secs_f64() * 1000.0);
    state
        .health_stats
        .record_metrics_response_size_kb(body.len() as f64 / 1024.0);

    // Reported on the following scrape.
    if let Some(t) = &state.telemetry {
        t.scrape_duration_seconds.set(duration.as_secs_f64());
    }

    debug!(
        "Metrics request completed: {} bytes, {:.3}ms",
        body.len(),
        duration.as_secs_f64() * 1000.0
    );

    Ok((
        [(header::CONTENT_TYPE, TextEncoder::new().format_type().to_string())],
        body,
    ))
}
