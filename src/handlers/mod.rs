//! HTTP endpoint handlers for the exporter.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/metrics`: Prometheus metrics endpoint
//! - `/health`: Health check endpoint
//! - `/config`: Configuration display endpoint
//! - `/`: Landing page

pub mod config;
pub mod health;
pub mod metrics;
pub mod root;

use axum::{routing::get, Router};

use crate::state::SharedState;

// Re-export handlers
pub use config::config_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use root::root_handler;

/// Builds the exporter's routes. `/health` is only mounted when enabled.
pub fn router(state: SharedState, enable_health: bool) -> Router {
    let mut app = Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/config", get(config_handler));

    if enable_health {
        app = app.route("/health", get(health_handler));
    }

    app.with_state(state)
}
