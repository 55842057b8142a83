//! Configuration display endpoint handler.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use tracing::{debug, error, instrument};

use crate::cli::ConfigFormat;
use crate::config::render_config;
use crate::state::SharedState;

/// Handler for the /config endpoint. Renders the effective configuration as YAML.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /config request");
    state.health_stats.record_http_request();

    match render_config(&state.config, &ConfigFormat::Yaml) {
        Ok(yaml) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; charset=utf-8")],
            yaml,
        ),
        Err(e) => {
            error!("Failed to render configuration: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "text/plain; charset=utf-8")],
                "Failed to render configuration".to_string(),
            )
        }
    }
}
