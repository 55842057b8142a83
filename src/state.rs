//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers. The collector writes into the same registry through its
//! own clones of the gauge handles.

use cephfs_subvolume_exporter::{ExporterMetrics, HealthStats};
use prometheus::Registry;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// State shared across HTTP requests.
pub struct AppState {
    pub registry: Registry,
    /// `None` when internal telemetry is disabled.
    pub telemetry: Option<ExporterMetrics>,
    pub config: Arc<Config>,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
