//! Prometheus metrics definitions for cephfs-subvolume-exporter.
//!
//! The registry is created by the caller and passed in, so the collector and
//! the HTTP handler share one explicit instance instead of a process global.

use prometheus::{Counter, Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};

/// Label carrying the full subvolume path.
pub const SUBVOLUME_LABEL: &str = "subvolume";

/// Per-subvolume gauges written by the collector.
#[derive(Clone)]
pub struct SubvolumeMetrics {
    pub usage_bytes: GaugeVec, // labels: subvolume
    pub quota_bytes: GaugeVec, // labels: subvolume
}

impl SubvolumeMetrics {
    /// Creates and registers both gauge families with the registry.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let usage_bytes = GaugeVec::new(
            Opts::new(
                "cephfs_subvolume_usage_bytes",
                "Disk usage of CephFS subvolumes",
            ),
            &[SUBVOLUME_LABEL],
        )?;
        let quota_bytes = GaugeVec::new(
            Opts::new(
                "cephfs_subvolume_quota_bytes",
                "Disk quota of CephFS subvolumes",
            ),
            &[SUBVOLUME_LABEL],
        )?;

        registry.register(Box::new(usage_bytes.clone()))?;
        registry.register(Box::new(quota_bytes.clone()))?;

        Ok(Self {
            usage_bytes,
            quota_bytes,
        })
    }

    /// Overwrites both gauges of one subvolume.
    pub fn set(&self, subvolume: &str, bytes_used: i64, bytes_quota: i64) {
        self.usage_bytes
            .with_label_values(&[subvolume])
            .set(bytes_used as f64);
        self.quota_bytes
            .with_label_values(&[subvolume])
            .set(bytes_quota as f64);
    }

    /// Drops both gauges of one subvolume from the exposition.
    pub fn remove(&self, subvolume: &str) {
        // Missing label values are not an error here.
        let _ = self.usage_bytes.remove_label_values(&[subvolume]);
        let _ = self.quota_bytes.remove_label_values(&[subvolume]);
    }
}

/// Internal exporter telemetry describing the collection loop itself.
#[derive(Clone)]
pub struct ExporterMetrics {
    pub cycle_duration_seconds: Gauge,
    pub cycle_success: Gauge,
    pub last_cycle_timestamp_seconds: Gauge,
    pub subvolumes_discovered: Gauge,
    pub discovery_errors_total: Counter,
    pub query_errors_total: Counter,
    pub scrape_duration_seconds: Gauge,
}

impl ExporterMetrics {
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let cycle_duration_seconds = Gauge::new(
            "cephfs_exporter_cycle_duration_seconds",
            "Time spent in the last collection cycle",
        )?;
        let cycle_success = Gauge::new(
            "cephfs_exporter_cycle_success",
            "Whether the last collection cycle discovered subvolumes successfully (1) or failed (0)",
        )?;
        let last_cycle_timestamp_seconds = Gauge::new(
            "cephfs_exporter_last_cycle_timestamp_seconds",
            "Unix timestamp of the end of the last collection cycle",
        )?;
        let subvolumes_discovered = Gauge::new(
            "cephfs_exporter_subvolumes_discovered",
            "Number of subvolumes listed in the last successful cycle",
        )?;
        let discovery_errors_total = Counter::new(
            "cephfs_exporter_discovery_errors_total",
            "Collection cycles aborted because subvolume listing failed",
        )?;
        let query_errors_total = Counter::new(
            "cephfs_exporter_query_errors_total",
            "Subvolume info queries that failed",
        )?;
        let scrape_duration_seconds = Gauge::new(
            "cephfs_exporter_scrape_duration_seconds",
            "Time spent serving the previous /metrics request",
        )?;

        registry.register(Box::new(cycle_duration_seconds.clone()))?;
        registry.register(Box::new(cycle_success.clone()))?;
        registry.register(Box::new(last_cycle_timestamp_seconds.clone()))?;
        registry.register(Box::new(subvolumes_discovered.clone()))?;
        registry.register(Box::new(discovery_errors_total.clone()))?;
        registry.register(Box::new(query_errors_total.clone()))?;
        registry.register(Box::new(scrape_duration_seconds.clone()))?;

        Ok(Self {
            cycle_duration_seconds,
            cycle_success,
            last_cycle_timestamp_seconds,
            subvolumes_discovered,
            discovery_errors_total,
            query_errors_total,
            scrape_duration_seconds,
        })
    }
}

/// Renders the registry in the Prometheus text exposition format.
pub fn encode_text(registry: &Registry) -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let families = registry.gather();
    let mut buffer = Vec::with_capacity(4096);
    encoder.encode(&families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
