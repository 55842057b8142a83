//! The collection cycle and the background loop that schedules it.
//!
//! A cycle lists the subvolumes under the configured path, then queries each
//! one in turn and overwrites its gauges. Cycles are strictly serial: no
//! subvolume is queried concurrently with another, and a new cycle never
//! starts before the previous one has returned.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, instrument, warn};

use crate::ceph::{list_subvolumes, subvolume_info, CommandRunner};
use crate::error::DiscoveryError;
use crate::health_stats::HealthStats;
use crate::metrics::{ExporterMetrics, SubvolumeMetrics};
use crate::stale::StalePolicy;

/// Outcome of a cycle whose discovery step succeeded.
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Number of subvolumes listed.
    pub discovered: usize,
    /// Subvolumes whose gauges were set this cycle.
    pub updated: usize,
    /// Subvolumes skipped because their info query failed.
    pub failed: Vec<String>,
    /// Subvolumes whose gauges the stale policy removed.
    pub removed: Vec<String>,
    pub duration: Duration,
}

/// Collects usage and quota of every subvolume under one path of one
/// filesystem into [`SubvolumeMetrics`].
pub struct Collector {
    runner: Box<dyn CommandRunner>,
    filesystem: String,
    subvolume_path: String,
    metrics: SubvolumeMetrics,
    telemetry: Option<ExporterMetrics>,
    stale_policy: StalePolicy,
    health_stats: Arc<HealthStats>,
    /// Subvolumes listed by the last successful discovery.
    known: Mutex<HashSet<String>>,
}

impl Collector {
    pub fn new(
        runner: Box<dyn CommandRunner>,
        filesystem: impl Into<String>,
        subvolume_path: impl Into<String>,
        metrics: SubvolumeMetrics,
    ) -> Self {
        Self {
            runner,
            filesystem: filesystem.into(),
            subvolume_path: subvolume_path.into(),
            metrics,
            telemetry: None,
            stale_policy: StalePolicy::default(),
            health_stats: Arc::new(HealthStats::new()),
            known: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_stale_policy(mut self, policy: StalePolicy) -> Self {
        self.stale_policy = policy;
        self
    }

    pub fn with_telemetry(mut self, telemetry: ExporterMetrics) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn with_health_stats(mut self, health_stats: Arc<HealthStats>) -> Self {
        self.health_stats = health_stats;
        self
    }

    pub fn filesystem(&self) -> &str {
        &self.filesystem
    }

    pub fn subvolume_path(&self) -> &str {
        &self.subvolume_path
    }

    pub fn health_stats(&self) -> &Arc<HealthStats> {
        &self.health_stats
    }

    /// Runs one collection cycle. Resolves once every ceph command has
    /// returned; dropping the future kills the command in flight.
    ///
    /// A discovery failure returns early without touching any gauge. A failed
    /// info query only skips that subvolume.
    #[instrument(skip(self), fields(filesystem = %self.filesystem, path = %self.subvolume_path))]
    pub async fn collect_once(&self) -> Result<CycleReport, DiscoveryError> {
        let start = Instant::now();

        let subvolumes =
            match list_subvolumes(self.runner.as_ref(), &self.filesystem, &self.subvolume_path)
                .await
            {
                Ok(subvolumes) => subvolumes,
                Err(e) => {
                    let elapsed = start.elapsed();
                    self.health_stats
                        .record_cycle_failure(elapsed.as_secs_f64());
                    if let Some(t) = &self.telemetry {
                        t.discovery_errors_total.inc();
                        t.cycle_success.set(0.0);
                        t.cycle_duration_seconds.set(elapsed.as_secs_f64());
                        t.last_cycle_timestamp_seconds
                            .set(chrono::Utc::now().timestamp() as f64);
                    }
                    return Err(e);
                }
            };

        let mut report = CycleReport {
            discovered: subvolumes.len(),
            ..Default::default()
        };

        for subvolume in &subvolumes {
            match subvolume_info(self.runner.as_ref(), &self.filesystem, subvolume).await {
                Ok(info) => {
                    debug!(
                        "Subvolume {}: used={} quota={}",
                        subvolume, info.bytes_used, info.bytes_quota
                    );
                    self.metrics
                        .set(subvolume, info.bytes_used, info.bytes_quota);
                    report.updated += 1;
                }
                Err(e) => {
                    error!("Error fetching usage for subvolume {}: {}", subvolume, e);
                    report.failed.push(subvolume.clone());
                }
            }
        }

        let current: HashSet<String> = subvolumes.into_iter().collect();
        {
            let mut known = match self.known.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            report.removed = self.stale_policy.apply(&self.metrics, &known, &current);
            *known = current;
        }

        report.duration = start.elapsed();
        let secs = report.duration.as_secs_f64();

        self.health_stats
            .record_cycle_success(report.discovered as u64, secs);
        self.health_stats
            .record_query_errors(report.failed.len() as u64);
        self.health_stats
            .record_removed_stale(report.removed.len() as u64);

        if let Some(t) = &self.telemetry {
            t.cycle_success.set(1.0);
            t.cycle_duration_seconds.set(secs);
            t.subvolumes_discovered.set(report.discovered as f64);
            t.query_errors_total.inc_by(report.failed.len() as f64);
            t.last_cycle_timestamp_seconds
                .set(chrono::Utc::now().timestamp() as f64);
        }

        Ok(report)
    }
}

/// Runs collection cycles forever: one immediately, then one per `interval`.
///
/// Each cycle is awaited before the next tick is taken, so cycles never
/// overlap. When a cycle overruns the interval the next one starts right away
/// and later ticks are spaced from there. Aborting the task kills any ceph
/// command still running.
pub async fn run_collector(collector: Arc<Collector>, interval: Duration) {
    info!(
        "Collector started for {}:{} (interval {:?})",
        collector.filesystem(),
        collector.subvolume_path(),
        interval
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        match collector.collect_once().await {
            Ok(report) => {
                if report.failed.is_empty() {
                    info!(
                        "Collection cycle finished: {} subvolumes updated in {:.3}s",
                        report.updated,
                        report.duration.as_secs_f64()
                    );
                } else {
                    warn!(
                        "Collection cycle finished: {} of {} subvolumes updated in {:.3}s, {} failed",
                        report.updated,
                        report.discovered,
                        report.duration.as_secs_f64(),
                        report.failed.len()
                    );
                }
                if !report.removed.is_empty() {
                    info!("Removed gauges of {} vanished subvolumes", report.removed.len());
                }
            }
            Err(e) => error!("Error fetching subvolumes: {}", e),
        }
    }
}
