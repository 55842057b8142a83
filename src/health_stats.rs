//! Health statistics and monitoring for the exporter.
//!
//! This module provides types for tracking collection-cycle performance,
//! ceph CLI errors, and HTTP request counts, rendered by the `/health`
//! endpoint as a plain-text table.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Duration, Instant};

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    /// Returns `(last, avg, max, min, count)`.
    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Thread-safe sliding window of HTTP request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(256)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            let now = Instant::now();
            guard.push_back(now);
            // Only the last minute is ever reported.
            while guard
                .front()
                .is_some_and(|&t| now.duration_since(t) > Duration::from_secs(60))
            {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            let now = Instant::now();
            guard
                .iter()
                .filter(|&&t| now.duration_since(t) <= Duration::from_secs(60))
                .count() as u64
        } else {
            0
        }
    }
}

/// Health statistics for the collection loop and HTTP side.
pub struct HealthStats {
    // Collection cycles
    pub cycle_duration_seconds: Stat,
    pub discovered_subvolumes: Stat,
    pub total_cycles: AtomicU64,
    pub cycle_success_count: AtomicU64,
    pub cycle_failure_count: AtomicU64,
    pub query_errors: AtomicU64,
    pub removed_stale_subvolumes: AtomicU64,
    last_cycle_success: AtomicBool,

    // HTTP server stats
    pub http_request_timestamps: RequestTimestamps,
    pub metrics_endpoint_calls: AtomicU64,
    pub scrape_duration_ms: Stat,
    pub metrics_response_size_kb: Stat,

    // Timing
    pub start_time: Instant,
    pub last_cycle_time: StdRwLock<Option<DateTime<Utc>>>,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            cycle_duration_seconds: Stat::default(),
            discovered_subvolumes: Stat::default(),
            total_cycles: AtomicU64::new(0),
            cycle_success_count: AtomicU64::new(0),
            cycle_failure_count: AtomicU64::new(0),
            query_errors: AtomicU64::new(0),
            removed_stale_subvolumes: AtomicU64::new(0),
            last_cycle_success: AtomicBool::new(false),
            http_request_timestamps: RequestTimestamps::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            scrape_duration_ms: Stat::default(),
            metrics_response_size_kb: Stat::default(),
            start_time: Instant::now(),
            last_cycle_time: StdRwLock::new(None),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records a cycle whose discovery succeeded.
    pub fn record_cycle_success(&self, discovered: u64, duration_seconds: f64) {
        self.discovered_subvolumes.add_sample(discovered as f64);
        self.cycle_duration_seconds.add_sample(duration_seconds);
        self.total_cycles.fetch_add(1, Ordering::Relaxed);
        self.cycle_success_count.fetch_add(1, Ordering::Relaxed);
        self.last_cycle_success.store(true, Ordering::Relaxed);
        self.update_last_cycle_time();
    }

    /// Records a cycle aborted by a discovery failure.
    pub fn record_cycle_failure(&self, duration_seconds: f64) {
        self.cycle_duration_seconds.add_sample(duration_seconds);
        self.total_cycles.fetch_add(1, Ordering::Relaxed);
        self.cycle_failure_count.fetch_add(1, Ordering::Relaxed);
        self.last_cycle_success.store(false, Ordering::Relaxed);
        self.update_last_cycle_time();
    }

    pub fn record_query_errors(&self, count: u64) {
        self.query_errors.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_removed_stale(&self, count: u64) {
        self.removed_stale_subvolumes
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_scrape_duration_ms(&self, duration_ms: f64) {
        self.scrape_duration_ms.add_sample(duration_ms);
    }

    pub fn record_metrics_response_size_kb(&self, size_kb: f64) {
        self.metrics_response_size_kb.add_sample(size_kb);
    }

    fn update_last_cycle_time(&self) {
        if let Ok(mut guard) = self.last_cycle_time.write() {
            *guard = Some(Utc::now());
        }
    }

    /// True once a cycle has completed and the most recent one listed
    /// subvolumes successfully.
    pub fn is_healthy(&self) -> bool {
        self.cycle_success_count.load(Ordering::Relaxed) > 0
            && self.last_cycle_success.load(Ordering::Relaxed)
    }

    pub fn get_cycle_success_rate(&self) -> f64 {
        let success = self.cycle_success_count.load(Ordering::Relaxed);
        let failure = self.cycle_failure_count.load(Ordering::Relaxed);
        let total = success + failure;
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn get_uptime_hours(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() / 3600.0
    }

    pub fn get_last_cycle_time_str(&self) -> String {
        match self.last_cycle_time.read() {
            Ok(guard) => guard
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            Err(_) => "N/A".to_string(),
        }
    }

    pub fn render_table(&self) -> String {
        let (cd_cur, cd_avg, cd_max, cd_min, _) = self.cycle_duration_seconds.snapshot();
        let (ds_cur, ds_avg, ds_max, ds_min, _) = self.discovered_subvolumes.snapshot();
        let (sd_cur, sd_avg, sd_max, sd_min, _) = self.scrape_duration_ms.snapshot();
        let (rs_cur, rs_avg, rs_max, rs_min, _) = self.metrics_response_size_kb.snapshot();

        let total = self.total_cycles.load(Ordering::Relaxed);
        let failures = self.cycle_failure_count.load(Ordering::Relaxed);
        let query_errors = self.query_errors.load(Ordering::Relaxed);
        let removed = self.removed_stale_subvolumes.load(Ordering::Relaxed);
        let success_rate = self.get_cycle_success_rate();
        let requests_last_minute = self.http_request_timestamps.count_last_minute();
        let metrics_calls = self.metrics_endpoint_calls.load(Ordering::Relaxed);

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        let row = |out: &mut String, name: &str, values: [String; 4]| {
            writeln!(
                out,
                "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
                name,
                values[0],
                values[1],
                values[2],
                values[3],
                left = left_col,
                col = col_w
            )
            .ok();
        };

        writeln!(out).ok();
        writeln!(out, "COLLECTION CYCLES").ok();
        writeln!(out, "-----------------").ok();
        row(
            &mut out,
            "cycle_duration (s)",
            [
                format!("{:.3}", cd_cur),
                format!("{:.3}", cd_avg),
                format!("{:.3}", cd_max),
                format!("{:.3}", cd_min),
            ],
        );
        row(
            &mut out,
            "discovered_subvolumes",
            [
                format!("{:.0}", ds_cur),
                format!("{:.1}", ds_avg),
                format!("{:.0}", ds_max),
                format!("{:.0}", ds_min),
            ],
        );

        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();
        row(
            &mut out,
            "scrape_duration (ms)",
            [
                format!("{:.2}", sd_cur),
                format!("{:.2}", sd_avg),
                format!("{:.2}", sd_max),
                format!("{:.2}", sd_min),
            ],
        );
        row(
            &mut out,
            "response_size (KB)",
            [
                format!("{:.1}", rs_cur),
                format!("{:.1}", rs_avg),
                format!("{:.1}", rs_max),
                format!("{:.1}", rs_min),
            ],
        );

        writeln!(out).ok();
        writeln!(out, "SUMMARY").ok();
        writeln!(out, "-------").ok();
        writeln!(out, "{:left$} : {}", "total_cycles", total, left = left_col).ok();
        writeln!(out, "{:left$} : {}", "discovery_failures", failures, left = left_col).ok();
        writeln!(out, "{:left$} : {:.1}", "cycle_success_rate (%)", success_rate, left = left_col).ok();
        writeln!(out, "{:left$} : {}", "query_errors", query_errors, left = left_col).ok();
        writeln!(out, "{:left$} : {}", "removed_stale_subvolumes", removed, left = left_col).ok();
        writeln!(out, "{:left$} : {}", "http_requests_last_minute", requests_last_minute, left = left_col).ok();
        writeln!(out, "{:left$} : {}", "metrics_endpoint_calls", metrics_calls, left = left_col).ok();
        writeln!(out, "{:left$} : {:.2}", "uptime_hours", self.get_uptime_hours(), left = left_col).ok();
        writeln!(out, "{:left$} : {}", "last_cycle", self.get_last_cycle_time_str(), left = left_col).ok();

        out
    }
}
