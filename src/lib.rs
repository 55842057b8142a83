//! CephFS Subvolume Exporter Library
//!
//! This library polls CephFS subvolume usage and quota through the `ceph`
//! administration CLI and keeps the latest values in a Prometheus registry.
//! The HTTP side of the exporter only ever reads that registry.
//!
//! # Features
//!
//! - **Subvolume Discovery**: `ceph fs subvolume ls <fs> <path>`
//! - **Usage Queries**: `ceph fs subvolume info <fs> <subvolume>`
//! - **Gauge Updates**: `cephfs_subvolume_usage_bytes` and `cephfs_subvolume_quota_bytes`
//! - **Pluggable Command Runner**: swap the process invocation for tests or wrappers
//!
//! # Usage
//!
//! ```rust,no_run
//! use cephfs_subvolume_exporter::{CephCli, Collector, SubvolumeMetrics};
//! use prometheus::Registry;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Registry::new();
//!     let metrics = SubvolumeMetrics::new(&registry).unwrap();
//!     let collector =
//!         Collector::new(Box::new(CephCli::default()), "k8s-fs", "/volumes/csi", metrics);
//!
//!     match collector.collect_once().await {
//!         Ok(report) => println!("{} subvolumes updated", report.updated),
//!         Err(e) => eprintln!("discovery failed: {}", e),
//!     }
//!
//!     let text = cephfs_subvolume_exporter::metrics::encode_text(&registry).unwrap();
//!     println!("{text}");
//! }
//! ```
//!
//! # Limitations
//!
//! A `bytes_quota` of zero is exported for subvolumes without a quota as well
//! as for subvolumes whose quota really is zero; the two cannot be told apart.

pub mod ceph;
pub mod collector;
pub mod error;
pub mod health_stats;
pub mod metrics;
pub mod stale;

// Re-export main types for convenience
pub use ceph::{CephCli, CommandRunner, SubvolumeInfo};
pub use collector::{run_collector, Collector, CycleReport};
pub use error::{CommandError, DiscoveryError, QueryError};
pub use health_stats::HealthStats;
pub use metrics::{ExporterMetrics, SubvolumeMetrics};
pub use stale::StalePolicy;
