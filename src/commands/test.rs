//! Test command implementation.
//!
//! Runs collection cycles against the live cluster and displays results
//! without starting the HTTP server.

use cephfs_subvolume_exporter::metrics::encode_text;
use cephfs_subvolume_exporter::{CephCli, Collector, SubvolumeMetrics};
use prometheus::Registry;

use crate::config::Config;

/// Tests metrics collection.
pub async fn command_test(
    iterations: usize,
    verbose: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 CephFS Subvolume Exporter - Test Mode");
    println!("=========================================");

    let registry = Registry::new();
    let metrics = SubvolumeMetrics::new(&registry)?;
    let runner = CephCli::new(config.ceph_binary()).with_timeout(config.command_timeout());
    let collector = Collector::new(
        Box::new(runner),
        config.filesystem(),
        config.subvolume_path(),
        metrics,
    )
    .with_stale_policy(config.stale_policy());

    let mut failed_cycles = 0usize;

    for iteration in 1..=iterations {
        println!("\n🔄 Iteration {}/{}:", iteration, iterations);

        match collector.collect_once().await {
            Ok(report) => {
                println!("   📁 Discovered {} subvolumes", report.discovered);
                println!("   ✅ Updated {} subvolumes", report.updated);
                for subvolume in &report.failed {
                    println!("   ❌ Query failed: {}", subvolume);
                }
                for subvolume in &report.removed {
                    println!("   🗑️  Removed stale: {}", subvolume);
                }
                println!("   ⏱️  {:.3}s", report.duration.as_secs_f64());
            }
            Err(e) => {
                println!("   ❌ {}", e);
                failed_cycles += 1;
            }
        }

        let text = encode_text(&registry)?;
        if verbose {
            println!("\n{}", text);
        } else {
            for line in text
                .lines()
                .filter(|l| l.starts_with("cephfs_subvolume_usage_bytes"))
            {
                println!("   {}", line);
            }
        }
    }

    println!("\n📋 Summary:");
    if failed_cycles == 0 {
        println!("   ✅ {} cycles completed", iterations);
        Ok(())
    } else {
        Err(format!("{} of {} cycles failed discovery", failed_cycles, iterations).into())
    }
}
