//! Check command implementation.
//!
//! Validates configuration, the ceph CLI, and subvolume discovery.

use cephfs_subvolume_exporter::ceph::{list_subvolumes, CephCli, CommandRunner};

use crate::config::{validate_effective_config, Config};

/// Validates configuration and that the configured path can be listed.
pub async fn command_check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 CephFS Subvolume Exporter - System Check");
    println!("============================================");

    let mut all_ok = true;

    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => println!("   ✅ Configuration is valid"),
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    let runner = CephCli::new(config.ceph_binary()).with_timeout(config.command_timeout());

    println!("\n🛠️  Checking ceph CLI ({})...", runner.binary().display());
    match runner.run(&["--version"]).await {
        Ok(out) => println!("   ✅ {}", String::from_utf8_lossy(&out).trim()),
        Err(e) => {
            println!("   ❌ ceph CLI not usable: {}", e);
            all_ok = false;
        }
    }

    println!(
        "\n📂 Listing subvolumes of {}:{}...",
        config.filesystem(),
        config.subvolume_path()
    );
    match list_subvolumes(&runner, config.filesystem(), config.subvolume_path()).await {
        Ok(subvolumes) => {
            println!("   ✅ {} subvolumes found", subvolumes.len());
            for subvolume in subvolumes.iter().take(10) {
                println!("      - {}", subvolume);
            }
            if subvolumes.len() > 10 {
                println!("      ... and {} more", subvolumes.len() - 10);
            }
        }
        Err(e) => {
            println!("   ❌ {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - exporter is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review the output above");
        std::process::exit(1);
    }
}
