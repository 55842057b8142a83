//! CLI command implementations for cephfs-subvolume-exporter.
//!
//! This module provides implementations for all CLI subcommands:
//! - `check`: ceph CLI and discovery validation
//! - `config`: Configuration file generation
//! - `test`: One-shot collection cycles without the HTTP server

pub mod check;
pub mod config;
pub mod test;

// Re-export command functions
pub use check::command_check;
pub use config::command_config;
pub use test::command_test;
