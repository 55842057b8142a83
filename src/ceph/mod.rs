//! Invocation of the `ceph` administration CLI.
//!
//! All process spawning goes through the [`CommandRunner`] trait so the
//! collection cycle never depends on how (or whether) a real process is
//! started. [`CephCli`] is the production runner. Its children are killed
//! when the returned future is dropped, so cancelling a cycle (or hitting
//! the optional deadline) never leaves a ceph process behind.

pub mod subvolume;

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::CommandError;

pub use subvolume::{list_subvolumes, subvolume_info, SubvolumeInfo};

/// Runs an external command and returns its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>, CommandError>;
}

/// Runner that shells out to the ceph binary.
#[derive(Debug, Clone)]
pub struct CephCli {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for CephCli {
    fn default() -> Self {
        Self::new("ceph")
    }
}

impl CephCli {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    /// Kill the child and fail with [`CommandError::Timeout`] once `timeout`
    /// has elapsed. `None` waits forever.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn binary(&self) -> &std::path::Path {
        &self.binary
    }

    fn program(&self) -> String {
        self.binary.display().to_string()
    }
}

#[async_trait]
impl CommandRunner for CephCli {
    async fn run(&self, args: &[&str]) -> Result<Vec<u8>, CommandError> {
        debug!("Running {} {}", self.program(), args.join(" "));

        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        let output = command.output();

        // The deadline covers pipe EOF as well, so a grandchild holding
        // stdout open cannot stretch the call past it.
        let output = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, output).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        "Killing `{}` after {:?} (args: {:?})",
                        self.program(),
                        timeout,
                        args
                    );
                    return Err(CommandError::Timeout {
                        program: self.program(),
                        timeout,
                    });
                }
            },
            None => output.await,
        }
        .map_err(|source| CommandError::Spawn {
            program: self.program(),
            source,
        })?;

        if !output.status.success() {
            return Err(CommandError::NonZeroExit {
                program: self.program(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output.stdout)
    }
}
