//! Error types for ceph CLI invocation and subvolume collection.
//!
//! Both `DiscoveryError` and `QueryError` are non-fatal: the collector logs
//! them and abandons either the whole cycle (discovery) or a single
//! subvolume (query) until the next scheduled cycle.

use std::time::Duration;

/// Failure to obtain stdout from an external command.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    NonZeroExit {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("`{program}` did not finish within {timeout:?} and was killed")]
    Timeout { program: String, timeout: Duration },
}

/// Listing subvolumes under a path failed.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("listing subvolumes of {filesystem}:{path} failed: {source}")]
    Command {
        filesystem: String,
        path: String,
        #[source]
        source: CommandError,
    },

    #[error("unexpected subvolume list output for {filesystem}:{path}: {source}")]
    Parse {
        filesystem: String,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Querying a single subvolume's usage failed.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("querying subvolume {subvolume} on {filesystem} failed: {source}")]
    Command {
        filesystem: String,
        subvolume: String,
        #[source]
        source: CommandError,
    },

    #[error("unexpected subvolume info output for {subvolume} on {filesystem}: {source}")]
    Parse {
        filesystem: String,
        subvolume: String,
        #[source]
        source: serde_json::Error,
    },
}
