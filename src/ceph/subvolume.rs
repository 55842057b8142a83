//! Subvolume discovery and per-subvolume usage queries.

use serde::{Deserialize, Deserializer};
use tracing::debug;

use super::CommandRunner;
use crate::error::{DiscoveryError, QueryError};

/// One entry of `ceph fs subvolume ls` output. Extra keys are ignored.
#[derive(Debug, Deserialize)]
struct SubvolumeEntry {
    name: String,
}

/// Usage and quota of a single subvolume as reported by
/// `ceph fs subvolume info`.
///
/// A `bytes_quota` of zero means no quota is configured. It is not
/// distinguished from a quota explicitly set to zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubvolumeInfo {
    pub name: String,
    #[serde(deserialize_with = "byte_count")]
    pub bytes_used: i64,
    #[serde(deserialize_with = "byte_count")]
    pub bytes_quota: i64,
}

/// Byte counts read as 0 when ceph prints `null` or, for subvolumes without
/// a quota, `"infinite"`.
fn byte_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Bytes {
        Count(Option<i64>),
        Text(String),
    }

    match Bytes::deserialize(deserializer)? {
        Bytes::Count(n) => Ok(n.unwrap_or(0)),
        Bytes::Text(s) if s == "infinite" => Ok(0),
        Bytes::Text(s) => Err(serde::de::Error::custom(format!(
            "invalid byte count {s:?}, expected an integer or \"infinite\""
        ))),
    }
}

/// Lists subvolumes under `parent_path` and returns their full paths
/// (`parent_path/name`) in the order ceph printed them.
pub async fn list_subvolumes(
    runner: &dyn CommandRunner,
    filesystem: &str,
    parent_path: &str,
) -> Result<Vec<String>, DiscoveryError> {
    let stdout = runner
        .run(&["fs", "subvolume", "ls", filesystem, parent_path])
        .await
        .map_err(|source| DiscoveryError::Command {
            filesystem: filesystem.to_string(),
            path: parent_path.to_string(),
            source,
        })?;

    let entries: Vec<SubvolumeEntry> =
        serde_json::from_slice(&stdout).map_err(|source| DiscoveryError::Parse {
            filesystem: filesystem.to_string(),
            path: parent_path.to_string(),
            source,
        })?;

    debug!(
        "Discovered {} subvolumes under {}:{}",
        entries.len(),
        filesystem,
        parent_path
    );

    Ok(entries
        .into_iter()
        .map(|e| format!("{}/{}", parent_path, e.name))
        .collect())
}

/// Fetches usage and quota for one subvolume.
pub async fn subvolume_info(
    runner: &dyn CommandRunner,
    filesystem: &str,
    subvolume: &str,
) -> Result<SubvolumeInfo, QueryError> {
    let stdout = runner
        .run(&["fs", "subvolume", "info", filesystem, subvolume])
        .await
        .map_err(|source| QueryError::Command {
            filesystem: filesystem.to_string(),
            subvolume: subvolume.to_string(),
            source,
        })?;

    serde_json::from_slice(&stdout).map_err(|source| QueryError::Parse {
        filesystem: filesystem.to_string(),
        subvolume: subvolume.to_string(),
        source,
    })
}
