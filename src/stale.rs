//! What happens to gauges of subvolumes that vanish between cycles.
//!
//! Every decision about clearing per-subvolume gauges goes through
//! [`StalePolicy::apply`]; the collection cycle itself only ever sets values.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::metrics::SubvolumeMetrics;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Keep exporting the last observed values forever.
    #[default]
    Retain,
    /// Drop gauges of subvolumes missing from the latest listing.
    Remove,
}

impl StalePolicy {
    /// Applies the policy after a successful discovery. `previous` is the set
    /// of subvolumes listed by the last successful cycle, `current` the set
    /// listed now.
    ///
    /// Returns the subvolumes whose gauges were removed.
    pub fn apply(
        &self,
        metrics: &SubvolumeMetrics,
        previous: &HashSet<String>,
        current: &HashSet<String>,
    ) -> Vec<String> {
        match self {
            StalePolicy::Retain => Vec::new(),
            StalePolicy::Remove => {
                let mut vanished: Vec<String> = previous.difference(current).cloned().collect();
                vanished.sort();
                for subvolume in &vanished {
                    debug!("Removing gauges of vanished subvolume {}", subvolume);
                    metrics.remove(subvolume);
                }
                vanished
            }
        }
    }
}

impl fmt::Display for StalePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StalePolicy::Retain => write!(f, "retain"),
            StalePolicy::Remove => write!(f, "remove"),
        }
    }
}

impl FromStr for StalePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "retain" => Ok(StalePolicy::Retain),
            "remove" => Ok(StalePolicy::Remove),
            other => Err(format!(
                "Invalid stale_subvolumes '{}', expected 'retain' or 'remove'",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;

    fn set_of(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_retain_keeps_everything() {
        let registry = Registry::new();
        let metrics = SubvolumeMetrics::new(&registry).unwrap();
        metrics.set("/p/c", 50, 0);

        let removed = StalePolicy::Retain.apply(&metrics, &set_of(&["/p/c"]), &set_of(&[]));

        assert!(removed.is_empty());
        assert_eq!(metrics.usage_bytes.with_label_values(&["/p/c"]).get(), 50.0);
    }

    #[test]
    fn test_remove_drops_only_vanished() {
        let registry = Registry::new();
        let metrics = SubvolumeMetrics::new(&registry).unwrap();
        metrics.set("/p/a", 1, 0);
        metrics.set("/p/c", 50, 0);

        let removed =
            StalePolicy::Remove.apply(&metrics, &set_of(&["/p/a", "/p/c"]), &set_of(&["/p/a"]));

        assert_eq!(removed, vec!["/p/c".to_string()]);
        let text = crate::metrics::encode_text(&registry).unwrap();
        assert!(text.contains("/p/a"));
        assert!(!text.contains("/p/c"));
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("retain".parse::<StalePolicy>().unwrap(), StalePolicy::Retain);
        assert_eq!("remove".parse::<StalePolicy>().unwrap(), StalePolicy::Remove);
        assert!("forget".parse::<StalePolicy>().is_err());
        assert_eq!(StalePolicy::default().to_string(), "retain");
    }
}
