//! Sweep reports.

use serde::{Deserialize, Serialize};

use super::EntryId;

/// A release that failed during a sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseFailure {
    /// The evicted entry.
    pub entry: EntryId,
    /// The entry label, or its id when unlabeled.
    pub name: String,
    /// The failure message.
    pub error: String,
}

/// Outcome of a single sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Entries examined by this sweep.
    pub examined: usize,
    /// Entries whose resource released successfully.
    pub released: usize,
    /// Entries whose release failed. They are evicted all the same.
    pub failures: Vec<ReleaseFailure>,
    /// Live entries left in the registry after the partition.
    pub retained: usize,
}

impl SweepReport {
    /// Returns the number of entries evicted by this sweep.
    #[must_use]
    pub fn evicted(&self) -> usize {
        self.released + self.failures.len()
    }

    /// Returns true if the sweep evicted nothing.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.evicted() == 0
    }

    /// Converts the report to event data.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        serde_json::json!({
            "examined": self.examined,
            "released": self.released,
            "failed": self.failures.len(),
            "retained": self.retained,
        })
    }
}
