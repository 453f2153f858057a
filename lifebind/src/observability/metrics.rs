//! Registry counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters describing a registry's activity.
#[derive(Debug, Default)]
pub struct RegistryMetrics {
    registered: AtomicU64,
    released: AtomicU64,
    release_failures: AtomicU64,
    sweeps: AtomicU64,
}

/// A point-in-time copy of [`RegistryMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Entries ever registered.
    pub registered: u64,
    /// Resources released successfully by a sweep.
    pub released: u64,
    /// Releases that failed or panicked.
    pub release_failures: u64,
    /// Sweeps performed.
    pub sweeps: u64,
}

impl MetricsSnapshot {
    /// Entries evicted by sweeps, whether their release succeeded or not.
    #[must_use]
    pub fn evicted(&self) -> u64 {
        self.released + self.release_failures
    }
}

impl RegistryMetrics {
    /// Records a registration.
    pub fn record_registered(&self) {
        self.registered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful release.
    pub fn record_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed release.
    pub fn record_release_failure(&self) {
        self.release_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed sweep.
    pub fn record_sweep(&self) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of registrations.
    #[must_use]
    pub fn registered(&self) -> u64 {
        self.registered.load(Ordering::Relaxed)
    }

    /// Returns the number of successful releases.
    #[must_use]
    pub fn released(&self) -> u64 {
        self.released.load(Ordering::Relaxed)
    }

    /// Returns the number of failed releases.
    #[must_use]
    pub fn release_failures(&self) -> u64 {
        self.release_failures.load(Ordering::Relaxed)
    }

    /// Returns the number of sweeps.
    #[must_use]
    pub fn sweeps(&self) -> u64 {
        self.sweeps.load(Ordering::Relaxed)
    }

    /// Takes a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            registered: self.registered(),
            released: self.released(),
            release_failures: self.release_failures(),
            sweeps: self.sweeps(),
        }
    }

    /// Converts metrics to a dictionary.
    #[must_use]
    pub fn to_dict(&self) -> serde_json::Value {
        let snapshot = self.snapshot();
        serde_json::json!({
            "registered": snapshot.registered,
            "released": snapshot.released,
            "release_failures": snapshot.release_failures,
            "evicted": snapshot.evicted(),
            "sweeps": snapshot.sweeps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_counters() {
        let metrics = RegistryMetrics::default();
        metrics.record_registered();
        metrics.record_registered();
        metrics.record_released();
        metrics.record_release_failure();
        metrics.record_sweep();

        assert_eq!(
            metrics.snapshot(),
            MetricsSnapshot {
                registered: 2,
                released: 1,
                release_failures: 1,
                sweeps: 1,
            }
        );
        assert_eq!(metrics.snapshot().evicted(), 2);
    }

    #[test]
    fn test_to_dict() {
        let metrics = RegistryMetrics::default();
        metrics.record_registered();
        metrics.record_released();

        assert_eq!(
            metrics.to_dict(),
            serde_json::json!({
                "registered": 1,
                "released": 1,
                "release_failures": 0,
                "evicted": 1,
                "sweeps": 0,
            })
        );
    }
}
