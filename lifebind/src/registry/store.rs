//! The resource registry.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::entry::RegistryEntry;
use super::report::{ReleaseFailure, SweepReport};
use super::sweeper::{Sweeper, SweeperClaim};
use super::EntryId;
use crate::config::RegistryConfig;
use crate::errors::LifebindError;
use crate::events::{self, EventSink, NoOpEventSink};
use crate::liveness::{LivenessToken, Watchable};
use crate::observability::RegistryMetrics;
use crate::resource::Resource;

/// Registry of resources that are released once their watched object dies.
///
/// Entries are added by [`register`](Self::register) and removed only by
/// [`sweep_once`](Self::sweep_once). With `auto_start_sweeper` enabled, the
/// first registration starts a background [`Sweeper`] that calls `sweep_once`
/// at the configured interval.
pub struct ResourceRegistry {
    /// Live entries.
    entries: Mutex<Vec<RegistryEntry>>,
    /// Next entry id.
    next_id: AtomicU64,
    /// Registry configuration.
    config: RegistryConfig,
    /// Activity counters.
    metrics: RegistryMetrics,
    /// Receives release failures and sweep summaries.
    event_sink: RwLock<Arc<dyn EventSink>>,
    /// Whether a sweeper is running for this registry.
    sweeper_started: AtomicBool,
    /// Number of sweepers ever started for this registry.
    sweeper_starts: AtomicUsize,
}

impl ResourceRegistry {
    /// Creates a registry after validating its configuration.
    pub fn new(config: RegistryConfig) -> Result<Arc<Self>, LifebindError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    /// Creates a registry with the default configuration.
    #[must_use]
    pub fn with_defaults() -> Arc<Self> {
        Self::from_validated(RegistryConfig::default())
    }

    pub(crate) fn from_validated(config: RegistryConfig) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            config,
            metrics: RegistryMetrics::default(),
            event_sink: RwLock::new(Arc::new(NoOpEventSink)),
            sweeper_started: AtomicBool::new(false),
            sweeper_starts: AtomicUsize::new(0),
        })
    }

    /// Registers a resource to be released once `token` expires.
    pub fn register<R>(self: &Arc<Self>, resource: R, token: LivenessToken) -> EntryId
    where
        R: Resource + 'static,
    {
        self.insert(None, Arc::new(resource), token)
    }

    /// Registers a resource with a label used in logs and events.
    pub fn register_labeled<R>(
        self: &Arc<Self>,
        resource: R,
        token: LivenessToken,
        label: impl Into<String>,
    ) -> EntryId
    where
        R: Resource + 'static,
    {
        self.insert(Some(label.into()), Arc::new(resource), token)
    }

    fn insert(
        self: &Arc<Self>,
        label: Option<String>,
        resource: Arc<dyn Resource>,
        token: LivenessToken,
    ) -> EntryId {
        let id = EntryId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.entries
            .lock()
            .push(RegistryEntry::new(id, label, resource, token));
        self.metrics.record_registered();

        if self.config.auto_start_sweeper {
            self.ensure_sweeper();
        }
        id
    }

    /// Keeps `resource` alive until `watched` is dropped, then releases it.
    ///
    /// Returns the resource unchanged.
    pub fn retain<R, W>(self: &Arc<Self>, resource: R, watched: &W) -> R
    where
        R: Resource + Clone + 'static,
        W: Watchable + ?Sized,
    {
        self.register(resource.clone(), watched.liveness_token());
        resource
    }

    /// Like [`retain`](Self::retain), with a label used in logs and events.
    pub fn retain_labeled<R, W>(
        self: &Arc<Self>,
        resource: R,
        label: impl Into<String>,
        watched: &W,
    ) -> R
    where
        R: Resource + Clone + 'static,
        W: Watchable + ?Sized,
    {
        self.register_labeled(resource.clone(), watched.liveness_token(), label);
        resource
    }

    /// Releases every resource whose watched object has died.
    ///
    /// Expired entries are taken out of the registry under the lock, then
    /// released after it is dropped. Entries registered after the partition
    /// are left for a later sweep. A failing release is reported and the entry
    /// stays evicted.
    pub fn sweep_once(&self) -> SweepReport {
        let (expired, examined, retained) = {
            let mut entries = self.entries.lock();
            let examined = entries.len();
            if entries.iter().any(RegistryEntry::is_expired) {
                let (expired, live): (Vec<_>, Vec<_>) = std::mem::take(&mut *entries)
                    .into_iter()
                    .partition(RegistryEntry::is_expired);
                *entries = live;
                (expired, examined, entries.len())
            } else {
                (Vec::new(), examined, examined)
            }
        };

        let mut report = SweepReport {
            examined,
            retained,
            ..SweepReport::default()
        };

        for entry in expired {
            match entry.release() {
                Ok(()) => {
                    self.metrics.record_released();
                    report.released += 1;
                }
                Err(failure) => {
                    warn!(
                        entry = %failure.entry,
                        error = %failure.error,
                        "Resource release failed during sweep"
                    );
                    self.metrics.record_release_failure();
                    self.emit_release_failure(&failure);
                    report.failures.push(failure);
                }
            }
        }

        self.metrics.record_sweep();
        if !report.is_idle() {
            debug!(
                released = report.released,
                failed = report.failures.len(),
                retained = report.retained,
                "Sweep evicted expired resources"
            );
        }
        report
    }

    fn emit_release_failure(&self, failure: &ReleaseFailure) {
        let sink = self.event_sink();
        let data = serde_json::to_value(failure).ok();
        let emitted = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            sink.try_emit(events::RELEASE_FAILED, data);
        }));
        if emitted.is_err() {
            warn!(entry = %failure.entry, "Event sink panicked while reporting release failure");
        }
    }

    /// Starts the background sweeper unless one is already running.
    ///
    /// Safe to call from many threads at once: exactly one caller starts it.
    /// Failures are logged and leave the sweeper unclaimed, so a later
    /// registration tries again.
    pub fn ensure_sweeper(self: &Arc<Self>) {
        if let Err(e) = self.start_sweeper() {
            error!(error = %e, "Failed to start sweeper");
        }
    }

    /// Starts the background sweeper on a dedicated thread.
    ///
    /// Returns `Ok(false)` if a sweeper was already running.
    pub fn start_sweeper(self: &Arc<Self>) -> Result<bool, LifebindError> {
        let Some(claim) = SweeperClaim::acquire(self) else {
            return Ok(false);
        };

        Sweeper::start_dedicated(self, claim).map_err(LifebindError::SweeperStart)?;
        self.record_sweeper_start();
        Ok(true)
    }

    pub(crate) fn try_claim_sweeper(&self) -> bool {
        !self.sweeper_started.load(Ordering::Acquire)
            && self
                .sweeper_started
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    pub(crate) fn release_sweeper_claim(&self) {
        self.sweeper_started.store(false, Ordering::Release);
    }

    pub(crate) fn record_sweeper_start(&self) {
        let starts = self.sweeper_starts.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            interval_ms = self.config.sweep_interval_ms,
            starts, "Sweeper started"
        );
    }

    /// Returns whether a sweeper is running for this registry.
    #[must_use]
    pub fn is_sweeper_running(&self) -> bool {
        self.sweeper_started.load(Ordering::Acquire)
    }

    /// Returns how many sweepers were ever started for this registry.
    #[must_use]
    pub fn sweeper_starts(&self) -> usize {
        self.sweeper_starts.load(Ordering::SeqCst)
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if no entries are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns the registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns the registry counters.
    #[must_use]
    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    /// Replaces the event sink.
    pub fn set_event_sink(&self, sink: Arc<dyn EventSink>) {
        *self.event_sink.write() = sink;
    }

    /// Returns the current event sink.
    #[must_use]
    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        self.event_sink.read().clone()
    }
}

impl std::fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("len", &self.len())
            .field("sweeper_running", &self.is_sweeper_running())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
