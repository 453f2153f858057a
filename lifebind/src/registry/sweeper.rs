//! Periodic sweeper task.

use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::ResourceRegistry;
use crate::errors::ReleaseError;
use crate::events::SWEEP_COMPLETED;

/// A registry's claim on its single sweeper slot.
///
/// The claim travels with the sweeper future and is given back when it is
/// dropped, however the sweeper ends: stopped, aborted, its runtime shut down,
/// or its thread unwound.
#[derive(Debug)]
pub(crate) struct SweeperClaim {
    registry: Weak<ResourceRegistry>,
}

impl SweeperClaim {
    /// Claims the sweeper slot, or returns `None` if it is already taken.
    pub(crate) fn acquire(registry: &Arc<ResourceRegistry>) -> Option<Self> {
        registry.try_claim_sweeper().then(|| Self {
            registry: Arc::downgrade(registry),
        })
    }
}

impl Drop for SweeperClaim {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.release_sweeper_claim();
        }
    }
}

/// Drives [`ResourceRegistry::sweep_once`] on a fixed interval.
///
/// A sweeper holds only a weak reference to its registry and exits once the
/// registry is dropped. Sweeps run one after another inside a single task, so
/// they never overlap; ticks missed while a sweep runs are skipped.
#[derive(Debug)]
pub struct Sweeper;

impl Sweeper {
    /// Starts a sweeper on a dedicated OS thread with its own runtime.
    ///
    /// The thread does not depend on any caller runtime, so it keeps sweeping
    /// after the runtime that triggered the first registration shuts down.
    /// On failure the claim is dropped and the slot is free again.
    pub(crate) fn start_dedicated(
        registry: &Arc<ResourceRegistry>,
        claim: SweeperClaim,
    ) -> std::io::Result<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()?;
        let config = registry.config().clone();

        std::thread::Builder::new()
            .name(config.sweeper_thread_name.clone())
            .spawn(move || {
                runtime.block_on(Self::run(
                    claim,
                    config.sweep_interval(),
                    config.emit_sweep_events,
                ));
            })?;
        Ok(())
    }

    /// Starts a sweeper on the current tokio runtime.
    ///
    /// Returns `None` if the registry already has a running sweeper.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn spawn(registry: &Arc<ResourceRegistry>) -> Option<SweeperHandle> {
        let claim = SweeperClaim::acquire(registry)?;
        registry.record_sweeper_start();

        let interval = registry.config().sweep_interval();
        let emit = registry.config().emit_sweep_events;
        let handle = tokio::spawn(Self::run(claim, interval, emit));

        Some(SweeperHandle { handle })
    }

    async fn run(claim: SweeperClaim, interval: Duration, emit_events: bool) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(live) = claim.registry.upgrade() else {
                debug!("Registry dropped, sweeper exiting");
                return;
            };

            let swept =
                std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| live.sweep_once()));
            let report = match swept {
                Ok(report) => report,
                Err(panic) => {
                    let error = ReleaseError::from_panic(panic.as_ref());
                    warn!(error = %error.message, "Sweep panicked, retrying on next tick");
                    continue;
                }
            };

            if emit_events && !report.is_idle() {
                let sink = live.event_sink();
                let data = Some(report.to_dict());
                // A panicking sink fails its own task, not the sweeper.
                let emitted =
                    tokio::spawn(async move { sink.emit(SWEEP_COMPLETED, data).await }).await;
                if let Err(e) = emitted {
                    warn!(error = %e, "Event sink failed to emit sweep summary");
                }
            }
        }
    }
}

/// Handle to a sweeper started with [`Sweeper::spawn`].
///
/// Dropping the handle leaves the sweeper running.
#[derive(Debug)]
pub struct SweeperHandle {
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Stops the sweeper. A sweep in progress is allowed to finish.
    ///
    /// Afterwards the registry may start a new sweeper.
    pub async fn stop(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }

    /// Returns whether the sweeper task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}
