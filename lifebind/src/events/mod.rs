//! Event sinks for registry observability.
//!
//! A [`ResourceRegistry`](crate::registry::ResourceRegistry) reports release
//! failures and sweep summaries to its event sink. The default sink discards
//! everything.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Emitted by a sweep for every resource whose release failed.
pub const RELEASE_FAILED: &str = "resource.release_failed";

/// Emitted by the sweeper after a sweep that evicted at least one entry.
pub const SWEEP_COMPLETED: &str = "sweep.completed";
