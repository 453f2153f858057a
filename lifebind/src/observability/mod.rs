//! Observability utilities.

mod logging;
mod metrics;

pub use logging::init_tracing;
pub use metrics::{MetricsSnapshot, RegistryMetrics};
