//! Testing utilities for code built on lifebind.
//!
//! This module provides:
//! - Resources that count, fail, or panic on release or drop
//! - A producer and a consumer that record what flows through them
//! - Bounded polling for effects of background sweeps

mod mocks;
mod wait;

pub use mocks::{
    CountingResource, FailingResource, MockProducer, PanicOnDropResource, PanickingResource,
    RecordingConsumer,
};
pub use wait::wait_until;
