//! Liveness probing for watched objects.
//!
//! A [`LivenessToken`] is a non-owning handle that can only answer one
//! question: is the object it was created from still reachable?

mod token;

pub use token::{LivenessToken, Watchable};
