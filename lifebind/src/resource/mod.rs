//! Releasable resources.
//!
//! This module provides:
//! - The [`Resource`] capability consumed by the registry
//! - [`Subscription`], an idempotent resource wrapping a release closure
//! - [`ResourceBag`], which releases everything it holds when dropped

mod bag;
mod subscription;

pub use bag::ResourceBag;
pub use subscription::Subscription;

use std::sync::Arc;

use crate::errors::ReleaseError;

/// Something with an explicit release operation.
///
/// Implementations must make `release` idempotent: the registry and the
/// resource's other holders may both call it, and every call after the first
/// has to be a no-op.
#[cfg_attr(test, mockall::automock)]
pub trait Resource: Send + Sync {
    /// Releases the resource.
    fn release(&self) -> Result<(), ReleaseError>;

    /// Returns whether the resource has been released.
    fn is_released(&self) -> bool {
        false
    }
}

impl<R: Resource + ?Sized> Resource for Arc<R> {
    fn release(&self) -> Result<(), ReleaseError> {
        (**self).release()
    }

    fn is_released(&self) -> bool {
        (**self).is_released()
    }
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    fn release(&self) -> Result<(), ReleaseError> {
        (**self).release()
    }

    fn is_released(&self) -> bool {
        (**self).is_released()
    }
}
