//! Lifetime-gated resource registry.
//!
//! This module provides:
//! - [`ResourceRegistry`], which pairs resources with liveness tokens
//! - [`Sweeper`], which releases resources whose watched object died
//! - The process-wide registry used by
//!   [`retain_until_release_of`](crate::retain_until_release_of)

mod entry;
mod report;
mod store;
mod sweeper;


pub use entry::EntryId;
pub use report::{ReleaseFailure, SweepReport};
pub use store::ResourceRegistry;
pub use sweeper::{Sweeper, SweeperHandle};

use std::sync::{Arc, OnceLock};

use crate::config::RegistryConfig;
use crate::errors::LifebindError;

/// The process-wide registry, created on first use and never torn down.
static GLOBAL_REGISTRY: OnceLock<Arc<ResourceRegistry>> = OnceLock::new();

/// Returns the process-wide registry, creating it with the default
/// configuration if [`configure_global`] was not called first.
pub fn global() -> &'static Arc<ResourceRegistry> {
    GLOBAL_REGISTRY.get_or_init(ResourceRegistry::with_defaults)
}

/// Installs the configuration of the process-wide registry.
///
/// Must be called before anything touches the global registry; afterwards it
/// fails with [`LifebindError::AlreadyInitialized`].
pub fn configure_global(config: RegistryConfig) -> Result<(), LifebindError> {
    config.validate()?;

    let mut installed = false;
    GLOBAL_REGISTRY.get_or_init(|| {
        installed = true;
        ResourceRegistry::from_validated(config)
    });

    if installed {
        Ok(())
    } else {
        Err(LifebindError::AlreadyInitialized)
    }
}
