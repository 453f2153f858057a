//! Registry entries.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::report::ReleaseFailure;
use crate::errors::ReleaseError;
use crate::liveness::LivenessToken;
use crate::resource::Resource;

/// Identifier assigned to an entry when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub u64);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A resource paired with the liveness token of the object it watches.
pub(crate) struct RegistryEntry {
    pub(crate) id: EntryId,
    pub(crate) label: Option<String>,
    resource: Arc<dyn Resource>,
    token: LivenessToken,
}

impl RegistryEntry {
    pub(crate) fn new(
        id: EntryId,
        label: Option<String>,
        resource: Arc<dyn Resource>,
        token: LivenessToken,
    ) -> Self {
        Self {
            id,
            label,
            resource,
            token,
        }
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.token.is_expired()
    }

    /// Releases the resource and drops the entry.
    ///
    /// A panic in either `release()` or the resource's `Drop` is caught and
    /// reported as a failure, so one entry cannot abort the rest of a sweep.
    pub(crate) fn release(self) -> Result<(), ReleaseFailure> {
        let Self {
            id,
            label,
            resource,
            token,
        } = self;
        drop(token);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let outcome = resource.release();
            drop(resource);
            outcome
        }))
        .unwrap_or_else(|panic| Err(ReleaseError::from_panic(panic.as_ref())));

        result.map_err(|e| {
            let error = match (&e.resource, &label) {
                (None, Some(label)) => e.with_resource(label.clone()),
                _ => e,
            };
            ReleaseFailure {
                entry: id,
                name: label.unwrap_or_else(|| id.to_string()),
                error: error.to_string(),
            }
        })
    }
}

impl std::fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}
