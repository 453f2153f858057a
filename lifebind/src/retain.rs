//! Entry point for lifetime-gated retention.

use crate::liveness::Watchable;
use crate::registry;
use crate::resource::{Resource, ResourceBag};

/// Keeps `resource` until `watched` becomes unreachable, then releases it.
///
/// A clone of the resource is handed to the process-wide registry and the
/// original is returned unchanged, so the call can sit at the tail of the
/// expression that created the resource. The registry release is an extra
/// release path: releasing the resource directly is still allowed, and the
/// later registry release is then a no-op.
///
/// The first call starts the background sweeper. Release happens within a
/// sweep interval or two of `watched` being dropped, not immediately.
pub fn retain_until_release_of<R, W>(resource: R, watched: &W) -> R
where
    R: Resource + Clone + 'static,
    W: Watchable + ?Sized,
{
    registry::global().retain(resource, watched)
}

/// Method forms of the retention helpers.
pub trait RetainExt: Resource + Clone + Sized + 'static {
    /// See [`retain_until_release_of`].
    #[must_use]
    fn retain_until_release_of<W>(self, watched: &W) -> Self
    where
        W: Watchable + ?Sized,
    {
        retain_until_release_of(self, watched)
    }

    /// Like [`retain_until_release_of`], naming the resource in logs and
    /// events.
    #[must_use]
    fn retain_labeled<W>(self, label: impl Into<String>, watched: &W) -> Self
    where
        W: Watchable + ?Sized,
    {
        registry::global().retain_labeled(self, label, watched)
    }

    /// Adds the resource to `bag` and returns it.
    #[must_use]
    fn disposed_by(self, bag: &ResourceBag) -> Self {
        bag.insert(self.clone());
        self
    }
}

impl<R: Resource + Clone + 'static> RetainExt for R {}
