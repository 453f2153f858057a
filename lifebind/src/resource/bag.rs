//! A bag that releases its resources when dropped.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::warn;

use super::Resource;
use crate::errors::ReleaseError;

/// Collects resources and releases all of them together.
///
/// Resources are released when [`Resource::release`] is called on the bag or
/// when the bag is dropped. Resources added after the bag was released are
/// released immediately.
#[derive(Default)]
pub struct ResourceBag {
    resources: Mutex<Vec<Arc<dyn Resource>>>,
    released: Mutex<bool>,
}

impl ResourceBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource to the bag.
    pub fn insert<R>(&self, resource: R)
    where
        R: Resource + 'static,
    {
        self.insert_arc(Arc::new(resource));
    }

    /// Adds several resources to the bag.
    pub fn extend<I, R>(&self, resources: I)
    where
        I: IntoIterator<Item = R>,
        R: Resource + 'static,
    {
        for resource in resources {
            self.insert(resource);
        }
    }

    fn insert_arc(&self, resource: Arc<dyn Resource>) {
        let released = self.released.lock();
        if *released {
            drop(released);
            if let Err(e) = resource.release() {
                warn!(error = %e, "Resource added to a released bag failed to release");
            }
            return;
        }
        self.resources.lock().push(resource);
    }

    /// Returns the number of resources currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.resources.lock().len()
    }

    /// Returns true if the bag holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resources.lock().is_empty()
    }

    /// Releases every held resource, collecting failures.
    ///
    /// Resources are released in insertion order. A failure does not stop the
    /// remaining resources from being released.
    pub fn release_all(&self) -> Vec<ReleaseError> {
        let drained: Vec<Arc<dyn Resource>> = {
            let mut released = self.released.lock();
            *released = true;
            std::mem::take(&mut *self.resources.lock())
        };

        drained
            .into_iter()
            .filter_map(|resource| resource.release().err())
            .collect()
    }
}

impl Resource for ResourceBag {
    fn release(&self) -> Result<(), ReleaseError> {
        let mut failures = self.release_all();
        if failures.len() > 1 {
            return Err(ReleaseError::new(format!(
                "{} resources failed to release: {}",
                failures.len(),
                failures
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join("; ")
            )));
        }
        failures.pop().map_or(Ok(()), Err)
    }

    fn is_released(&self) -> bool {
        *self.released.lock()
    }
}

impl Drop for ResourceBag {
    fn drop(&mut self) {
        for failure in self.release_all() {
            warn!(error = %failure, "Resource failed to release when its bag was dropped");
        }
    }
}

impl std::fmt::Debug for ResourceBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBag")
            .field("len", &self.len())
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{MockResource, Subscription};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>) -> Subscription {
        let counter = counter.clone();
        Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_drop_releases_everything() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let bag = ResourceBag::new();
            bag.insert(counting(&counter));
            bag.extend(vec![counting(&counter), counting(&counter)]);
            assert_eq!(bag.len(), 3);
            assert_eq!(counter.load(Ordering::SeqCst), 0);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_explicit_release_is_idempotent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bag = ResourceBag::new();
        bag.insert(counting(&counter));

        bag.release().unwrap();
        bag.release().unwrap();
        drop(bag);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_insert_after_release_releases_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let bag = ResourceBag::new();
        bag.release().unwrap();
        assert!(bag.is_released());

        bag.insert(counting(&counter));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(bag.is_empty());
    }

    #[test]
    fn test_failures_are_collected() {
        let mut failing = MockResource::new();
        failing
            .expect_release()
            .times(1)
            .returning(|| Err(ReleaseError::new("stuck")));

        let counter = Arc::new(AtomicUsize::new(0));
        let bag = ResourceBag::new();
        bag.insert(failing);
        bag.insert(counting(&counter));

        let err = bag.release().unwrap_err();
        assert_eq!(err.message, "stuck");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_multiple_failures_are_summarised() {
        let bag = ResourceBag::new();
        bag.insert(Subscription::fallible(|| Err(ReleaseError::new("a"))));
        bag.insert(Subscription::fallible(|| Err(ReleaseError::new("b"))));

        let err = bag.release().unwrap_err();
        assert_eq!(err.message, "2 resources failed to release: a; b");
    }
}
