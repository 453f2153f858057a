//! Idempotent subscription handle.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::Resource;
use crate::errors::ReleaseError;

type ReleaseFn = Box<dyn FnOnce() -> Result<(), ReleaseError> + Send>;

struct Inner {
    released: AtomicBool,
    on_release: Mutex<Option<ReleaseFn>>,
}

/// A releasable connection between a producer and a consumer.
///
/// Clones share state: releasing any clone releases all of them, and the
/// release closure runs at most once.
///
/// The closure must not hold a strong reference to the producer it
/// disconnects from, otherwise a registered subscription keeps its own
/// watched object alive and is never swept.
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<Inner>,
}

impl Subscription {
    /// Creates a subscription that runs `on_release` when released.
    pub fn new<F>(on_release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self::fallible(move || {
            on_release();
            Ok(())
        })
    }

    /// Creates a subscription whose release closure may fail.
    pub fn fallible<F>(on_release: F) -> Self
    where
        F: FnOnce() -> Result<(), ReleaseError> + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                released: AtomicBool::new(false),
                on_release: Mutex::new(Some(Box::new(on_release))),
            }),
        }
    }

    /// Creates a subscription with nothing to release.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Inner {
                released: AtomicBool::new(false),
                on_release: Mutex::new(None),
            }),
        }
    }
}

impl Resource for Subscription {
    fn release(&self) -> Result<(), ReleaseError> {
        if self
            .inner
            .released
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(());
        }

        let on_release = self.inner.on_release.lock().take();
        match on_release {
            Some(f) => f(),
            None => Ok(()),
        }
    }

    fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_release_runs_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let sub = Subscription::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!sub.is_released());
        sub.release().unwrap();
        sub.release().unwrap();

        assert!(sub.is_released());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let sub = Subscription::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        let other = sub.clone();

        other.release().unwrap();
        assert!(sub.is_released());
        sub.release().unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fallible_release_reports_once() {
        let sub = Subscription::fallible(|| Err(ReleaseError::new("already gone")));

        assert_eq!(sub.release(), Err(ReleaseError::new("already gone")));
        // Second call is a no-op even though the first failed.
        assert_eq!(sub.release(), Ok(()));
        assert!(sub.is_released());
    }

    #[test]
    fn test_empty_subscription() {
        let sub = Subscription::empty();
        assert!(sub.release().is_ok());
        assert!(sub.is_released());
        assert_eq!(format!("{sub:?}"), "Subscription { released: true }");
    }

    #[test]
    fn test_concurrent_release() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let sub = Subscription::new(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let sub = sub.clone();
                std::thread::spawn(move || sub.release())
            })
            .collect();
        for t in threads {
            t.join().unwrap().unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
