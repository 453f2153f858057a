//! Weak-reference liveness token.

use std::sync::{Arc, Weak};

/// Anything that can report whether its referent has been dropped.
trait Probe: Send + Sync {
    fn is_dead(&self) -> bool;
}

impl<T: ?Sized + Send + Sync> Probe for Weak<T> {
    fn is_dead(&self) -> bool {
        self.strong_count() == 0
    }
}

/// A non-owning probe over a watched object.
///
/// The token holds a [`Weak`] to the object, so it never keeps it alive. Once
/// the last strong reference is dropped the token reports expired, and since a
/// `Weak` cannot resurrect its referent it never reverts.
#[derive(Clone)]
pub struct LivenessToken {
    probe: Arc<dyn Probe>,
}

impl LivenessToken {
    /// Creates a token watching the given object.
    #[must_use]
    pub fn new<T>(watched: &Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self::from_weak(Arc::downgrade(watched))
    }

    /// Creates a token from an existing weak reference.
    #[must_use]
    pub fn from_weak<T>(weak: Weak<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        Self {
            probe: Arc::new(weak),
        }
    }

    /// Creates a token that is already expired.
    #[must_use]
    pub fn expired() -> Self {
        Self::from_weak(Weak::<()>::new())
    }

    /// Returns whether the watched object is no longer reachable.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.probe.is_dead()
    }
}

impl std::fmt::Debug for LivenessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LivenessToken")
            .field("expired", &self.is_expired())
            .finish()
    }
}

/// Types whose reachability can be tracked by a [`LivenessToken`].
///
/// Only `Send + Sync` referents can be watched: tokens are probed from the
/// sweeper thread. Objects behind `Rc`, or types that are not `Sync`, need
/// a thread-safe `Arc` owner to act as the watched object instead.
pub trait Watchable {
    /// Returns a token watching this object.
    fn liveness_token(&self) -> LivenessToken;
}

impl<T: ?Sized + Send + Sync + 'static> Watchable for Arc<T> {
    fn liveness_token(&self) -> LivenessToken {
        LivenessToken::new(self)
    }
}

impl<T: ?Sized + Send + Sync + 'static> Watchable for Weak<T> {
    fn liveness_token(&self) -> LivenessToken {
        LivenessToken::from_weak(self.clone())
    }
}

impl Watchable for LivenessToken {
    fn liveness_token(&self) -> LivenessToken {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_alive_while_referenced() {
        let watched = Arc::new(String::from("producer"));
        let token = LivenessToken::new(&watched);
        assert!(!token.is_expired());

        let extra = Arc::clone(&watched);
        drop(watched);
        assert!(!token.is_expired());

        drop(extra);
        assert!(token.is_expired());
    }

    #[test]
    fn test_token_never_reverts() {
        let watched = Arc::new(5_u32);
        let token = LivenessToken::new(&watched);
        drop(watched);

        for _ in 0..3 {
            assert!(token.is_expired());
        }
    }

    #[test]
    fn test_token_does_not_keep_object_alive() {
        let watched = Arc::new(vec![1, 2, 3]);
        let _token = LivenessToken::new(&watched);
        assert_eq!(Arc::strong_count(&watched), 1);
    }

    #[test]
    fn test_expired_token() {
        assert!(LivenessToken::expired().is_expired());
    }

    #[test]
    fn test_unsized_referent() {
        let watched: Arc<dyn std::any::Any + Send + Sync> = Arc::new(42_i64);
        let token = watched.liveness_token();
        assert!(!token.is_expired());
        drop(watched);
        assert!(token.is_expired());
    }

    #[test]
    fn test_watchable_weak_and_clone() {
        let watched = Arc::new(());
        let token = Arc::downgrade(&watched).liveness_token();
        let copy = token.liveness_token();

        drop(watched);
        assert!(token.is_expired());
        assert!(copy.is_expired());
        assert_eq!(format!("{copy:?}"), "LivenessToken { expired: true }");
    }
}
