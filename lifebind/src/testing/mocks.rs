//! Mock resources, producers and consumers.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use crate::bind::{Consumer, Producer};
use crate::errors::ReleaseError;
use crate::resource::{Resource, Subscription};

/// A resource that counts how many times it was released.
///
/// Every call is counted, including repeated ones, so a count above one means
/// something released the resource twice.
#[derive(Debug, Clone, Default)]
pub struct CountingResource {
    releases: Arc<AtomicUsize>,
}

impl CountingResource {
    /// Creates a new counting resource.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of release calls.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl Resource for CountingResource {
    fn release(&self) -> Result<(), ReleaseError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_released(&self) -> bool {
        self.release_count() > 0
    }
}

/// A resource whose release always fails.
#[derive(Debug, Clone)]
pub struct FailingResource {
    message: String,
    attempts: Arc<AtomicUsize>,
}

impl FailingResource {
    /// Creates a resource that fails with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Returns the number of release attempts.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Resource for FailingResource {
    fn release(&self) -> Result<(), ReleaseError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ReleaseError::new(self.message.clone()))
    }
}

/// A resource whose release panics.
#[derive(Debug, Clone, Default)]
pub struct PanickingResource;

impl Resource for PanickingResource {
    fn release(&self) -> Result<(), ReleaseError> {
        panic!("PanickingResource released");
    }
}

/// A resource that releases cleanly but panics when dropped.
#[derive(Debug, Default)]
pub struct PanicOnDropResource;

impl Resource for PanicOnDropResource {
    fn release(&self) -> Result<(), ReleaseError> {
        Ok(())
    }
}

impl Drop for PanicOnDropResource {
    fn drop(&mut self) {
        panic!("PanicOnDropResource dropped");
    }
}

type ConsumerList<T> = Mutex<Vec<(u64, Arc<dyn Consumer<T>>)>>;

/// A producer that forwards manually emitted values to its consumers.
///
/// Bindings only hold a weak reference to the consumer list, so they never
/// keep the producer alive.
pub struct MockProducer<T> {
    consumers: Arc<ConsumerList<T>>,
    next_id: AtomicU64,
}

impl<T> Default for MockProducer<T> {
    fn default() -> Self {
        Self {
            consumers: Arc::new(Mutex::new(Vec::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<T: Clone + Send + 'static> MockProducer<T> {
    /// Creates a producer with no consumers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `value` to every connected consumer.
    pub fn emit(&self, value: T) {
        let consumers: Vec<_> = self
            .consumers
            .lock()
            .iter()
            .map(|(_, c)| Arc::clone(c))
            .collect();
        for consumer in consumers {
            consumer.on_next(value.clone());
        }
    }

    /// Returns the number of connected consumers.
    #[must_use]
    pub fn consumer_count(&self) -> usize {
        self.consumers.lock().len()
    }
}

impl<T: Clone + Send + 'static> Producer for MockProducer<T> {
    type Item = T;
    type Binding = Subscription;

    fn subscribe(&self, consumer: Arc<dyn Consumer<T>>) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.consumers.lock().push((id, consumer));

        let consumers = Arc::downgrade(&self.consumers);
        Subscription::new(move || {
            if let Some(consumers) = consumers.upgrade() {
                consumers.lock().retain(|(other, _)| *other != id);
            }
        })
    }
}

impl<T> std::fmt::Debug for MockProducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProducer")
            .field("consumer_count", &self.consumers.lock().len())
            .finish()
    }
}

/// A consumer that records every value it receives.
#[derive(Debug)]
pub struct RecordingConsumer<T> {
    values: Arc<Mutex<Vec<T>>>,
}

impl<T> Clone for RecordingConsumer<T> {
    fn clone(&self) -> Self {
        Self {
            values: Arc::clone(&self.values),
        }
    }
}

impl<T> Default for RecordingConsumer<T> {
    fn default() -> Self {
        Self {
            values: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> RecordingConsumer<T> {
    /// Creates a consumer with no recorded values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded values in arrival order.
    #[must_use]
    pub fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }
}

impl<T: Send> Consumer<T> for RecordingConsumer<T> {
    fn on_next(&self, value: T) {
        self.values.lock().push(value);
    }
}
