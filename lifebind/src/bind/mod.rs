//! Binding producers to consumers.
//!
//! The `connect*` helpers only create the binding. The `bind*` helpers also
//! hand it to the process-wide registry, so it is released once the producer
//! becomes unreachable and the caller need not keep the returned handle.

use std::sync::Arc;

use crate::resource::Resource;
use crate::retain::retain_until_release_of;

/// Receives values from a [`Producer`].
pub trait Consumer<T>: Send + Sync {
    /// Handles one value.
    fn on_next(&self, value: T);
}

impl<T, F> Consumer<T> for F
where
    F: Fn(T) + Send + Sync,
{
    fn on_next(&self, value: T) {
        self(value);
    }
}

/// A source of values that consumers can subscribe to.
///
/// The returned binding must not keep the producer alive, or a retained
/// binding would never be swept.
pub trait Producer: Send + Sync + 'static {
    /// Values delivered to consumers.
    type Item: Send + 'static;
    /// Handle that disconnects a consumer.
    type Binding: Resource + Clone + 'static;

    /// Connects a consumer.
    fn subscribe(&self, consumer: Arc<dyn Consumer<Self::Item>>) -> Self::Binding;
}

/// Adapts a consumer of optional values to plain values.
struct Optional<C>(C);

impl<T, C> Consumer<T> for Optional<C>
where
    C: Consumer<Option<T>>,
{
    fn on_next(&self, value: T) {
        self.0.on_next(Some(value));
    }
}

/// Connects `consumer` to `producer` without retaining the binding.
pub fn connect<P, C>(producer: &P, consumer: C) -> P::Binding
where
    P: Producer + ?Sized,
    C: Consumer<P::Item> + 'static,
{
    producer.subscribe(Arc::new(consumer))
}

/// Connects every consumer to `producer` without retaining the bindings.
pub fn connect_all<P, C, I>(producer: &P, consumers: I) -> Vec<P::Binding>
where
    P: Producer + ?Sized,
    C: Consumer<P::Item> + 'static,
    I: IntoIterator<Item = C>,
{
    consumers
        .into_iter()
        .map(|consumer| connect(producer, consumer))
        .collect()
}

/// Connects `consumer` and retains the binding until `producer` is dropped.
pub fn bind<P, C>(producer: &Arc<P>, consumer: C) -> P::Binding
where
    P: Producer,
    C: Consumer<P::Item> + 'static,
{
    retain_until_release_of(connect(producer.as_ref(), consumer), producer)
}

/// Binds a consumer of `Option<Item>`; every value arrives wrapped in `Some`.
pub fn bind_optional<P, C>(producer: &Arc<P>, consumer: C) -> P::Binding
where
    P: Producer,
    C: Consumer<Option<P::Item>> + 'static,
{
    bind(producer, Optional(consumer))
}

/// Binds every consumer, retaining each binding until `producer` is dropped.
pub fn bind_all<P, C, I>(producer: &Arc<P>, consumers: I) -> Vec<P::Binding>
where
    P: Producer,
    C: Consumer<P::Item> + 'static,
    I: IntoIterator<Item = C>,
{
    consumers
        .into_iter()
        .map(|consumer| bind(producer, consumer))
        .collect()
}

/// Binds every consumer of `Option<Item>`.
pub fn bind_all_optional<P, C, I>(producer: &Arc<P>, consumers: I) -> Vec<P::Binding>
where
    P: Producer,
    C: Consumer<Option<P::Item>> + 'static,
    I: IntoIterator<Item = C>,
{
    consumers
        .into_iter()
        .map(|consumer| bind_optional(producer, consumer))
        .collect()
}

/// Runs a custom binder and retains its result until `producer` is dropped.
pub fn bind_with<P, F, R>(producer: &Arc<P>, binder: F) -> R
where
    P: Producer,
    F: FnOnce(&P) -> R,
    R: Resource + Clone + 'static,
{
    retain_until_release_of(binder(producer.as_ref()), producer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{wait_until, MockProducer, RecordingConsumer};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    const BOUND: Duration = Duration::from_secs(5);

    #[test]
    fn test_connect_delivers_until_released() {
        let producer = MockProducer::<i32>::new();
        let consumer = RecordingConsumer::<i32>::new();
        let binding = connect(&producer, consumer.clone());

        producer.emit(1);
        binding.release().unwrap();
        producer.emit(2);

        assert_eq!(consumer.values(), vec![1]);
        assert_eq!(producer.consumer_count(), 0);
    }

    #[test]
    fn test_connect_all_fans_out() {
        let producer = MockProducer::<&'static str>::new();
        let consumers: Vec<_> = (0..3).map(|_| RecordingConsumer::<&'static str>::new()).collect();
        let bindings = connect_all(&producer, consumers.clone());

        producer.emit("tick");

        assert_eq!(bindings.len(), 3);
        for consumer in &consumers {
            assert_eq!(consumer.values(), vec!["tick"]);
        }
    }

    #[test]
    fn test_closure_consumer() {
        let producer = MockProducer::<u32>::new();
        let seen = RecordingConsumer::<u32>::new();
        let sink = seen.clone();
        let _binding = connect(&producer, move |v: u32| sink.on_next(v * 10));

        producer.emit(4);
        assert_eq!(seen.values(), vec![40]);
    }

    #[test]
    fn test_bind_releases_after_producer_dropped() {
        let producer = Arc::new(MockProducer::<i32>::new());
        let consumer = RecordingConsumer::<i32>::new();
        let binding = bind(&producer, consumer.clone());

        producer.emit(7);
        assert_eq!(consumer.values(), vec![7]);
        assert!(!binding.is_released());

        drop(producer);
        assert!(wait_until(BOUND, || binding.is_released()));
    }

    #[test]
    fn test_bind_optional_wraps_values() {
        let producer = Arc::new(MockProducer::<i32>::new());
        let consumer = RecordingConsumer::<Option<i32>>::new();
        let _binding = bind_optional(&producer, consumer.clone());

        producer.emit(3);
        assert_eq!(consumer.values(), vec![Some(3)]);
    }

    #[test]
    fn test_bind_all_releases_every_binding() {
        let producer = Arc::new(MockProducer::<u8>::new());
        let consumers: Vec<_> = (0..3).map(|_| RecordingConsumer::<u8>::new()).collect();
        let bindings = bind_all(&producer, consumers.clone());
        let optional = bind_all_optional(&producer, vec![RecordingConsumer::<Option<u8>>::new()]);

        producer.emit(9_u8);
        assert!(consumers.iter().all(|c| c.values() == vec![9]));
        assert_eq!(producer.consumer_count(), 4);

        drop(producer);
        assert!(wait_until(BOUND, || {
            bindings.iter().chain(optional.iter()).all(Resource::is_released)
        }));
    }

    #[test]
    fn test_bind_with_custom_binder() {
        let producer = Arc::new(MockProducer::<i64>::new());
        let consumer = RecordingConsumer::<i64>::new();
        let sink = consumer.clone();
        let binding = bind_with(&producer, |p| {
            connect(p, move |v: i64| {
                if v > 0 {
                    sink.on_next(v);
                }
            })
        });

        producer.emit(-1);
        producer.emit(5);
        assert_eq!(consumer.values(), vec![5]);

        drop(producer);
        assert!(wait_until(BOUND, || binding.is_released()));
    }
}
