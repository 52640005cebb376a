//! Diagnostic observers for resolution traceability.
//!
//! Observers are notified around every resolution the container performs,
//! with the path the resolution took (override, default binding, argument
//! override or self-construction). When no observer is installed the
//! resolution path skips timing and notification entirely.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use crate::error::DiError;
use crate::key::Key;

/// Which binding produced a resolved service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResolutionSource {
    /// A zero-argument override registered with `register`
    Override,
    /// An argument-aware override registered with `register_with`
    ArgumentOverride,
    /// The caller-supplied default binding
    Default,
    /// The type's own `SelfConstructing::construct`
    SelfConstructed,
}

/// Observer trait for resolution events.
///
/// Calls are made synchronously on the resolving thread. Keep
/// implementations lightweight; they run on every resolution.
///
/// # Examples
///
/// ```
/// use injectable::{container, DiError, Key, ResolutionObserver, ResolutionSource};
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Counter(AtomicUsize);
///
/// impl ResolutionObserver for Counter {
///     fn resolving(&self, _key: &Key, _source: ResolutionSource) {}
///
///     fn resolved(&self, _key: &Key, _source: ResolutionSource, _duration: Duration) {
///         self.0.fetch_add(1, Ordering::Relaxed);
///     }
/// }
///
/// let counter = Arc::new(Counter::default());
/// container().add_observer(counter.clone());
/// let _ = container().resolve(|| 5u8);
/// container().clear_observers();
/// assert!(counter.0.load(Ordering::Relaxed) >= 1);
/// ```
pub trait ResolutionObserver: Send + Sync {
    /// Called before the chosen factory runs.
    fn resolving(&self, key: &Key, source: ResolutionSource);

    /// Called after the factory produced a service.
    fn resolved(&self, key: &Key, source: ResolutionSource, duration: Duration);

    /// Called when resolution fails with an error.
    ///
    /// Panics raised by factories are not reported here; they propagate
    /// to the caller unchanged.
    fn failed(&self, key: &Key, error: &DiError) {
        let _ = (key, error);
    }
}

/// Container for registered observers.
#[derive(Default)]
pub(crate) struct Observers {
    observers: RwLock<Vec<Arc<dyn ResolutionObserver>>>,
    active: AtomicBool,
}

impl Observers {
    pub(crate) fn add(&self, observer: Arc<dyn ResolutionObserver>) {
        self.observers.write().push(observer);
        self.active.store(true, Ordering::Release);
    }

    pub(crate) fn clear(&self) {
        self.observers.write().clear();
        self.active.store(false, Ordering::Release);
    }

    // Cloned out so observers may touch the container without holding our lock
    fn snapshot(&self) -> Option<Vec<Arc<dyn ResolutionObserver>>> {
        if !self.active.load(Ordering::Acquire) {
            return None;
        }
        let observers = self.observers.read();
        (!observers.is_empty()).then(|| observers.clone())
    }

    /// Runs `f`, reporting it to every observer.
    #[inline]
    pub(crate) fn observe<T>(&self, key: &Key, source: ResolutionSource, f: impl FnOnce() -> T) -> T {
        let Some(observers) = self.snapshot() else {
            return f();
        };

        for observer in &observers {
            observer.resolving(key, source);
        }
        let start = Instant::now();
        let value = f();
        let duration = start.elapsed();
        for observer in &observers {
            observer.resolved(key, source, duration);
        }
        value
    }

    /// Like `observe`, for fallible resolution.
    #[inline]
    pub(crate) fn observe_result<T>(
        &self,
        key: &Key,
        source: ResolutionSource,
        f: impl FnOnce() -> Result<T, DiError>,
    ) -> Result<T, DiError> {
        let Some(observers) = self.snapshot() else {
            return f();
        };

        for observer in &observers {
            observer.resolving(key, source);
        }
        let start = Instant::now();
        let result = f();
        let duration = start.elapsed();
        for observer in &observers {
            match &result {
                Ok(_) => observer.resolved(key, source, duration),
                Err(error) => observer.failed(key, error),
            }
        }
        result
    }

    /// Reports a failure that happened without running any factory.
    pub(crate) fn failed(&self, key: &Key, error: &DiError) {
        if let Some(observers) = self.snapshot() {
            for observer in &observers {
                observer.failed(key, error);
            }
        }
    }
}

/// Built-in observer that forwards events to `tracing`.
///
/// # Examples
///
/// ```
/// use injectable::{container, LoggingObserver};
/// use std::sync::Arc;
///
/// container().add_observer(Arc::new(LoggingObserver::new()));
/// container().clear_observers();
/// ```
pub struct LoggingObserver {
    prefix: String,
}

impl LoggingObserver {
    /// Creates a new logging observer with default prefix.
    pub fn new() -> Self {
        Self {
            prefix: "[injectable]".to_string(),
        }
    }

    /// Creates a new logging observer with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Default for LoggingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionObserver for LoggingObserver {
    fn resolving(&self, key: &Key, source: ResolutionSource) {
        tracing::info!(prefix = %self.prefix, service = key.display_name(), ?source, "resolving");
    }

    fn resolved(&self, key: &Key, source: ResolutionSource, duration: Duration) {
        tracing::info!(prefix = %self.prefix, service = key.display_name(), ?source, ?duration, "resolved");
    }

    fn failed(&self, key: &Key, error: &DiError) {
        tracing::error!(prefix = %self.prefix, service = key.display_name(), %error, "resolution failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl ResolutionObserver for Recorder {
        fn resolving(&self, key: &Key, source: ResolutionSource) {
            self.events.lock().push(format!("resolving {} {:?}", key, source));
        }

        fn resolved(&self, key: &Key, source: ResolutionSource, _duration: Duration) {
            self.events.lock().push(format!("resolved {} {:?}", key, source));
        }

        fn failed(&self, key: &Key, error: &DiError) {
            self.events.lock().push(format!("failed {} {}", key, error));
        }
    }

    #[test]
    fn no_observers_runs_factory_directly() {
        let observers = Observers::default();
        let key = key_of_type::<u8>();
        assert_eq!(observers.observe(&key, ResolutionSource::Default, || 3u8), 3);
    }

    #[test]
    fn events_bracket_the_factory() {
        let observers = Observers::default();
        let recorder = Arc::new(Recorder::default());
        observers.add(recorder.clone());

        let key = key_of_type::<u8>();
        observers.observe(&key, ResolutionSource::Override, || 1u8);
        let _ = observers.observe_result::<u8>(&key, ResolutionSource::SelfConstructed, || {
            Err(DiError::MissingArgument("u8"))
        });

        let events = recorder.events.lock().clone();
        assert_eq!(
            events,
            vec![
                "resolving u8 Override".to_string(),
                "resolved u8 Override".to_string(),
                "resolving u8 SelfConstructed".to_string(),
                "failed u8 Missing construction argument for: u8".to_string(),
            ]
        );

        observers.clear();
        observers.observe(&key, ResolutionSource::Default, || 2u8);
        assert_eq!(recorder.events.lock().len(), 4);
    }

    #[test]
    fn logging_observer_passes_values_through() {
        let observers = Observers::default();
        observers.add(Arc::new(LoggingObserver::with_prefix("[test]")));

        let key = key_of_type::<u8>();
        assert_eq!(observers.observe(&key, ResolutionSource::Default, || 5u8), 5);
        let result = observers.observe_result::<u8>(&key, ResolutionSource::ArgumentOverride, || {
            Err(DiError::NotFound("u8"))
        });
        assert_eq!(result, Err(DiError::NotFound("u8")));
    }
}
