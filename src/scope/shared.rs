//! Weakly-observing scope for services shared while someone still uses them.

use std::any::Any;
use std::cell::RefCell;
use std::sync::{Arc, Weak};

use parking_lot::ReentrantMutex;

use super::{corrupt_entry, Scope, ScopeKind};
use crate::key::{key_of_type, Key, KeyMap};

/// Type-erased weak observer of a cached instance.
trait WeakEntry: Send + Sync {
    fn is_live(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: ?Sized + Send + Sync + 'static> WeakEntry for Weak<T> {
    fn is_live(&self) -> bool {
        self.strong_count() > 0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Outcome of looking up a weak entry.
enum Slot<T: ?Sized> {
    Live(Arc<T>),
    Stale,
    Vacant,
}

/// Scope that shares an instance only while an external strong reference exists.
///
/// Entries are `Weak` observers, so the scope never keeps a service alive on
/// its own. Once every `Arc` handed out has been dropped, the next `obtain`
/// finds a dead entry, treats it as a miss and constructs a new instance.
///
/// Only `Arc` handles are accepted. Plain values cannot be observed weakly
/// and belong in [`CachedScope`](super::CachedScope) or
/// [`SingletonScope`](super::SingletonScope).
///
/// # Examples
///
/// ```
/// use injectable::SharedScope;
/// use std::sync::Arc;
///
/// struct Session;
///
/// let scope = SharedScope::new();
/// let a = scope.obtain(|| Arc::new(Session));
/// let b = scope.obtain(|| Arc::new(Session));
/// assert!(Arc::ptr_eq(&a, &b));
///
/// drop(a);
/// drop(b);
/// let c = scope.obtain(|| Arc::new(Session));
/// assert_eq!(Arc::strong_count(&c), 1);
/// ```
pub struct SharedScope {
    entries: ReentrantMutex<RefCell<KeyMap<Box<dyn WeakEntry>>>>,
}

impl SharedScope {
    pub fn new() -> Self {
        Self {
            entries: ReentrantMutex::new(RefCell::new(KeyMap::default())),
        }
    }

    /// Returns the live shared `Arc<T>`, constructing it with `factory` when
    /// there is no entry or the previous instance has been dropped.
    ///
    /// The entry is keyed by `Arc<T>`, so trait-object handles such as
    /// `Arc<dyn Greeter>` share one slot whatever the concrete type is.
    pub fn obtain<T, F>(&self, factory: F) -> Arc<T>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> Arc<T>,
    {
        let key = key_of_type::<Arc<T>>();
        let guard = self.entries.lock();

        match Self::lookup::<T>(&guard.borrow(), &key) {
            Slot::Live(service) => {
                tracing::trace!(scope = %ScopeKind::Shared, service = key.display_name(), "cache hit");
                return service;
            }
            Slot::Stale => {
                tracing::debug!(scope = %ScopeKind::Shared, service = key.display_name(), "last owner released, constructing");
            }
            Slot::Vacant => {
                tracing::debug!(scope = %ScopeKind::Shared, service = key.display_name(), "cache miss, constructing");
            }
        }

        let service = factory();

        let mut entries = guard.borrow_mut();
        if let Slot::Live(existing) = Self::lookup::<T>(&entries, &key) {
            return existing;
        }
        entries.insert(key, Box::new(Arc::downgrade(&service)));
        service
    }

    fn lookup<T>(entries: &KeyMap<Box<dyn WeakEntry>>, key: &Key) -> Slot<T>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match entries.get(key) {
            None => Slot::Vacant,
            Some(slot) => match slot.as_any().downcast_ref::<Weak<T>>() {
                Some(weak) => weak.upgrade().map_or(Slot::Stale, Slot::Live),
                None => corrupt_entry(key),
            },
        }
    }

    /// Drops every entry whose instance is gone. Returns how many were removed.
    pub fn purge(&self) -> usize {
        let guard = self.entries.lock();
        let mut entries = guard.borrow_mut();
        let before = entries.len();
        entries.retain(|_, slot| slot.is_live());
        before - entries.len()
    }
}

impl Default for SharedScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for SharedScope {
    fn kind(&self) -> ScopeKind {
        ScopeKind::Shared
    }

    fn release_key(&self, key: &Key) -> bool {
        let removed = self.entries.lock().borrow_mut().remove(key).is_some();
        if removed {
            tracing::debug!(scope = %ScopeKind::Shared, service = key.display_name(), "released");
        }
        removed
    }

    fn reset(&self) {
        let guard = self.entries.lock();
        let evicted = std::mem::take(&mut *guard.borrow_mut()).len();
        tracing::debug!(scope = %ScopeKind::Shared, evicted, "reset");
    }

    /// Counts live entries only; stale ones are ignored until replaced or purged.
    fn len(&self) -> usize {
        let guard = self.entries.lock();
        let entries = guard.borrow();
        entries.values().filter(|slot| slot.is_live()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct Hello;
    impl Greeter for Hello {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn trait_object_handles_are_shared() {
        let scope = SharedScope::new();
        let a = scope.obtain(|| Arc::new(Hello) as Arc<dyn Greeter>);
        let b = scope.obtain::<dyn Greeter, _>(|| unreachable!("entry is live"));
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(b.greet(), "hello");
    }

    #[test]
    fn stale_entry_is_rebuilt() {
        let calls = AtomicUsize::new(0);
        let scope = SharedScope::new();
        let make = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Arc::new(Hello)
        };

        let first = scope.obtain(make);
        drop(first);
        assert_eq!(scope.len(), 0);

        let _second = scope.obtain(make);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(scope.len(), 1);
    }

    #[test]
    fn purge_removes_only_dead_entries() {
        struct Other;
        let scope = SharedScope::new();
        let kept = scope.obtain(|| Arc::new(Hello));
        drop(scope.obtain(|| Arc::new(Other)));

        assert_eq!(scope.purge(), 1);
        assert_eq!(scope.purge(), 0);
        assert_eq!(scope.len(), 1);
        drop(kept);
    }

    #[test]
    fn release_forgets_live_entry() {
        let scope = SharedScope::new();
        let held = scope.obtain(|| Arc::new(Hello) as Arc<dyn Greeter>);

        assert!(scope.release::<Arc<dyn Greeter>>());
        assert!(!scope.release::<Arc<dyn Greeter>>());
        assert!(scope.is_empty());

        let rebuilt = scope.obtain(|| Arc::new(Hello) as Arc<dyn Greeter>);
        assert!(!Arc::ptr_eq(&held, &rebuilt));
    }
}
