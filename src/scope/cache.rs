//! Strongly-owning scopes: application singletons and the resettable cache.

use std::cell::RefCell;

use parking_lot::ReentrantMutex;

use super::{corrupt_entry, AnyBox, Scope, ScopeKind};
use crate::key::{key_of_type, Key, KeyMap};

/// Keyed cache of strongly-owned values.
struct StrongCache {
    kind: ScopeKind,
    entries: ReentrantMutex<RefCell<KeyMap<AnyBox>>>,
}

impl StrongCache {
    fn new(kind: ScopeKind) -> Self {
        Self {
            kind,
            entries: ReentrantMutex::new(RefCell::new(KeyMap::default())),
        }
    }

    fn obtain<S, F>(&self, factory: F) -> S
    where
        S: Clone + Send + Sync + 'static,
        F: FnOnce() -> S,
    {
        let key = key_of_type::<S>();
        let guard = self.entries.lock();

        if let Some(service) = Self::lookup::<S>(&guard.borrow(), &key) {
            tracing::trace!(scope = %self.kind, service = key.display_name(), "cache hit");
            return service;
        }

        tracing::debug!(scope = %self.kind, service = key.display_name(), "cache miss, constructing");
        // No RefCell borrow is live here, the factory may re-enter this scope
        let service = factory();

        let mut entries = guard.borrow_mut();
        if let Some(existing) = Self::lookup::<S>(&entries, &key) {
            // A re-entrant factory on this thread already filled the slot
            return existing;
        }
        entries.insert(key, Box::new(service.clone()));
        service
    }

    fn lookup<S: Clone + 'static>(entries: &KeyMap<AnyBox>, key: &Key) -> Option<S> {
        entries.get(key).map(|slot| match slot.downcast_ref::<S>() {
            Some(service) => service.clone(),
            None => corrupt_entry(key),
        })
    }

    fn release_key(&self, key: &Key) -> bool {
        let guard = self.entries.lock();
        let evicted = guard.borrow_mut().remove(key);
        drop(guard);
        let removed = evicted.is_some();
        drop(evicted);
        if removed {
            tracing::debug!(scope = %self.kind, service = key.display_name(), "released");
        }
        removed
    }

    fn clear(&self) {
        let guard = self.entries.lock();
        // Drop the values outside the borrow, their destructors may touch this scope
        let drained = std::mem::take(&mut *guard.borrow_mut());
        drop(guard);
        tracing::debug!(scope = %self.kind, evicted = drained.len(), "reset");
    }

    fn len(&self) -> usize {
        self.entries.lock().borrow().len()
    }
}

/// Scope for services that live as long as the application.
///
/// Instances are created on first use and kept forever. [`Scope::reset`] is
/// intentionally a no-op; use [`Scope::release`] to evict one entry explicitly.
///
/// # Examples
///
/// ```
/// use injectable::{Scope, SingletonScope};
/// use std::sync::Arc;
///
/// let scope = SingletonScope::new();
/// let a = scope.obtain(|| Arc::new(vec![1, 2, 3]));
/// scope.reset();
/// let b = scope.obtain(|| Arc::new(vec![4, 5, 6]));
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct SingletonScope {
    inner: StrongCache,
}

impl SingletonScope {
    pub fn new() -> Self {
        Self { inner: StrongCache::new(ScopeKind::Singleton) }
    }

    /// Returns the cached `S`, constructing it with `factory` on a miss.
    ///
    /// `S` is normally an `Arc` handle so that every caller shares one instance.
    pub fn obtain<S, F>(&self, factory: F) -> S
    where
        S: Clone + Send + Sync + 'static,
        F: FnOnce() -> S,
    {
        self.inner.obtain(factory)
    }
}

impl Default for SingletonScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for SingletonScope {
    fn kind(&self) -> ScopeKind {
        ScopeKind::Singleton
    }

    fn release_key(&self, key: &Key) -> bool {
        self.inner.release_key(key)
    }

    fn reset(&self) {
        tracing::warn!(scope = %ScopeKind::Singleton, "reset ignored, application services live for the whole process");
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Scope for services cached until explicitly reset.
///
/// Behaves like [`SingletonScope`] but [`Scope::reset`] empties the cache so
/// the next `obtain` constructs a fresh instance.
///
/// # Examples
///
/// ```
/// use injectable::{CachedScope, Scope};
/// use std::sync::Arc;
///
/// let scope = CachedScope::new();
/// let a = scope.obtain(|| Arc::new(1u8));
/// scope.reset();
/// let b = scope.obtain(|| Arc::new(1u8));
/// assert!(!Arc::ptr_eq(&a, &b));
/// ```
pub struct CachedScope {
    inner: StrongCache,
}

impl CachedScope {
    pub fn new() -> Self {
        Self { inner: StrongCache::new(ScopeKind::Cached) }
    }

    /// Returns the cached `S`, constructing it with `factory` on a miss.
    pub fn obtain<S, F>(&self, factory: F) -> S
    where
        S: Clone + Send + Sync + 'static,
        F: FnOnce() -> S,
    {
        self.inner.obtain(factory)
    }
}

impl Default for CachedScope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for CachedScope {
    fn kind(&self) -> ScopeKind {
        ScopeKind::Cached
    }

    fn release_key(&self, key: &Key) -> bool {
        self.inner.release_key(key)
    }

    fn reset(&self) {
        self.inner.clear();
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}
