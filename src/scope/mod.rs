//! Scope caches governing how long a constructed service is reused.
//!
//! Three policies are provided, each owning its own keyed cache behind its
//! own re-entrant lock:
//!
//! - [`SingletonScope`]: strong references kept for the life of the process
//! - [`CachedScope`]: strong references kept until [`Scope::reset`]
//! - [`SharedScope`]: weak references, so an entry lives exactly as long as
//!   some caller still holds the `Arc` it handed out
//!
//! All three return a cached instance on a hit and run the supplied factory
//! once per miss. The lock is held across the factory call, so two threads
//! racing on the same miss construct a single instance. A factory may
//! resolve *other* services from the same scope on the same thread.

use std::any::Any;
use std::fmt;

use crate::error::DiError;
use crate::key::{key_of_type, Key};

mod cache;
mod shared;

pub use cache::{CachedScope, SingletonScope};
pub use shared::SharedScope;

// Type-erased cache slot
pub(crate) type AnyBox = Box<dyn Any + Send + Sync>;

/// Caching policy of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScopeKind {
    /// Cached for the life of the process
    Singleton,
    /// Cached until the scope is reset
    Cached,
    /// Cached while an external strong reference exists
    Shared,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeKind::Singleton => f.write_str("singleton"),
            ScopeKind::Cached => f.write_str("cached"),
            ScopeKind::Shared => f.write_str("shared"),
        }
    }
}

/// Eviction surface shared by every scope.
///
/// `obtain` is not part of this trait because the shared scope only accepts
/// `Arc` handles while the strong scopes accept any `Clone` value; each scope
/// type exposes its own `obtain` with the bound that fits it.
///
/// # Examples
///
/// ```
/// use injectable::{CachedScope, Scope};
/// use std::sync::Arc;
///
/// let scope = CachedScope::new();
/// let first = scope.obtain(|| Arc::new(String::from("config")));
/// assert_eq!(scope.len(), 1);
///
/// assert!(scope.release::<Arc<String>>());
/// let second = scope.obtain(|| Arc::new(String::from("config")));
/// assert!(!Arc::ptr_eq(&first, &second));
/// ```
pub trait Scope: Send + Sync {
    /// The caching policy of this scope.
    fn kind(&self) -> ScopeKind;

    /// Evicts the entry for `key`. Returns whether an entry was present.
    fn release_key(&self, key: &Key) -> bool;

    /// Evicts the entry for the handle type `S`.
    ///
    /// For [`SharedScope`] the handle type is the `Arc<T>` that
    /// [`SharedScope::obtain`] returns.
    fn release<S: ?Sized + 'static>(&self) -> bool
    where
        Self: Sized,
    {
        self.release_key(&key_of_type::<S>())
    }

    /// Evicts every entry.
    fn reset(&self);

    /// Number of live entries.
    fn len(&self) -> usize;

    /// Returns true when no live entry is cached.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// Keys are derived from the stored type, so a failed downcast means the cache is corrupt.
#[cold]
pub(crate) fn corrupt_entry(key: &Key) -> ! {
    panic!("{}", DiError::TypeMismatch(key.display_name()))
}
