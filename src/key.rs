//! Service keys for the registry and the scope caches.

use std::any::TypeId;
use std::fmt;

/// Key for override and cache lookup.
///
/// A key identifies the *handle type* a consumer asks for, usually
/// `Arc<dyn SomeTrait>`. It is derived from the type's `TypeId`, so it is
/// stable for the life of the process and identical no matter which concrete
/// implementation ends up behind the handle.
///
/// The type name is carried along for diagnostics only; equality, hashing
/// and ordering look at the `TypeId` alone.
///
/// # Examples
///
/// ```rust
/// use injectable::{key_of_type, Key};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {}
///
/// let a = key_of_type::<Arc<dyn Greeter>>();
/// let b = key_of_type::<Arc<dyn Greeter>>();
/// assert_eq!(a, b);
/// assert_ne!(a, key_of_type::<dyn Greeter>());
/// assert!(a.display_name().contains("Greeter"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Key {
    id: TypeId,
    name: &'static str,
}

impl Key {
    /// Builds a key from its parts.
    pub fn new(id: TypeId, name: &'static str) -> Self {
        Self { id, name }
    }

    /// The `TypeId` backing this key.
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Get the type name for display
    ///
    /// This is the `std::any::type_name` result captured when the key was made.
    pub fn display_name(&self) -> &'static str {
        self.name
    }
}

// Hot path: TypeId-only comparison, the name never participates
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Key {}

impl PartialOrd for Key {
    #[inline(always)]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    #[inline(always)]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> Key {
    Key::new(TypeId::of::<T>(), std::any::type_name::<T>())
}

#[cfg(feature = "ahash")]
pub(crate) type KeyMap<V> = std::collections::HashMap<Key, V, ahash::RandomState>;

#[cfg(not(feature = "ahash"))]
pub(crate) type KeyMap<V> = std::collections::HashMap<Key, V>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    trait Speaker {}

    #[test]
    fn name_does_not_affect_identity() {
        let a = Key::new(TypeId::of::<u32>(), "u32");
        let b = Key::new(TypeId::of::<u32>(), "renamed");
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn handle_and_trait_object_keys_differ() {
        let handle = key_of_type::<Arc<dyn Speaker>>();
        let object = key_of_type::<dyn Speaker>();
        assert_ne!(handle, object);
        assert_eq!(handle.to_string(), handle.display_name());
    }
}
