/// Unit tests for Key identity

use injectable::{key_of_type, Key};
use std::any::TypeId;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

trait Logger: Send + Sync {}
struct ConsoleLogger;
struct FileLogger;
impl Logger for ConsoleLogger {}
impl Logger for FileLogger {}

#[test]
fn test_key_display_name() {
    let key = Key::new(TypeId::of::<String>(), "alloc::string::String");
    assert_eq!(key.display_name(), "alloc::string::String");
    assert_eq!(key.to_string(), "alloc::string::String");
    assert_eq!(key.type_id(), TypeId::of::<String>());
}

#[test]
fn test_key_is_stable_across_calls() {
    let a = key_of_type::<Arc<dyn Logger>>();
    let b = key_of_type::<Arc<dyn Logger>>();
    assert_eq!(a, b);
    assert_eq!(a.display_name(), b.display_name());
}

#[test]
fn test_key_is_per_abstract_type_not_implementation() {
    // Both implementations are requested through the same handle type
    let console: Arc<dyn Logger> = Arc::new(ConsoleLogger);
    let file: Arc<dyn Logger> = Arc::new(FileLogger);

    fn key_for<T: ?Sized + 'static>(_: &T) -> Key {
        key_of_type::<T>()
    }

    assert_eq!(key_for(&console), key_for(&file));
    assert_ne!(key_of_type::<Arc<ConsoleLogger>>(), key_of_type::<Arc<FileLogger>>());
}

#[test]
fn test_key_hash_and_order_ignore_name() {
    let a = Key::new(TypeId::of::<u32>(), "u32");
    let b = Key::new(TypeId::of::<u32>(), "alias");

    let mut map = HashMap::new();
    map.insert(a, 1);
    map.insert(b, 2);
    assert_eq!(map.len(), 1);
    assert_eq!(map[&a], 2);

    let set: BTreeSet<Key> = [a, b, key_of_type::<u64>()].into_iter().collect();
    assert_eq!(set.len(), 2);
}
