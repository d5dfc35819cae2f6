use crate::any_value::AnyValue;
use crate::key::TypedKey;
use crate::semantics::{DependentMap, Narrow};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// A thread-safe dependent map.
///
/// `SharedMap` is a handle to a map shared behind a lock. Cloning the handle is
/// cheap and every clone sees the same entries, so each thread or component
/// keeps its own handle and writes through it.
///
/// # Examples
///
/// ```
/// use sovran_keymap::{DependentMapExt, SharedMap, TypedKey};
/// use std::thread;
///
/// const HITS: TypedKey<SharedMap<&str>, &str, u64> = TypedKey::new("hits");
///
/// let map = SharedMap::new();
/// let mut writer = map.clone();
/// thread::spawn(move || writer.assign(&HITS, 3))
///     .join()
///     .unwrap();
///
/// assert_eq!(map.lookup(&HITS), Some(3));
/// ```
#[derive(Debug)]
pub struct SharedMap<K> {
    items: Arc<Mutex<HashMap<K, AnyValue>>>,
}

impl<K> SharedMap<K>
where
    K: Clone + Eq + Hash + Debug,
{
    /// Creates a new, empty SharedMap
    pub fn new() -> Self {
        Self {
            items: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, AnyValue>> {
        self.items.lock().unwrap_or_else(|poisoned| {
            // A panic elsewhere cannot leave a HashMap half-updated.
            log::warn!("recovering poisoned SharedMap lock");
            poisoned.into_inner()
        })
    }

    /// Returns the number of entries in the map
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns true if anything is stored under the raw key, whatever its type
    pub fn contains_key(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    /// Returns a vector of all raw keys in the map
    pub fn keys(&self) -> Vec<K> {
        self.lock().keys().cloned().collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Runs `f` against the value stored under `key` without cloning it.
    ///
    /// Returns `None` if the entry is missing or holds another type.
    ///
    /// ```
    /// use sovran_keymap::{DependentMapExt, SharedMap, TypedKey};
    ///
    /// const LOG: TypedKey<SharedMap<&str>, &str, Vec<String>> = TypedKey::new("log");
    ///
    /// let mut map = SharedMap::new();
    /// map.assign(&LOG, vec!["started".to_string()]);
    ///
    /// let lines = map.with(&LOG, |log| log.len());
    /// assert_eq!(lines, Some(1));
    /// ```
    pub fn with<V, F, R>(&self, key: &TypedKey<Self, K, V>, f: F) -> Option<R>
    where
        V: 'static,
        F: FnOnce(&V) -> R,
    {
        let store = self.lock();
        store
            .get(key.raw_value())
            .and_then(AnyValue::downcast_ref::<V>)
            .map(f)
    }

    /// Runs `f` against a mutable reference to the value stored under `key`.
    ///
    /// Returns `None` if the entry is missing or holds another type.
    pub fn with_mut<V, F, R>(&self, key: &TypedKey<Self, K, V>, f: F) -> Option<R>
    where
        V: 'static,
        F: FnOnce(&mut V) -> R,
    {
        let mut store = self.lock();
        store
            .get_mut(key.raw_value())
            .and_then(AnyValue::downcast_mut::<V>)
            .map(f)
    }
}

impl<K> Clone for SharedMap<K> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<K> Default for SharedMap<K>
where
    K: Clone + Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> DependentMap for SharedMap<K>
where
    K: Clone + Eq + Hash + Debug,
{
    type RawKey = K;
    type Payload = AnyValue;

    fn value_for<V>(&self, key: &TypedKey<Self, K, V>) -> Option<V>
    where
        V: Narrow<AnyValue>,
    {
        let store = self.lock();
        store.get(key.raw_value()).and_then(V::narrow)
    }

    fn set<V>(&mut self, value: Option<V>, key: &TypedKey<Self, K, V>)
    where
        V: Narrow<AnyValue>,
    {
        let mut store = self.lock();
        match value {
            Some(value) => {
                log::trace!("storing {:?}", key.raw_value());
                store.insert(key.raw_value().clone(), value.erase());
            }
            None => {
                log::trace!("removing {:?}", key.raw_value());
                store.remove(key.raw_value());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DependentMapExt;
    use std::thread;

    const COUNTER: TypedKey<SharedMap<&str>, &str, i32> = TypedKey::new("counter");

    #[test]
    fn test_clones_share_entries() {
        let mut a = SharedMap::new();
        let b = a.clone();

        a.assign(&COUNTER, 1);
        assert_eq!(b.lookup(&COUNTER), Some(1));
        assert_eq!(b.keys(), vec!["counter"]);

        b.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn test_with_mut_respects_type() {
        let mut map = SharedMap::new();
        map.assign(&COUNTER, 41);

        let bumped = map.with_mut(&COUNTER, |c| {
            *c += 1;
            *c
        });
        assert_eq!(bumped, Some(42));

        let as_text: TypedKey<SharedMap<&str>, &str, String> = TypedKey::new("counter");
        assert_eq!(map.with(&as_text, |s| s.len()), None);
        assert!(map.contains_key(&"counter"));
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let mut map = SharedMap::new();
        map.assign(&COUNTER, 7);

        let poisoner = map.clone();
        let _ = thread::spawn(move || {
            poisoner.with_mut(&COUNTER, |_| panic!("poison the lock"));
        })
        .join();

        assert_eq!(map.lookup(&COUNTER), Some(7));
        map.assign(&COUNTER, None);
        assert_eq!(map.len(), 0);
    }
}
