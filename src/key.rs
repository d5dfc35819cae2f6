use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A key into a dependent map.
///
/// `TypedKey` is generic over three type parameters:
///
/// - `M` is the container this key indexes. It must implement
///   [`DependentMap`](crate::DependentMap) for the key to be usable.
/// - `K` is the raw key. It is what the container actually looks up.
/// - `V` is the type of the value stored under this key.
///
/// Only `K` exists at runtime. `M` and `V` are zero-sized markers that let the
/// compiler check every read and write against the declared value type.
///
/// Keys are meant to be declared once, usually as constants:
///
/// ```
/// use sovran_keymap::{AnyMap, DependentMapExt, TypedKey};
/// use std::time::SystemTime;
///
/// const LAST_LOGIN: TypedKey<AnyMap<&str>, &str, SystemTime> = TypedKey::new("lastLogin");
///
/// let mut map = AnyMap::new();
/// map.assign(&LAST_LOGIN, SystemTime::now());
/// assert!(map.lookup(&LAST_LOGIN).is_some());
/// ```
///
/// A key declared for one container cannot be used with another:
///
/// ```compile_fail
/// use sovran_keymap::{AnyMap, DependentMapExt, PrefKey, Preferences};
///
/// const DARK_MODE: PrefKey<bool> = PrefKey::from_static("darkMode");
///
/// let map: AnyMap<std::borrow::Cow<'static, str>> = AnyMap::new();
/// let _ = map.lookup(&DARK_MODE);
/// ```
///
/// Nor can it store a value of the wrong type:
///
/// ```compile_fail
/// use sovran_keymap::{AnyMap, DependentMapExt, TypedKey};
///
/// const COUNT: TypedKey<AnyMap<&str>, &str, i32> = TypedKey::new("count");
///
/// let mut map = AnyMap::new();
/// map.assign(&COUNT, "forty-two");
/// ```
pub struct TypedKey<M, K, V> {
    raw: K,
    _marker: PhantomData<fn() -> (M, V)>,
}

impl<M, K, V> TypedKey<M, K, V> {
    pub const fn new(raw: K) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// The raw key used for the container lookup
    pub fn raw_value(&self) -> &K {
        &self.raw
    }

    pub fn into_raw(self) -> K {
        self.raw
    }
}

impl<M, V> TypedKey<M, Cow<'static, str>, V> {
    /// Creates a string key usable in `const` items.
    pub const fn from_static(raw: &'static str) -> Self {
        Self::new(Cow::Borrowed(raw))
    }
}

impl<M, V> From<String> for TypedKey<M, Cow<'static, str>, V> {
    fn from(raw: String) -> Self {
        Self::new(Cow::Owned(raw))
    }
}

impl<M, V> From<&'static str> for TypedKey<M, Cow<'static, str>, V> {
    fn from(raw: &'static str) -> Self {
        Self::from_static(raw)
    }
}

// Manual impls below: deriving would put bounds on `M` and `V`.

impl<M, K: Clone, V> Clone for TypedKey<M, K, V> {
    fn clone(&self) -> Self {
        Self::new(self.raw.clone())
    }
}

impl<M, K: Copy, V> Copy for TypedKey<M, K, V> {}

impl<M, K: PartialEq, V> PartialEq for TypedKey<M, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<M, K: Eq, V> Eq for TypedKey<M, K, V> {}

impl<M, K: Hash, V> Hash for TypedKey<M, K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<M, K: fmt::Debug, V> fmt::Debug for TypedKey<M, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedKey")
            .field("raw", &self.raw)
            .field("value", &std::any::type_name::<V>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::rc::Rc;

    struct Container;

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_identity_is_raw_value() {
        let a: TypedKey<Container, &str, i32> = TypedKey::new("count");
        let b: TypedKey<Container, &str, i32> = TypedKey::new("count");
        let c: TypedKey<Container, &str, i32> = TypedKey::new("other");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_eq!(hash_of(&a), hash_of(&"count"));
    }

    #[test]
    fn test_markers_do_not_leak_into_auto_traits() {
        // Rc is neither Send nor Sync, but only the raw key is stored.
        assert_send_sync::<TypedKey<Rc<u8>, u64, Rc<String>>>();
        assert_eq!(
            std::mem::size_of::<TypedKey<Container, u64, String>>(),
            std::mem::size_of::<u64>()
        );
    }

    #[test]
    fn test_copy_and_into_raw() {
        let key: TypedKey<Container, u32, String> = TypedKey::new(7);
        let copy = key;
        assert_eq!(*key.raw_value(), 7);
        assert_eq!(copy.into_raw(), 7);
    }

    #[test]
    fn test_string_keys() {
        const STATIC: TypedKey<Container, Cow<'static, str>, bool> =
            TypedKey::from_static("darkMode");
        let owned: TypedKey<Container, Cow<'static, str>, bool> =
            TypedKey::from(String::from("darkMode"));
        let borrowed: TypedKey<Container, Cow<'static, str>, bool> = "darkMode".into();

        assert_eq!(STATIC, owned);
        assert_eq!(owned, borrowed);
        assert_eq!(STATIC.raw_value().as_ref(), "darkMode");
    }

    #[test]
    fn test_debug_names_value_type() {
        let key: TypedKey<Container, &str, f64> = TypedKey::new("ratio");
        let debug = format!("{:?}", key);
        assert!(debug.contains("\"ratio\""));
        assert!(debug.contains("f64"));
    }
}
