use crate::any_value::AnyValue;
use crate::key::TypedKey;
use crate::semantics::{DependentMap, Narrow};
use std::collections::HashMap;
use std::hash::{BuildHasher, Hash};

/// A plain `HashMap` holding type-erased values.
pub type AnyMap<K> = HashMap<K, AnyValue>;

/// A typed key into an [`AnyMap`].
pub type AnyKey<K, V> = TypedKey<AnyMap<K>, K, V>;

/// Dependent map semantics for `HashMap`, applicable when the map's values are
/// [`AnyValue`]s.
impl<K, S> DependentMap for HashMap<K, AnyValue, S>
where
    K: Eq + Hash + Clone,
    S: BuildHasher,
{
    type RawKey = K;
    type Payload = AnyValue;

    fn value_for<V>(&self, key: &TypedKey<Self, K, V>) -> Option<V>
    where
        V: Narrow<AnyValue>,
    {
        self.get(key.raw_value()).and_then(V::narrow)
    }

    fn set<V>(&mut self, value: Option<V>, key: &TypedKey<Self, K, V>)
    where
        V: Narrow<AnyValue>,
    {
        match value {
            Some(value) => {
                self.insert(key.raw_value().clone(), value.erase());
            }
            None => {
                self.remove(key.raw_value());
            }
        }
    }
}
