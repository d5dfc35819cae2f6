use crate::key::TypedKey;
use crate::semantics::{DependentMap, Narrow};

type KeyOf<M, V> = TypedKey<M, <M as DependentMap>::RawKey, V>;

/// Indexed access for every [`DependentMap`].
///
/// This is implemented once for all conforming containers, so a new container
/// only has to provide `value_for` and `set`.
///
/// # Examples
///
/// ```
/// use sovran_keymap::{AnyKey, AnyMap, DependentMapExt};
///
/// const ANSWER: AnyKey<&str, i32> = AnyKey::new("answer");
///
/// let mut map = AnyMap::new();
/// assert_eq!(map.lookup(&ANSWER), None);
///
/// map.assign(&ANSWER, 42);
/// assert_eq!(map.lookup(&ANSWER), Some(42));
///
/// map.assign(&ANSWER, None);
/// assert_eq!(map.lookup(&ANSWER), None);
/// ```
pub trait DependentMapExt: DependentMap {
    /// Reads the value stored under `key`.
    fn lookup<V>(&self, key: &KeyOf<Self, V>) -> Option<V>
    where
        V: Narrow<Self::Payload>,
    {
        self.value_for(key)
    }

    /// Writes `value` under `key`. Passing `None` removes the entry.
    fn assign<V, T>(&mut self, key: &KeyOf<Self, V>, value: T)
    where
        V: Narrow<Self::Payload>,
        T: Into<Option<V>>,
    {
        self.set(value.into(), key)
    }

    /// Returns a read/write handle bound to `key`.
    fn slot<'a, V>(&'a mut self, key: &'a KeyOf<Self, V>) -> Slot<'a, Self, V>
    where
        V: Narrow<Self::Payload>,
    {
        Slot { map: self, key }
    }
}

impl<M: DependentMap> DependentMapExt for M {}

/// A handle to the entry for one typed key.
///
/// Every method is a composition of [`DependentMap::value_for`] and
/// [`DependentMap::set`].
///
/// ```
/// use sovran_keymap::{AnyKey, AnyMap, DependentMapExt};
///
/// const VISITS: AnyKey<&str, u32> = AnyKey::new("visits");
///
/// let mut map = AnyMap::new();
/// let mut visits = map.slot(&VISITS);
/// visits.update(|count| Some(count.unwrap_or(0) + 1));
/// visits.update(|count| Some(count.unwrap_or(0) + 1));
/// assert_eq!(visits.get(), Some(2));
/// ```
pub struct Slot<'a, M: DependentMap, V> {
    map: &'a mut M,
    key: &'a KeyOf<M, V>,
}

impl<'a, M, V> Slot<'a, M, V>
where
    M: DependentMap,
    V: Narrow<M::Payload>,
{
    pub fn get(&self) -> Option<V> {
        self.map.value_for(self.key)
    }

    pub fn set(&mut self, value: Option<V>) {
        self.map.set(value, self.key);
    }

    /// Replaces the entry with whatever `f` returns for the current value.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(Option<V>) -> Option<V>,
    {
        let next = f(self.get());
        self.set(next);
    }
}

#[cfg(test)]
mod tests {
    use crate::{AnyKey, AnyMap, AnyValue, DependentMapExt};

    const NAME: AnyKey<&str, String> = AnyKey::new("name");
    const SCORE: AnyKey<&str, i64> = AnyKey::new("score");

    #[test]
    fn test_assign_accepts_value_or_none() {
        let mut map = AnyMap::new();

        map.assign(&NAME, "alice".to_string());
        assert_eq!(map.lookup(&NAME).as_deref(), Some("alice"));

        map.assign(&NAME, Some("bob".to_string()));
        assert_eq!(map.lookup(&NAME).as_deref(), Some("bob"));

        map.assign(&NAME, None);
        assert_eq!(map.lookup(&NAME), None);
        assert!(map.is_empty());
    }

    #[test]
    fn test_slot_get_and_set() {
        let mut map = AnyMap::new();
        let mut score = map.slot(&SCORE);

        assert_eq!(score.get(), None);
        score.set(Some(10));
        assert_eq!(score.get(), Some(10));
        score.set(None);
        assert_eq!(score.get(), None);
    }

    #[test]
    fn test_slot_update_sees_current_value() {
        let mut map = AnyMap::new();
        map.assign(&NAME, "carol".to_string());

        map.slot(&NAME)
            .update(|name| name.or_else(|| Some("dave".to_string())));

        assert_eq!(map.lookup(&NAME).as_deref(), Some("carol"));
    }

    #[test]
    fn test_slot_update_can_remove() {
        let mut map = AnyMap::new();
        map.assign(&SCORE, 3);

        map.slot(&SCORE).update(|score| score.filter(|s| *s > 5));

        assert_eq!(map.lookup(&SCORE), None);
        assert!(!map.contains_key("score"));
    }

    #[test]
    fn test_update_on_mismatched_slot_overwrites_it() {
        let mut map = AnyMap::new();
        map.insert("score", AnyValue::new("not a number"));

        // The stored value is invisible through SCORE, so update starts from None.
        map.slot(&SCORE).update(|score| Some(score.unwrap_or(0) + 1));
        assert_eq!(map.lookup(&SCORE), Some(1));
    }
}
