use crate::key::TypedKey;
use std::hash::Hash;

/// Conversion between a value type and a container's opaque payload.
///
/// `erase` forgets the static type when a value is stored. `narrow` recovers
/// it when reading, returning `None` when the payload does not hold a value
/// of this type.
pub trait Narrow<P>: Sized {
    fn erase(self) -> P;

    fn narrow(payload: &P) -> Option<Self>;
}

/// Dependent map semantics for any container that maps homogeneous raw keys
/// to type-erased values.
///
/// Both operations are generic over the value type at the call site, so a
/// single implementation serves every value type the payload can narrow to.
/// The value type is fixed by the [`TypedKey`], never by the caller.
///
/// Most code should go through [`DependentMapExt`](crate::DependentMapExt)
/// rather than calling these methods directly.
pub trait DependentMap: Sized {
    /// The homogeneous key type. Writes clone it into the container.
    type RawKey: Eq + Hash + Clone;

    /// The type-erased representation of stored values.
    type Payload;

    /// Returns the value associated with `key`.
    ///
    /// Returns `None` if nothing is stored under the key's raw value or if the
    /// stored value cannot be narrowed to `V`. The two cases are deliberately
    /// indistinguishable.
    fn value_for<V>(&self, key: &TypedKey<Self, Self::RawKey, V>) -> Option<V>
    where
        V: Narrow<Self::Payload>;

    /// Associates `value` with `key`, or removes the entry when `value` is
    /// `None`. Removing an absent entry is a no-op.
    fn set<V>(&mut self, value: Option<V>, key: &TypedKey<Self, Self::RawKey, V>)
    where
        V: Narrow<Self::Payload>;
}
