use crate::semantics::Narrow;
use std::any::{Any, TypeId};
use std::fmt;

/// A type-erased value that remembers what it was.
///
/// This is the payload of the in-memory conformances. Any
/// `Any + Send + Sync + Clone` type narrows to and from it.
pub struct AnyValue {
    type_id: TypeId,
    type_name: &'static str,
    value: Box<dyn Any + Send + Sync>,
}

impl AnyValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            value: Box::new(value),
        }
    }

    /// Check if the contained value is of type T
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Name of the stored type, for diagnostics only
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.value.downcast_mut::<T>()
    }

    /// Unwraps the value, handing `self` back if it is not a `T`.
    pub fn downcast<T: Any>(self) -> Result<T, Self> {
        if !self.is::<T>() {
            return Err(self);
        }
        let Self {
            type_id,
            type_name,
            value,
        } = self;
        value.downcast::<T>().map(|boxed| *boxed).map_err(|value| Self {
            type_id,
            type_name,
            value,
        })
    }
}

impl fmt::Debug for AnyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyValue")
            .field("type", &self.type_name)
            .finish_non_exhaustive()
    }
}

impl<T> Narrow<AnyValue> for T
where
    T: Any + Send + Sync + Clone,
{
    fn erase(self) -> AnyValue {
        AnyValue::new(self)
    }

    fn narrow(payload: &AnyValue) -> Option<Self> {
        payload.downcast_ref::<T>().cloned()
    }
}
