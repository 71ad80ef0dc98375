use core::fmt;
use std::any::{type_name, Any};

/// Opaque, type-matched data handed to an action when it starts (or takes over).
///
/// The caller owns the value until the receiving action consumes it with
/// [`Payload::downcast`].
pub struct Payload {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl Payload {
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: type_name::<T>(),
        }
    }

    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the value out; hands the payload back untouched when the type does not match.
    pub fn downcast<T: 'static>(self) -> Result<T, Payload> {
        let type_name = self.type_name;
        match self.value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Payload { value, type_name }),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type", &self.type_name)
            .finish()
    }
}
