// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use super::TypeTag;

/// Shared, immutable handle on a value of any type.
///
/// Cloning a payload is cheap: clones share the same value, which is why the
/// engine never hands out mutable access to it.
#[derive(Clone)]
pub struct Payload {
    value: Arc<dyn Any + Send + Sync>,
    tag: TypeTag,
}

impl Payload {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            tag: TypeTag::of::<T>(),
        }
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.tag
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Identity comparison: true only for clones of the same payload.
    pub fn ptr_eq(&self, other: &Payload) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl Debug for Payload {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Payload").field("type", &self.tag.name()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_reports_its_type() {
        let payload = Payload::new(String::from("x"));
        assert!(payload.is::<String>());
        assert_eq!(payload.type_tag(), &TypeTag::of::<String>());
        assert!(format!("{:?}", payload).contains("String"));
    }

    #[test]
    fn ptr_eq_distinguishes_equal_values() {
        let a = Payload::new(1_i32);
        let b = Payload::new(1_i32);
        assert!(a.ptr_eq(&a.clone()));
        assert!(!a.ptr_eq(&b));
    }
}
