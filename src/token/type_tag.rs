// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::{Any, TypeId};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Identifies the type of a payload for setup-time contract checks.
///
/// `TypeTag::unknown()` is the wildcard: an actor that accepts or generates
/// the unknown tag is compatible with every neighbour.
#[derive(Debug, Clone, Copy)]
pub struct TypeTag {
    id: Option<TypeId>,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: Any>() -> Self {
        Self {
            id: Some(TypeId::of::<T>()),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn unknown() -> Self {
        Self {
            id: None,
            name: "unknown",
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.id.is_none()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a producer generating `generated` can feed a consumer
    /// accepting `accepted`.
    ///
    /// ```
    /// use flowtree::token::TypeTag;
    ///
    /// let ints = [TypeTag::of::<i64>()];
    /// let strings = [TypeTag::of::<String>()];
    /// assert!(TypeTag::is_compatible(&ints, &ints));
    /// assert!(!TypeTag::is_compatible(&ints, &strings));
    /// assert!(TypeTag::is_compatible(&ints, &[TypeTag::unknown()]));
    /// ```
    pub fn is_compatible(generated: &[TypeTag], accepted: &[TypeTag]) -> bool {
        if generated.iter().any(TypeTag::is_unknown) || accepted.iter().any(TypeTag::is_unknown) {
            return true;
        }
        generated.iter().any(|g| accepted.contains(g))
    }

    /// Render a tag list as `[a, b]` for error messages.
    pub fn describe(tags: &[TypeTag]) -> String {
        let names: Vec<&str> = tags.iter().map(TypeTag::name).collect();
        format!("[{}]", names.join(", "))
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_compare_by_type() {
        assert_eq!(TypeTag::of::<String>(), TypeTag::of::<String>());
        assert_ne!(TypeTag::of::<String>(), TypeTag::of::<&'static str>());
        assert_eq!(TypeTag::unknown(), TypeTag::unknown());
    }

    #[test]
    fn compatibility_requires_overlap() {
        let produced = [TypeTag::of::<i64>(), TypeTag::of::<f64>()];
        assert!(TypeTag::is_compatible(&produced, &[TypeTag::of::<f64>()]));
        assert!(!TypeTag::is_compatible(&produced, &[TypeTag::of::<String>()]));
        assert!(!TypeTag::is_compatible(&[], &[TypeTag::of::<String>()]));
        assert!(TypeTag::is_compatible(&[TypeTag::unknown()], &[TypeTag::of::<String>()]));
    }

    #[test]
    fn describe_lists_names() {
        let text = TypeTag::describe(&[TypeTag::of::<i64>(), TypeTag::unknown()]);
        assert_eq!(text, "[i64, unknown]");
    }
}
