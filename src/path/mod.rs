// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Dotted addressing of actors within a tree.
//!
//! An [`ActorPath`] is the chain of actor names from the tree root down to an
//! actor. The textual form joins the components with `.`; a dot that is part
//! of a name is written as `\.` and a literal backslash as `\\`, so any name
//! sequence survives a `to_string`/`parse` round trip.
//!
//! ```
//! use flowtree::path::ActorPath;
//!
//! let path = ActorPath::from_components(["Flow", "read v1.2", "filter"]);
//! assert_eq!(path.to_string(), r"Flow.read v1\.2.filter");
//! assert_eq!(path.to_string().parse::<ActorPath>().unwrap(), path);
//! ```

use std::fmt::{Display, Formatter, Write};
use std::str::FromStr;

use thiserror::Error;

pub const SEPARATOR: char = '.';
const ESCAPE: char = '\\';

/// Errors produced when parsing a textual actor path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("actor path '{path}' contains an empty component at position {position}")]
    EmptyComponent { path: String, position: usize },
}

/// Ordered name components identifying an actor from the tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActorPath {
    components: Vec<String>,
}

impl ActorPath {
    /// The empty path, i.e. "above" the root actor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Single component path naming a root actor.
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            components: vec![name.into()],
        }
    }

    pub fn from_components<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn first(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Path of the enclosing actor; `None` for the empty path.
    pub fn parent(&self) -> Option<ActorPath> {
        if self.components.is_empty() {
            return None;
        }
        let mut components = self.components.clone();
        components.pop();
        Some(Self { components })
    }

    pub fn child(&self, name: impl Into<String>) -> ActorPath {
        let mut components = self.components.clone();
        components.push(name.into());
        Self { components }
    }

    pub fn append(&self, other: &ActorPath) -> ActorPath {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Self { components }
    }

    pub fn starts_with(&self, prefix: &ActorPath) -> bool {
        self.components.starts_with(&prefix.components)
    }

    /// Whether `other` lies in the subtree rooted at `self`, i.e. `other`'s
    /// components extend `self`'s. Reflexive.
    ///
    /// ```
    /// use flowtree::path::ActorPath;
    ///
    /// let ab: ActorPath = "a.b".parse().unwrap();
    /// assert!(ab.is_descendant(&"a.b.c".parse().unwrap()));
    /// assert!(!ab.is_descendant(&"a.c".parse().unwrap()));
    /// assert!(ab.is_descendant(&ab));
    /// ```
    pub fn is_descendant(&self, other: &ActorPath) -> bool {
        other.starts_with(self)
    }

    /// Longest shared prefix of both paths.
    pub fn common_ancestor(&self, other: &ActorPath) -> ActorPath {
        let components = self
            .components
            .iter()
            .zip(other.components.iter())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.clone())
            .collect();
        Self { components }
    }

    /// Remainder of this path below `prefix`, `None` if `prefix` does not match.
    pub fn strip_prefix(&self, prefix: &ActorPath) -> Option<ActorPath> {
        if !self.starts_with(prefix) {
            return None;
        }
        Some(Self {
            components: self.components[prefix.len()..].to_vec(),
        })
    }

    /// Escape a single actor name for use in the textual form.
    pub fn escape(name: &str) -> String {
        let mut escaped = String::with_capacity(name.len());
        for c in name.chars() {
            if c == SEPARATOR || c == ESCAPE {
                escaped.push(ESCAPE);
            }
            escaped.push(c);
        }
        escaped
    }
}

impl Display for ActorPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                f.write_char(SEPARATOR)?;
            }
            f.write_str(&ActorPath::escape(component))?;
        }
        Ok(())
    }
}

impl FromStr for ActorPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Self::empty());
        }

        let mut components = Vec::new();
        let mut current = String::new();
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                ESCAPE => match chars.peek() {
                    Some(&next) if next == SEPARATOR || next == ESCAPE => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push(ESCAPE),
                },
                SEPARATOR => {
                    if current.is_empty() {
                        return Err(PathError::EmptyComponent {
                            path: s.to_string(),
                            position: components.len(),
                        });
                    }
                    components.push(std::mem::take(&mut current));
                }
                other => current.push(other),
            }
        }
        if current.is_empty() {
            return Err(PathError::EmptyComponent {
                path: s.to_string(),
                position: components.len(),
            });
        }
        components.push(current);

        Ok(Self { components })
    }
}

impl From<&[&str]> for ActorPath {
    fn from(components: &[&str]) -> Self {
        Self::from_components(components.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn path(s: &str) -> ActorPath {
        s.parse().unwrap()
    }

    #[test]
    fn parse_splits_on_unescaped_dots() {
        let p = path(r"Flow.load file\.csv.sink");
        assert_eq!(p.components(), ["Flow", "load file.csv", "sink"]);
    }

    #[test]
    fn parse_keeps_lone_backslash() {
        let p = path(r"a\b.c");
        assert_eq!(p.components(), [r"a\b", "c"]);
    }

    #[test]
    fn parse_rejects_empty_components() {
        assert!(matches!(
            "a..b".parse::<ActorPath>(),
            Err(PathError::EmptyComponent { position: 1, .. })
        ));
        assert!("a.".parse::<ActorPath>().is_err());
        assert_eq!(path(""), ActorPath::empty());
    }

    #[test]
    fn descendant_relation() {
        assert!(path("a.b").is_descendant(&path("a.b.c")));
        assert!(!path("a.b").is_descendant(&path("a.c")));
        assert!(path("a.b").is_descendant(&path("a.b")));
        assert!(!path("a.b.c").is_descendant(&path("a.b")));
    }

    #[test]
    fn common_ancestor_is_longest_prefix() {
        assert_eq!(path("a.b.c").common_ancestor(&path("a.b.d.e")), path("a.b"));
        assert_eq!(path("x.y").common_ancestor(&path("z")), ActorPath::empty());
    }

    #[test]
    fn parent_child_and_strip_prefix() {
        let p = path("Flow.tee.sink");
        assert_eq!(p.parent(), Some(path("Flow.tee")));
        assert_eq!(path("Flow").child("a.b").to_string(), r"Flow.a\.b");
        assert_eq!(p.strip_prefix(&path("Flow")), Some(path("tee.sink")));
        assert_eq!(p.strip_prefix(&path("Other")), None);
        assert_eq!(ActorPath::empty().parent(), None);
    }

    #[test]
    fn ordering_is_component_wise() {
        let mut paths = vec![path("a.c"), path("a.b.z"), path("a"), path("a.b")];
        paths.sort();
        assert_eq!(paths, vec![path("a"), path("a.b"), path("a.b.z"), path("a.c")]);
    }

    proptest! {
        #[test]
        fn display_parse_round_trip(names in prop::collection::vec("[a-z.\\\\ ]{1,8}", 1..6)) {
            let original = ActorPath::from_components(names);
            let parsed: ActorPath = original.to_string().parse().unwrap();
            prop_assert_eq!(parsed, original);
        }

        #[test]
        fn common_ancestor_is_ancestor_of_both(
            a in prop::collection::vec("[a-c]{1,2}", 0..5),
            b in prop::collection::vec("[a-c]{1,2}", 0..5),
        ) {
            let a = ActorPath::from_components(a);
            let b = ActorPath::from_components(b);
            let common = a.common_ancestor(&b);
            prop_assert!(common.is_descendant(&a));
            prop_assert!(common.is_descendant(&b));
        }
    }
}
