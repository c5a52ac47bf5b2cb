// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution scopes: variables and storage.
//!
//! Both live in a parent chain. Handlers that run a body in isolation
//! ([`crate::control::LocalScope`], [`crate::encapsulation::Encapsulator`],
//! [`crate::control::ForLoop`]) build child scopes for the body and drop them
//! afterwards, so nothing the body writes leaks into the caller unless it is
//! explicitly propagated.

mod chain;
mod storage;
mod variables;

pub use storage::{Storage, StorageKey};
pub use variables::{extract_names, Variables, ENVIRONMENT_PREFIX};

use serde::{Deserialize, Serialize};

/// How a handler derives the scope its body runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeHandling {
    /// Body uses the caller's scope directly.
    Share,
    /// Body gets a read-through child of the caller's scope.
    #[default]
    Inherit,
    /// Body gets an isolated scope.
    Empty,
}

impl ScopeHandling {
    pub fn apply_variables(&self, caller: &Variables) -> Variables {
        match self {
            ScopeHandling::Share => caller.clone(),
            ScopeHandling::Inherit => caller.child(),
            ScopeHandling::Empty => caller.detached(),
        }
    }

    pub fn apply_storage(&self, caller: &Storage) -> Storage {
        match self {
            ScopeHandling::Share => caller.clone(),
            ScopeHandling::Inherit => caller.child(),
            ScopeHandling::Empty => caller.detached(),
        }
    }

    /// Whether entries written by the body may be copied back to the caller.
    pub fn allows_propagation(&self) -> bool {
        !matches!(self, ScopeHandling::Share)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handling_modes_build_expected_scopes() {
        let caller = Variables::new();
        caller.set("x", "1");

        let shared = ScopeHandling::Share.apply_variables(&caller);
        assert!(shared.is_same_scope(&caller));

        let inherited = ScopeHandling::Inherit.apply_variables(&caller);
        assert_eq!(inherited.lookup("x").as_deref(), Some("1"));
        assert!(!inherited.is_same_scope(&caller));

        let empty = ScopeHandling::Empty.apply_variables(&caller);
        assert!(empty.lookup("x").is_none());
    }

    #[test]
    fn handling_deserializes_from_snake_case() {
        let handling: ScopeHandling = serde_yaml::from_str("empty").unwrap();
        assert_eq!(handling, ScopeHandling::Empty);
        assert_eq!(ScopeHandling::default(), ScopeHandling::Inherit);
        assert!(!ScopeHandling::Share.allows_propagation());
    }
}
