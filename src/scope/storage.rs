// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Scoped storage of arbitrary payloads under validated keys.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use regex::Regex;

use super::chain::ScopeChain;
use super::Variables;
use crate::errors::ScopeError;
use crate::token::Payload;

/// Validated storage item name. Uses the same character set as variable names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(name: impl Into<String>) -> Result<Self, ScopeError> {
        let name = name.into();
        if Variables::is_valid_name(&name) {
            Ok(Self(name))
        } else {
            Err(ScopeError::InvalidName { name })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StorageKey {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Handle on one storage scope. Clones refer to the same scope.
#[derive(Clone)]
pub struct Storage {
    chain: ScopeChain<Payload>,
}

impl Default for Storage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage")
            .field("depth", &self.chain.depth())
            .field("local", &self.local_keys())
            .finish()
    }
}

impl Storage {
    pub fn new() -> Self {
        Self {
            chain: ScopeChain::root(),
        }
    }

    /// Read-through child scope.
    pub fn child(&self) -> Self {
        Self {
            chain: self.chain.child(),
        }
    }

    /// Isolated scope without a parent.
    pub fn detached(&self) -> Self {
        Self::new()
    }

    pub fn is_same_scope(&self, other: &Storage) -> bool {
        self.chain.same_frame(&other.chain)
    }

    /// Chained lookup, local scope first.
    pub fn get(&self, key: &StorageKey) -> Option<Payload> {
        self.chain.lookup(key.as_str())
    }

    /// Typed chained lookup; `None` when missing or of another type.
    pub fn get_value<T>(&self, key: &StorageKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.get(key).and_then(|p| p.downcast_ref::<T>().cloned())
    }

    pub fn put(&self, key: &StorageKey, payload: Payload) -> Option<Payload> {
        self.chain.set(key.as_str().to_string(), payload)
    }

    pub fn put_value<T>(&self, key: &StorageKey, value: T) -> Option<Payload>
    where
        T: Send + Sync + 'static,
    {
        self.put(key, Payload::new(value))
    }

    /// Remove a local entry and hand it to the caller.
    pub fn take(&self, key: &StorageKey) -> Option<Payload> {
        self.chain.remove(key.as_str())
    }

    /// Local-only removal; returns whether an entry was removed.
    pub fn remove(&self, key: &StorageKey) -> bool {
        self.chain.remove(key.as_str()).is_some()
    }

    pub fn contains(&self, key: &StorageKey) -> bool {
        self.chain.contains(key.as_str())
    }

    pub fn contains_local(&self, key: &StorageKey) -> bool {
        self.chain.contains_local(key.as_str())
    }

    pub fn require(&self, key: &StorageKey) -> Result<Payload, ScopeError> {
        self.get(key).ok_or_else(|| ScopeError::MissingStorageValue {
            key: key.to_string(),
        })
    }

    pub fn require_as<T>(&self, key: &StorageKey) -> Result<T, ScopeError>
    where
        T: Clone + Send + Sync + 'static,
    {
        let payload = self.require(key)?;
        payload
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| ScopeError::StorageTypeMismatch {
                key: key.to_string(),
                expected: std::any::type_name::<T>(),
                found: payload.type_tag().name(),
            })
    }

    /// All visible keys, outermost scope first.
    pub fn keys(&self) -> Vec<String> {
        self.chain.names()
    }

    pub fn local_keys(&self) -> Vec<String> {
        self.chain.local_entries().into_iter().map(|(k, _)| k).collect()
    }

    pub fn len_local(&self) -> usize {
        self.chain.local_len()
    }

    pub fn clear(&self) {
        self.chain.clear_local();
    }

    /// Copy local entries whose key matches `filter` (all when `None`) into
    /// `target`. Returns the propagated keys.
    pub fn propagate_to(&self, target: &Storage, filter: Option<&Regex>) -> Vec<String> {
        let mut propagated = Vec::new();
        for (key, payload) in self.chain.local_entries() {
            if filter.map_or(true, |re| re.is_match(&key)) {
                target.chain.set(key.clone(), payload);
                propagated.push(key);
            }
        }
        propagated
    }
}
