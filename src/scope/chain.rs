// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Generic parent-chained scope shared by `Variables` and `Storage`.
//!
//! Every frame guards its own map with a lock; a child holds a shared handle
//! on its parent frame and only ever reads through it.

use indexmap::{IndexMap, IndexSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct Frame<V> {
    entries: RwLock<IndexMap<String, V>>,
    parent: Option<Arc<Frame<V>>>,
}

impl<V> Frame<V> {
    fn read(&self) -> RwLockReadGuard<'_, IndexMap<String, V>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexMap<String, V>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cloneable handle on one scope frame; clones address the same frame.
pub(crate) struct ScopeChain<V> {
    frame: Arc<Frame<V>>,
}

impl<V> Clone for ScopeChain<V> {
    fn clone(&self) -> Self {
        Self {
            frame: Arc::clone(&self.frame),
        }
    }
}

impl<V: Clone> ScopeChain<V> {
    pub(crate) fn root() -> Self {
        Self {
            frame: Arc::new(Frame {
                entries: RwLock::new(IndexMap::new()),
                parent: None,
            }),
        }
    }

    pub(crate) fn child(&self) -> Self {
        Self {
            frame: Arc::new(Frame {
                entries: RwLock::new(IndexMap::new()),
                parent: Some(Arc::clone(&self.frame)),
            }),
        }
    }

    pub(crate) fn same_frame(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.frame, &other.frame)
    }

    pub(crate) fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = self.frame.parent.as_ref();
        while let Some(frame) = current {
            depth += 1;
            current = frame.parent.as_ref();
        }
        depth
    }

    pub(crate) fn has_parent(&self) -> bool {
        self.frame.parent.is_some()
    }

    /// Local-first lookup walking the parent chain.
    pub(crate) fn lookup(&self, name: &str) -> Option<V> {
        let mut current = Some(&self.frame);
        while let Some(frame) = current {
            if let Some(value) = frame.read().get(name) {
                return Some(value.clone());
            }
            current = frame.parent.as_ref();
        }
        None
    }

    pub(crate) fn lookup_local(&self, name: &str) -> Option<V> {
        self.frame.read().get(name).cloned()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        let mut current = Some(&self.frame);
        while let Some(frame) = current {
            if frame.read().contains_key(name) {
                return true;
            }
            current = frame.parent.as_ref();
        }
        false
    }

    pub(crate) fn contains_local(&self, name: &str) -> bool {
        self.frame.read().contains_key(name)
    }

    /// Write into this frame, returning the previous local value.
    pub(crate) fn set(&self, name: String, value: V) -> Option<V> {
        self.frame.write().insert(name, value)
    }

    /// Remove from this frame only; parent bindings stay visible.
    pub(crate) fn remove(&self, name: &str) -> Option<V> {
        self.frame.write().shift_remove(name)
    }

    pub(crate) fn clear_local(&self) {
        self.frame.write().clear();
    }

    pub(crate) fn local_len(&self) -> usize {
        self.frame.read().len()
    }

    pub(crate) fn local_entries(&self) -> Vec<(String, V)> {
        self.frame
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// All visible names, outermost frame first, each name once.
    pub(crate) fn names(&self) -> Vec<String> {
        let mut frames = Vec::new();
        let mut current = Some(&self.frame);
        while let Some(frame) = current {
            frames.push(frame);
            current = frame.parent.as_ref();
        }

        let mut names = IndexSet::new();
        for frame in frames.into_iter().rev() {
            for name in frame.read().keys() {
                names.insert(name.clone());
            }
        }
        names.into_iter().collect()
    }

    /// Flatten all visible bindings into a new root frame.
    pub(crate) fn snapshot(&self) -> Self {
        let flat = Self::root();
        for name in self.names() {
            if let Some(value) = self.lookup(&name) {
                flat.set(name, value);
            }
        }
        flat
    }
}
