// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tokio::sync::Mutex;

use crate::engine::Node;
use crate::path::ActorPath;

/// Shared handle on a callable actor.
pub type SharedNode = Arc<Mutex<Node>>;

/// Callable actors of one run, keyed by their full path.
///
/// Populated by [`crate::control::CallableActors`] during set-up and read by
/// [`crate::control::CallableActor`] references. Owned by the run's
/// [`crate::engine::FlowContext`]; nothing is global.
#[derive(Clone, Default)]
pub struct ActorRegistry {
    entries: Arc<RwLock<HashMap<ActorPath, SharedNode>>>,
}

impl std::fmt::Debug for ActorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActorRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `path`, returning any actor it replaced.
    pub fn register(&self, path: ActorPath, node: SharedNode) -> Option<SharedNode> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, node)
    }

    pub fn get(&self, path: &ActorPath) -> Option<SharedNode> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn contains(&self, path: &ActorPath) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(path)
    }

    pub fn unregister(&self, path: &ActorPath) -> Option<SharedNode> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(path)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn paths(&self) -> Vec<ActorPath> {
        let mut paths: Vec<ActorPath> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        paths.sort();
        paths
    }
}
