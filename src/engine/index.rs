// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use indexmap::IndexMap;

use crate::engine::Role;
use crate::path::ActorPath;
use crate::token::TypeTag;

/// Static description of one actor, captured before set-up.
#[derive(Debug, Clone)]
pub struct ActorInfo {
    pub path: ActorPath,
    pub name: String,
    pub role: Role,
    pub type_name: &'static str,
    pub accepts: Vec<TypeTag>,
    pub generates: Vec<TypeTag>,
    pub skip: bool,
    /// Held by a callable-actors holder and reachable by reference.
    pub callable: bool,
}

/// Mirror of the whole tree, in depth-first declaration order.
///
/// Built once per run before set-up; path references are resolved against it
/// so resolution never needs access to the live nodes.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    entries: IndexMap<ActorPath, ActorInfo>,
}

impl TreeIndex {
    pub fn insert(&mut self, info: ActorInfo) {
        self.entries.insert(info.path.clone(), info);
    }

    pub fn get(&self, path: &ActorPath) -> Option<&ActorInfo> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &ActorPath) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActorInfo> {
        self.entries.values()
    }

    pub fn root(&self) -> Option<&ActorInfo> {
        self.entries.values().next()
    }

    pub(crate) fn mark_callable(&mut self, path: &ActorPath) {
        if let Some(info) = self.entries.get_mut(path) {
            info.callable = true;
        }
    }

    /// Direct children of `path`, in declaration order.
    pub fn children_of<'a>(&'a self, path: &'a ActorPath) -> impl Iterator<Item = &'a ActorInfo> + 'a {
        self.entries
            .values()
            .filter(move |info| info.path.parent().as_ref() == Some(path))
    }

    /// First callable actor named `name`, in declaration order.
    pub fn find_callable(&self, name: &str) -> Option<&ActorInfo> {
        self.entries
            .values()
            .find(|info| info.callable && info.name == name)
    }

    /// Resolve a reference given either as a full path or as the bare name
    /// of a callable actor.
    pub fn resolve_callable(&self, reference: &ActorPath) -> Option<&ActorInfo> {
        match reference.len() {
            0 => None,
            1 => self
                .find_callable(reference.first().unwrap_or_default())
                .or_else(|| self.get(reference).filter(|info| info.callable)),
            _ => self.get(reference).filter(|info| info.callable),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(path: &str, callable: bool) -> ActorInfo {
        let path: ActorPath = path.parse().unwrap();
        ActorInfo {
            name: path.last().unwrap_or_default().to_string(),
            path,
            role: Role::Transformer,
            type_name: "Test",
            accepts: vec![TypeTag::unknown()],
            generates: vec![TypeTag::unknown()],
            skip: false,
            callable,
        }
    }

    #[test]
    fn resolves_full_paths_and_bare_names() {
        let mut index = TreeIndex::default();
        index.insert(info("Flow", false));
        index.insert(info("Flow.callables", false));
        index.insert(info("Flow.callables.square", true));
        index.insert(info("Flow.square", false));

        let by_name = index.resolve_callable(&ActorPath::root("square")).unwrap();
        assert_eq!(by_name.path.to_string(), "Flow.callables.square");

        let full: ActorPath = "Flow.callables.square".parse().unwrap();
        assert!(index.resolve_callable(&full).is_some());

        let not_callable: ActorPath = "Flow.square".parse().unwrap();
        assert!(index.resolve_callable(&not_callable).is_none());
        assert!(index.resolve_callable(&ActorPath::root("missing")).is_none());
    }

    #[test]
    fn children_follow_declaration_order() {
        let mut index = TreeIndex::default();
        index.insert(info("Flow", false));
        index.insert(info("Flow.b", false));
        index.insert(info("Flow.a", false));
        index.insert(info("Flow.a.x", false));

        let root: ActorPath = "Flow".parse().unwrap();
        let names: Vec<&str> = index.children_of(&root).map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(index.root().map(|i| i.name.as_str()), Some("Flow"));
    }
}
