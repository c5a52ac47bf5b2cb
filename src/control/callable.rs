// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Actors held outside the token flow and invoked by reference.
//!
//! A [`CallableActors`] holder owns its members behind shared locks and
//! registers them with the run's registry when it is set up. A
//! [`CallableActor`] resolves its reference against the tree index during
//! its own set-up, so a bad reference fails before anything executes, and
//! forwards tokens to the target while running.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};

use crate::engine::{unique_names, ActorInfo, FlowContext, Node, Role, SharedNode, TreeIndex};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::actor::CallableMemberBusy;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

/// Standalone holder of callable actors.
pub struct CallableActors {
    path: ActorPath,
    members: Vec<SharedNode>,
}

impl CallableActors {
    pub fn new(members: Vec<Node>) -> Self {
        Self {
            path: ActorPath::empty(),
            members: members
                .into_iter()
                .map(|node| Arc::new(Mutex::new(node)))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Lock every member that is not busy; busy ones are logged and left out.
    fn lock_members(&self, operation: &'static str) -> Vec<MutexGuard<'_, Node>> {
        let mut locked = Vec::with_capacity(self.members.len());
        for (position, member) in self.members.iter().enumerate() {
            match member.try_lock() {
                Ok(guard) => locked.push(guard),
                Err(_) => CallableMemberBusy {
                    holder: &self.path,
                    position,
                    operation,
                }
                .log(),
            }
        }
        locked
    }
}

#[async_trait]
impl ActorHandler for CallableActors {
    fn type_name(&self) -> &'static str {
        "CallableActors"
    }

    fn children(&self) -> &[Node] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut []
    }

    fn role(&self) -> Role {
        Role::Standalone
    }

    fn accepts(&self) -> Vec<TypeTag> {
        Vec::new()
    }

    fn generates(&self) -> Vec<TypeTag> {
        Vec::new()
    }

    // Members are only locked while a call executes them. A walk that meets
    // a busy member logs it and leaves it as it was.
    fn assign_paths(&mut self, path: &ActorPath) {
        self.path = path.clone();
        let mut members = self.lock_members("assign paths");
        let names = unique_names(members.iter().map(|m| m.name()));
        for (member, name) in members.iter_mut().zip(names) {
            member.set_name(name);
            member.assign_paths(path);
        }
    }

    fn index_children(&self, index: &mut TreeIndex) {
        for member in self.lock_members("index") {
            member.index_into(index);
            index.mark_callable(member.path());
        }
    }

    fn reset(&mut self) {
        for mut member in self.lock_members("reset") {
            member.reset();
        }
    }

    async fn set_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        for member in &self.members {
            let mut node = member.lock().await;
            if node.is_skipped() {
                continue;
            }
            node.set_up(ctx).await?;
            ctx.registry().register(node.path().clone(), Arc::clone(member));
        }
        Ok(())
    }

    async fn execute(
        &mut self,
        _path: &ActorPath,
        _input: Option<Token>,
        _ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        Ok(Vec::new())
    }

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        let mut errors = Vec::new();
        for member in self.members.iter().rev() {
            let mut node = member.lock().await;
            errors.extend(node.wrap_up(ctx).await);
            ctx.registry().unregister(node.path());
        }
        errors
    }
}

/// Reference to a callable actor, by full path or by bare name.
pub struct CallableActor {
    reference: String,
    flavour: Role,
    resolved: Option<ActorInfo>,
    target: Option<SharedNode>,
}

impl CallableActor {
    fn with_flavour(reference: impl Into<String>, flavour: Role) -> Self {
        Self {
            reference: reference.into(),
            flavour,
            resolved: None,
            target: None,
        }
    }

    pub fn source(reference: impl Into<String>) -> Self {
        Self::with_flavour(reference, Role::Source)
    }

    pub fn transformer(reference: impl Into<String>) -> Self {
        Self::with_flavour(reference, Role::Transformer)
    }

    pub fn sink(reference: impl Into<String>) -> Self {
        Self::with_flavour(reference, Role::Sink)
    }

    /// Path of the target once set up.
    pub fn resolved_path(&self) -> Option<&ActorPath> {
        self.resolved.as_ref().map(|info| &info.path)
    }

    fn target(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<SharedNode> {
        if let Some(target) = &self.target {
            return Ok(Arc::clone(target));
        }
        let info = self.resolved.as_ref().ok_or_else(|| {
            FlowError::configuration(path, "callable reference used before set-up")
        })?;
        let target = ctx.registry().get(&info.path).ok_or_else(|| {
            FlowError::configuration(
                path,
                format!("callable actor '{}' is not available in this run", info.path),
            )
        })?;
        self.target = Some(Arc::clone(&target));
        Ok(target)
    }
}

#[async_trait]
impl ActorHandler for CallableActor {
    fn type_name(&self) -> &'static str {
        "CallableActor"
    }

    fn children(&self) -> &[Node] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut []
    }

    fn role(&self) -> Role {
        self.flavour
    }

    fn accepts(&self) -> Vec<TypeTag> {
        match (&self.resolved, self.flavour.accepts_input()) {
            (_, false) => Vec::new(),
            (Some(info), true) => info.accepts.clone(),
            (None, true) => vec![TypeTag::unknown()],
        }
    }

    fn generates(&self) -> Vec<TypeTag> {
        match (&self.resolved, self.flavour.produces_output()) {
            (_, false) => Vec::new(),
            (Some(info), true) => info.generates.clone(),
            (None, true) => vec![TypeTag::unknown()],
        }
    }

    fn reset(&mut self) {
        self.resolved = None;
        self.target = None;
    }

    async fn set_up(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        let reference: ActorPath = self
            .reference
            .parse()
            .map_err(|e: crate::path::PathError| FlowError::configuration(path, e.to_string()))?;
        let info = ctx
            .index()
            .resolve_callable(&reference)
            .ok_or_else(|| {
                FlowError::configuration(path, format!("path not found: {}", self.reference))
            })?
            .clone();
        if info.skip {
            return Err(FlowError::configuration(
                path,
                format!("callable actor '{}' is skipped", info.path),
            ));
        }
        if info.role != self.flavour {
            return Err(FlowError::configuration(
                path,
                format!(
                    "callable actor '{}' acts as a {}, expected a {}",
                    info.path, info.role, self.flavour
                ),
            ));
        }
        self.resolved = Some(info);
        Ok(())
    }

    async fn execute(
        &mut self,
        path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        let target = self.target(path, ctx)?;
        let mut node = target.try_lock().map_err(|_| {
            FlowError::execution(
                path,
                anyhow::anyhow!("callable actor '{}' is already running", self.reference),
            )
        })?;
        let input = if self.flavour.accepts_input() { input } else { None };
        node.execute(input, ctx).await
    }

    async fn wrap_up(&mut self, _path: &ActorPath, _ctx: &FlowContext) -> Vec<FlowError> {
        self.target = None;
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::MapTransformer;

    fn holder() -> CallableActors {
        CallableActors::new(vec![
            Node::transformer("twice", MapTransformer::new(|v: &i64| v * 2)),
            Node::transformer("twice", MapTransformer::new(|v: &i64| v * 2)),
        ])
    }

    #[test]
    fn duplicate_member_names_are_disambiguated() {
        let mut holder = holder();
        holder.assign_paths(&ActorPath::from_components(["Flow", "callables"]));

        let paths: Vec<String> = holder
            .lock_members("inspect")
            .iter()
            .map(|member| member.path().to_string())
            .collect();
        assert_eq!(paths, vec!["Flow.callables.twice", "Flow.callables.twice-1"]);
    }

    #[test]
    fn busy_members_are_left_out_of_tree_walks() {
        let mut holder = holder();
        holder.assign_paths(&ActorPath::from_components(["Flow", "callables"]));
        let busy = Arc::clone(&holder.members[1]);
        let _running = busy.try_lock().unwrap();

        assert_eq!(holder.lock_members("reset").len(), 1);

        let mut index = TreeIndex::default();
        holder.index_children(&mut index);
        assert!(index.contains(&"Flow.callables.twice".parse().unwrap()));
        assert!(!index.contains(&"Flow.callables.twice-1".parse().unwrap()));
    }
}
