// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::{assign_child_paths, FlowContext, Node, Role, TreeIndex};
use crate::errors::{FlowError, FlowResult};
use crate::path::ActorPath;
use crate::token::{Token, TypeTag};

/// An actor that owns and drives child actors.
///
/// The owning [`Node`] handles state transitions, skip flags and the
/// per-node error override; a handler only decides how its children are set
/// up, fed and released. The default lifecycle methods set children up in
/// declaration order, stopping at the first failure, and wrap them up in
/// reverse order, collecting every failure.
#[async_trait]
pub trait ActorHandler: Send + Sync {
    /// Short type name used in logs and the tree index.
    fn type_name(&self) -> &'static str;

    fn children(&self) -> &[Node];

    fn children_mut(&mut self) -> &mut [Node];

    /// Role derived from the children.
    fn role(&self) -> Role;

    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    /// Error policy applied to children that carry no override of their own.
    fn error_default(&self) -> Option<bool> {
        None
    }

    fn assign_paths(&mut self, path: &ActorPath) {
        assign_child_paths(self.children_mut(), path);
    }

    fn index_children(&self, index: &mut TreeIndex) {
        for child in self.children() {
            child.index_into(index);
        }
    }

    fn reset(&mut self) {
        for child in self.children_mut() {
            child.reset();
        }
    }

    async fn set_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        for child in self.children_mut() {
            child.set_up(ctx).await?;
        }
        Ok(())
    }

    async fn execute(
        &mut self,
        path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>>;

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        let mut errors = Vec::new();
        for child in self.children_mut().iter_mut().rev() {
            errors.extend(child.wrap_up(ctx).await);
        }
        errors
    }

    fn into_node(self, name: impl Into<String>) -> Node
    where
        Self: Sized + 'static,
    {
        Node::handler(name, self)
    }
}
