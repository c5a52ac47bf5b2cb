// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::sequence::{chain_role, run_chain, set_up_chain, wrap_up_chain};
use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::path::ActorPath;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

/// Runs its body, without input, once per incoming token.
///
/// Emits nothing by default. `forward_input` passes the incoming token on
/// after the body ran, which turns the trigger into a transformer.
pub struct Trigger {
    body: Vec<Node>,
    forward_input: bool,
}

impl Trigger {
    pub fn new(body: Vec<Node>) -> Self {
        Self {
            body,
            forward_input: false,
        }
    }

    pub fn forward_input(mut self, forward: bool) -> Self {
        self.forward_input = forward;
        self
    }
}

#[async_trait]
impl ActorHandler for Trigger {
    fn type_name(&self) -> &'static str {
        "Trigger"
    }

    fn children(&self) -> &[Node] {
        &self.body
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.body
    }

    fn role(&self) -> Role {
        if self.forward_input {
            Role::Transformer
        } else {
            Role::Sink
        }
    }

    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    fn generates(&self) -> Vec<TypeTag> {
        if self.forward_input {
            vec![TypeTag::unknown()]
        } else {
            Vec::new()
        }
    }

    async fn set_up(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        let role = chain_role(&self.body);
        if role.accepts_input() {
            return Err(FlowError::configuration(
                path,
                format!("trigger body must not require input, but acts as a {}", role),
            ));
        }
        set_up_chain(&mut self.body, ctx).await
    }

    async fn execute(
        &mut self,
        _path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        run_chain(&mut self.body, None, ctx).await?;
        match input {
            Some(token) if self.forward_input && !ctx.is_stopped() => Ok(vec![token]),
            _ => Ok(Vec::new()),
        }
    }

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        wrap_up_chain(&mut self.body, ctx).await
    }
}
