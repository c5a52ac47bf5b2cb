// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::sequence::{chain_accepts, chain_role, run_chain, set_up_chain, wrap_up_chain};
use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::path::ActorPath;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

/// Feeds a copy of every token to a side chain and forwards the original.
///
/// What the side chain emits is discarded. With `isolate_errors` even fatal
/// side-chain errors are recorded as non-fatal so the main flow continues.
pub struct Tee {
    body: Vec<Node>,
    isolate_errors: Option<bool>,
    min_active: usize,
}

impl Tee {
    pub fn new(body: Vec<Node>) -> Self {
        Self {
            body,
            isolate_errors: None,
            min_active: 0,
        }
    }

    /// Override the engine-wide `tee_isolates_errors` default.
    pub fn isolate_errors(mut self, isolate: bool) -> Self {
        self.isolate_errors = Some(isolate);
        self
    }

    /// Minimum number of non-skipped side-chain actors.
    pub fn min_active(mut self, count: usize) -> Self {
        self.min_active = count;
        self
    }
}

#[async_trait]
impl ActorHandler for Tee {
    fn type_name(&self) -> &'static str {
        "Tee"
    }

    fn children(&self) -> &[Node] {
        &self.body
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.body
    }

    fn role(&self) -> Role {
        Role::Transformer
    }

    fn accepts(&self) -> Vec<TypeTag> {
        let accepted = chain_accepts(&self.body);
        if accepted.is_empty() {
            vec![TypeTag::unknown()]
        } else {
            accepted
        }
    }

    fn generates(&self) -> Vec<TypeTag> {
        self.accepts()
    }

    async fn set_up(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        let active = self.body.iter().filter(|c| !c.is_skipped()).count();
        if active < self.min_active {
            return Err(FlowError::configuration(
                path,
                format!(
                    "at least {} active actors required, found {}",
                    self.min_active, active
                ),
            ));
        }
        if active > 0 && !chain_role(&self.body).accepts_input() {
            return Err(FlowError::configuration(
                path,
                format!(
                    "tee body must accept input, but acts as a {}",
                    chain_role(&self.body)
                ),
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
        let Some(token) = input else {
            return Ok(Vec::new());
        };
        if let Err(error) = run_chain(&mut self.body, Some(token.clone()), ctx).await {
            if self.isolate_errors.unwrap_or(ctx.tee_isolates_errors()) {
                ctx.record_error(error);
            } else {
                return Err(error);
            }
        }
        if ctx.is_stopped() {
            return Ok(Vec::new());
        }
        Ok(vec![token])
    }

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        wrap_up_chain(&mut self.body, ctx).await
    }
}
