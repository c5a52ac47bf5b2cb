// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use regex::Regex;

use super::sequence::{chain_accepts, chain_generates, chain_role, run_chain, set_up_chain, wrap_up_chain};
use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::scope::ScopePropagated;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::scope::ScopeHandling;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

/// Runs its body against scopes of its own.
///
/// How the body's variables and storage relate to the caller's is chosen by
/// [`ScopeHandling`]. After a run that was not stopped, local entries whose
/// names match the propagation pattern are copied back to the caller.
pub struct LocalScope {
    body: Vec<Node>,
    variables: ScopeHandling,
    storage: ScopeHandling,
    propagate_variables: Option<String>,
    propagate_storage: Option<String>,
    variables_filter: Option<Regex>,
    storage_filter: Option<Regex>,
}

impl LocalScope {
    pub fn new(body: Vec<Node>) -> Self {
        Self {
            body,
            variables: ScopeHandling::default(),
            storage: ScopeHandling::default(),
            propagate_variables: None,
            propagate_storage: None,
            variables_filter: None,
            storage_filter: None,
        }
    }

    pub fn variables(mut self, handling: ScopeHandling) -> Self {
        self.variables = handling;
        self
    }

    pub fn storage(mut self, handling: ScopeHandling) -> Self {
        self.storage = handling;
        self
    }

    /// Copy back variables whose name matches `pattern`.
    pub fn propagate_variables(mut self, pattern: impl Into<String>) -> Self {
        self.propagate_variables = Some(pattern.into());
        self
    }

    /// Copy back storage items whose key matches `pattern`.
    pub fn propagate_storage(mut self, pattern: impl Into<String>) -> Self {
        self.propagate_storage = Some(pattern.into());
        self
    }
}

fn compile(path: &ActorPath, pattern: Option<&String>) -> FlowResult<Option<Regex>> {
    pattern
        .map(|p| {
            Regex::new(p).map_err(|e| {
                FlowError::configuration(path, format!("invalid propagation pattern '{}': {}", p, e))
            })
        })
        .transpose()
}

#[async_trait]
impl ActorHandler for LocalScope {
    fn type_name(&self) -> &'static str {
        "LocalScope"
    }

    fn children(&self) -> &[Node] {
        &self.body
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.body
    }

    fn role(&self) -> Role {
        chain_role(&self.body)
    }

    fn accepts(&self) -> Vec<TypeTag> {
        chain_accepts(&self.body)
    }

    fn generates(&self) -> Vec<TypeTag> {
        chain_generates(&self.body)
    }

    async fn set_up(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        self.variables_filter = compile(path, self.propagate_variables.as_ref())?;
        self.storage_filter = compile(path, self.propagate_storage.as_ref())?;
        set_up_chain(&mut self.body, ctx).await
    }

    async fn execute(
        &mut self,
        path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        let variables = self.variables.apply_variables(ctx.variables());
        let storage = self.storage.apply_storage(ctx.storage());
        let body_ctx = ctx.with_scopes(variables.clone(), storage.clone());

        let outputs = run_chain(&mut self.body, input, &body_ctx).await?;
        if ctx.is_stopped() {
            return Ok(outputs);
        }

        if self.variables.allows_propagation() {
            if let Some(filter) = &self.variables_filter {
                let names = variables.propagate_to(ctx.variables(), Some(filter));
                ScopePropagated {
                    path,
                    scope: "variables",
                    names: &names,
                }
                .log();
            }
        }
        if self.storage.allows_propagation() {
            if let Some(filter) = &self.storage_filter {
                let keys = storage.propagate_to(ctx.storage(), Some(filter));
                ScopePropagated {
                    path,
                    scope: "storage",
                    names: &keys,
                }
                .log();
            }
        }
        Ok(outputs)
    }

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        wrap_up_chain(&mut self.body, ctx).await
    }
}
