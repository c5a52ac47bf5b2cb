// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::actor::ErrorCaught;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::scope::Variables;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

/// Runs the `try` body and, if it fails, the `catch` body instead.
///
/// Every error inside the `try` body counts as a failure here, whatever the
/// policy around it. The catch body receives the same input token when it
/// accepts input. Errors of the catch body propagate normally.
pub struct TryCatch {
    bodies: Vec<Node>,
    catch_error_variable: Option<String>,
}

const TRY: usize = 0;
const CATCH: usize = 1;

impl TryCatch {
    pub fn new(try_body: Node, catch_body: Node) -> Self {
        Self {
            bodies: vec![try_body, catch_body],
            catch_error_variable: None,
        }
    }

    /// Variable receiving the message of the caught error.
    pub fn catch_error_variable(mut self, name: impl Into<String>) -> Self {
        self.catch_error_variable = Some(name.into());
        self
    }
}

#[async_trait]
impl ActorHandler for TryCatch {
    fn type_name(&self) -> &'static str {
        "TryCatch"
    }

    fn children(&self) -> &[Node] {
        &self.bodies
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.bodies
    }

    fn role(&self) -> Role {
        self.bodies[TRY].role()
    }

    fn accepts(&self) -> Vec<TypeTag> {
        self.bodies[TRY].accepts()
    }

    fn generates(&self) -> Vec<TypeTag> {
        self.bodies[TRY].generates()
    }

    async fn set_up(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        if let Some(name) = &self.catch_error_variable {
            if !Variables::is_valid_name(name) {
                return Err(FlowError::configuration(
                    path,
                    format!("invalid error variable name '{}'", name),
                ));
            }
        }
        let (try_role, catch_role) = (self.bodies[TRY].role(), self.bodies[CATCH].role());
        if try_role.produces_output() && !catch_role.produces_output() {
            return Err(FlowError::configuration(
                path,
                format!(
                    "catch body acts as a {} but the try body as a {}",
                    catch_role, try_role
                ),
            ));
        }
        let strict = ctx.with_error_default(true);
        self.bodies[TRY].set_up(&strict).await?;
        self.bodies[CATCH].set_up(ctx).await
    }

    async fn execute(
        &mut self,
        path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        let strict = ctx.with_error_default(true);
        let error = match self.bodies[TRY].execute(input.clone(), &strict).await {
            Ok(outputs) => return Ok(outputs),
            Err(error) => error,
        };

        ErrorCaught {
            path,
            error: &error,
        }
        .log();
        if let Some(name) = &self.catch_error_variable {
            ctx.variables().set(name.clone(), error.to_string());
        }

        let catch_input = if self.bodies[CATCH].role().accepts_input() {
            input
        } else {
            None
        };
        self.bodies[CATCH].execute(catch_input, ctx).await
    }
}
