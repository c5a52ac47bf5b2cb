// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use super::sequence::{chain_role, run_chain, set_up_chain, wrap_up_chain};
use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::scope::LoopIteration;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::scope::Variables;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

pub const DEFAULT_LOOP_VARIABLE: &str = "loop_value";

/// Counting loop over `lower..=upper` in steps of `step`.
///
/// Each iteration runs the body, without input, against a fresh child
/// variables scope holding the loop variable. The variable is gone once the
/// loop is done.
pub struct ForLoop {
    body: Vec<Node>,
    lower: i64,
    upper: i64,
    step: i64,
    variable: String,
}

impl ForLoop {
    pub fn new(lower: i64, upper: i64, body: Vec<Node>) -> Self {
        Self {
            body,
            lower,
            upper,
            step: 1,
            variable: DEFAULT_LOOP_VARIABLE.to_string(),
        }
    }

    pub fn step(mut self, step: i64) -> Self {
        self.step = step;
        self
    }

    pub fn variable(mut self, name: impl Into<String>) -> Self {
        self.variable = name.into();
        self
    }

    /// Loop values in order; empty when the range runs the wrong way.
    pub fn values(&self) -> impl Iterator<Item = i64> {
        loop_values(self.lower, self.upper, self.step)
    }
}

/// Lazy `lower..=upper` by `step`, ending at the integer limits.
fn loop_values(lower: i64, upper: i64, step: i64) -> impl Iterator<Item = i64> {
    let mut next = Some(lower);
    std::iter::from_fn(move || {
        let current = next?;
        let in_range = if step > 0 {
            current <= upper
        } else {
            step < 0 && current >= upper
        };
        if !in_range {
            next = None;
            return None;
        }
        next = current.checked_add(step);
        Some(current)
    })
}

#[async_trait]
impl ActorHandler for ForLoop {
    fn type_name(&self) -> &'static str {
        "ForLoop"
    }

    fn children(&self) -> &[Node] {
        &self.body
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.body
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

    async fn set_up(&mut self, path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        if self.step == 0 {
            return Err(FlowError::configuration(path, "loop step must not be 0"));
        }
        if !Variables::is_valid_name(&self.variable) {
            return Err(FlowError::configuration(
                path,
                format!("invalid loop variable name '{}'", self.variable),
            ));
        }
        let role = chain_role(&self.body);
        if role.accepts_input() {
            return Err(FlowError::configuration(
                path,
                format!("loop body must not require input, but acts as a {}", role),
            ));
        }
        set_up_chain(&mut self.body, ctx).await
    }

    async fn execute(
        &mut self,
        path: &ActorPath,
        _input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        for value in loop_values(self.lower, self.upper, self.step) {
            if ctx.is_stopped() {
                break;
            }
            LoopIteration {
                path,
                variable: &self.variable,
                value,
            }
            .log();
            let scope = ctx.variables().child();
            scope.set(self.variable.clone(), value.to_string());
            run_chain(&mut self.body, None, &ctx.with_variables(scope)).await?;
        }
        Ok(Vec::new())
    }

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        wrap_up_chain(&mut self.body, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::SetVariable;
    use crate::control::Stop;
    use crate::engine::Flow;

    #[test]
    fn values_follow_step_direction() {
        let up: Vec<i64> = ForLoop::new(0, 2, vec![]).values().collect();
        assert_eq!(up, vec![0, 1, 2]);

        let down: Vec<i64> = ForLoop::new(5, 1, vec![]).step(-2).values().collect();
        assert_eq!(down, vec![5, 3, 1]);

        assert_eq!(ForLoop::new(3, 1, vec![]).values().count(), 0);
        assert_eq!(ForLoop::new(1, 1, vec![]).values().count(), 1);
        assert_eq!(ForLoop::new(0, 2, vec![]).step(0).values().count(), 0);
    }

    #[tokio::test]
    async fn stop_ends_an_unbounded_loop_after_one_iteration() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![ForLoop::new(0, i64::MAX, vec![
                Node::standalone("count", SetVariable::new("seen", "${loop_value}")),
                Node::standalone("halt", Stop::new()),
            ])
            .into_node("loop")],
        );

        let report = flow.run().await.unwrap();

        assert!(report.stopped);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn values_stop_at_integer_limits() {
        let edge: Vec<i64> = ForLoop::new(i64::MAX - 1, i64::MAX, vec![]).values().collect();
        assert_eq!(edge, vec![i64::MAX - 1, i64::MAX]);
    }
}
