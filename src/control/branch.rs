// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::path::ActorPath;
use crate::token::{Token, TypeTag};
use crate::traits::{ActorHandler, Condition};

/// Routes each token to the first case whose condition holds.
///
/// Cases are checked in declaration order; when none holds the token goes to
/// the default body, or is dropped if there is none.
pub struct Branch {
    conditions: Vec<Box<dyn Condition>>,
    bodies: Vec<Node>,
    has_default: bool,
}

impl Default for Branch {
    fn default() -> Self {
        Self::new()
    }
}

impl Branch {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            bodies: Vec::new(),
            has_default: false,
        }
    }

    pub fn case<C: Condition + 'static>(mut self, condition: C, body: Node) -> Self {
        let at = self.conditions.len();
        self.conditions.push(Box::new(condition));
        self.bodies.insert(at, body);
        self
    }

    pub fn default_case(mut self, body: Node) -> Self {
        if self.has_default {
            self.bodies.pop();
        }
        self.bodies.push(body);
        self.has_default = true;
        self
    }

    fn active_bodies(&self) -> impl Iterator<Item = &Node> {
        self.bodies.iter().filter(|body| !body.is_skipped())
    }

    fn select(&self, token: &Token, path: &ActorPath, ctx: &FlowContext) -> FlowResult<Option<usize>> {
        let actor_ctx = ctx.actor(path);
        for (i, condition) in self.conditions.iter().enumerate() {
            if self.bodies[i].is_skipped() {
                continue;
            }
            let holds = condition.evaluate(token, &actor_ctx).map_err(|cause| {
                FlowError::execution(
                    path,
                    cause.context(format!("condition '{}' failed", condition.describe())),
                )
            })?;
            if holds {
                return Ok(Some(i));
            }
        }
        let default = self.conditions.len();
        if self.has_default && !self.bodies[default].is_skipped() {
            return Ok(Some(default));
        }
        Ok(None)
    }
}

#[async_trait]
impl ActorHandler for Branch {
    fn type_name(&self) -> &'static str {
        "Branch"
    }

    fn children(&self) -> &[Node] {
        &self.bodies
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.bodies
    }

    fn role(&self) -> Role {
        if self.active_bodies().any(|body| body.role().produces_output()) {
            Role::Transformer
        } else {
            Role::Sink
        }
    }

    fn accepts(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = Vec::new();
        for tag in self.active_bodies().flat_map(Node::accepts) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        if tags.is_empty() {
            tags.push(TypeTag::unknown());
        }
        tags
    }

    fn generates(&self) -> Vec<TypeTag> {
        let mut tags: Vec<TypeTag> = Vec::new();
        for tag in self.active_bodies().flat_map(Node::generates) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    async fn set_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        for body in self.bodies.iter().filter(|b| !b.is_skipped()) {
            if !body.role().accepts_input() {
                return Err(FlowError::configuration(
                    body.path(),
                    format!("branch body must accept input, but acts as a {}", body.role()),
                ));
            }
        }
        for body in self.bodies.iter_mut() {
            body.set_up(ctx).await?;
        }
        Ok(())
    }

    async fn execute(
        &mut self,
        path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        let Some(token) = input else {
            return Ok(Vec::new());
        };
        let selected = match self.select(&token, path, ctx) {
            Ok(selected) => selected,
            Err(error) => {
                ctx.absorb(error, None)?;
                return Ok(Vec::new());
            }
        };
        match selected {
            Some(i) => self.bodies[i].execute(Some(token), ctx).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::{Collector, ConstantSource, MapTransformer};
    use crate::control::FnCondition;
    use crate::engine::Flow;

    fn positive() -> FnCondition {
        FnCondition::on_value::<i64, _>("positive", |v| *v > 0)
    }

    #[test]
    fn role_follows_the_bodies() {
        let sinks = Branch::new()
            .case(positive(), Node::sink("a", Collector::<i64>::new()))
            .default_case(Node::sink("b", Collector::<i64>::new()));
        assert_eq!(sinks.role(), Role::Sink);

        let mixed = Branch::new()
            .case(positive(), Node::sink("a", Collector::<i64>::new()))
            .default_case(Node::transformer("neg", MapTransformer::new(|v: &i64| -v)));
        assert_eq!(mixed.role(), Role::Transformer);
    }

    #[test]
    fn later_default_replaces_earlier_one() {
        let branch = Branch::new()
            .default_case(Node::sink("first", Collector::<i64>::new()))
            .case(positive(), Node::sink("case", Collector::<i64>::new()))
            .default_case(Node::sink("second", Collector::<i64>::new()));
        let names: Vec<&str> = branch.children().iter().map(Node::name).collect();
        assert_eq!(names, vec!["case", "second"]);
    }

    #[tokio::test]
    async fn unmatched_tokens_are_dropped_without_default() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![
                Node::source("numbers", ConstantSource::new(vec![-1_i64, 2])),
                Branch::new()
                    .case(positive(), Node::transformer("keep", MapTransformer::new(|v: &i64| *v)))
                    .into_node("branch"),
            ],
        );
        let report = flow.run().await.unwrap();
        assert_eq!(report.output_values::<i64>(), vec![2]);
    }

    #[tokio::test]
    async fn bodies_must_accept_input() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![
                Node::source("numbers", ConstantSource::new(vec![1_i64])),
                Branch::new()
                    .case(positive(), Node::source("inner", ConstantSource::new(vec![2_i64])))
                    .into_node("branch"),
            ],
        );
        let error = flow.run().await.unwrap_err();
        assert!(error.is_configuration());
        assert!(error
            .to_string()
            .contains("branch body must accept input, but acts as a source"));
    }
}
