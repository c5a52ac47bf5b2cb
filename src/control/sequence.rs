// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Sequences of actors and the chain helpers every body-owning handler uses.
//!
//! A chain is a list of sibling nodes evaluated left to right. Leading
//! standalones run once; the first remaining member either receives the
//! chain's input or, when it is a source, is pulled until exhausted. Every
//! token is pushed depth-first through the rest of the chain before the next
//! one is produced.

use async_trait::async_trait;

use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::path::ActorPath;
use crate::token::{Token, TypeTag};
use crate::traits::ActorHandler;

/// Indices of the members taking part in a run.
fn active(children: &[Node]) -> Vec<usize> {
    children
        .iter()
        .enumerate()
        .filter(|(_, child)| !child.is_skipped())
        .map(|(i, _)| i)
        .collect()
}

/// Index into `children` of the first non-standalone active member.
fn flow_start(children: &[Node], active: &[usize]) -> usize {
    active
        .iter()
        .position(|&i| children[i].role() != Role::Standalone)
        .unwrap_or(active.len())
}

/// Role of a chain: input side from its first flow member, output side from
/// its last.
pub fn chain_role(children: &[Node]) -> Role {
    let active = active(children);
    let start = flow_start(children, &active);
    let flow = &active[start..];
    match (flow.first(), flow.last()) {
        (Some(&first), Some(&last)) => Role::from_sides(
            children[first].role().accepts_input(),
            children[last].role().produces_output(),
        ),
        _ => Role::Standalone,
    }
}

pub fn chain_accepts(children: &[Node]) -> Vec<TypeTag> {
    let active = active(children);
    let start = flow_start(children, &active);
    active
        .get(start)
        .map(|&i| children[i].accepts())
        .unwrap_or_default()
}

pub fn chain_generates(children: &[Node]) -> Vec<TypeTag> {
    let active = active(children);
    let start = flow_start(children, &active);
    if start == active.len() {
        return Vec::new();
    }
    active
        .last()
        .map(|&i| children[i].generates())
        .unwrap_or_default()
}

/// Structural rules: standalones only at the head, a source only as the
/// first flow member, nothing after a sink.
pub fn check_chain_structure(children: &[Node]) -> FlowResult<()> {
    let active = active(children);
    let start = flow_start(children, &active);
    for (pos, &i) in active.iter().enumerate().skip(start) {
        let child = &children[i];
        match child.role() {
            Role::Standalone => {
                return Err(FlowError::configuration(
                    child.path(),
                    "standalone actors must precede the flow actors of a sequence",
                ))
            }
            Role::Source if pos != start => {
                return Err(FlowError::configuration(
                    child.path(),
                    "a source can only be the first flow actor of a sequence",
                ))
            }
            _ => {}
        }
        if pos > start {
            let previous = &children[active[pos - 1]];
            if previous.role() == Role::Sink {
                return Err(FlowError::configuration(
                    child.path(),
                    format!("actor follows sink '{}'", previous.name()),
                ));
            }
        }
    }
    Ok(())
}

/// Adjacent flow members must agree on their payload types.
pub fn check_chain_types(children: &[Node]) -> FlowResult<()> {
    let active = active(children);
    let start = flow_start(children, &active);
    let flow = &active[start..];
    for pair in flow.windows(2) {
        let (upstream, downstream) = (&children[pair[0]], &children[pair[1]]);
        let generated = upstream.generates();
        let accepted = downstream.accepts();
        if !TypeTag::is_compatible(&generated, &accepted) {
            return Err(FlowError::configuration(
                downstream.path(),
                format!(
                    "accepts {} but '{}' generates {}",
                    TypeTag::describe(&accepted),
                    upstream.name(),
                    TypeTag::describe(&generated)
                ),
            ));
        }
    }
    Ok(())
}

/// Structure check, fail-fast set-up of every member, then the type check.
pub async fn set_up_chain(children: &mut [Node], ctx: &FlowContext) -> FlowResult<()> {
    check_chain_structure(children)?;
    for child in children.iter_mut() {
        child.set_up(ctx).await?;
    }
    check_chain_types(children)
}

/// Wrap up members in reverse declaration order, past any failure.
pub async fn wrap_up_chain(children: &mut [Node], ctx: &FlowContext) -> Vec<FlowError> {
    let mut errors = Vec::new();
    for child in children.iter_mut().rev() {
        errors.extend(child.wrap_up(ctx).await);
    }
    errors
}

/// Run a chain once. Returns the tokens emitted by its last member.
pub async fn run_chain(
    children: &mut [Node],
    input: Option<Token>,
    ctx: &FlowContext,
) -> FlowResult<Vec<Token>> {
    let active = active(children);
    let start = flow_start(children, &active);

    for &i in &active[..start] {
        if ctx.is_stopped() {
            return Ok(Vec::new());
        }
        children[i].execute(None, ctx).await?;
    }

    let Some((&head, rest)) = active[start..].split_first() else {
        return Ok(Vec::new());
    };

    let mut outputs = Vec::new();
    if children[head].is_leaf_source() {
        children[head].rewind();
        while !ctx.is_stopped() && children[head].has_more() {
            if let Some(token) = children[head].pull(ctx).await? {
                push_through(children, rest, token, ctx, &mut outputs).await?;
            }
        }
    } else {
        let input = if children[head].role().accepts_input() {
            input
        } else {
            None
        };
        for token in children[head].execute(input, ctx).await? {
            push_through(children, rest, token, ctx, &mut outputs).await?;
        }
    }
    Ok(outputs)
}

/// Depth-first propagation of one token through `chain`.
async fn push_through(
    children: &mut [Node],
    chain: &[usize],
    token: Token,
    ctx: &FlowContext,
    outputs: &mut Vec<Token>,
) -> FlowResult<()> {
    let mut pending = vec![(0_usize, token)];
    while let Some((pos, token)) = pending.pop() {
        if pos == chain.len() {
            outputs.push(token);
            continue;
        }
        if ctx.is_stopped() {
            return Ok(());
        }
        let emitted = children[chain[pos]].execute(Some(token), ctx).await?;
        pending.extend(emitted.into_iter().rev().map(|token| (pos + 1, token)));
    }
    Ok(())
}

/// Runs its members as a chain. The default handler and the usual root of a
/// flow.
pub struct Sequence {
    children: Vec<Node>,
    stop_flow_on_error: Option<bool>,
}

impl Sequence {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            stop_flow_on_error: None,
        }
    }

    /// Default error policy for members without an override.
    pub fn stop_flow_on_error(mut self, stop: bool) -> Self {
        self.stop_flow_on_error = Some(stop);
        self
    }

    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }
}

#[async_trait]
impl ActorHandler for Sequence {
    fn type_name(&self) -> &'static str {
        "Sequence"
    }

    fn children(&self) -> &[Node] {
        &self.children
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut self.children
    }

    fn role(&self) -> Role {
        chain_role(&self.children)
    }

    fn accepts(&self) -> Vec<TypeTag> {
        chain_accepts(&self.children)
    }

    fn generates(&self) -> Vec<TypeTag> {
        chain_generates(&self.children)
    }

    fn error_default(&self) -> Option<bool> {
        self.stop_flow_on_error
    }

    async fn set_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> FlowResult<()> {
        set_up_chain(&mut self.children, ctx).await
    }

    async fn execute(
        &mut self,
        _path: &ActorPath,
        input: Option<Token>,
        ctx: &FlowContext,
    ) -> FlowResult<Vec<Token>> {
        run_chain(&mut self.children, input, ctx).await
    }

    async fn wrap_up(&mut self, _path: &ActorPath, ctx: &FlowContext) -> Vec<FlowError> {
        wrap_up_chain(&mut self.children, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::{Collector, ConstantSource, MapTransformer, SetVariable};

    fn source() -> Node {
        Node::source("numbers", ConstantSource::new(vec![1_i64]))
    }

    fn double() -> Node {
        Node::transformer("double", MapTransformer::new(|v: &i64| v * 2))
    }

    fn collect() -> Node {
        Node::sink("collect", Collector::<i64>::new())
    }

    fn structure_error(children: &[Node]) -> String {
        check_chain_structure(children).unwrap_err().to_string()
    }

    #[test]
    fn chain_role_comes_from_first_and_last_flow_members() {
        assert_eq!(chain_role(&[source(), double()]), Role::Source);
        assert_eq!(chain_role(&[double(), collect()]), Role::Sink);
        assert_eq!(chain_role(&[double()]), Role::Transformer);
        assert_eq!(chain_role(&[source(), collect()]), Role::Standalone);
        assert_eq!(
            chain_role(&[Node::standalone("set", SetVariable::new("a", "1"))]),
            Role::Standalone
        );
    }

    #[test]
    fn skipped_members_are_transparent() {
        let children = [source(), collect().with_skip(true), double()];
        assert!(check_chain_structure(&children).is_ok());
        assert!(check_chain_types(&children).is_ok());
        assert_eq!(chain_role(&children), Role::Source);
    }

    #[test]
    fn structure_rules_are_enforced() {
        assert!(structure_error(&[double(), source()]).contains("only be the first flow actor"));
        assert!(structure_error(&[collect(), double()]).contains("actor follows sink 'collect'"));
        assert!(structure_error(&[
            double(),
            Node::standalone("set", SetVariable::new("a", "1")),
        ])
        .contains("standalone actors must precede"));
    }

    #[test]
    fn leading_standalones_are_allowed() {
        let children = [
            Node::standalone("set", SetVariable::new("a", "1")),
            source(),
            double(),
            collect(),
        ];
        assert!(check_chain_structure(&children).is_ok());
        assert!(check_chain_types(&children).is_ok());
        assert_eq!(chain_accepts(&children), Vec::<TypeTag>::new());
    }

    #[test]
    fn adjacent_types_must_match() {
        let children = [source(), Node::sink("text", Collector::<String>::new())];
        let error = check_chain_types(&children).unwrap_err();
        assert!(error.is_configuration());
        assert!(error
            .to_string()
            .contains("accepts [alloc::string::String] but 'numbers' generates [i64]"));
    }
}
