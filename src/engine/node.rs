// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The actor node: one entry of the tree and its lifecycle state machine.
//!
//! ```text
//! Configured --set_up--> SettingUp --ok--> Ready --execute--> Running --wrap_up--> Stopped
//!                            |                                   |
//!                            +--err--> Failed <--fatal error-----+
//! ```
//!
//! Every node passes through these states once per run and has to be
//! [`Node::reset`] before the next one.

use std::collections::HashSet;
use std::fmt::{Display, Formatter};

use crate::engine::{ActorContext, ActorInfo, FlowContext, TreeIndex};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::actor::{
    ActorSetUpCompleted, ActorSetUpFailed, ActorSkipped, ActorWrapUpFailed,
};
use crate::observability::messages::engine::NameDisambiguated;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::token::{Payload, ProvenanceEntry, Token, TypeTag};
use crate::traits::{ActorHandler, Sink, Source, Standalone, Transformer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorState {
    Configured,
    SettingUp,
    Ready,
    Running,
    Stopped,
    Failed,
}

impl Display for ActorState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ActorState::Configured => "configured",
            ActorState::SettingUp => "setting_up",
            ActorState::Ready => "ready",
            ActorState::Running => "running",
            ActorState::Stopped => "stopped",
            ActorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Which sides of the token flow an actor participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// No input, no output.
    Standalone,
    /// Output only.
    Source,
    /// Input and output.
    Transformer,
    /// Input only.
    Sink,
}

impl Role {
    pub fn from_sides(accepts_input: bool, produces_output: bool) -> Self {
        match (accepts_input, produces_output) {
            (false, false) => Role::Standalone,
            (false, true) => Role::Source,
            (true, true) => Role::Transformer,
            (true, false) => Role::Sink,
        }
    }

    pub fn accepts_input(&self) -> bool {
        matches!(self, Role::Transformer | Role::Sink)
    }

    pub fn produces_output(&self) -> bool {
        matches!(self, Role::Source | Role::Transformer)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Role::Standalone => "standalone",
            Role::Source => "source",
            Role::Transformer => "transformer",
            Role::Sink => "sink",
        };
        f.write_str(name)
    }
}

/// The capability a node wraps.
pub enum ActorKind {
    Source(Box<dyn Source>),
    Transformer(Box<dyn Transformer>),
    Sink(Box<dyn Sink>),
    Standalone(Box<dyn Standalone>),
    Handler(Box<dyn ActorHandler>),
}

pub struct Node {
    name: String,
    path: ActorPath,
    type_name: &'static str,
    state: ActorState,
    skip: bool,
    stop_flow_on_error: Option<bool>,
    set_up_done: bool,
    wrapped_up: bool,
    kind: ActorKind,
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("path", &self.path.to_string())
            .field("type", &self.type_name)
            .field("state", &self.state)
            .field("skip", &self.skip)
            .field("children", &self.children().len())
            .finish()
    }
}

impl Node {
    fn build(name: impl Into<String>, type_name: &'static str, kind: ActorKind) -> Self {
        let name = name.into();
        Self {
            path: ActorPath::root(name.clone()),
            name,
            type_name,
            state: ActorState::Configured,
            skip: false,
            stop_flow_on_error: None,
            set_up_done: false,
            wrapped_up: false,
            kind,
        }
    }

    pub fn source<S: Source + 'static>(name: impl Into<String>, source: S) -> Self {
        Self::build(name, short_type_name::<S>(), ActorKind::Source(Box::new(source)))
    }

    pub fn transformer<T: Transformer + 'static>(name: impl Into<String>, transformer: T) -> Self {
        Self::build(
            name,
            short_type_name::<T>(),
            ActorKind::Transformer(Box::new(transformer)),
        )
    }

    pub fn sink<S: Sink + 'static>(name: impl Into<String>, sink: S) -> Self {
        Self::build(name, short_type_name::<S>(), ActorKind::Sink(Box::new(sink)))
    }

    pub fn standalone<S: Standalone + 'static>(name: impl Into<String>, standalone: S) -> Self {
        Self::build(
            name,
            short_type_name::<S>(),
            ActorKind::Standalone(Box::new(standalone)),
        )
    }

    pub fn handler<H: ActorHandler + 'static>(name: impl Into<String>, handler: H) -> Self {
        let type_name = handler.type_name();
        Self::build(name, type_name, ActorKind::Handler(Box::new(handler)))
    }

    /// Skipped nodes are neither set up, executed nor wrapped up.
    pub fn with_skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    /// Override the inherited error policy for this node (and, for handlers,
    /// its subtree).
    pub fn with_stop_flow_on_error(mut self, stop: bool) -> Self {
        self.stop_flow_on_error = Some(stop);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn state(&self) -> ActorState {
        self.state
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn stop_flow_on_error(&self) -> Option<bool> {
        self.stop_flow_on_error
    }

    pub fn kind(&self) -> &ActorKind {
        &self.kind
    }

    pub fn is_handler(&self) -> bool {
        matches!(self.kind, ActorKind::Handler(_))
    }

    pub fn is_leaf_source(&self) -> bool {
        matches!(self.kind, ActorKind::Source(_))
    }

    pub fn handler_ref(&self) -> Option<&dyn ActorHandler> {
        match &self.kind {
            ActorKind::Handler(handler) => Some(handler.as_ref()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            ActorKind::Handler(handler) => handler.children(),
            _ => &[],
        }
    }

    pub fn role(&self) -> Role {
        match &self.kind {
            ActorKind::Source(_) => Role::Source,
            ActorKind::Transformer(_) => Role::Transformer,
            ActorKind::Sink(_) => Role::Sink,
            ActorKind::Standalone(_) => Role::Standalone,
            ActorKind::Handler(handler) => handler.role(),
        }
    }

    pub fn accepts(&self) -> Vec<TypeTag> {
        match &self.kind {
            ActorKind::Transformer(t) => t.accepts(),
            ActorKind::Sink(s) => s.accepts(),
            ActorKind::Handler(h) => h.accepts(),
            ActorKind::Source(_) | ActorKind::Standalone(_) => Vec::new(),
        }
    }

    pub fn generates(&self) -> Vec<TypeTag> {
        match &self.kind {
            ActorKind::Source(s) => s.generates(),
            ActorKind::Transformer(t) => t.generates(),
            ActorKind::Handler(h) => h.generates(),
            ActorKind::Sink(_) | ActorKind::Standalone(_) => Vec::new(),
        }
    }

    pub fn info(&self) -> ActorInfo {
        ActorInfo {
            path: self.path.clone(),
            name: self.name.clone(),
            role: self.role(),
            type_name: self.type_name,
            accepts: self.accepts(),
            generates: self.generates(),
            skip: self.skip,
            callable: false,
        }
    }

    /// Assign this node's path below `parent`, then its children's.
    pub fn assign_paths(&mut self, parent: &ActorPath) {
        self.path = parent.child(self.name.clone());
        if let ActorKind::Handler(handler) = &mut self.kind {
            handler.assign_paths(&self.path);
        }
    }

    /// Add this node and its subtree to `index`.
    pub fn index_into(&self, index: &mut TreeIndex) {
        index.insert(self.info());
        if let ActorKind::Handler(handler) = &self.kind {
            handler.index_children(index);
        }
    }

    /// Return this node and its subtree to `Configured`.
    pub fn reset(&mut self) {
        self.state = ActorState::Configured;
        self.set_up_done = false;
        self.wrapped_up = false;
        if let ActorKind::Handler(handler) = &mut self.kind {
            handler.reset();
        }
    }

    fn scoped_context(&self, ctx: &FlowContext) -> Option<FlowContext> {
        let default = match &self.kind {
            ActorKind::Handler(handler) => self.stop_flow_on_error.or(handler.error_default()),
            _ => None,
        };
        default
            .filter(|stop| *stop != ctx.stop_flow_on_error())
            .map(|stop| ctx.with_error_default(stop))
    }

    pub async fn set_up(&mut self, ctx: &FlowContext) -> FlowResult<()> {
        if self.skip {
            ActorSkipped { path: &self.path }.log();
            return Ok(());
        }
        if self.state != ActorState::Configured {
            return Err(FlowError::configuration(
                &self.path,
                format!("cannot set up an actor in state '{}'", self.state),
            ));
        }
        self.state = ActorState::SettingUp;

        let path = self.path.clone();
        let scoped = self.scoped_context(ctx);
        let ctx = scoped.as_ref().unwrap_or(ctx);
        let leaf_error = |e: anyhow::Error| FlowError::configuration(&path, format!("{:#}", e));
        let result = match &mut self.kind {
            ActorKind::Source(s) => s.set_up(&ctx.actor(&path)).await.map_err(leaf_error),
            ActorKind::Transformer(t) => t.set_up(&ctx.actor(&path)).await.map_err(leaf_error),
            ActorKind::Sink(s) => s.set_up(&ctx.actor(&path)).await.map_err(leaf_error),
            ActorKind::Standalone(s) => s.set_up(&ctx.actor(&path)).await.map_err(leaf_error),
            ActorKind::Handler(h) => h.set_up(&path, ctx).await,
        };

        match result {
            Ok(()) => {
                self.set_up_done = true;
                self.state = ActorState::Ready;
                ActorSetUpCompleted {
                    path: &self.path,
                    role: self.role(),
                }
                .log();
                Ok(())
            }
            Err(error) => {
                self.state = ActorState::Failed;
                ActorSetUpFailed {
                    path: &self.path,
                    error: &error,
                }
                .log();
                Err(error)
            }
        }
    }

    fn ensure_executable(&self) -> FlowResult<()> {
        if !self.set_up_done || self.wrapped_up {
            return Err(FlowError::configuration(
                &self.path,
                format!("actor cannot execute in state '{}'", self.state),
            ));
        }
        Ok(())
    }

    /// Run the node on `input` and return what it emits.
    ///
    /// A leaf source ignores `input`, is rewound and drained. Non-fatal leaf errors
    /// are recorded and yield no tokens; a fatal error marks the node failed
    /// and is returned.
    pub async fn execute(&mut self, input: Option<Token>, ctx: &FlowContext) -> FlowResult<Vec<Token>> {
        if self.skip {
            return Ok(input.into_iter().collect());
        }
        if ctx.is_stopped() {
            return Ok(Vec::new());
        }
        self.ensure_executable()?;
        self.state = ActorState::Running;

        if let ActorKind::Handler(_) = self.kind {
            let scoped = self.scoped_context(ctx);
            let ctx = scoped.as_ref().unwrap_or(ctx);
            let result = match &mut self.kind {
                ActorKind::Handler(handler) => handler.execute(&self.path, input, ctx).await,
                _ => Ok(Vec::new()),
            };
            if result.is_err() {
                self.state = ActorState::Failed;
            }
            return result;
        }

        let actor_ctx = ctx.actor(&self.path);
        let input_payload = input.as_ref().map(|token| token.payload().clone());
        let result = match &mut self.kind {
            ActorKind::Source(source) => {
                source.rewind();
                drain(source.as_mut(), &actor_ctx).await
            }
            ActorKind::Transformer(transformer) => match input {
                Some(token) => transformer.process(token, &actor_ctx).await,
                None => Ok(Vec::new()),
            },
            ActorKind::Sink(sink) => match input {
                Some(token) => sink.consume(token, &actor_ctx).await.map(|_| Vec::new()),
                None => Ok(Vec::new()),
            },
            ActorKind::Standalone(standalone) => standalone.execute(&actor_ctx).await.map(|_| Vec::new()),
            ActorKind::Handler(_) => Ok(Vec::new()),
        };

        match result {
            Ok(tokens) => Ok(self.stamp(tokens, input_payload.as_ref(), ctx)),
            Err(cause) => self.fail(cause, ctx).map(|_| Vec::new()),
        }
    }

    /// Whether a leaf source has another token.
    pub fn has_more(&self) -> bool {
        match &self.kind {
            ActorKind::Source(source) => !self.skip && source.has_more(),
            _ => false,
        }
    }

    /// Restart a leaf source before another pass over its chain.
    pub fn rewind(&mut self) {
        if let ActorKind::Source(source) = &mut self.kind {
            source.rewind();
        }
    }

    /// Pull one token from a leaf source. `None` when a non-fatal error
    /// swallowed the token.
    pub async fn pull(&mut self, ctx: &FlowContext) -> FlowResult<Option<Token>> {
        if self.skip || ctx.is_stopped() {
            return Ok(None);
        }
        self.ensure_executable()?;
        self.state = ActorState::Running;
        let actor_ctx = ctx.actor(&self.path);
        let result = match &mut self.kind {
            ActorKind::Source(source) => source.next(&actor_ctx).await,
            _ => {
                return Err(FlowError::configuration(
                    &self.path,
                    "only leaf sources can be pulled",
                ))
            }
        };
        match result {
            Ok(token) => Ok(self.stamp(vec![token], None, ctx).pop()),
            Err(cause) => self.fail(cause, ctx).map(|_| None),
        }
    }

    fn fail(&mut self, cause: anyhow::Error, ctx: &FlowContext) -> FlowResult<()> {
        let error = FlowError::execution(&self.path, cause);
        let result = ctx.absorb(error, self.stop_flow_on_error);
        if result.is_err() {
            self.state = ActorState::Failed;
        }
        result
    }

    fn stamp(&self, tokens: Vec<Token>, input: Option<&Payload>, ctx: &FlowContext) -> Vec<Token> {
        let stamps = ctx.provenance_enabled()
            && matches!(self.kind, ActorKind::Source(_) | ActorKind::Transformer(_));
        if !stamps {
            return tokens;
        }
        tokens
            .into_iter()
            .map(|token| {
                if input.map_or(false, |payload| payload.ptr_eq(token.payload())) {
                    return token;
                }
                let entry = ProvenanceEntry {
                    actor: self.path.clone(),
                    input_type: input.map(|payload| payload.type_tag().clone()),
                    output_type: token.payload().type_tag().clone(),
                };
                token.with_provenance(entry)
            })
            .collect()
    }

    /// Release resources. Nodes whose set-up never succeeded are left alone,
    /// except handlers, which always pass the call on to their children.
    pub async fn wrap_up(&mut self, ctx: &FlowContext) -> Vec<FlowError> {
        if self.skip || self.wrapped_up || self.state == ActorState::Configured {
            return Vec::new();
        }

        let path = self.path.clone();
        let set_up_done = self.set_up_done;
        let errors = match &mut self.kind {
            ActorKind::Handler(handler) => handler.wrap_up(&path, ctx).await,
            _ if !set_up_done => Vec::new(),
            ActorKind::Source(s) => cleanup_errors(&path, s.wrap_up().await),
            ActorKind::Transformer(t) => cleanup_errors(&path, t.wrap_up().await),
            ActorKind::Sink(s) => cleanup_errors(&path, s.wrap_up().await),
            ActorKind::Standalone(s) => cleanup_errors(&path, s.wrap_up().await),
        };

        self.wrapped_up = true;
        if self.state != ActorState::Failed {
            self.state = ActorState::Stopped;
        }
        for error in errors.iter().filter(|e| e.failing_path() == path) {
            ActorWrapUpFailed {
                path: &self.path,
                error,
            }
            .log();
        }
        errors
    }
}

fn cleanup_errors(path: &ActorPath, result: anyhow::Result<()>) -> Vec<FlowError> {
    result
        .err()
        .map(|cause| FlowError::cleanup(path, cause))
        .into_iter()
        .collect()
}

async fn drain(source: &mut dyn Source, ctx: &ActorContext) -> anyhow::Result<Vec<Token>> {
    let mut tokens = Vec::new();
    while source.has_more() && !ctx.is_stopped() {
        tokens.push(source.next(ctx).await?);
    }
    Ok(tokens)
}

/// Give every child of one handler a unique name and its path below `parent`.
pub fn assign_child_paths(children: &mut [Node], parent: &ActorPath) {
    let names = unique_names(children.iter().map(Node::name));
    for (child, name) in children.iter_mut().zip(names) {
        if name != child.name {
            NameDisambiguated {
                parent,
                original: &child.name,
                assigned: &name,
            }
            .log();
            child.set_name(name);
        }
        child.assign_paths(parent);
    }
}

/// Make sibling names unique: the first occurrence keeps its name, later
/// duplicates get `-1`, `-2`, ... appended.
pub fn unique_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let names: Vec<&str> = names.into_iter().collect();
    let originals: HashSet<&str> = names.iter().copied().collect();
    let mut used: HashSet<String> = HashSet::new();
    names
        .iter()
        .map(|name| {
            if used.insert(name.to_string()) {
                return name.to_string();
            }
            let mut suffix = 1;
            loop {
                let candidate = format!("{}-{}", name, suffix);
                if !originals.contains(candidate.as_str()) && used.insert(candidate.clone()) {
                    return candidate;
                }
                suffix += 1;
            }
        })
        .collect()
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    match base.rfind("::") {
        Some(pos) => &base[pos + 2..],
        None => base,
    }
}
