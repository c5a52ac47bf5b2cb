// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Running a subtree as an isolated unit, like a function call.
//!
//! An [`EncapsulationContainer`] bundles a handler subtree with the
//! variables and storage it reads through, an optional input payload and
//! the storage keys used to pass the input in and the output back.
//! [`Encapsulator`] runs the full lifecycle of the subtree against child
//! scopes of the container's scopes, so nothing the subtree writes leaks
//! into the container or the caller. [`SubFlow`] does the same for every
//! token flowing through it.
//!
//! Paths inside the subtree are relative to the subtree root. Failures come
//! back as [`FlowError::Encapsulated`] carrying the caller's path, so
//! [`FlowError::failing_path`] still names the actor absolutely.

use async_trait::async_trait;

use crate::engine::flow::{prepare, run_lifecycle, with_cleanup_errors};
use crate::engine::{FlowContext, Node, Role};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::scope::{EncapsulationCompleted, EncapsulationStarted};
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::scope::{Storage, StorageKey, Variables};
use crate::token::{Payload, Token, TypeTag};
use crate::traits::ActorHandler;

pub struct EncapsulationContainer {
    actor: Node,
    variables: Variables,
    storage: Storage,
    input: Option<Payload>,
    input_name: Option<StorageKey>,
    output: Option<Payload>,
    output_name: Option<StorageKey>,
}

impl EncapsulationContainer {
    /// Container around `actor` with empty root scopes.
    pub fn new(actor: Node) -> Self {
        Self {
            actor,
            variables: Variables::new(),
            storage: Storage::new(),
            input: None,
            input_name: None,
            output: None,
            output_name: None,
        }
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = storage;
        self
    }

    /// Storage key under which the input is injected.
    pub fn input_name(mut self, key: StorageKey) -> Self {
        self.input_name = Some(key);
        self
    }

    /// Storage key whose value becomes the output after the call.
    pub fn output_name(mut self, key: StorageKey) -> Self {
        self.output_name = Some(key);
        self
    }

    pub fn with_input(mut self, input: Payload) -> Self {
        self.input = Some(input);
        self
    }

    pub fn set_input(&mut self, input: Option<Payload>) {
        self.input = input;
    }

    pub fn actor(&self) -> &Node {
        &self.actor
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn input(&self) -> Option<&Payload> {
        self.input.as_ref()
    }

    pub fn output(&self) -> Option<&Payload> {
        self.output.as_ref()
    }

    pub fn take_output(&mut self) -> Option<Payload> {
        self.output.take()
    }

    pub fn output_value<T: Clone + 'static>(&self) -> Option<T> {
        self.output.as_ref()?.downcast_ref::<T>().cloned()
    }

    pub fn has_output_name(&self) -> bool {
        self.output_name.is_some()
    }

    /// Checks the container can be called: the actor must be a handler and
    /// an input needs a key to be injected under.
    pub fn validate(&self) -> Result<(), String> {
        if !self.actor.is_handler() {
            return Err(format!(
                "encapsulated actor '{}' is not an actor handler",
                self.actor.name()
            ));
        }
        if self.input.is_some() && self.input_name.is_none() {
            return Err("container has an input but no input name".to_string());
        }
        Ok(())
    }
}

/// Runs encapsulation containers.
pub struct Encapsulator;

impl Encapsulator {
    /// Run the container's subtree on behalf of the actor at `prefix` and
    /// hand the container back with its output filled in.
    pub async fn call(
        mut container: EncapsulationContainer,
        parent: &FlowContext,
        prefix: &ActorPath,
    ) -> FlowResult<EncapsulationContainer> {
        Self::call_in_place(&mut container, parent, prefix).await?;
        Ok(container)
    }

    pub async fn call_in_place(
        container: &mut EncapsulationContainer,
        parent: &FlowContext,
        prefix: &ActorPath,
    ) -> FlowResult<()> {
        container
            .validate()
            .map_err(|message| FlowError::configuration(prefix, message))?;
        container.output = None;

        let variables = container.variables.child();
        let storage = container.storage.child();
        if let (Some(key), Some(input)) = (&container.input_name, &container.input) {
            storage.put(key, input.clone());
        }

        let index = prepare(&mut container.actor, &ActorPath::empty());
        EncapsulationStarted {
            prefix,
            actor: container.actor.path(),
            actor_count: index.len(),
        }
        .log();

        let ctx = parent.encapsulated(prefix, variables, storage.clone(), index);
        let (result, cleanup) = run_lifecycle(&mut container.actor, None, &ctx).await;
        if let Err(primary) = result {
            return Err(FlowError::encapsulated(
                prefix,
                with_cleanup_errors(primary, cleanup),
            ));
        }
        // A successful call reports its cleanup failures without failing.
        for error in cleanup {
            ctx.record_error(error);
        }

        if let Some(key) = &container.output_name {
            container.output = storage.take(key);
        }
        EncapsulationCompleted {
            prefix,
            has_output: container.output.is_some(),
        }
        .log();
        Ok(())
    }
}

/// Handler calling an encapsulated subtree once per incoming token.
///
/// The token's payload becomes the container input; when the container has
/// an output name, the output found there is emitted as a new token.
pub struct SubFlow {
    container: EncapsulationContainer,
    inherit_variables: bool,
}

impl SubFlow {
    pub fn new(container: EncapsulationContainer) -> Self {
        Self {
            container,
            inherit_variables: false,
        }
    }

    /// Let the subtree read the caller's variables instead of the
    /// container's.
    pub fn inherit_variables(mut self, inherit: bool) -> Self {
        self.inherit_variables = inherit;
        self
    }

    pub fn container(&self) -> &EncapsulationContainer {
        &self.container
    }
}

#[async_trait]
impl ActorHandler for SubFlow {
    fn type_name(&self) -> &'static str {
        "SubFlow"
    }

    fn children(&self) -> &[Node] {
        &[]
    }

    fn children_mut(&mut self) -> &mut [Node] {
        &mut []
    }

    fn role(&self) -> Role {
        if self.container.has_output_name() {
            Role::Transformer
        } else {
            Role::Sink
        }
    }

    fn generates(&self) -> Vec<TypeTag> {
        if self.container.has_output_name() {
            vec![TypeTag::unknown()]
        } else {
            Vec::new()
        }
    }

    async fn set_up(&mut self, path: &ActorPath, _ctx: &FlowContext) -> FlowResult<()> {
        if self.container.input_name.is_none() {
            return Err(FlowError::configuration(
                path,
                "sub-flow container needs an input name",
            ));
        }
        self.container
            .validate()
            .map_err(|message| FlowError::configuration(path, message))
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
        if self.inherit_variables {
            self.container.variables = ctx.variables().clone();
        }
        self.container.set_input(Some(token.payload().clone()));

        match Encapsulator::call_in_place(&mut self.container, ctx, path).await {
            Ok(()) => {}
            // A subtree that cannot be set up aborts the run whatever the policy.
            Err(error) if error.is_configuration() => return Err(error),
            Err(error) => {
                ctx.absorb(error, None)?;
                return Ok(Vec::new());
            }
        }
        self.container.set_input(None);

        Ok(self
            .container
            .take_output()
            .map(|payload| vec![token.with_payload(payload)])
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::{MapTransformer, SetStorageValue, StorageValueSource};
    use crate::config::EngineConfig;
    use crate::control::Sequence;
    use crate::engine::{StopHandle, TreeIndex};

    fn key(name: &str) -> StorageKey {
        StorageKey::new(name).unwrap()
    }

    fn times_ten() -> Node {
        Sequence::new(vec![
            Node::source("load", StorageValueSource::new(key("in"))),
            Node::transformer("scale", MapTransformer::new(|v: &i64| v * 10)),
            Node::sink("store", SetStorageValue::<i64>::typed(key("out"))),
        ])
        .into_node("times-ten")
    }

    fn parent_context() -> FlowContext {
        FlowContext::new(
            Variables::new(),
            Storage::new(),
            StopHandle::new(),
            TreeIndex::default(),
            &EngineConfig::default(),
        )
    }

    #[tokio::test]
    async fn call_passes_input_and_output_through_storage() {
        let container = EncapsulationContainer::new(times_ten())
            .input_name(key("in"))
            .output_name(key("out"))
            .with_input(Payload::new(5_i64));

        let parent = parent_context();
        let prefix = ActorPath::root("caller");
        let container = Encapsulator::call(container, &parent, &prefix)
            .await
            .unwrap();

        assert_eq!(container.output_value::<i64>(), Some(50));
        assert!(!container.storage().contains(&key("in")));
        assert!(!container.storage().contains(&key("out")));
    }

    #[tokio::test]
    async fn subtree_reads_through_but_never_writes_back() {
        let variables = Variables::new();
        variables.set("factor", "3");
        let container = EncapsulationContainer::new(
            Sequence::new(vec![Node::standalone(
                "set",
                crate::backends::local::SetVariable::new("result", "${factor}${factor}"),
            )])
            .into_node("inner"),
        )
        .with_variables(variables.clone());

        let parent = parent_context();
        Encapsulator::call(container, &parent, &ActorPath::root("caller"))
            .await
            .unwrap();

        assert_eq!(variables.lookup("factor").as_deref(), Some("3"));
        assert!(!variables.contains("result"));
    }

    #[test]
    fn validate_rejects_leaf_actors_and_unnamed_input() {
        let leaf = EncapsulationContainer::new(Node::sink(
            "store",
            SetStorageValue::<i64>::typed(key("out")),
        ));
        assert!(leaf.validate().is_err());

        let unnamed = EncapsulationContainer::new(times_ten()).with_input(Payload::new(1_i64));
        assert!(unnamed.validate().unwrap_err().contains("input name"));
    }

    #[tokio::test]
    async fn failures_carry_the_caller_prefix() {
        let container = EncapsulationContainer::new(
            Sequence::new(vec![
                Node::source("load", StorageValueSource::new(key("missing"))),
                Node::sink("store", SetStorageValue::<i64>::typed(key("out"))),
            ])
            .into_node("inner"),
        );

        let parent = parent_context();
        let prefix = ActorPath::from_components(["Flow", "call"]);
        let error = Encapsulator::call(container, &parent, &prefix)
            .await
            .err()
            .unwrap();

        assert!(matches!(error, FlowError::Encapsulated { .. }));
        assert_eq!(
            error.failing_path(),
            ActorPath::from_components(["Flow", "call", "inner", "load"])
        );
    }
}
