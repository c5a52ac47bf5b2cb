// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The flow engine.
//!
//! A [`Flow`] owns the actor tree, the root scopes and the stop handle of
//! one pipeline. Each [`Flow::run`] walks the same phases:
//!
//! 1. reset every node to `Configured`, assign unique names and paths, and
//!    build the [`TreeIndex`];
//! 2. set the tree up, fail-fast on the first configuration error;
//! 3. execute the root;
//! 4. wrap up everything that was set up, in reverse order, collecting
//!    cleanup errors.
//!
//! Encapsulated subtrees go through the same phases via [`run_lifecycle`].

use std::time::{Duration, Instant};

use crate::config::EngineConfig;
use crate::control::Sequence;
use crate::engine::{FlowContext, Node, StopHandle, TreeIndex};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::engine::{RunCompleted, RunFailed, RunStarted};
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::scope::{Storage, Variables};
use crate::token::Token;
use crate::traits::ActorHandler;

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunReport {
    /// Tokens emitted by the root actor, in emission order.
    pub outputs: Vec<Token>,
    /// Non-fatal execution errors, in the order they occurred.
    pub errors: Vec<FlowError>,
    pub cleanup_errors: Vec<FlowError>,
    pub stopped: bool,
    pub stop_message: Option<String>,
    pub duration: Duration,
    /// Variables scope the run executed against, seeded from the config.
    pub variables: Variables,
    /// Storage scope the run executed against.
    pub storage: Storage,
}

impl RunReport {
    /// Typed copies of the output payloads; outputs of another type are skipped.
    pub fn output_values<T: Clone + 'static>(&self) -> Vec<T> {
        self.outputs
            .iter()
            .filter_map(|token| token.value::<T>().cloned())
            .collect()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.cleanup_errors.is_empty()
    }
}

pub struct Flow {
    root: Node,
    config: EngineConfig,
    variables: Variables,
    storage: Storage,
    stop: StopHandle,
}

impl Flow {
    pub fn new(root: Node) -> Self {
        Self {
            root,
            config: EngineConfig::default(),
            variables: Variables::new(),
            storage: Storage::new(),
            stop: StopHandle::new(),
        }
    }

    /// Flow whose root is a sequence of `children`.
    pub fn sequence(name: impl Into<String>, children: Vec<Node>) -> Self {
        Self::new(Sequence::new(children).into_node(name))
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Defaults every run reads through. A run writes into its own child
    /// scope, handed back in [`RunReport::variables`] and dropped otherwise.
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Storage defaults every run reads through; see [`Flow::variables`].
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Handle for stopping the flow from outside, e.g. another task.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Assign paths and describe the tree without running it.
    pub fn index(&mut self) -> TreeIndex {
        prepare(&mut self.root, &ActorPath::empty())
    }

    pub async fn run(&mut self) -> FlowResult<RunReport> {
        self.run_with(None).await
    }

    /// Run once, feeding `input` to the root actor.
    pub async fn run_with(&mut self, input: Option<Token>) -> FlowResult<RunReport> {
        let started = Instant::now();
        self.stop.reset();
        let variables = self.variables.child();
        for (name, value) in &self.config.variables {
            variables.set(name.clone(), value.clone());
        }
        let storage = self.storage.child();

        let index = prepare(&mut self.root, &ActorPath::empty());
        let root_path = self.root.path().clone();
        RunStarted {
            flow: &root_path,
            actor_count: index.len(),
        }
        .log();

        let ctx = FlowContext::new(
            variables.clone(),
            storage.clone(),
            self.stop.clone(),
            index,
            &self.config,
        );
        let (result, cleanup_errors) = run_lifecycle(&mut self.root, input, &ctx).await;
        let errors = ctx.take_errors();

        match result {
            Ok(outputs) => {
                let report = RunReport {
                    outputs,
                    errors,
                    cleanup_errors,
                    stopped: self.stop.is_stopped(),
                    stop_message: self.stop.message(),
                    duration: started.elapsed(),
                    variables,
                    storage,
                };
                RunCompleted {
                    flow: &root_path,
                    outputs: report.outputs.len(),
                    errors: report.errors.len(),
                    cleanup_errors: report.cleanup_errors.len(),
                    stopped: report.stopped,
                    duration: report.duration,
                }
                .log();
                Ok(report)
            }
            Err(primary) => {
                RunFailed {
                    flow: &root_path,
                    error: &primary,
                }
                .log();
                Err(with_cleanup_errors(primary, cleanup_errors))
            }
        }
    }
}

/// Reset `root`, assign paths below `parent` and index the subtree.
pub(crate) fn prepare(root: &mut Node, parent: &ActorPath) -> TreeIndex {
    root.reset();
    root.assign_paths(parent);
    let mut index = TreeIndex::default();
    root.index_into(&mut index);
    index
}

/// Set up, execute and wrap up a prepared subtree. Wrap-up always runs and
/// its errors are returned next to the primary result.
pub(crate) async fn run_lifecycle(
    root: &mut Node,
    input: Option<Token>,
    ctx: &FlowContext,
) -> (FlowResult<Vec<Token>>, Vec<FlowError>) {
    let result = match root.set_up(ctx).await {
        Ok(()) => root.execute(input, ctx).await,
        Err(error) => Err(error),
    };
    let cleanup = root.wrap_up(ctx).await;
    (result, cleanup)
}

/// Primary error first, then every cleanup error.
pub(crate) fn with_cleanup_errors(primary: FlowError, cleanup: Vec<FlowError>) -> FlowError {
    if cleanup.is_empty() {
        return primary;
    }
    let mut errors = Vec::with_capacity(cleanup.len() + 1);
    errors.push(primary);
    errors.extend(cleanup);
    FlowError::Aggregate(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::{
        ConstantSource, MapTransformer, SetStorageValue, SetVariable, TemplateSource,
    };

    #[tokio::test]
    async fn run_with_feeds_the_root() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![Node::transformer("double", MapTransformer::new(|v: &i64| v * 2))],
        );
        let report = flow.run_with(Some(Token::from_value(4_i64))).await.unwrap();
        assert_eq!(report.output_values::<i64>(), vec![8]);
        assert!(report.is_clean());
        assert!(!report.stopped);
    }

    #[tokio::test]
    async fn config_variables_seed_the_root_scope() {
        let config = EngineConfig::default().with_variable("who", "world");
        let mut flow = Flow::sequence(
            "Flow",
            vec![Node::source("greet", TemplateSource::new(["hello ${who}"]))],
        )
        .with_config(config);

        let report = flow.run().await.unwrap();

        assert_eq!(report.output_values::<String>(), vec!["hello world"]);
        assert_eq!(report.variables.lookup("who").as_deref(), Some("world"));
        assert!(!flow.variables().contains("who"));
    }

    #[tokio::test]
    async fn runs_do_not_see_each_others_writes() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![
                Node::standalone("mark", SetVariable::new("mark", "${mark}+")),
                Node::source("read", TemplateSource::new(["${mark}"])),
            ],
        );
        flow.variables().set("mark", "start");

        let first = flow.run().await.unwrap();
        let second = flow.run().await.unwrap();

        assert_eq!(first.output_values::<String>(), vec!["start+"]);
        assert_eq!(second.output_values::<String>(), vec!["start+"]);
        assert_eq!(flow.variables().lookup("mark").as_deref(), Some("start"));
        assert_eq!(second.variables.lookup("mark").as_deref(), Some("start+"));
    }

    #[tokio::test]
    async fn storage_written_by_a_run_is_dropped() {
        let key = crate::scope::StorageKey::new("total").unwrap();
        let mut flow = Flow::sequence(
            "Flow",
            vec![
                Node::source("numbers", ConstantSource::new(vec![3_i64])),
                Node::sink("store", SetStorageValue::<i64>::typed(key.clone())),
            ],
        );

        let report = flow.run().await.unwrap();

        assert_eq!(report.storage.get_value::<i64>(&key), Some(3));
        assert!(!flow.storage().contains(&key));
    }

    #[tokio::test]
    async fn stop_requested_before_a_run_is_cleared() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![Node::source("greet", TemplateSource::new(["hi"]))],
        );
        flow.stop_handle().stop();
        let report = flow.run().await.unwrap();
        assert_eq!(report.output_values::<String>(), vec!["hi"]);
    }

    #[test]
    fn index_assigns_paths_without_running() {
        let mut flow = Flow::sequence(
            "Flow",
            vec![Node::source("greet", TemplateSource::new(["hi"]))],
        );
        let index = flow.index();
        assert_eq!(index.len(), 2);
        assert_eq!(flow.root().children()[0].path().to_string(), "Flow.greet");
    }
}
