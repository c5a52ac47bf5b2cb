// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution contexts handed down the actor tree.
//!
//! [`FlowContext`] is what handlers see: the current scopes plus the run-wide
//! state (stop flag, callable registry, tree index, error sink and policy
//! defaults). Handlers derive modified copies of it for their bodies; all
//! copies share the run-wide state. [`ActorContext`] is the narrow view given
//! to leaf actors.

use std::sync::{Arc, Mutex, PoisonError};

use crate::config::EngineConfig;
use crate::engine::{ActorRegistry, StopHandle, TreeIndex};
use crate::errors::{FlowError, FlowResult};
use crate::observability::messages::actor::ActorExecutionFailed;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use crate::scope::{Storage, Variables};

#[derive(Clone)]
pub struct FlowContext {
    variables: Variables,
    storage: Storage,
    stop: StopHandle,
    registry: ActorRegistry,
    index: Arc<TreeIndex>,
    errors: Arc<Mutex<Vec<FlowError>>>,
    error_prefixes: Vec<ActorPath>,
    stop_flow_on_error: bool,
    tee_isolates_errors: bool,
    provenance: bool,
}

impl FlowContext {
    pub fn new(
        variables: Variables,
        storage: Storage,
        stop: StopHandle,
        index: TreeIndex,
        config: &EngineConfig,
    ) -> Self {
        Self {
            variables,
            storage,
            stop,
            registry: ActorRegistry::new(),
            index: Arc::new(index),
            errors: Arc::new(Mutex::new(Vec::new())),
            error_prefixes: Vec::new(),
            stop_flow_on_error: config.error_handling.stop_flow_on_error,
            tee_isolates_errors: config.error_handling.tee_isolates_errors,
            provenance: config.provenance,
        }
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn stop_handle(&self) -> &StopHandle {
        &self.stop
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }

    pub fn registry(&self) -> &ActorRegistry {
        &self.registry
    }

    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    pub fn provenance_enabled(&self) -> bool {
        self.provenance
    }

    /// Policy for nodes without an override of their own.
    pub fn stop_flow_on_error(&self) -> bool {
        self.stop_flow_on_error
    }

    pub fn tee_isolates_errors(&self) -> bool {
        self.tee_isolates_errors
    }

    pub fn with_variables(&self, variables: Variables) -> Self {
        Self {
            variables,
            ..self.clone()
        }
    }

    pub fn with_storage(&self, storage: Storage) -> Self {
        Self {
            storage,
            ..self.clone()
        }
    }

    pub fn with_scopes(&self, variables: Variables, storage: Storage) -> Self {
        Self {
            variables,
            storage,
            ..self.clone()
        }
    }

    pub fn with_error_default(&self, stop_flow_on_error: bool) -> Self {
        Self {
            stop_flow_on_error,
            ..self.clone()
        }
    }

    /// Context for a subtree run as an isolated unit: its own scopes, index
    /// and registry; the caller's stop flag and error sink. Errors recorded
    /// inside are attributed to `prefix`.
    pub fn encapsulated(
        &self,
        prefix: &ActorPath,
        variables: Variables,
        storage: Storage,
        index: TreeIndex,
    ) -> Self {
        let mut error_prefixes = self.error_prefixes.clone();
        error_prefixes.push(prefix.clone());
        Self {
            variables,
            storage,
            stop: self.stop.clone(),
            registry: ActorRegistry::new(),
            index: Arc::new(index),
            errors: Arc::clone(&self.errors),
            error_prefixes,
            stop_flow_on_error: self.stop_flow_on_error,
            tee_isolates_errors: self.tee_isolates_errors,
            provenance: self.provenance,
        }
    }

    /// Leaf view for the actor at `path`.
    pub fn actor(&self, path: &ActorPath) -> ActorContext {
        ActorContext {
            path: path.clone(),
            variables: self.variables.clone(),
            storage: self.storage.clone(),
            stop: self.stop.clone(),
        }
    }

    /// Apply the error policy: a fatal error is handed back, a non-fatal one
    /// is recorded and swallowed.
    pub fn absorb(&self, error: FlowError, node_override: Option<bool>) -> FlowResult<()> {
        let fatal = node_override.unwrap_or(self.stop_flow_on_error);
        let path = error.failing_path();
        ActorExecutionFailed {
            path: &path,
            error: &error,
            fatal,
        }
        .log();
        if fatal {
            Err(error)
        } else {
            self.record_error(error);
            Ok(())
        }
    }

    /// Record a non-fatal error in the run report.
    pub fn record_error(&self, error: FlowError) {
        let error = self
            .error_prefixes
            .iter()
            .rev()
            .fold(error, |inner, prefix| FlowError::encapsulated(prefix, inner));
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(error);
    }

    pub fn recorded_error_count(&self) -> usize {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub(crate) fn take_errors(&self) -> Vec<FlowError> {
        std::mem::take(&mut *self.errors.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// What a leaf actor can see while it runs.
#[derive(Debug, Clone)]
pub struct ActorContext {
    path: ActorPath,
    variables: Variables,
    storage: Storage,
    stop: StopHandle,
}

impl ActorContext {
    pub fn new(path: ActorPath, variables: Variables, storage: Storage, stop: StopHandle) -> Self {
        Self {
            path,
            variables,
            storage,
            stop,
        }
    }

    pub fn path(&self) -> &ActorPath {
        &self.path
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Expand `${name}` placeholders against the current variables.
    pub fn expand(&self, template: &str) -> String {
        self.variables.expand(template)
    }

    pub fn request_stop(&self, message: Option<String>) {
        match message {
            Some(message) => self.stop.stop_with(message),
            None => self.stop.stop(),
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(config: &EngineConfig) -> FlowContext {
        FlowContext::new(
            Variables::new(),
            Storage::new(),
            StopHandle::new(),
            TreeIndex::default(),
            config,
        )
    }

    #[test]
    fn absorb_follows_policy() {
        let ctx = context(&EngineConfig::default());
        let path: ActorPath = "Flow.a".parse().unwrap();

        let fatal = ctx.absorb(FlowError::execution(&path, anyhow::anyhow!("x")), None);
        assert!(fatal.is_err());
        assert_eq!(ctx.recorded_error_count(), 0);

        let lenient = ctx.with_error_default(false);
        assert!(lenient
            .absorb(FlowError::execution(&path, anyhow::anyhow!("y")), None)
            .is_ok());
        assert!(lenient
            .absorb(FlowError::execution(&path, anyhow::anyhow!("z")), Some(true))
            .is_err());
        assert_eq!(ctx.recorded_error_count(), 1);
    }

    #[test]
    fn encapsulated_errors_are_prefixed() {
        let ctx = context(&EngineConfig::default());
        let prefix: ActorPath = "Flow.sub".parse().unwrap();
        let inner = ctx.encapsulated(&prefix, Variables::new(), Storage::new(), TreeIndex::default());

        inner.record_error(FlowError::execution(
            &"Body.leaf".parse().unwrap(),
            anyhow::anyhow!("bad"),
        ));
        let errors = ctx.take_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].failing_path().to_string(), "Flow.sub.Body.leaf");
    }

    #[test]
    fn derived_contexts_share_stop_flag() {
        let ctx = context(&EngineConfig::default());
        let derived = ctx.with_variables(ctx.variables().child());
        derived.actor(&ActorPath::root("x")).request_stop(Some("done".into()));
        assert!(ctx.is_stopped());
        assert_eq!(ctx.stop_handle().message().as_deref(), Some("done"));
    }
}
