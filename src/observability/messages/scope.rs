// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for nested execution contexts: loop iterations, local
//! scopes and encapsulated calls.

use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Loop body about to run for one value.
///
/// # Log Level
/// `trace!` - One event per iteration
pub struct LoopIteration<'a> {
    pub path: &'a ActorPath,
    pub variable: &'a str,
    pub value: i64,
}

impl Display for LoopIteration<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Loop '{}' iteration {}={}",
            self.path, self.variable, self.value
        )
    }
}

impl StructuredLog for LoopIteration<'_> {
    fn log(&self) {
        tracing::trace!(
            path = %self.path,
            variable = self.variable,
            value = self.value,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "loop_iteration",
            span_name = name,
            path = %self.path,
            variable = self.variable,
            value = self.value,
        )
    }
}

/// Local entries copied back to the enclosing scope.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
///
/// # Example
/// ```
/// use flowtree::observability::messages::scope::ScopePropagated;
/// use flowtree::path::ActorPath;
///
/// let path = ActorPath::from_components(["Flow", "local"]);
/// let names = vec!["result".to_string()];
/// let msg = ScopePropagated {
///     path: &path,
///     scope: "variables",
///     names: &names,
/// };
///
/// assert_eq!(msg.to_string(), "Scope 'Flow.local' propagated 1 variables: result");
/// ```
pub struct ScopePropagated<'a> {
    pub path: &'a ActorPath,
    pub scope: &'a str,
    pub names: &'a [String],
}

impl Display for ScopePropagated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Scope '{}' propagated {} {}: {}",
            self.path,
            self.names.len(),
            self.scope,
            self.names.join(", ")
        )
    }
}

impl StructuredLog for ScopePropagated<'_> {
    fn log(&self) {
        tracing::debug!(
            path = %self.path,
            scope = self.scope,
            count = self.names.len(),
            names = ?self.names,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "scope_propagated",
            span_name = name,
            path = %self.path,
            scope = self.scope,
            count = self.names.len(),
        )
    }
}

/// Encapsulated subtree about to run on behalf of `prefix`.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct EncapsulationStarted<'a> {
    pub prefix: &'a ActorPath,
    pub actor: &'a ActorPath,
    pub actor_count: usize,
}

impl Display for EncapsulationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Calling encapsulated '{}' from '{}' ({} actors)",
            self.actor, self.prefix, self.actor_count
        )
    }
}

impl StructuredLog for EncapsulationStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            prefix = %self.prefix,
            actor = %self.actor,
            actor_count = self.actor_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "encapsulation",
            span_name = name,
            prefix = %self.prefix,
            actor = %self.actor,
            actor_count = self.actor_count,
        )
    }
}

/// Encapsulated call returned.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct EncapsulationCompleted<'a> {
    pub prefix: &'a ActorPath,
    pub has_output: bool,
}

impl Display for EncapsulationCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Encapsulated call from '{}' completed {}",
            self.prefix,
            if self.has_output {
                "with output"
            } else {
                "without output"
            }
        )
    }
}

impl StructuredLog for EncapsulationCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            prefix = %self.prefix,
            has_output = self.has_output,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "encapsulation_completed",
            span_name = name,
            prefix = %self.prefix,
            has_output = self.has_output,
        )
    }
}
