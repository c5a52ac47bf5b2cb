// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for flow runs.
//!
//! This module contains message types for logging events related to:
//! * Run lifecycle (start, completion, failure)
//! * Child name disambiguation while paths are assigned
//! * Stop requests raised by actors

use crate::errors::FlowError;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Flow run started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use flowtree::observability::messages::engine::RunStarted;
/// use flowtree::path::ActorPath;
///
/// let flow = ActorPath::root("Flow");
/// let msg = RunStarted {
///     flow: &flow,
///     actor_count: 5,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunStarted<'a> {
    pub flow: &'a ActorPath,
    pub actor_count: usize,
}

impl Display for RunStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting flow '{}' with {} actors",
            self.flow, self.actor_count
        )
    }
}

impl StructuredLog for RunStarted<'_> {
    fn log(&self) {
        tracing::info!(
            flow = %self.flow,
            actor_count = self.actor_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            flow = %self.flow,
            actor_count = self.actor_count,
        )
    }
}

/// Flow run finished without a fatal error.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use flowtree::observability::messages::engine::RunCompleted;
/// use flowtree::path::ActorPath;
/// use std::time::Duration;
///
/// let flow = ActorPath::root("Flow");
/// let msg = RunCompleted {
///     flow: &flow,
///     outputs: 3,
///     errors: 0,
///     cleanup_errors: 0,
///     stopped: false,
///     duration: Duration::from_millis(12),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct RunCompleted<'a> {
    pub flow: &'a ActorPath,
    pub outputs: usize,
    pub errors: usize,
    pub cleanup_errors: usize,
    pub stopped: bool,
    pub duration: Duration,
}

impl Display for RunCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow '{}' {} in {:?}: {} outputs, {} recorded errors, {} cleanup errors",
            self.flow,
            if self.stopped { "stopped" } else { "completed" },
            self.duration,
            self.outputs,
            self.errors,
            self.cleanup_errors
        )
    }
}

impl StructuredLog for RunCompleted<'_> {
    fn log(&self) {
        if self.errors > 0 || self.cleanup_errors > 0 {
            tracing::warn!(
                flow = %self.flow,
                outputs = self.outputs,
                errors = self.errors,
                cleanup_errors = self.cleanup_errors,
                stopped = self.stopped,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::info!(
                flow = %self.flow,
                outputs = self.outputs,
                stopped = self.stopped,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run_completed",
            span_name = name,
            flow = %self.flow,
            outputs = self.outputs,
            errors = self.errors,
            cleanup_errors = self.cleanup_errors,
            stopped = self.stopped,
            duration = ?self.duration,
        )
    }
}

/// Flow run aborted by a configuration or fatal execution error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct RunFailed<'a> {
    pub flow: &'a ActorPath,
    pub error: &'a FlowError,
}

impl Display for RunFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Flow '{}' failed: {}", self.flow, self.error)
    }
}

impl StructuredLog for RunFailed<'_> {
    fn log(&self) {
        tracing::error!(
            flow = %self.flow,
            failing_path = %self.error.failing_path(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "run_failed",
            span_name = name,
            flow = %self.flow,
            error = %self.error,
        )
    }
}

/// A child was renamed to keep sibling paths unique.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct NameDisambiguated<'a> {
    pub parent: &'a ActorPath,
    pub original: &'a str,
    pub assigned: &'a str,
}

impl Display for NameDisambiguated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Child '{}' of '{}' renamed to '{}' to keep names unique",
            self.original, self.parent, self.assigned
        )
    }
}

impl StructuredLog for NameDisambiguated<'_> {
    fn log(&self) {
        tracing::debug!(
            parent = %self.parent,
            original = self.original,
            assigned = self.assigned,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "name_disambiguated",
            span_name = name,
            parent = %self.parent,
            original = self.original,
            assigned = self.assigned,
        )
    }
}

/// An actor asked the flow to stop.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use flowtree::observability::messages::engine::StopRequested;
/// use flowtree::path::ActorPath;
///
/// let path = ActorPath::from_components(["Flow", "halt"]);
/// let msg = StopRequested {
///     path: &path,
///     message: Some("limit reached"),
/// };
///
/// assert_eq!(msg.to_string(), "Stop requested by 'Flow.halt': limit reached");
/// ```
pub struct StopRequested<'a> {
    pub path: &'a ActorPath,
    pub message: Option<&'a str>,
}

impl Display for StopRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.message {
            Some(message) => write!(f, "Stop requested by '{}': {}", self.path, message),
            None => write!(f, "Stop requested by '{}'", self.path),
        }
    }
}

impl StructuredLog for StopRequested<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path,
            stop_message = self.message,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "stop_requested",
            span_name = name,
            path = %self.path,
            stop_message = self.message,
        )
    }
}
