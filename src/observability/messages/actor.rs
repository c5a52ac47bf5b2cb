// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for actor lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Set-up and wrap-up of individual actors
//! * Execution errors and how the error policy treated them
//! * Errors caught by a try/catch handler

use crate::engine::Role;
use crate::errors::FlowError;
use crate::observability::messages::StructuredLog;
use crate::path::ActorPath;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Actor set up and ready to execute.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ActorSetUpCompleted<'a> {
    pub path: &'a ActorPath,
    pub role: Role,
}

impl Display for ActorSetUpCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Actor '{}' set up as {}", self.path, self.role)
    }
}

impl StructuredLog for ActorSetUpCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            path = %self.path,
            role = %self.role,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "actor_set_up",
            span_name = name,
            path = %self.path,
            role = %self.role,
        )
    }
}

/// Actor failed to set up; the run aborts before executing anything.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use flowtree::errors::FlowError;
/// use flowtree::observability::messages::actor::ActorSetUpFailed;
/// use flowtree::path::ActorPath;
///
/// let path = ActorPath::from_components(["Flow", "call"]);
/// let error = FlowError::configuration(&path, "path not found: helper");
/// let msg = ActorSetUpFailed {
///     path: &path,
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ActorSetUpFailed<'a> {
    pub path: &'a ActorPath,
    pub error: &'a FlowError,
}

impl Display for ActorSetUpFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Actor '{}' failed to set up: {}", self.path, self.error)
    }
}

impl StructuredLog for ActorSetUpFailed<'_> {
    fn log(&self) {
        tracing::error!(
            path = %self.path,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "actor_set_up_failed",
            span_name = name,
            path = %self.path,
            error = %self.error,
        )
    }
}

/// Actor is marked skipped and passes its input through.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ActorSkipped<'a> {
    pub path: &'a ActorPath,
}

impl Display for ActorSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Actor '{}' is skipped", self.path)
    }
}

impl StructuredLog for ActorSkipped<'_> {
    fn log(&self) {
        tracing::debug!(path = %self.path, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("actor_skipped", span_name = name, path = %self.path)
    }
}

/// Execution error, either stopping the flow or recorded and dropped.
///
/// # Log Level
/// `error!` when fatal, `warn!` when the flow continues
pub struct ActorExecutionFailed<'a> {
    pub path: &'a ActorPath,
    pub error: &'a FlowError,
    pub fatal: bool,
}

impl Display for ActorExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.fatal {
            write!(f, "Actor '{}' failed, stopping flow: {}", self.path, self.error)
        } else {
            write!(
                f,
                "Actor '{}' failed, token dropped: {}",
                self.path, self.error
            )
        }
    }
}

impl StructuredLog for ActorExecutionFailed<'_> {
    fn log(&self) {
        if self.fatal {
            tracing::error!(
                path = %self.path,
                error = %self.error,
                fatal = true,
                "{}", self
            );
        } else {
            tracing::warn!(
                path = %self.path,
                error = %self.error,
                fatal = false,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "actor_execution_failed",
            span_name = name,
            path = %self.path,
            error = %self.error,
            fatal = self.fatal,
        )
    }
}

/// Actor failed to release its resources.
///
/// # Log Level
/// `warn!` - Cleanup continues with the remaining actors
pub struct ActorWrapUpFailed<'a> {
    pub path: &'a ActorPath,
    pub error: &'a FlowError,
}

impl Display for ActorWrapUpFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Actor '{}' failed to wrap up: {}", self.path, self.error)
    }
}

impl StructuredLog for ActorWrapUpFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            path = %self.path,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "actor_wrap_up_failed",
            span_name = name,
            path = %self.path,
            error = %self.error,
        )
    }
}

/// Callable member locked by a running call, skipped by a tree walk.
///
/// # Log Level
/// `warn!` - The member keeps the state of the previous walk
pub struct CallableMemberBusy<'a> {
    pub holder: &'a ActorPath,
    pub position: usize,
    pub operation: &'a str,
}

impl Display for CallableMemberBusy<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Callable member {} of '{}' is busy, skipped during {}",
            self.position, self.holder, self.operation
        )
    }
}

impl StructuredLog for CallableMemberBusy<'_> {
    fn log(&self) {
        tracing::warn!(
            holder = %self.holder,
            position = self.position,
            operation = self.operation,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "callable_member_busy",
            span_name = name,
            holder = %self.holder,
            position = self.position,
        )
    }
}

/// A try body failed and the catch body takes over.
///
/// # Log Level
/// `info!` - The failure is handled by the flow
pub struct ErrorCaught<'a> {
    pub path: &'a ActorPath,
    pub error: &'a FlowError,
}

impl Display for ErrorCaught<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Error caught by '{}', running catch body: {}",
            self.path, self.error
        )
    }
}

impl StructuredLog for ErrorCaught<'_> {
    fn log(&self) {
        tracing::info!(
            path = %self.path,
            failing_path = %self.error.failing_path(),
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "error_caught",
            span_name = name,
            path = %self.path,
            error = %self.error,
        )
    }
}
