// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Engine-level error type.
//!
//! Every variant names the actor it originated from so the caller can
//! attribute a failure precisely, including failures inside encapsulated
//! subtrees whose paths are relative to the subtree root.

use thiserror::Error;

use crate::path::ActorPath;

use super::ScopeError;

/// Coarse classification of a [`FlowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Execution,
    Cleanup,
    Scope,
}

#[derive(Debug, Error)]
pub enum FlowError {
    /// Setup-time validation failure: unresolved path, type mismatch,
    /// missing field. Aborts the run before any execution.
    #[error("configuration error in '{path}': {message}")]
    Configuration { path: ActorPath, message: String },

    /// Raised by an actor while executing.
    #[error("execution error in '{path}': {cause}")]
    Execution {
        path: ActorPath,
        #[source]
        cause: anyhow::Error,
    },

    /// Raised while releasing resources; never stops sibling cleanup.
    #[error("cleanup error in '{path}': {cause}")]
    Cleanup {
        path: ActorPath,
        #[source]
        cause: anyhow::Error,
    },

    /// A required variable or storage item could not be resolved.
    #[error("scope error in '{path}': {source}")]
    Scope {
        path: ActorPath,
        #[source]
        source: ScopeError,
    },

    /// Failure of a subtree executed as an isolated unit, prefixed with the
    /// path of the actor that invoked it. Paths inside `source` are relative
    /// to the subtree.
    #[error("encapsulated flow called from '{prefix}' failed: {source}")]
    Encapsulated {
        prefix: ActorPath,
        #[source]
        source: Box<FlowError>,
    },

    #[error("{}", summarize(.0))]
    Aggregate(Vec<FlowError>),
}

fn summarize(errors: &[FlowError]) -> String {
    let lines: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!("{} errors occurred:\n{}", errors.len(), lines.join("\n"))
}

impl FlowError {
    pub fn configuration(path: &ActorPath, message: impl Into<String>) -> Self {
        Self::Configuration {
            path: path.clone(),
            message: message.into(),
        }
    }

    /// Wrap an error raised by leaf code executing at `path`. Scope failures
    /// keep their own variant.
    pub fn execution(path: &ActorPath, cause: anyhow::Error) -> Self {
        match cause.downcast::<ScopeError>() {
            Ok(source) => Self::Scope {
                path: path.clone(),
                source,
            },
            Err(cause) => Self::Execution {
                path: path.clone(),
                cause,
            },
        }
    }

    pub fn cleanup(path: &ActorPath, cause: anyhow::Error) -> Self {
        Self::Cleanup {
            path: path.clone(),
            cause,
        }
    }

    pub fn encapsulated(prefix: &ActorPath, source: FlowError) -> Self {
        Self::Encapsulated {
            prefix: prefix.clone(),
            source: Box::new(source),
        }
    }

    /// Collapse a list of errors: `None` when empty, the error itself when
    /// there is exactly one.
    pub fn aggregate(mut errors: Vec<FlowError>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(errors)),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Cleanup { .. } => ErrorKind::Cleanup,
            Self::Scope { .. } => ErrorKind::Scope,
            Self::Encapsulated { source, .. } => source.kind(),
            Self::Aggregate(errors) => errors.first().map(FlowError::kind).unwrap_or(ErrorKind::Execution),
        }
    }

    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Absolute path of the actor that failed.
    pub fn failing_path(&self) -> ActorPath {
        match self {
            Self::Configuration { path, .. }
            | Self::Execution { path, .. }
            | Self::Cleanup { path, .. }
            | Self::Scope { path, .. } => path.clone(),
            Self::Encapsulated { prefix, source } => prefix.append(&source.failing_path()),
            Self::Aggregate(errors) => errors.first().map(FlowError::failing_path).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> ActorPath {
        s.parse().unwrap()
    }

    #[test]
    fn execution_maps_scope_errors() {
        let cause = anyhow::Error::new(ScopeError::UnresolvedVariable { name: "x".into() });
        let error = FlowError::execution(&path("Flow.a"), cause);
        assert_eq!(error.kind(), ErrorKind::Scope);
        assert!(error.to_string().contains("variable 'x' is not set"));

        let error = FlowError::execution(&path("Flow.a"), anyhow::anyhow!("boom"));
        assert_eq!(error.kind(), ErrorKind::Execution);
        assert_eq!(error.to_string(), "execution error in 'Flow.a': boom");
    }

    #[test]
    fn encapsulated_paths_are_prefixed() {
        let inner = FlowError::execution(&path("Sub.multiply"), anyhow::anyhow!("overflow"));
        let outer = FlowError::encapsulated(&path("Flow.call"), inner);
        assert_eq!(outer.failing_path(), path("Flow.call.Sub.multiply"));
        assert_eq!(outer.kind(), ErrorKind::Execution);

        // A subtree whose root shares the caller's names is still relative.
        let lookalike = FlowError::configuration(&path("Flow.call.body"), "bad");
        let outer = FlowError::encapsulated(&path("Flow.call"), lookalike);
        assert_eq!(outer.failing_path(), path("Flow.call.Flow.call.body"));

        let nested = FlowError::encapsulated(
            &path("Flow.call"),
            FlowError::encapsulated(
                &path("inner.again"),
                FlowError::execution(&path("deep.leaf"), anyhow::anyhow!("boom")),
            ),
        );
        assert_eq!(nested.failing_path(), path("Flow.call.inner.again.deep.leaf"));
    }

    #[test]
    fn aggregate_collapses_small_lists() {
        assert!(FlowError::aggregate(vec![]).is_none());
        let single = FlowError::aggregate(vec![FlowError::configuration(&path("a"), "x")]).unwrap();
        assert!(matches!(single, FlowError::Configuration { .. }));

        let many = FlowError::aggregate(vec![
            FlowError::cleanup(&path("a"), anyhow::anyhow!("one")),
            FlowError::cleanup(&path("b"), anyhow::anyhow!("two")),
        ])
        .unwrap();
        assert!(many.to_string().starts_with("2 errors occurred"));
        assert_eq!(many.failing_path(), path("a"));
        assert_eq!(many.kind(), ErrorKind::Cleanup);
    }
}
