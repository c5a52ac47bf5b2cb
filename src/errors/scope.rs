// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failures resolving a variable or storage reference that was marked as
/// required.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("variable '{name}' is not set")]
    UnresolvedVariable { name: String },

    #[error("storage item '{key}' is not available")]
    MissingStorageValue { key: String },

    #[error("storage item '{key}' holds {found}, expected {expected}")]
    StorageTypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{name}' is not a valid name (allowed: letters, digits, '_', '-', ':', '.')")]
    InvalidName { name: String },
}
