// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod flow;
mod scope;

pub use config::ConfigError;
pub use flow::{ErrorKind, FlowError};
pub use scope::ScopeError;

/// Result alias used throughout the engine.
pub type FlowResult<T> = std::result::Result<T, FlowError>;
