// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_LOG_FILTER, DEFAULT_PROVENANCE, DEFAULT_STOP_FLOW_ON_ERROR,
    DEFAULT_TEE_ISOLATES_ERRORS,
};
use crate::errors::ConfigError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Engine-wide settings for a flow run.
///
/// Every field has a default, so an empty document is a valid configuration.
/// Actors themselves are built in code; this only holds the policies and
/// seed values the engine applies around them.
///
/// # Fields
/// * `error_handling` - Defaults for the error policy of nodes and tees
/// * `provenance` - Whether tokens are stamped with provenance entries
/// * `variables` - Seeded into the root variables scope, in file order
/// * `logging` - Settings for the binary's tracing subscriber
///
/// # Example
/// ```yaml
/// error_handling:
///   stop_flow_on_error: true
///   tee_isolates_errors: false
/// provenance: true
/// variables:
///   project: demo
/// logging:
///   filter: info
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub error_handling: ErrorHandlingConfig,
    pub provenance: bool,
    pub variables: IndexMap<String, String>,
    pub logging: LoggingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_handling: ErrorHandlingConfig::default(),
            provenance: DEFAULT_PROVENANCE,
            variables: IndexMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes as unit, not as an empty map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Set or replace a seed variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_stop_flow_on_error(mut self, stop: bool) -> Self {
        self.error_handling.stop_flow_on_error = stop;
        self
    }
}

/// Defaults of the error policy.
///
/// # Fields
/// * `stop_flow_on_error` - Whether an execution error stops the flow for
///   nodes and handlers that do not decide themselves (defaults to true)
/// * `tee_isolates_errors` - Whether a tee records its body's errors instead
///   of failing the surrounding chain (defaults to false)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ErrorHandlingConfig {
    pub stop_flow_on_error: bool,
    pub tee_isolates_errors: bool,
}

impl Default for ErrorHandlingConfig {
    fn default() -> Self {
        Self {
            stop_flow_on_error: DEFAULT_STOP_FLOW_ON_ERROR,
            tee_isolates_errors: DEFAULT_TEE_ISOLATES_ERRORS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    EngineConfig::from_yaml_str(&content)
}

/// Load a config from a YAML file and check its contents.
///
/// Every problem found is reported, not just the first.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<EngineConfig, ConfigError> {
    let cfg = load_config(path)?;
    crate::config::validate_config(&cfg).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
