// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Semantic checks on a parsed [`EngineConfig`].
//!
//! Parsing already guarantees the shape of the document; these checks
//! cover what serde cannot see:
//!
//! 1. **Variable names**: every seed variable must be usable inside a
//!    `${...}` placeholder.
//! 2. **Log filter**: `logging.filter` must be a valid `EnvFilter` directive.
//!
//! All problems are collected so a user can fix a file in one pass.

use tracing_subscriber::EnvFilter;

use crate::config::EngineConfig;
use crate::scope::Variables;

/// Validate `config`, returning one message per problem found.
pub fn validate_config(config: &EngineConfig) -> Result<(), Vec<String>> {
    let mut problems = Vec::new();

    for name in config.variables.keys() {
        if !Variables::is_valid_name(name) {
            problems.push(format!(
                "variable '{}' is not a valid name (suggested: '{}')",
                name,
                Variables::to_valid_name(name)
            ));
        }
    }

    if let Err(e) = EnvFilter::try_new(&config.logging.filter) {
        problems.push(format!(
            "logging filter '{}' is invalid: {}",
            config.logging.filter, e
        ));
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(problems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&EngineConfig::default()).is_ok());
    }

    #[test]
    fn invalid_names_are_reported_with_a_suggestion() {
        let config = EngineConfig::default()
            .with_variable("ok_name", "1")
            .with_variable("has space", "2");

        let problems = validate_config(&config).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("'has space'"));
        assert!(problems[0].contains("'has_space'"));
    }

    #[test]
    fn invalid_log_filter_is_reported() {
        let mut config = EngineConfig::default();
        config.logging.filter = "flowtree=notalevel".to_string();

        let problems = validate_config(&config).unwrap_err();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].starts_with("logging filter"));
    }
}
