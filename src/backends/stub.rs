// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::engine::ActorContext;
use crate::token::Token;
use crate::traits::{Standalone, Transformer};

/// Shared, ordered record of lifecycle calls made on probes.
#[derive(Clone, Default)]
pub struct LifecycleLog {
    events: Arc<Mutex<Vec<String>>>,
}

impl LifecycleLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: String) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }

    pub fn events(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Events of one kind (`set_up`, `execute`, `wrap_up`), as probe labels.
    pub fn of(&self, kind: &str) -> Vec<String> {
        let prefix = format!("{}:", kind);
        self.events()
            .into_iter()
            .filter_map(|e| e.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }
}

/// Pass-through transformer recording its lifecycle calls, optionally
/// failing in one phase.
pub struct Probe {
    label: String,
    log: LifecycleLog,
    fail_set_up: bool,
    fail_execute: bool,
    fail_wrap_up: bool,
}

impl Probe {
    pub fn new(label: &str, log: &LifecycleLog) -> Self {
        Self {
            label: label.to_string(),
            log: log.clone(),
            fail_set_up: false,
            fail_execute: false,
            fail_wrap_up: false,
        }
    }

    pub fn failing_set_up(mut self) -> Self {
        self.fail_set_up = true;
        self
    }

    pub fn failing_execute(mut self) -> Self {
        self.fail_execute = true;
        self
    }

    pub fn failing_wrap_up(mut self) -> Self {
        self.fail_wrap_up = true;
        self
    }

    fn record(&self, kind: &str, fail: bool) -> anyhow::Result<()> {
        self.log.push(format!("{}:{}", kind, self.label));
        if fail {
            anyhow::bail!("{} failed in {}", self.label, kind);
        }
        Ok(())
    }
}

#[async_trait]
impl Transformer for Probe {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.record("set_up", self.fail_set_up)
    }

    async fn process(&mut self, token: Token, _ctx: &ActorContext) -> anyhow::Result<Vec<Token>> {
        self.record("execute", self.fail_execute)?;
        Ok(vec![token])
    }

    async fn wrap_up(&mut self) -> anyhow::Result<()> {
        self.record("wrap_up", self.fail_wrap_up)
    }
}

#[async_trait]
impl Standalone for Probe {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.record("set_up", self.fail_set_up)
    }

    async fn execute(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        self.record("execute", self.fail_execute)
    }

    async fn wrap_up(&mut self) -> anyhow::Result<()> {
        self.record("wrap_up", self.fail_wrap_up)
    }
}

/// Transformer that fails on every token.
pub struct FailingTransformer {
    message: String,
}

impl FailingTransformer {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Transformer for FailingTransformer {
    async fn process(&mut self, _token: Token, _ctx: &ActorContext) -> anyhow::Result<Vec<Token>> {
        Err(anyhow::anyhow!("{}", self.message))
    }
}
