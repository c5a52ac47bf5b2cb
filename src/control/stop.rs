// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::ActorContext;
use crate::observability::messages::engine::StopRequested;
use crate::observability::messages::StructuredLog;
use crate::token::Token;
use crate::traits::{Sink, Standalone};

/// Requests a flow stop, as a sink on the first token it sees or as a
/// standalone when it runs.
///
/// The optional message is expanded against the current variables and ends
/// up in the run report.
#[derive(Default)]
pub struct Stop {
    message: Option<String>,
}

impl Stop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }

    fn request(&self, ctx: &ActorContext) {
        let message = self.message.as_deref().map(|m| ctx.expand(m));
        StopRequested {
            path: ctx.path(),
            message: message.as_deref(),
        }
        .log();
        ctx.request_stop(message);
    }
}

#[async_trait]
impl Sink for Stop {
    async fn consume(&mut self, _token: Token, ctx: &ActorContext) -> anyhow::Result<()> {
        self.request(ctx);
        Ok(())
    }
}

#[async_trait]
impl Standalone for Stop {
    async fn execute(&mut self, ctx: &ActorContext) -> anyhow::Result<()> {
        self.request(ctx);
        Ok(())
    }
}
