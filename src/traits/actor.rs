// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Leaf actor capabilities.
//!
//! A leaf implements exactly one of these traits and is wrapped in a
//! [`crate::engine::Node`] which owns its lifecycle state, path and error
//! policy. Leaf code reports failures as `anyhow::Error`; the node attaches the
//! actor path before the error travels further.

use async_trait::async_trait;

use crate::engine::ActorContext;
use crate::token::{Token, TypeTag};

/// Produces tokens without consuming any.
///
/// The parent drives a source with [`has_more`](Source::has_more) and
/// [`next`](Source::next) until it is exhausted or the flow is stopped. Any
/// cursor must be rewound in [`set_up`](Source::set_up) so a re-run starts
/// from the beginning.
#[async_trait]
pub trait Source: Send + Sync {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    fn has_more(&self) -> bool;

    /// Start over; called before each pass of the chain this source heads.
    fn rewind(&mut self) {}

    async fn next(&mut self, ctx: &ActorContext) -> anyhow::Result<Token>;

    async fn wrap_up(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Turns each input token into zero or more output tokens.
#[async_trait]
pub trait Transformer: Send + Sync {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    fn generates(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    async fn process(&mut self, token: Token, ctx: &ActorContext) -> anyhow::Result<Vec<Token>>;

    async fn wrap_up(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Consumes tokens without producing any.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        Ok(())
    }

    fn accepts(&self) -> Vec<TypeTag> {
        vec![TypeTag::unknown()]
    }

    async fn consume(&mut self, token: Token, ctx: &ActorContext) -> anyhow::Result<()>;

    async fn wrap_up(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Runs for its side effects only: no input, no output.
#[async_trait]
pub trait Standalone: Send + Sync {
    async fn set_up(&mut self, _ctx: &ActorContext) -> anyhow::Result<()> {
        Ok(())
    }

    async fn execute(&mut self, ctx: &ActorContext) -> anyhow::Result<()>;

    async fn wrap_up(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}
