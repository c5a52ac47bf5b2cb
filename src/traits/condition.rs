// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::ActorContext;
use crate::token::Token;

/// Predicate deciding which case of a [`crate::control::Branch`] receives a
/// token. Errors are reported as execution errors of the branch.
pub trait Condition: Send + Sync {
    fn evaluate(&self, token: &Token, ctx: &ActorContext) -> anyhow::Result<bool>;

    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}
