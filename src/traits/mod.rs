// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod actor;
pub mod condition;
pub mod handler;

pub use actor::{Sink, Source, Standalone, Transformer};
pub use condition::Condition;
pub use handler::ActorHandler;
