// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it through `tracing` with its fields attached.
//!
//! # Organization
//!
//! * `engine` - Flow runs, naming and stop requests
//! * `actor` - Actor lifecycle failures and caught errors
//! * `scope` - Loops, scope propagation and encapsulated calls
//!
//! # Usage Pattern
//!
//! ```rust
//! use flowtree::observability::messages::engine::RunStarted;
//! use flowtree::observability::messages::StructuredLog;
//! use flowtree::path::ActorPath;
//!
//! let flow = ActorPath::root("Flow");
//! let msg = RunStarted {
//!     flow: &flow,
//!     actor_count: 5,
//! };
//!
//! msg.log();
//! ```

use tracing::Span;

pub mod actor;
pub mod engine;
pub mod scope;

/// A message that knows its own level and fields.
pub trait StructuredLog {
    /// Emit the message as an event at its level.
    fn log(&self);

    /// Span carrying the message's fields, labelled `name`.
    fn span(&self, name: &str) -> Span;
}
