// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging.
//!
//! All diagnostics are emitted through `tracing` using the message types in
//! [`messages`]. Keeping the wording in one place keeps log lines consistent
//! and lets the fields attached to each event be reviewed together.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - Flow runs, naming and stop requests
//! * `messages::actor` - Actor lifecycle and error policy events
//! * `messages::scope` - Loops, scope propagation and encapsulated calls
//!
//! # Usage
//!
//! ```rust
//! use flowtree::errors::FlowError;
//! use flowtree::observability::messages::actor::ActorExecutionFailed;
//! use flowtree::observability::messages::StructuredLog;
//! use flowtree::path::ActorPath;
//!
//! let path = ActorPath::from_components(["Flow", "parse"]);
//! let error = FlowError::execution(&path, anyhow::anyhow!("bad input"));
//! ActorExecutionFailed {
//!     path: &path,
//!     error: &error,
//!     fatal: false,
//! }
//! .log();
//! ```
//!
//! The binary installs a `tracing_subscriber::fmt` subscriber; library users
//! bring their own.

pub mod messages;
