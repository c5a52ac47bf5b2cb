// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Nodes without an override stop the flow on their first execution error.
pub const DEFAULT_STOP_FLOW_ON_ERROR: bool = true;
/// Tees hand body errors back to the surrounding chain unless told otherwise.
pub const DEFAULT_TEE_ISOLATES_ERRORS: bool = false;
/// Stamp provenance entries on tokens produced by sources and transformers.
pub const DEFAULT_PROVENANCE: bool = true;
/// `tracing` filter directive used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info";
