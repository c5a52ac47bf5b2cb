// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Leaf actor implementations.
//!
//! ## Local Backend
//! Generic in-process actors: constant and template sources, closure
//! transformers, variable and storage accessors, collectors.
//!
//! ## Stub Backend (Test-Only)
//! Lifecycle probes and failing actors for engine tests. Not available in
//! production builds.

pub mod local;
#[cfg(test)]
pub mod stub;
