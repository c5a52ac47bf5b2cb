// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // leaf actors
pub mod config;        // engine settings
pub mod control;       // control-flow handlers
pub mod demos;         // built-in demo flows
pub mod encapsulation; // subtrees called as isolated units
pub mod engine;        // tree walk and run lifecycle
pub mod errors;        // error handling
pub mod observability;
pub mod path;          // actor addressing
pub mod scope;         // variables and storage
pub mod token;         // data flowing between actors
pub mod traits;        // actor capabilities
