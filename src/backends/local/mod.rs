// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Small in-process leaf actors.
//!
//! Just enough to build real pipelines in demos and tests: constant and
//! template sources, closures, variable and storage accessors, collectors.

mod sinks;
mod sources;
mod transformers;

pub use sinks::{Collector, SetStorageValue, TokenCollector};
pub use sources::{ConstantSource, StorageValueSource, TemplateSource};
pub use transformers::{ExpandTemplate, MapTransformer, SetVariable};

use crate::token::Payload;

/// Text form of common scalar payloads.
pub fn payload_text(payload: &Payload) -> Option<String> {
    if let Some(text) = payload.downcast_ref::<String>() {
        return Some(text.clone());
    }
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        return Some((*text).to_string());
    }
    macro_rules! scalar {
        ($($ty:ty),*) => {
            $(
                if let Some(value) = payload.downcast_ref::<$ty>() {
                    return Some(value.to_string());
                }
            )*
        };
    }
    scalar!(i64, i32, u64, u32, usize, f64, bool);
    None
}
