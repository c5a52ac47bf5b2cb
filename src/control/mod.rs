// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Control actors: handlers that decide how tokens move through their
//! children.
//!
//! | Handler | Role | Children run |
//! |---|---|---|
//! | [`Sequence`] | from members | as one chain, per input |
//! | [`Tee`] | transformer | on a copy of each token |
//! | [`Trigger`] | sink, or transformer when forwarding | without input, per token |
//! | [`ForLoop`] | standalone | without input, per loop value |
//! | [`Branch`] | transformer or sink | first matching case, per token |
//! | [`TryCatch`] | from the try body | catch body after a failure |
//! | [`LocalScope`] | from members | against scopes of their own |
//! | [`CallableActors`] | standalone | only by reference |
//!
//! [`Stop`] is a leaf, usable as sink or standalone.

mod branch;
mod callable;
pub mod conditions;
mod for_loop;
mod local_scope;
pub mod sequence;
mod stop;
mod tee;
mod trigger;
mod try_catch;

pub use branch::Branch;
pub use callable::{CallableActor, CallableActors};
pub use conditions::{FnCondition, PayloadIs, StorageHas, VariableEquals, VariableMatches};
pub use for_loop::{ForLoop, DEFAULT_LOOP_VARIABLE};
pub use local_scope::LocalScope;
pub use sequence::Sequence;
pub use stop::Stop;
pub use tee::Tee;
pub use trigger::Trigger;
pub use try_catch::TryCatch;
