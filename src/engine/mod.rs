// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod flow;
pub mod index;
pub mod node;
pub mod registry;
pub mod stop;

pub use context::{ActorContext, FlowContext};
pub use flow::{Flow, RunReport};
pub use index::{ActorInfo, TreeIndex};
pub use node::{assign_child_paths, unique_names, ActorKind, ActorState, Node, Role};
pub use registry::{ActorRegistry, SharedNode};
pub use stop::StopHandle;
