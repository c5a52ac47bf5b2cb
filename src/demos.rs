// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in demo flows run by the `flowtree` binary.

use std::fmt::{Display, Formatter};

use crate::backends::local::{
    Collector, ConstantSource, MapTransformer, SetStorageValue, StorageValueSource, TemplateSource,
};
use crate::control::{ForLoop, Sequence, Tee};
use crate::encapsulation::{EncapsulationContainer, SubFlow};
use crate::engine::{Flow, Node};
use crate::errors::ScopeError;
use crate::scope::StorageKey;
use crate::traits::ActorHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoKind {
    /// Numbers doubled, audited through a tee and collected as text.
    Pipeline,
    /// A loop body expanding its loop variable into a template.
    Loop,
    /// Every number multiplied by an encapsulated sub-flow.
    Encapsulate,
}

impl DemoKind {
    pub const ALL: [DemoKind; 3] = [DemoKind::Pipeline, DemoKind::Loop, DemoKind::Encapsulate];

    pub fn name(&self) -> &'static str {
        match self {
            DemoKind::Pipeline => "pipeline",
            DemoKind::Loop => "loop",
            DemoKind::Encapsulate => "encapsulate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            DemoKind::Pipeline => "source -> double -> tee(audit) -> format -> collect",
            DemoKind::Loop => "for i in 1..=3: template \"item ${i} of ${project}\" -> collect",
            DemoKind::Encapsulate => "source -> sub-flow(x10 via storage) -> format -> collect",
        }
    }
}

impl Display for DemoKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A demo flow plus the collectors it fills.
pub struct Demo {
    pub kind: DemoKind,
    pub flow: Flow,
    pub results: Collector<String>,
    pub audit: Option<Collector<String>>,
}

/// Variable seeded into every demo unless the configuration sets it.
pub const PROJECT_VARIABLE: &str = "project";

pub fn build(kind: DemoKind) -> Result<Demo, ScopeError> {
    let demo = match kind {
        DemoKind::Pipeline => pipeline(),
        DemoKind::Loop => for_loop(),
        DemoKind::Encapsulate => encapsulate()?,
    };
    demo.flow.variables().set(PROJECT_VARIABLE, "flowtree");
    Ok(demo)
}

fn format_number() -> Node {
    Node::transformer("format", MapTransformer::new(|v: &i64| v.to_string()))
}

fn pipeline() -> Demo {
    let results = Collector::<String>::new();
    let audit = Collector::<String>::new();
    let flow = Flow::sequence(
        "Flow",
        vec![
            Node::source("numbers", ConstantSource::new(vec![1_i64, 2, 3])),
            Node::transformer("double", MapTransformer::new(|v: &i64| v * 2)),
            Tee::new(vec![
                Node::transformer(
                    "describe",
                    MapTransformer::new(|v: &i64| format!("saw {}", v)),
                ),
                Node::sink("audit", audit.clone()),
            ])
            .into_node("tee"),
            format_number(),
            Node::sink("results", results.clone()),
        ],
    );
    Demo {
        kind: DemoKind::Pipeline,
        flow,
        results,
        audit: Some(audit),
    }
}

fn for_loop() -> Demo {
    let results = Collector::<String>::new();
    let flow = Flow::sequence(
        "Flow",
        vec![ForLoop::new(
            1,
            3,
            vec![
                Node::source("item", TemplateSource::new(["item ${i} of ${project}"])),
                Node::sink("results", results.clone()),
            ],
        )
        .variable("i")
        .into_node("loop")],
    );
    Demo {
        kind: DemoKind::Loop,
        flow,
        results,
        audit: None,
    }
}

/// Storage key the sub-flow reads its input from.
const INPUT_KEY: &str = "in";
/// Storage key the sub-flow leaves its result under.
const OUTPUT_KEY: &str = "out";

fn encapsulate() -> Result<Demo, ScopeError> {
    let (input, output) = (StorageKey::new(INPUT_KEY)?, StorageKey::new(OUTPUT_KEY)?);
    let results = Collector::<String>::new();
    let times_ten = Sequence::new(vec![
        Node::source("load", StorageValueSource::new(input.clone())),
        Node::transformer("scale", MapTransformer::new(|v: &i64| v * 10)),
        Node::sink("store", SetStorageValue::<i64>::typed(output.clone())),
    ])
    .into_node("times-ten");
    let container = EncapsulationContainer::new(times_ten)
        .input_name(input)
        .output_name(output);

    let flow = Flow::sequence(
        "Flow",
        vec![
            Node::source("numbers", ConstantSource::new(vec![5_i64, 7])),
            SubFlow::new(container).into_node("call"),
            format_number(),
            Node::sink("results", results.clone()),
        ],
    );
    Ok(Demo {
        kind: DemoKind::Encapsulate,
        flow,
        results,
        audit: None,
    })
}
