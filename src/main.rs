// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use flowtree::config::{load_and_validate_config, EngineConfig};
use flowtree::demos::{self, Demo, DemoKind};
use flowtree::engine::RunReport;
use flowtree::errors::FlowError;
use tracing_subscriber::EnvFilter;

/// Run one of the built-in actor-tree demos.
#[derive(Parser, Debug)]
#[command(name = "flowtree", version, about)]
struct Args {
    /// Engine configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Demo flow to run
    #[arg(short, long, value_enum, default_value = "pipeline")]
    demo: DemoArg,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DemoArg {
    Pipeline,
    Loop,
    Encapsulate,
}

impl From<DemoArg> for DemoKind {
    fn from(arg: DemoArg) -> Self {
        match arg {
            DemoArg::Pipeline => DemoKind::Pipeline,
            DemoArg::Loop => DemoKind::Loop,
            DemoArg::Encapsulate => DemoKind::Encapsulate,
        }
    }
}

fn init_tracing(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_and_validate_config(path)?,
        None => EngineConfig::default(),
    };
    init_tracing(&config);

    let kind = DemoKind::from(args.demo);
    let Demo {
        flow,
        results,
        audit,
        ..
    } = demos::build(kind)?;
    let mut flow = flow.with_config(config);

    if !args.json {
        println!("🌳 flowtree demo: {}", kind);
        println!("   {}", kind.description());
        println!();
    }

    match flow.run().await {
        Ok(report) => {
            let audit = audit.map(|a| a.values());
            if args.json {
                print_json(kind, &report, &results.values(), audit.as_deref())?;
            } else {
                print_report(&report, &results.values(), audit.as_deref());
            }
            Ok(())
        }
        Err(error) => {
            eprintln!("❌ Flow failed at '{}': {}", error.failing_path(), error);
            std::process::exit(1);
        }
    }
}

fn print_report(report: &RunReport, results: &[String], audit: Option<&[String]>) {
    println!("📊 Results:");
    for (i, value) in results.iter().enumerate() {
        println!("  {}. {}", i + 1, value);
    }
    if let Some(audit) = audit {
        println!("🔍 Audit:");
        for value in audit {
            println!("  • {}", value);
        }
    }
    println!();
    println!("⏱️  Duration: {:?}", report.duration);
    if report.stopped {
        println!(
            "🛑 Stopped: {}",
            report.stop_message.as_deref().unwrap_or("no message")
        );
    }
    print_errors("⚠️  Recorded errors", &report.errors);
    print_errors("🧹 Cleanup errors", &report.cleanup_errors);
}

fn print_errors(title: &str, errors: &[FlowError]) {
    if errors.is_empty() {
        return;
    }
    println!("{} ({}):", title, errors.len());
    for error in errors {
        println!("  • {}", error);
    }
}

fn print_json(
    kind: DemoKind,
    report: &RunReport,
    results: &[String],
    audit: Option<&[String]>,
) -> anyhow::Result<()> {
    let to_strings = |errors: &[FlowError]| errors.iter().map(ToString::to_string).collect::<Vec<_>>();
    let document = serde_json::json!({
        "demo": kind.name(),
        "results": results,
        "audit": audit,
        "errors": to_strings(&report.errors),
        "cleanup_errors": to_strings(&report.cleanup_errors),
        "stopped": report.stopped,
        "stop_message": report.stop_message,
        "duration_ms": report.duration.as_millis() as u64,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
