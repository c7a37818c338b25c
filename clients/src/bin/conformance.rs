//! `jspecify-conformance`: runs the JSpecify conformance oracle over a test corpus.
//!
//! Reads the annotated sources under `--root`, replays the analyzer findings
//! recorded in `--facts`, and applies the selected run mode to the resulting
//! report:
//! - `compare` (default): fail if the report differs from `--report`
//! - `write`: overwrite `--report`
//! - `details`: fail unless every assertion passes, listing the failures
//!
//! **Usage:**
//! ```text
//! JSPECIFY_CONFORMANCE_TEST_MODE=details jspecify-conformance --root samples --facts facts.json
//! ```
//!
//! Exits non-zero if the run mode fails.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;
use jspecify_conformance::{
    discover_groups, run_conformance, run_mode, AssertionRegistry, ConformancePaths,
    RecordedAnalyzer, RunMode,
};
use tracing_subscriber::EnvFilter;

/// Run the JSpecify conformance oracle.
#[derive(Parser)]
#[command(
    name = "jspecify-conformance",
    about = "Check analyzer findings against inline JSpecify conformance expectations"
)]
struct Args {
    /// Root directory of the annotated test sources.
    #[arg(long, default_value = "samples")]
    root: PathBuf,

    /// JSON dump of the analyzer's reported facts.
    #[arg(long, default_value = "facts.json")]
    facts: PathBuf,

    /// Stored report to compare against or overwrite.
    #[arg(long, default_value = "tests/ConformanceTestsResults.txt")]
    report: PathBuf,

    /// Source file extension to collect.
    #[arg(long, default_value = "java")]
    extension: String,

    /// Run mode: compare, write, or details (case-insensitive). Defaults to
    /// `JSPECIFY_CONFORMANCE_TEST_MODE`, then to compare.
    #[arg(long)]
    mode: Option<RunMode>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mode = match args.mode {
        Some(mode) => mode,
        None => RunMode::from_env()?,
    };
    let paths = ConformancePaths {
        tests_root: args.root,
        report: args.report,
        facts: args.facts,
    };

    let registry = AssertionRegistry::standard();
    let analyzer = RecordedAnalyzer::load(&paths.facts)?;
    let groups = discover_groups(&paths.tests_root, &args.extension)?;
    let report = run_conformance(&paths.tests_root, &groups, &analyzer, &registry)?;

    if mode == RunMode::Details {
        print!("{}", report.render(true));
        println!();
    }

    let outcome = run_mode(mode, &report, &paths.report, &registry)?;
    if !outcome.passed {
        eprintln!("{}", outcome.message.trim_end());
        eprintln!("Conformance FAILED ({} mode).", mode);
        process::exit(1);
    }

    println!("{}", outcome.message);
    println!("Conformance PASSED ({} mode).", mode);
    Ok(())
}
