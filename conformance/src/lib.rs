//! JSpecify conformance oracle.
//!
//! Test sources declare what an analyzer should report using directive
//! comments. This crate reads those expectations, matches them against the
//! facts an analyzer actually reported, and produces a stable, diffable
//! report that can be compared with a stored baseline.
//!
//! # Directive grammar
//!
//! | Directive | Variant |
//! |-----------|---------|
//! | `// jspecify_nullness_mismatch ...` | legacy nullness mismatch |
//! | `// test:cannot-convert:<source> to <sink>` | nullness mismatch with types |
//! | `// test:expression-type:<type>:<expression>` | informational |
//! | `// test:irrelevant-annotation:<annotation>` | informational |
//! | `// test:sink-type:<type>:<sink>` | informational |
//! | `// test:name:<name>` | labels the line group |
//!
//! # Entry Point
//!
//! ```no_run
//! use std::path::Path;
//! use jspecify_conformance::{
//!     discover_groups, run_conformance, AssertionRegistry, RecordedAnalyzer,
//! };
//!
//! let root = Path::new("samples");
//! let registry = AssertionRegistry::standard();
//! let analyzer = RecordedAnalyzer::load(Path::new("facts.json")).expect("facts");
//! let groups = discover_groups(root, "java").expect("corpus");
//! let report = run_conformance(root, &groups, &analyzer, &registry).expect("run");
//! print!("{}", report.render(false));
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod analyzer;
pub mod compare;
pub mod corpus;
pub mod error;
pub mod fact;
pub mod matching;
pub mod mode;
pub mod reader;
pub mod recorded;
pub mod registry;
pub mod report;
pub mod runner;

pub use analyzer::Analyzer;
pub use compare::ReportComparison;
pub use corpus::{discover_groups, FileGroup, SourceFile};
pub use error::{ExpectationErrors, GrammarError, GrammarErrorKind, ModeError, ReportParseError};
pub use fact::{ExpectedFact, ExpectedFactKind, Fact, ReportedFact};
pub use matching::match_file;
pub use mode::{run_mode, ConformancePaths, ModeOutcome, RunMode, MODE_ENV_VAR};
pub use reader::{read_expected_facts, ExpectationReader, ParsedFile};
pub use recorded::{DiagnosticKind, RecordedAnalyzer, RecordedFact};
pub use registry::{AssertionRegistry, DirectiveGrammar};
pub use report::{
    ConformanceTestAssertion, ConformanceTestReport, ConformanceTestResult, UnmatchedFact,
};
pub use runner::{run_conformance, run_group};
