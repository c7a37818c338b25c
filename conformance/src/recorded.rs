//! Recorded-analyzer adapter: replays findings captured from a real analyzer
//! run as a JSON array.
//!
//! ```json
//! [
//!   { "file": "Foo.java", "line": 12, "key": "dereference.of.nullable",
//!     "kind": "error", "message": "dereference of possibly-null reference x" },
//!   { "file": "Foo.java", "line": 15, "key": "sink.type",
//!     "kind": "note", "args": ["Object!", "param"] }
//! ]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::analyzer::Analyzer;
use crate::fact::{Fact, ReportedFact};

/// Diagnostic keys that report a nullness mismatch.
pub const NULLNESS_MISMATCH_KEYS: &[&str] = &[
    "argument",
    "assignment",
    "atomicreference.must.include.null",
    "cast.unsafe",
    "dereference.of.nullable",
    "lambda.param",
    "methodref.receiver.bound",
    "methodref.receiver",
    "methodref.return",
    "override.param",
    "override.return",
    "return",
    "threadlocal.must.include.null",
    "type.argument",
];

const EXPRESSION_TYPE_KEY: &str = "expression.type";
const IRRELEVANT_ANNOTATION_KEY: &str = "irrelevant.annotation";
const SINK_TYPE_KEY: &str = "sink.type";

/// Severity of a recorded diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Shown to users as an error.
    Error,
    /// Shown to users as a warning.
    Warning,
    /// Informational output only.
    Note,
}

/// One recorded diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecordedFact {
    /// Source file relative to the test root.
    pub file: PathBuf,
    /// 1-based line.
    pub line: u32,
    /// Message key identifying the diagnostic.
    pub key: String,
    /// Severity.
    pub kind: DiagnosticKind,
    /// Rendered message.
    #[serde(default)]
    pub message: String,
    /// Structured message arguments.
    #[serde(default)]
    pub args: Vec<String>,
}

impl RecordedFact {
    fn is_nullness_mismatch(&self) -> bool {
        NULLNESS_MISMATCH_KEYS.contains(&self.key.as_str())
    }

    fn args_are(&self, key: &str, expected: &[&str]) -> bool {
        self.key == key && self.args.iter().map(String::as_str).eq(expected.iter().copied())
    }
}

impl Fact for RecordedFact {
    fn file(&self) -> &Path {
        &self.file
    }

    fn line_number(&self) -> u32 {
        self.line
    }
}

impl ReportedFact for RecordedFact {
    fn must_be_expected(&self) -> bool {
        self.kind == DiagnosticKind::Error
    }

    fn fact_text(&self) -> String {
        if self.message.is_empty() {
            self.key.clone()
        } else {
            format!("({}) {}", self.key, self.message)
        }
    }

    fn matches_nullness_mismatch(&self) -> bool {
        self.is_nullness_mismatch()
    }

    /// Classified like the legacy directive; the source and sink types are
    /// not compared.
    fn matches_cannot_convert(&self, _source_type: &str, _sink_type: &str) -> bool {
        self.is_nullness_mismatch()
    }

    fn matches_expression_type(&self, expression_type: &str, expression: &str) -> bool {
        self.args_are(EXPRESSION_TYPE_KEY, &[expression_type, expression])
    }

    fn matches_irrelevant_annotation(&self, annotation: &str) -> bool {
        self.args_are(IRRELEVANT_ANNOTATION_KEY, &[annotation])
    }

    fn matches_sink_type(&self, sink_type: &str, sink: &str) -> bool {
        self.args_are(SINK_TYPE_KEY, &[sink_type, sink])
    }
}

/// Replays a recorded analyzer run.
#[derive(Debug, Clone, Default)]
pub struct RecordedAnalyzer {
    facts: Vec<RecordedFact>,
}

impl RecordedAnalyzer {
    /// Creates an analyzer from facts already in memory.
    pub fn new(facts: Vec<RecordedFact>) -> Self {
        Self { facts }
    }

    /// Parses a JSON dump.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not an array of recorded facts.
    pub fn from_json(json: &str) -> Result<Self> {
        let facts: Vec<RecordedFact> =
            serde_json::from_str(json).context("Invalid recorded facts JSON")?;
        Ok(Self::new(facts))
    }

    /// Reads a JSON dump from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("In {}", path.display()))
    }

    /// Number of recorded facts.
    pub fn len(&self) -> usize {
        self.facts.len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl Analyzer for RecordedAnalyzer {
    type Fact = RecordedFact;

    fn analyze(&self, _root: &Path, files: &[PathBuf]) -> Result<Vec<RecordedFact>> {
        Ok(self
            .facts
            .iter()
            .filter(|f| files.contains(&f.file))
            .cloned()
            .collect())
    }
}
