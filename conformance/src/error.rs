//! Error types raised by the oracle.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A single malformed directive found while reading a source file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}:{line}: {kind} (in `{text}`)", .file.display())]
pub struct GrammarError {
    /// File containing the directive.
    pub file: PathBuf,
    /// Line of the offending directive comment.
    pub line: u32,
    /// Raw directive text.
    pub text: String,
    /// What is wrong with it.
    pub kind: GrammarErrorKind,
}

/// The ways a directive run can be malformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarErrorKind {
    /// The directive body matches no known grammar.
    #[error("unrecognized expectation")]
    Unrecognized,
    /// A `test:name` directive follows an expectation in the same run.
    #[error("test name must come before assertions for a line")]
    NameAfterAssertion,
    /// A second `test:name` directive in the same run.
    #[error("test name already set")]
    NameAlreadySet,
    /// The name parses as an integer or contains a colon.
    #[error("test name cannot be an integer or contain a colon")]
    InvalidName,
    /// A named run carries no real expectation.
    #[error("no expected facts")]
    NoExpectedFacts,
    /// The same name labels several line groups in one file.
    #[error("test name not unique: test '{name}' appears on tests of lines {lines:?}")]
    NameNotUnique {
        /// The duplicated name.
        name: String,
        /// Every decorated line carrying the name, ascending.
        lines: Vec<u32>,
    },
}

/// Every grammar error collected from one file, raised together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ExpectationErrors {
    /// The collected errors in source order.
    pub errors: Vec<GrammarError>,
}

impl fmt::Display for ExpectationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} malformed expectation(s):", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

/// A stored report line that does not follow the report format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportParseError {
    /// The line is neither a comment, a result, nor a detail line.
    #[error("report line {line}: unrecognized line `{text}`")]
    MalformedLine {
        /// 1-based line within the report.
        line: usize,
        /// The line text.
        text: String,
    },
    /// The fact text of a result line matches no known grammar.
    #[error("report line {line}: unrecognized expectation `{text}`")]
    UnknownExpectation {
        /// 1-based line within the report.
        line: usize,
        /// The fact text.
        text: String,
    },
}

/// An unrecognized run-mode value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModeError {
    /// The value names no mode.
    #[error("unrecognized conformance test mode `{value}`; valid modes are: compare, write, details")]
    Unrecognized {
        /// The rejected value.
        value: String,
    },
}
