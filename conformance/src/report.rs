//! Conformance report types: assertions, results, and report aggregation.
//!
//! A report is an immutable value. Partial reports over disjoint file sets
//! are folded with [`ConformanceTestReport::combine`], and results are always
//! kept in the canonical order so that rendering never depends on the order
//! in which files were processed.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::ReportParseError;
use crate::fact::{ExpectedFact, Fact};
use crate::registry::AssertionRegistry;

const NO_UNEXPECTED_FACTS: &str = "no unexpected facts";

/// A claim checked by a conformance run.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConformanceTestAssertion {
    /// A fact declared by a directive comment.
    Expected(ExpectedFact),
    /// The file produced no unmatched must-be-expected fact.
    NoUnexpectedFacts {
        /// The file the claim covers.
        file: PathBuf,
    },
}

impl ConformanceTestAssertion {
    /// The file the assertion belongs to.
    pub fn file(&self) -> &Path {
        match self {
            Self::Expected(fact) => fact.file(),
            Self::NoUnexpectedFacts { file } => file,
        }
    }

    /// The decorated line, or `None` for the file-level aggregate.
    pub fn line_number(&self) -> Option<u32> {
        match self {
            Self::Expected(fact) => Some(fact.line_number()),
            Self::NoUnexpectedFacts { .. } => None,
        }
    }

    /// The text rendered after the location in a report line.
    pub fn fact_text(&self) -> &str {
        match self {
            Self::Expected(fact) => fact.comment_text(),
            Self::NoUnexpectedFacts { .. } => NO_UNEXPECTED_FACTS,
        }
    }

    /// The report line body without its status prefix.
    pub fn render(&self) -> String {
        match self {
            Self::Expected(fact) => format!(
                "{}:{} {}",
                display_path(fact.file()),
                fact.line_number(),
                fact.comment_text()
            ),
            Self::NoUnexpectedFacts { file } => {
                format!("{}: {}", display_path(file), NO_UNEXPECTED_FACTS)
            }
        }
    }
}

impl Ord for ConformanceTestAssertion {
    /// File, then line-numbered assertions before the file aggregate, then
    /// line, then canonical text.
    fn cmp(&self, other: &Self) -> Ordering {
        self.file()
            .cmp(other.file())
            .then_with(|| match (self, other) {
                (Self::Expected(a), Self::Expected(b)) => a.cmp(b),
                (Self::Expected(_), Self::NoUnexpectedFacts { .. }) => Ordering::Less,
                (Self::NoUnexpectedFacts { .. }, Self::Expected(_)) => Ordering::Greater,
                (Self::NoUnexpectedFacts { .. }, Self::NoUnexpectedFacts { .. }) => {
                    Ordering::Equal
                }
            })
    }
}

impl PartialOrd for ConformanceTestAssertion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A reported fact left unconsumed after matching, kept for detail output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnmatchedFact {
    /// Line the analyzer reported it on.
    pub line_number: u32,
    /// Whether leaving it unmatched fails the file.
    pub must_be_expected: bool,
    /// The analyzer's description of the fact.
    pub text: String,
}

/// The outcome of one assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConformanceTestResult {
    /// The assertion checked.
    pub assertion: ConformanceTestAssertion,
    /// Whether it held.
    pub passed: bool,
    /// Unconsumed reported facts; only populated for the file aggregate and
    /// never serialized.
    pub unexpected_facts: Vec<UnmatchedFact>,
}

impl ConformanceTestResult {
    /// Creates a result for an expected fact.
    pub fn expected(fact: ExpectedFact, passed: bool) -> Self {
        Self {
            assertion: ConformanceTestAssertion::Expected(fact),
            passed,
            unexpected_facts: Vec::new(),
        }
    }

    /// Creates the file-level aggregate result; it passes iff none of the
    /// unmatched facts must be expected.
    pub fn no_unexpected_facts(file: impl Into<PathBuf>, unexpected: Vec<UnmatchedFact>) -> Self {
        Self {
            assertion: ConformanceTestAssertion::NoUnexpectedFacts { file: file.into() },
            passed: !unexpected.iter().any(|f| f.must_be_expected),
            unexpected_facts: unexpected,
        }
    }

    /// `PASS` or `FAIL`.
    pub fn status(&self) -> &'static str {
        if self.passed {
            "PASS"
        } else {
            "FAIL"
        }
    }
}

/// Aggregated results for a set of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConformanceTestReport {
    results: Vec<ConformanceTestResult>,
}

impl ConformanceTestReport {
    /// The report over no files; the identity of [`ConformanceTestReport::combine`].
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a report from results in any order.
    pub fn from_results(results: impl IntoIterator<Item = ConformanceTestResult>) -> Self {
        let mut results: Vec<_> = results.into_iter().collect();
        results.sort_by(|a, b| a.assertion.cmp(&b.assertion));
        Self { results }
    }

    /// Combines two reports over disjoint file sets.
    ///
    /// Associative and commutative as long as no file appears in both.
    pub fn combine(self, other: Self) -> Self {
        let mut results = self.results;
        results.extend(other.results);
        Self::from_results(results)
    }

    /// All results in canonical order.
    pub fn results(&self) -> &[ConformanceTestResult] {
        &self.results
    }

    /// Count of passing assertions.
    pub fn passes(&self) -> usize {
        self.results.iter().filter(|r| r.passed).count()
    }

    /// Count of failing assertions.
    pub fn fails(&self) -> usize {
        self.total() - self.passes()
    }

    /// Expected facts plus one aggregate assertion per file.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of files covered.
    pub fn file_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| matches!(r.assertion, ConformanceTestAssertion::NoUnexpectedFacts { .. }))
            .count()
    }

    /// Percentage of passing assertions, or `None` for a report over no files.
    pub fn score(&self) -> Option<f64> {
        match self.total() {
            0 => None,
            total => Some(100.0 * self.passes() as f64 / total as f64),
        }
    }

    /// Returns true if every assertion passed.
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(|r| r.passed)
    }

    /// Renders the canonical text form.
    ///
    /// With `details`, every unmatched fact is listed after its file's
    /// aggregate line, tagged `OOPS` if it must be expected and `INFO`
    /// otherwise. Detail lines are for humans and are never stored.
    pub fn render(&self, details: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# {} pass; {} fail; {} total; {:.1}% score",
            self.passes(),
            self.fails(),
            self.total(),
            self.score().unwrap_or(100.0)
        );
        for result in &self.results {
            let _ = writeln!(out, "{}: {}", result.status(), result.assertion.render());
            if !details {
                continue;
            }
            for fact in &result.unexpected_facts {
                let tag = if fact.must_be_expected { "OOPS" } else { "INFO" };
                let _ = writeln!(
                    out,
                    "{}: {}:{} {}",
                    tag,
                    display_path(result.assertion.file()),
                    fact.line_number,
                    fact.text
                );
            }
        }
        out
    }

    /// Reads a report back from its canonical text.
    ///
    /// The header is recomputed rather than trusted; blank lines and detail
    /// lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error for a line outside the report format, or a fact text
    /// that no grammar in `registry` accepts.
    pub fn parse(text: &str, registry: &AssertionRegistry) -> Result<Self, ReportParseError> {
        let mut results = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            if line.trim().is_empty()
                || line.starts_with('#')
                || line.starts_with("OOPS: ")
                || line.starts_with("INFO: ")
            {
                continue;
            }
            let malformed = || ReportParseError::MalformedLine {
                line: line_no,
                text: line.to_string(),
            };
            let (passed, body) = if let Some(body) = line.strip_prefix("PASS: ") {
                (true, body)
            } else if let Some(body) = line.strip_prefix("FAIL: ") {
                (false, body)
            } else {
                return Err(malformed());
            };

            let Some((file, line_number, fact_text)) = split_location(body) else {
                let file = body
                    .strip_suffix(&format!(": {}", NO_UNEXPECTED_FACTS))
                    .ok_or_else(malformed)?;
                results.push(ConformanceTestResult {
                    assertion: ConformanceTestAssertion::NoUnexpectedFacts {
                        file: PathBuf::from(file),
                    },
                    passed,
                    unexpected_facts: Vec::new(),
                });
                continue;
            };
            let kind = registry
                .parse(fact_text)
                .ok_or_else(|| ReportParseError::UnknownExpectation {
                    line: line_no,
                    text: fact_text.to_string(),
                })?;
            results.push(ConformanceTestResult::expected(
                ExpectedFact::new(file, line_number, fact_text, kind),
                passed,
            ));
        }

        Ok(Self::from_results(results))
    }
}

/// Splits `file:line fact` at the first `:<digits> ` after a non-empty file.
fn split_location(body: &str) -> Option<(&str, u32, &str)> {
    body.match_indices(':').find_map(|(i, _)| {
        if i == 0 {
            return None;
        }
        let (digits, fact) = body[i + 1..].split_once(' ')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some((&body[..i], digits.parse().ok()?, fact))
    })
}

/// Renders a path with `/` separators so reports are portable.
pub fn display_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
