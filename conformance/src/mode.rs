//! Run modes: what a conformance run does with the report it builds.

use std::fmt;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::compare::ReportComparison;
use crate::error::ModeError;
use crate::registry::AssertionRegistry;
use crate::report::{display_path, ConformanceTestAssertion, ConformanceTestReport};

/// Environment variable selecting the run mode.
pub const MODE_ENV_VAR: &str = "JSPECIFY_CONFORMANCE_TEST_MODE";

/// Paths required by a conformance run.
#[derive(Debug, Clone)]
pub struct ConformancePaths {
    /// Root directory of the annotated test sources.
    pub tests_root: PathBuf,
    /// Stored report compared against or overwritten.
    pub report: PathBuf,
    /// Recorded analyzer findings.
    pub facts: PathBuf,
}

/// What to do with the current report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Fail if the report text differs from the stored report.
    #[default]
    Compare,
    /// Overwrite the stored report.
    Write,
    /// Fail unless every assertion passes, listing what went wrong.
    Details,
}

impl RunMode {
    /// Reads the mode from [`MODE_ENV_VAR`], defaulting to compare.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable names no mode.
    pub fn from_env() -> Result<Self, ModeError> {
        match std::env::var(MODE_ENV_VAR) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl FromStr for RunMode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compare" => Ok(Self::Compare),
            "write" => Ok(Self::Write),
            "details" => Ok(Self::Details),
            _ => Err(ModeError::Unrecognized {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Compare => "compare",
            Self::Write => "write",
            Self::Details => "details",
        })
    }
}

/// The result of applying a run mode.
#[derive(Debug, Clone)]
pub struct ModeOutcome {
    /// Whether the run succeeded.
    pub passed: bool,
    /// Human-readable explanation.
    pub message: String,
    /// Semantic diff against the stored report, in compare mode.
    pub comparison: Option<ReportComparison>,
}

/// Applies `mode` to `report`, reading or writing `report_path`.
///
/// # Errors
///
/// Returns an error if the stored report cannot be read (compare), parsed
/// (compare, when it differs), or written (write).
pub fn run_mode(
    mode: RunMode,
    report: &ConformanceTestReport,
    report_path: &Path,
    registry: &AssertionRegistry,
) -> Result<ModeOutcome> {
    match mode {
        RunMode::Compare => compare_with_stored(report, report_path, registry),
        RunMode::Write => write_report(report, report_path),
        RunMode::Details => Ok(details(report)),
    }
}

fn compare_with_stored(
    report: &ConformanceTestReport,
    report_path: &Path,
    registry: &AssertionRegistry,
) -> Result<ModeOutcome> {
    let stored = std::fs::read_to_string(report_path)
        .with_context(|| format!("Cannot read stored report {}", report_path.display()))?;
    let current = report.render(false);
    if stored == current {
        return Ok(ModeOutcome {
            passed: true,
            message: format!("Report matches {}", report_path.display()),
            comparison: None,
        });
    }

    let baseline = ConformanceTestReport::parse(&stored, registry)
        .with_context(|| format!("Cannot parse stored report {}", report_path.display()))?;
    let comparison = ReportComparison::compare(report, &baseline);
    let mut message = format!("Report differs from {}", report_path.display());
    if comparison.reports_are_equal() {
        message.push_str(" (text only; no assertion changed)");
    } else {
        let _ = write!(message, ":\n{}", comparison);
    }
    Ok(ModeOutcome {
        passed: false,
        message,
        comparison: Some(comparison),
    })
}

fn write_report(report: &ConformanceTestReport, report_path: &Path) -> Result<ModeOutcome> {
    if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    std::fs::write(report_path, report.render(false))
        .with_context(|| format!("Cannot write report {}", report_path.display()))?;
    Ok(ModeOutcome {
        passed: true,
        message: format!("Wrote {}", report_path.display()),
        comparison: None,
    })
}

fn details(report: &ConformanceTestReport) -> ModeOutcome {
    if report.all_passed() {
        return ModeOutcome {
            passed: true,
            message: format!("All {} assertions passed", report.total()),
            comparison: None,
        };
    }

    let mut message = String::new();
    let mut current_file: Option<&Path> = None;
    for result in report.results().iter().filter(|r| !r.passed) {
        let file = result.assertion.file();
        if current_file != Some(file) {
            let _ = writeln!(message, "{}:", display_path(file));
            current_file = Some(file);
        }
        match &result.assertion {
            ConformanceTestAssertion::Expected(_) => {
                let _ = writeln!(message, "  missing expected fact: {}", result.assertion.render());
            }
            ConformanceTestAssertion::NoUnexpectedFacts { .. } => {
                for fact in result.unexpected_facts.iter().filter(|f| f.must_be_expected) {
                    let _ = writeln!(
                        message,
                        "  unexpected fact: {}:{} {}",
                        display_path(file),
                        fact.line_number,
                        fact.text
                    );
                }
            }
        }
    }
    ModeOutcome {
        passed: false,
        message,
        comparison: None,
    }
}
