//! End-to-end oracle scenarios: directive parsing, matching, and grammar
//! validation on small in-memory sources.

use std::path::{Path, PathBuf};

use jspecify_conformance::{
    match_file, read_expected_facts, AssertionRegistry, ConformanceTestReport, ExpectationErrors,
    Fact, ReportedFact,
};

/// A reported fact with a configurable mismatch classification.
struct Reported {
    file: PathBuf,
    line: u32,
    mismatch: bool,
    error: bool,
}

impl Reported {
    fn mismatch(line: u32) -> Self {
        Self {
            file: PathBuf::from("Sample.java"),
            line,
            mismatch: true,
            error: true,
        }
    }

    fn unrelated_error(line: u32) -> Self {
        Self {
            mismatch: false,
            ..Self::mismatch(line)
        }
    }
}

impl Fact for Reported {
    fn file(&self) -> &Path {
        &self.file
    }

    fn line_number(&self) -> u32 {
        self.line
    }
}

impl ReportedFact for Reported {
    fn must_be_expected(&self) -> bool {
        self.error
    }

    fn fact_text(&self) -> String {
        format!("reported on line {}", self.line)
    }

    fn matches_nullness_mismatch(&self) -> bool {
        self.mismatch
    }

    fn matches_cannot_convert(&self, _source_type: &str, _sink_type: &str) -> bool {
        self.mismatch
    }
}

fn run(lines: &[&str], reported: &[Reported]) -> Result<ConformanceTestReport, ExpectationErrors> {
    let registry = AssertionRegistry::standard();
    let file = Path::new("Sample.java");
    let parsed = read_expected_facts(&registry, file, &lines.join("\n"))?;
    Ok(match_file(file, &parsed.expected_facts, reported))
}

fn error_messages(lines: &[&str]) -> Vec<String> {
    run(lines, &[])
        .err()
        .map(|e| e.errors.iter().map(|e| e.kind.to_string()).collect())
        .unwrap_or_default()
}

#[test]
fn simple_pass() -> Result<(), ExpectationErrors> {
    let report = run(
        &["// jspecify_nullness_mismatch", "foo();"],
        &[Reported::mismatch(2)],
    )?;
    assert_eq!(
        report.render(false),
        "# 2 pass; 0 fail; 2 total; 100.0% score\n\
         PASS: Sample.java:2 jspecify_nullness_mismatch\n\
         PASS: Sample.java: no unexpected facts\n"
    );
    Ok(())
}

#[test]
fn unexpected_fact_fails_both_assertions() -> Result<(), ExpectationErrors> {
    let report = run(
        &["// jspecify_nullness_mismatch", "foo();"],
        &[Reported::unrelated_error(2)],
    )?;
    assert_eq!(
        report.render(true),
        "# 0 pass; 2 fail; 2 total; 0.0% score\n\
         FAIL: Sample.java:2 jspecify_nullness_mismatch\n\
         FAIL: Sample.java: no unexpected facts\n\
         OOPS: Sample.java:2 reported on line 2\n"
    );
    Ok(())
}

#[test]
fn integer_test_name_is_rejected() {
    assert_eq!(
        error_messages(&["// test:name: 1234", "foo();"]),
        vec!["test name cannot be an integer or contain a colon"]
    );
}

#[test]
fn duplicate_test_names_are_rejected() {
    let messages = error_messages(&[
        "// test:name:testName",
        "// jspecify_nullness_mismatch",
        "a();",
        "",
        "// test:name:testName",
        "// jspecify_nullness_mismatch",
        "b();",
    ]);
    assert_eq!(
        messages,
        vec!["test name not unique: test 'testName' appears on tests of lines [3, 7]"]
    );
}

#[test]
fn run_decorates_first_code_line() -> Result<(), ExpectationErrors> {
    let report = run(
        &[
            "class Sample {",
            "  // jspecify_nullness_mismatch",
            "  // test:cannot-convert:Object? to Object!",
            "  Object o = nullable();",
            "}",
        ],
        &[Reported::mismatch(4), Reported::mismatch(4)],
    )?;
    let lines: Vec<Option<u32>> = report
        .results()
        .iter()
        .map(|r| r.assertion.line_number())
        .collect();
    assert_eq!(lines, vec![Some(4), Some(4), None]);
    assert!(report.all_passed());
    Ok(())
}

#[test]
fn scarce_facts_go_to_the_first_declared_expectation() -> Result<(), ExpectationErrors> {
    let report = run(
        &[
            "// test:cannot-convert:A? to A!",
            "// jspecify_nullness_mismatch",
            "foo();",
        ],
        &[Reported::mismatch(3)],
    )?;
    let outcomes: Vec<(String, bool)> = report
        .results()
        .iter()
        .map(|r| (r.assertion.fact_text().to_string(), r.passed))
        .collect();
    // canonical order sorts by text; the cannot-convert directive claimed the fact
    assert_eq!(
        outcomes,
        vec![
            ("jspecify_nullness_mismatch".to_string(), false),
            ("test:cannot-convert:A? to A!".to_string(), true),
            ("no unexpected facts".to_string(), true),
        ]
    );
    Ok(())
}

#[test]
fn order_is_irrelevant_when_facts_suffice() -> Result<(), ExpectationErrors> {
    let facts = [Reported::mismatch(3), Reported::mismatch(3)];
    let forward = run(
        &[
            "// test:cannot-convert:A? to A!",
            "// jspecify_nullness_mismatch",
            "foo();",
        ],
        &facts,
    )?;
    let backward = run(
        &[
            "// jspecify_nullness_mismatch",
            "// test:cannot-convert:A? to A!",
            "foo();",
        ],
        &facts,
    )?;
    assert_eq!(forward.render(false), backward.render(false));
    assert!(forward.all_passed());
    Ok(())
}

#[test]
fn trailing_directives_produce_nothing() -> Result<(), ExpectationErrors> {
    let report = run(&["foo();", "// jspecify_nullness_mismatch"], &[])?;
    assert_eq!(report.total(), 1);
    assert!(report.all_passed());
    Ok(())
}
