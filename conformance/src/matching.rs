//! Matching engine: pairs one file's expected facts with its reported facts.

use std::collections::BTreeMap;
use std::path::Path;

use crate::fact::{ExpectedFact, Fact, ReportedFact};
use crate::report::{ConformanceTestReport, ConformanceTestResult, UnmatchedFact};

/// Matches `expected` against `reported` for a single file.
///
/// Only facts whose file is `file` take part. On each line, expectations are
/// tried in source order and each claims the first remaining reported fact
/// that satisfies it, so a reported fact is consumed at most once and earlier
/// expectations win ambiguous matches. Reported facts left over anywhere in
/// the file fail the file's aggregate assertion if they must be expected.
pub fn match_file<R: ReportedFact>(
    file: &Path,
    expected: &[ExpectedFact],
    reported: &[R],
) -> ConformanceTestReport {
    let mut remaining: BTreeMap<u32, Vec<&R>> = BTreeMap::new();
    for fact in reported.iter().filter(|f| f.file() == file) {
        remaining.entry(fact.line_number()).or_default().push(fact);
    }

    let mut results = Vec::with_capacity(expected.len() + 1);
    for fact in expected.iter().filter(|f| f.file() == file) {
        let on_line = remaining.entry(fact.line_number()).or_default();
        let claimed = on_line
            .iter()
            .position(|r| fact.is_satisfied_by(*r))
            .map(|i| on_line.remove(i));
        if claimed.is_none() {
            tracing::debug!(
                file = %file.display(),
                line = fact.line_number(),
                kind = fact.kind().name(),
                "expectation not satisfied"
            );
        }
        results.push(ConformanceTestResult::expected(
            fact.clone(),
            claimed.is_some(),
        ));
    }

    let unexpected: Vec<UnmatchedFact> = remaining
        .into_values()
        .flatten()
        .map(|r| UnmatchedFact {
            line_number: r.line_number(),
            must_be_expected: r.must_be_expected(),
            text: r.fact_text(),
        })
        .collect();

    tracing::debug!(
        file = %file.display(),
        expected = results.len(),
        unmatched = unexpected.len(),
        "matched file"
    );

    results.push(ConformanceTestResult::no_unexpected_facts(file, unexpected));
    ConformanceTestReport::from_results(results)
}
