//! Property-based tests for the report model and differ.
//!
//! Uses proptest to check the monoid laws of report combination, the
//! render/parse round trip, and the identities of report comparison.

use jspecify_conformance::{
    AssertionRegistry, ConformanceTestReport, ConformanceTestResult, ExpectedFact,
    ExpectedFactKind, ReportComparison,
};
use proptest::prelude::*;

const DIRECTIVES: &[&str] = &[
    "jspecify_nullness_mismatch",
    "test:cannot-convert:Object? to Object!",
    "test:irrelevant-annotation:@Nullable",
    "jspecify_nullness_mismatch see: no unexpected facts",
];

/// A report over one file: `(line, directive index, passed)` entries plus the
/// file aggregate outcome.
fn file_report(file: String) -> impl Strategy<Value = ConformanceTestReport> {
    (
        prop::collection::vec((1u32..40, 0usize..DIRECTIVES.len(), any::<bool>()), 0..8),
        any::<bool>(),
    )
        .prop_map(move |(entries, aggregate_passed)| {
            let registry = AssertionRegistry::standard();
            let mut results: Vec<ConformanceTestResult> = entries
                .into_iter()
                .map(|(line, directive, passed)| {
                    let text = DIRECTIVES[directive];
                    let kind = registry
                        .parse(text)
                        .unwrap_or(ExpectedFactKind::NullnessMismatch);
                    ConformanceTestResult::expected(
                        ExpectedFact::new(file.as_str(), line, text, kind),
                        passed,
                    )
                })
                .collect();
            let mut aggregate = ConformanceTestResult::no_unexpected_facts(file.as_str(), Vec::new());
            aggregate.passed = aggregate_passed;
            results.push(aggregate);
            ConformanceTestReport::from_results(results)
        })
}

fn disjoint_reports() -> impl Strategy<Value = (ConformanceTestReport, ConformanceTestReport, ConformanceTestReport)> {
    (
        file_report("a/A.java".to_string()),
        file_report("B.java".to_string()),
        file_report("c/nested/C.java".to_string()),
    )
}

proptest! {
    /// combine is associative over disjoint files
    #[test]
    fn prop_combine_associative((a, b, c) in disjoint_reports()) {
        let left = a.clone().combine(b.clone()).combine(c.clone());
        let right = a.combine(b.combine(c));
        prop_assert_eq!(left, right);
    }

    /// combine is commutative over disjoint files
    #[test]
    fn prop_combine_commutative((a, b, c) in disjoint_reports()) {
        let abc = a.clone().combine(b.clone()).combine(c.clone());
        let bac = b.combine(a.combine(c));
        prop_assert_eq!(abc.render(false), bac.render(false));
        prop_assert_eq!(abc, bac);
    }

    /// the empty report is the identity of combine
    #[test]
    fn prop_empty_is_identity((a, _b, _c) in disjoint_reports()) {
        prop_assert_eq!(a.clone().combine(ConformanceTestReport::empty()), a.clone());
        prop_assert_eq!(ConformanceTestReport::empty().combine(a.clone()), a);
    }
}

proptest! {
    /// parse(render(x)) renders byte-identically and compares equal to x
    #[test]
    fn prop_render_parse_round_trip((a, b, c) in disjoint_reports()) {
        let registry = AssertionRegistry::standard();
        let report = a.combine(b).combine(c);
        let text = report.render(false);
        let parsed = ConformanceTestReport::parse(&text, &registry);
        prop_assert!(parsed.is_ok());
        let parsed = parsed.unwrap_or_default();
        prop_assert_eq!(parsed.render(false), text);
        prop_assert!(ReportComparison::compare(&parsed, &report).reports_are_equal());
    }

    /// score is passes over total
    #[test]
    fn prop_score_counts((a, b, _c) in disjoint_reports()) {
        let report = a.combine(b);
        prop_assert_eq!(report.passes() + report.fails(), report.total());
        prop_assert_eq!(report.file_count(), 2);
        let expected = 100.0 * report.passes() as f64 / report.total() as f64;
        prop_assert_eq!(report.score(), Some(expected));
    }
}

proptest! {
    /// compare(x, x) finds no change
    #[test]
    fn prop_compare_self_is_equal((a, b, c) in disjoint_reports()) {
        let report = a.combine(b).combine(c);
        prop_assert!(ReportComparison::compare(&report, &report).reports_are_equal());
    }

    /// against an empty baseline everything is new
    #[test]
    fn prop_compare_with_empty_baseline((a, b, _c) in disjoint_reports()) {
        let report = a.combine(b);
        let diff = ReportComparison::compare(&report, &ConformanceTestReport::empty());
        prop_assert!(diff.newly_failing.is_empty());
        prop_assert!(diff.newly_fixed.is_empty());
        prop_assert!(diff.deleted.is_empty());
        prop_assert_eq!(diff.new_passing.len(), report.passes());
        prop_assert_eq!(diff.new_failing.len(), report.fails());
    }

    /// against an empty current report everything is deleted
    #[test]
    fn prop_compare_with_empty_current((a, _b, _c) in disjoint_reports()) {
        let diff = ReportComparison::compare(&ConformanceTestReport::empty(), &a);
        prop_assert_eq!(diff.deleted.len(), a.total());
        prop_assert!(diff.new_passing.is_empty() && diff.new_failing.is_empty());
    }
}
