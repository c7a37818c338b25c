//! Report differ: classifies every assertion of two reports by how its
//! outcome changed.

use std::collections::HashMap;
use std::fmt;

use crate::report::{ConformanceTestAssertion, ConformanceTestReport};

/// The semantic difference between a current report and a baseline.
///
/// Assertions are joined on identity, never on position. Identical
/// assertions repeated on one line are paired in order of occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportComparison {
    /// Passed in the baseline, fails now.
    pub newly_failing: Vec<ConformanceTestAssertion>,
    /// Failed in the baseline, passes now.
    pub newly_fixed: Vec<ConformanceTestAssertion>,
    /// Only in the current report, failing.
    pub new_failing: Vec<ConformanceTestAssertion>,
    /// Only in the current report, passing.
    pub new_passing: Vec<ConformanceTestAssertion>,
    /// Only in the baseline.
    pub deleted: Vec<ConformanceTestAssertion>,
}

type Outcomes<'a> = HashMap<(&'a ConformanceTestAssertion, usize), bool>;

fn outcomes(report: &ConformanceTestReport) -> Outcomes<'_> {
    let mut seen: HashMap<&ConformanceTestAssertion, usize> = HashMap::new();
    report
        .results()
        .iter()
        .map(|r| {
            let occurrence = seen.entry(&r.assertion).or_default();
            let key = (&r.assertion, *occurrence);
            *occurrence += 1;
            (key, r.passed)
        })
        .collect()
}

impl ReportComparison {
    /// Compares `current` against `baseline`.
    pub fn compare(current: &ConformanceTestReport, baseline: &ConformanceTestReport) -> Self {
        let now = outcomes(current);
        let before = outcomes(baseline);
        let mut comparison = Self::default();

        for (key, passed) in &now {
            let assertion = key.0.clone();
            match (before.get(key).copied(), *passed) {
                (Some(true), false) => comparison.newly_failing.push(assertion),
                (Some(false), true) => comparison.newly_fixed.push(assertion),
                (Some(_), _) => {}
                (None, false) => comparison.new_failing.push(assertion),
                (None, true) => comparison.new_passing.push(assertion),
            }
        }
        for key in before.keys() {
            if !now.contains_key(key) {
                comparison.deleted.push(key.0.clone());
            }
        }

        comparison.newly_failing.sort();
        comparison.newly_fixed.sort();
        comparison.new_failing.sort();
        comparison.new_passing.sort();
        comparison.deleted.sort();
        comparison
    }

    /// Returns true if no assertion changed.
    pub fn reports_are_equal(&self) -> bool {
        self.newly_failing.is_empty()
            && self.newly_fixed.is_empty()
            && self.new_failing.is_empty()
            && self.new_passing.is_empty()
            && self.deleted.is_empty()
    }

    /// Returns true if any previously passing assertion now fails.
    pub fn has_regressions(&self) -> bool {
        !self.newly_failing.is_empty()
    }
}

impl fmt::Display for ReportComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sections = [
            ("newly failing", &self.newly_failing),
            ("newly fixed", &self.newly_fixed),
            ("new failing", &self.new_failing),
            ("new passing", &self.new_passing),
            ("deleted", &self.deleted),
        ];
        for (label, assertions) in sections {
            for assertion in assertions {
                writeln!(f, "{}: {}", label, assertion.render())?;
            }
        }
        Ok(())
    }
}
