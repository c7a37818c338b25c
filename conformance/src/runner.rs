//! Parallel driver: builds the report for a whole corpus.
//!
//! Each file group is an independent unit of work. Workers return partial
//! reports over disjoint files, which are folded with
//! [`ConformanceTestReport::combine`].

use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::analyzer::Analyzer;
use crate::corpus::{FileGroup, SourceFile};
use crate::matching::match_file;
use crate::reader::{read_expected_facts, ParsedFile};
use crate::registry::AssertionRegistry;
use crate::report::ConformanceTestReport;

/// Runs the oracle over every group under `root`.
///
/// # Errors
///
/// Returns the first I/O, grammar, or analyzer error encountered; grammar
/// errors list every malformed directive in the offending file.
pub fn run_conformance<A: Analyzer>(
    root: &Path,
    groups: &[FileGroup],
    analyzer: &A,
    registry: &AssertionRegistry,
) -> Result<ConformanceTestReport> {
    let report = groups
        .par_iter()
        .map(|group| run_group(root, group, analyzer, registry))
        .try_reduce(ConformanceTestReport::empty, |a, b| Ok(a.combine(b)))?;

    tracing::info!(
        groups = groups.len(),
        files = report.file_count(),
        passes = report.passes(),
        total = report.total(),
        "conformance run complete"
    );
    Ok(report)
}

/// Builds the partial report for one group.
///
/// # Errors
///
/// Returns an error if a file cannot be read, has malformed directives, or
/// the analyzer fails on the group.
pub fn run_group<A: Analyzer>(
    root: &Path,
    group: &FileGroup,
    analyzer: &A,
    registry: &AssertionRegistry,
) -> Result<ConformanceTestReport> {
    let mut parsed: Vec<(&Path, ParsedFile)> = Vec::with_capacity(group.files.len());
    for file in &group.files {
        let source = SourceFile::load(root, file)?;
        let facts = read_expected_facts(registry, &source.path, &source.text)
            .with_context(|| format!("Malformed expectations in {}", source.path.display()))?;
        parsed.push((file.as_path(), facts));
    }

    let reported = analyzer
        .analyze(root, &group.files)
        .with_context(|| format!("Analyzer failed on group {:?}", group.files))?;

    let mut report = ConformanceTestReport::empty();
    for (file, facts) in parsed {
        let partial = match_file(file, &facts.expected_facts, &reported);
        for result in partial.results().iter().filter(|r| !r.passed) {
            let Some(line) = result.assertion.line_number() else {
                continue;
            };
            if let Some(name) = facts.test_names.get(&line) {
                tracing::info!(file = %file.display(), line, test = %name, "named test failed");
            }
        }
        report = report.combine(partial);
    }
    Ok(report)
}
