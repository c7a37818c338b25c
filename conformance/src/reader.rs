//! Expectation parser: extracts expected facts from directive comments.
//!
//! A directive line is a line that, after leading whitespace, starts with
//! `// `. Consecutive directive lines form a run that decorates the first
//! following line that is not a directive line. A run at end of file
//! decorates nothing and is dropped.
//!
//! Every directive body must parse as `test:name:<name>` or against the
//! registry. Anything else is a grammar error, so a mistyped expectation is
//! never silently skipped.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{ExpectationErrors, GrammarError, GrammarErrorKind};
use crate::fact::{ExpectedFact, ExpectedFactKind};
use crate::registry::AssertionRegistry;

const DIRECTIVE_MARKER: &str = "// ";
const TEST_NAME_PREFIX: &str = "test:name:";

/// Expected facts read from one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    /// Expected facts in source order.
    pub expected_facts: Vec<ExpectedFact>,
    /// Test names keyed by the line their group decorates.
    pub test_names: BTreeMap<u32, String>,
}

/// An expectation buffered until the decorated line is known.
struct Pending {
    text: String,
    kind: ExpectedFactKind,
}

/// The directive run currently being read.
#[derive(Default)]
struct LineGroup {
    name: Option<(String, u32)>,
    pending: Vec<Pending>,
}

impl LineGroup {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.pending.is_empty()
    }
}

/// A directive classified by its body.
enum Directive<'a> {
    Name(&'a str),
    Expectation(ExpectedFactKind),
    Unrecognized,
}

/// Reads directive comments, collecting grammar errors across calls.
pub struct ExpectationReader<'r> {
    registry: &'r AssertionRegistry,
    errors: Vec<GrammarError>,
}

impl<'r> ExpectationReader<'r> {
    /// Creates a reader over the given registry.
    pub fn new(registry: &'r AssertionRegistry) -> Self {
        Self {
            registry,
            errors: Vec::new(),
        }
    }

    /// Reads every expectation in `text`, recording grammar errors instead of
    /// stopping at the first one.
    pub fn read(&mut self, file: &Path, text: &str) -> ParsedFile {
        let mut parsed = ParsedFile::default();
        let mut group = LineGroup::default();
        // name -> (decorated line, directive line) for each group carrying it
        let mut names: BTreeMap<String, Vec<(u32, u32)>> = BTreeMap::new();

        for (index, line) in text.lines().enumerate() {
            let line_number = to_line_number(index);
            let Some(body) = directive_body(line) else {
                self.flush(file, line_number, &mut group, &mut parsed, &mut names);
                continue;
            };
            match self.classify(body) {
                Directive::Name(name) => {
                    self.record_name(file, line_number, body, name, &mut group);
                }
                Directive::Expectation(kind) => group.pending.push(Pending {
                    text: body.to_string(),
                    kind,
                }),
                Directive::Unrecognized => {
                    self.push_error(file, line_number, body, GrammarErrorKind::Unrecognized)
                }
            }
        }

        if !group.is_empty() {
            tracing::debug!(
                file = %file.display(),
                dropped = group.pending.len(),
                "directive run at end of file decorates no line"
            );
        }

        for (name, occurrences) in names {
            if occurrences.len() > 1 {
                let directive_line = occurrences[0].1;
                let lines = occurrences.iter().map(|(decorated, _)| *decorated).collect();
                self.push_error(
                    file,
                    directive_line,
                    &format!("{}{}", TEST_NAME_PREFIX, name),
                    GrammarErrorKind::NameNotUnique { name, lines },
                );
            }
        }

        tracing::debug!(
            file = %file.display(),
            facts = parsed.expected_facts.len(),
            "read expectations"
        );
        parsed
    }

    /// Returns every grammar error recorded so far, leaving the reader empty.
    ///
    /// # Errors
    ///
    /// Returns all collected errors together if any directive was malformed.
    pub fn check_errors(&mut self) -> Result<(), ExpectationErrors> {
        if self.errors.is_empty() {
            return Ok(());
        }
        Err(ExpectationErrors {
            errors: std::mem::take(&mut self.errors),
        })
    }

    fn classify<'b>(&self, body: &'b str) -> Directive<'b> {
        if let Some(name) = body.strip_prefix(TEST_NAME_PREFIX) {
            return Directive::Name(name.trim());
        }
        match self.registry.parse(body) {
            Some(kind) => Directive::Expectation(kind),
            None => Directive::Unrecognized,
        }
    }

    fn record_name(
        &mut self,
        file: &Path,
        line_number: u32,
        body: &str,
        name: &str,
        group: &mut LineGroup,
    ) {
        if !group.pending.is_empty() {
            self.push_error(file, line_number, body, GrammarErrorKind::NameAfterAssertion);
        } else if group.name.is_some() {
            self.push_error(file, line_number, body, GrammarErrorKind::NameAlreadySet);
        } else if !is_valid_name(name) {
            self.push_error(file, line_number, body, GrammarErrorKind::InvalidName);
        } else {
            group.name = Some((name.to_string(), line_number));
        }
    }

    /// Attaches the buffered run to `decorated` and clears it.
    fn flush(
        &mut self,
        file: &Path,
        decorated: u32,
        group: &mut LineGroup,
        parsed: &mut ParsedFile,
        names: &mut BTreeMap<String, Vec<(u32, u32)>>,
    ) {
        let LineGroup { name, pending } = std::mem::take(group);
        if let Some((name, directive_line)) = name {
            if pending.is_empty() {
                self.push_error(
                    file,
                    directive_line,
                    &format!("{}{}", TEST_NAME_PREFIX, name),
                    GrammarErrorKind::NoExpectedFacts,
                );
            } else {
                names
                    .entry(name.clone())
                    .or_default()
                    .push((decorated, directive_line));
                parsed.test_names.insert(decorated, name);
            }
        }
        parsed.expected_facts.extend(
            pending
                .into_iter()
                .map(|p| ExpectedFact::new(file, decorated, p.text, p.kind)),
        );
    }

    fn push_error(&mut self, file: &Path, line: u32, text: &str, kind: GrammarErrorKind) {
        self.errors.push(GrammarError {
            file: PathBuf::from(file),
            line,
            text: text.to_string(),
            kind,
        });
    }
}

/// Reads `text` and raises its grammar errors, if any.
///
/// # Errors
///
/// Returns every malformed directive in the file together.
pub fn read_expected_facts(
    registry: &AssertionRegistry,
    file: &Path,
    text: &str,
) -> Result<ParsedFile, ExpectationErrors> {
    let mut reader = ExpectationReader::new(registry);
    let parsed = reader.read(file, text);
    reader.check_errors()?;
    Ok(parsed)
}

/// Returns the directive body if `line` is a directive line.
fn directive_body(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix(DIRECTIVE_MARKER)
}

/// A name must not read as a line number or contain the directive separator.
fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && !is_integer(name) && !name.contains(':')
}

/// An optional sign followed by ASCII digits, of any magnitude.
fn is_integer(text: &str) -> bool {
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn to_line_number(index: usize) -> u32 {
    u32::try_from(index + 1).unwrap_or(u32::MAX)
}
