//! Assertion registry: the ordered directive grammars.
//!
//! Grammars are tried in registration order and the first match wins, so a
//! more specific pattern must be registered before a more general one.

use regex::{Captures, Regex};

use crate::fact::ExpectedFactKind;

/// Builds an assertion variant from the captures of a matching grammar.
pub type DirectiveConstructor = fn(&Captures<'_>) -> ExpectedFactKind;

/// One directive grammar: a full-match pattern and its constructor.
pub struct DirectiveGrammar {
    pattern: Regex,
    construct: DirectiveConstructor,
}

impl DirectiveGrammar {
    /// Creates a grammar from a pattern anchored to the whole directive body.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str, construct: DirectiveConstructor) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&format!("^(?:{})$", pattern))?,
            construct,
        })
    }

    /// Parses `directive`, returning `None` if the pattern does not match.
    pub fn parse(&self, directive: &str) -> Option<ExpectedFactKind> {
        self.pattern
            .captures(directive)
            .map(|caps| (self.construct)(&caps))
    }
}

impl std::fmt::Debug for DirectiveGrammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectiveGrammar")
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// Ordered set of directive grammars.
#[derive(Debug)]
pub struct AssertionRegistry {
    grammars: Vec<DirectiveGrammar>,
}

fn group(caps: &Captures<'_>, name: &str) -> String {
    caps.name(name)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn nullness_mismatch(_: &Captures<'_>) -> ExpectedFactKind {
    ExpectedFactKind::NullnessMismatch
}

fn cannot_convert(caps: &Captures<'_>) -> ExpectedFactKind {
    ExpectedFactKind::CannotConvert {
        source_type: group(caps, "source"),
        sink_type: group(caps, "sink"),
    }
}

fn expression_type(caps: &Captures<'_>) -> ExpectedFactKind {
    ExpectedFactKind::ExpressionType {
        expression_type: group(caps, "type"),
        expression: group(caps, "expression"),
    }
}

fn irrelevant_annotation(caps: &Captures<'_>) -> ExpectedFactKind {
    ExpectedFactKind::IrrelevantAnnotation {
        annotation: group(caps, "annotation"),
    }
}

fn sink_type(caps: &Captures<'_>) -> ExpectedFactKind {
    ExpectedFactKind::SinkType {
        sink_type: group(caps, "type"),
        sink: group(caps, "sink"),
    }
}

/// The reference grammars in priority order.
const STANDARD_GRAMMARS: &[(&str, DirectiveConstructor)] = &[
    (r"jspecify_nullness_mismatch\b.*", nullness_mismatch),
    (
        r"test:cannot-convert:(?<source>[^:]+?) to (?<sink>[^:]+)",
        cannot_convert,
    ),
    (
        r"test:expression-type:(?<type>[^:]+):(?<expression>.+)",
        expression_type,
    ),
    (
        r"test:irrelevant-annotation:(?<annotation>.+)",
        irrelevant_annotation,
    ),
    (r"test:sink-type:(?<type>[^:]+):(?<sink>.+)", sink_type),
];

impl AssertionRegistry {
    /// Creates a registry with no grammars.
    pub fn empty() -> Self {
        Self {
            grammars: Vec::new(),
        }
    }

    /// Creates the registry holding the reference grammars.
    ///
    /// The standard patterns are fixed literals; one that failed to compile
    /// would be skipped and surface as unrecognized directives.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for (pattern, construct) in STANDARD_GRAMMARS {
            match DirectiveGrammar::new(pattern, *construct) {
                Ok(grammar) => registry.register(grammar),
                Err(e) => tracing::error!(pattern, error = %e, "invalid standard directive grammar"),
            }
        }
        registry
    }

    /// Appends a grammar after every grammar already registered.
    pub fn register(&mut self, grammar: DirectiveGrammar) {
        self.grammars.push(grammar);
    }

    /// Parses a directive body with the first grammar that matches it.
    pub fn parse(&self, directive: &str) -> Option<ExpectedFactKind> {
        self.grammars.iter().find_map(|g| g.parse(directive))
    }

    /// Number of registered grammars.
    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    /// Returns true if no grammar is registered.
    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }
}

impl Default for AssertionRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
