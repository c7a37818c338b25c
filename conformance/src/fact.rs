//! Facts tied to a source line: expected facts declared in comments and the
//! reported facts an analyzer emits.

use std::path::{Path, PathBuf};

/// A finding tied to a `(file, line)` pair.
pub trait Fact {
    /// Path of the source file, relative to the test root.
    fn file(&self) -> &Path;

    /// 1-based line number within [`Fact::file`].
    fn line_number(&self) -> u32;
}

/// The closed set of assertion variants a directive can declare.
///
/// Matching against a reported fact is double-dispatched: each variant asks
/// the reported fact the predicate for its own kind, because only the
/// analyzer-specific implementation knows how to read its diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExpectedFactKind {
    /// Legacy free-form `jspecify_nullness_mismatch` directive.
    NullnessMismatch,
    /// `test:cannot-convert:<source> to <sink>`.
    CannotConvert {
        /// Type of the value being converted.
        source_type: String,
        /// Type of the location it is converted to.
        sink_type: String,
    },
    /// `test:expression-type:<type>:<expression>` (informational).
    ExpressionType {
        /// Expected augmented type of the expression.
        expression_type: String,
        /// Source text of the expression.
        expression: String,
    },
    /// `test:irrelevant-annotation:<annotation>` (informational).
    IrrelevantAnnotation {
        /// The annotation that has no effect at this location.
        annotation: String,
    },
    /// `test:sink-type:<type>:<sink>` (informational).
    SinkType {
        /// Expected augmented type of the sink.
        sink_type: String,
        /// Name of the sink.
        sink: String,
    },
}

impl ExpectedFactKind {
    /// Returns true if `reported` satisfies this assertion variant.
    pub fn is_satisfied_by(&self, reported: &dyn ReportedFact) -> bool {
        match self {
            Self::NullnessMismatch => reported.matches_nullness_mismatch(),
            Self::CannotConvert {
                source_type,
                sink_type,
            } => reported.matches_cannot_convert(source_type, sink_type),
            Self::ExpressionType {
                expression_type,
                expression,
            } => reported.matches_expression_type(expression_type, expression),
            Self::IrrelevantAnnotation { annotation } => {
                reported.matches_irrelevant_annotation(annotation)
            }
            Self::SinkType { sink_type, sink } => reported.matches_sink_type(sink_type, sink),
        }
    }

    /// Short variant name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NullnessMismatch => "nullness-mismatch",
            Self::CannotConvert { .. } => "cannot-convert",
            Self::ExpressionType { .. } => "expression-type",
            Self::IrrelevantAnnotation { .. } => "irrelevant-annotation",
            Self::SinkType { .. } => "sink-type",
        }
    }
}

/// A fact declared by a directive comment, attached to the code line the
/// comment run decorates.
///
/// Field order drives the derived ordering: file, line, comment text, variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ExpectedFact {
    file: PathBuf,
    line_number: u32,
    comment_text: String,
    kind: ExpectedFactKind,
}

impl ExpectedFact {
    /// Creates an expected fact.
    pub fn new(
        file: impl Into<PathBuf>,
        line_number: u32,
        comment_text: impl Into<String>,
        kind: ExpectedFactKind,
    ) -> Self {
        Self {
            file: file.into(),
            line_number,
            comment_text: comment_text.into(),
            kind,
        }
    }

    /// The raw directive body, as written after `// `.
    pub fn comment_text(&self) -> &str {
        &self.comment_text
    }

    /// The parsed assertion variant.
    pub fn kind(&self) -> &ExpectedFactKind {
        &self.kind
    }

    /// Returns true if `reported` satisfies this expectation.
    pub fn is_satisfied_by(&self, reported: &dyn ReportedFact) -> bool {
        self.kind.is_satisfied_by(reported)
    }
}

impl Fact for ExpectedFact {
    fn file(&self) -> &Path {
        &self.file
    }

    fn line_number(&self) -> u32 {
        self.line_number
    }
}

/// A finding produced by the external analyzer.
///
/// Every predicate defaults to `false`: a reported fact that does not
/// implement a predicate never matches that variant.
pub trait ReportedFact: Fact {
    /// True if the finding is error-severity, so that leaving it unmatched
    /// fails the file.
    fn must_be_expected(&self) -> bool;

    /// Human-readable description used in detail output.
    fn fact_text(&self) -> String;

    /// Matches the legacy `jspecify_nullness_mismatch` directive.
    fn matches_nullness_mismatch(&self) -> bool {
        false
    }

    /// Matches `test:cannot-convert:<source> to <sink>`.
    fn matches_cannot_convert(&self, _source_type: &str, _sink_type: &str) -> bool {
        false
    }

    /// Matches `test:expression-type:<type>:<expression>`.
    fn matches_expression_type(&self, _expression_type: &str, _expression: &str) -> bool {
        false
    }

    /// Matches `test:irrelevant-annotation:<annotation>`.
    fn matches_irrelevant_annotation(&self, _annotation: &str) -> bool {
        false
    }

    /// Matches `test:sink-type:<type>:<sink>`.
    fn matches_sink_type(&self, _sink_type: &str, _sink: &str) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Minimal reported fact for unit tests.
    #[derive(Debug, Clone)]
    pub(crate) struct StubFact {
        pub file: PathBuf,
        pub line: u32,
        pub mismatch: bool,
        pub error: bool,
    }

    impl StubFact {
        pub(crate) fn mismatch(file: &str, line: u32) -> Self {
            Self {
                file: PathBuf::from(file),
                line,
                mismatch: true,
                error: true,
            }
        }

        pub(crate) fn other_error(file: &str, line: u32) -> Self {
            Self {
                mismatch: false,
                ..Self::mismatch(file, line)
            }
        }

        pub(crate) fn note(file: &str, line: u32) -> Self {
            Self {
                mismatch: false,
                error: false,
                ..Self::mismatch(file, line)
            }
        }
    }

    impl Fact for StubFact {
        fn file(&self) -> &Path {
            &self.file
        }

        fn line_number(&self) -> u32 {
            self.line
        }
    }

    impl ReportedFact for StubFact {
        fn must_be_expected(&self) -> bool {
            self.error
        }

        fn fact_text(&self) -> String {
            if self.mismatch {
                "nullness mismatch".to_string()
            } else {
                "other".to_string()
            }
        }

        fn matches_nullness_mismatch(&self) -> bool {
            self.mismatch
        }

        fn matches_cannot_convert(&self, _source_type: &str, _sink_type: &str) -> bool {
            self.mismatch
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubFact;
    use super::*;

    #[test]
    fn kind_names_are_stable() {
        assert_eq!(ExpectedFactKind::NullnessMismatch.name(), "nullness-mismatch");
        let sink = ExpectedFactKind::SinkType {
            sink_type: "Object!".to_string(),
            sink: "param".to_string(),
        };
        assert_eq!(sink.name(), "sink-type");
    }

    #[test]
    fn cannot_convert_ignores_structured_fields() {
        let fact = StubFact::mismatch("A.java", 3);
        let kind = ExpectedFactKind::CannotConvert {
            source_type: "Object?".to_string(),
            sink_type: "Object!".to_string(),
        };
        assert!(kind.is_satisfied_by(&fact));
        assert!(ExpectedFactKind::NullnessMismatch.is_satisfied_by(&fact));
    }

    #[test]
    fn unimplemented_predicates_never_match() {
        let fact = StubFact::mismatch("A.java", 3);
        let kind = ExpectedFactKind::IrrelevantAnnotation {
            annotation: "@Nullable".to_string(),
        };
        assert!(!kind.is_satisfied_by(&fact));
    }

    #[test]
    fn equality_requires_same_variant() {
        let a = ExpectedFact::new("A.java", 2, "x", ExpectedFactKind::NullnessMismatch);
        let b = ExpectedFact::new(
            "A.java",
            2,
            "x",
            ExpectedFactKind::IrrelevantAnnotation {
                annotation: "x".to_string(),
            },
        );
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }
}
