//! The analyzer collaborator interface.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::fact::ReportedFact;

/// A static analyzer run once per file group.
///
/// Implementations must be callable repeatedly and concurrently for
/// different groups.
pub trait Analyzer: Sync {
    /// The analyzer's reported-fact type.
    type Fact: ReportedFact + Send;

    /// Analyzes `files` (relative to `root`) together and returns every fact
    /// reported for them.
    ///
    /// # Errors
    ///
    /// Returns an error if the analyzer cannot run; the whole conformance
    /// run fails with it.
    fn analyze(&self, root: &Path, files: &[PathBuf]) -> Result<Vec<Self::Fact>>;
}
