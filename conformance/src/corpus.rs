//! Test corpus layout: file groups and source loading.
//!
//! Each top-level file under the test root is analyzed on its own. Each
//! top-level directory is one group: every matching file beneath it is
//! analyzed together, so files in it may refer to one another.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Files analyzed together, relative to the test root.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FileGroup {
    /// Member files, sorted.
    pub files: Vec<PathBuf>,
}

impl FileGroup {
    /// Creates a group, sorting its members.
    pub fn new(mut files: Vec<PathBuf>) -> Self {
        files.sort();
        Self { files }
    }
}

/// A source file read from the corpus.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path relative to the test root.
    pub path: PathBuf,
    /// File contents.
    pub text: String,
}

impl SourceFile {
    /// Reads `relative` under `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8.
    pub fn load(root: &Path, relative: &Path) -> Result<Self> {
        let full = root.join(relative);
        let text = std::fs::read_to_string(&full)
            .with_context(|| format!("Cannot read {}", full.display()))?;
        Ok(Self {
            path: relative.to_path_buf(),
            text,
        })
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension().map(|x| x == extension).unwrap_or(false)
}

/// Discovers the file groups under `root` for files with `extension`.
///
/// # Errors
///
/// Returns an error if `root` is missing or a directory cannot be walked.
pub fn discover_groups(root: &Path, extension: &str) -> Result<Vec<FileGroup>> {
    if !root.is_dir() {
        anyhow::bail!("Test root {} is not a directory", root.display());
    }

    let mut groups = Vec::new();
    for entry in std::fs::read_dir(root)
        .with_context(|| format!("Cannot read {}", root.display()))?
    {
        let entry = entry.with_context(|| format!("Directory entry error in {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            let mut files = Vec::new();
            for nested in WalkDir::new(&path) {
                let nested =
                    nested.with_context(|| format!("Cannot walk {}", path.display()))?;
                if nested.file_type().is_file() && has_extension(nested.path(), extension) {
                    files.push(relative_to(root, nested.path()));
                }
            }
            if !files.is_empty() {
                groups.push(FileGroup::new(files));
            }
        } else if has_extension(&path, extension) {
            groups.push(FileGroup::new(vec![relative_to(root, &path)]));
        }
    }

    groups.sort();
    tracing::debug!(root = %root.display(), groups = groups.len(), "discovered file groups");
    Ok(groups)
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}
