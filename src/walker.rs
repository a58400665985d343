//! Recursive search for files whose names contain the fragment.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Error raised when the directory tree cannot be read.
#[derive(Debug)]
pub struct WalkError {
    /// The path that could not be read, when known.
    pub path: Option<PathBuf>,
    pub source: walkdir::Error,
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "Error reading {}: {}", path.display(), self.source),
            None => write!(f, "Error reading directory tree: {}", self.source),
        }
    }
}

impl std::error::Error for WalkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Case-insensitive substring test on a file's base name.
pub fn name_matches(file_name: &str, fragment: &str) -> bool {
    file_name.to_lowercase().contains(&fragment.to_lowercase())
}

/// Collects every non-directory entry under `root` whose base name contains
/// `fragment`, ignoring case. Entries are visited in file name order.
///
/// # Errors
///
/// Any unreadable entry aborts the search.
pub fn find_matches(root: &Path, fragment: &str) -> Result<Vec<PathBuf>, WalkError> {
    let fragment = fragment.to_lowercase();
    let mut matches = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| WalkError {
            path: e.path().map(Path::to_path_buf),
            source: e,
        })?;

        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if name.to_lowercase().contains(&fragment) {
            debug!(path = %entry.path().display(), "matched");
            matches.push(entry.into_path());
        }
    }

    Ok(matches)
}
