//! Removal of directories emptied by a run.

use crate::walker::name_matches;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which empty directories get removed after the moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrunePolicy {
    /// Only directories that held a moved file.
    #[default]
    MovedSources,
    /// Any empty directory under the root whose name contains the fragment.
    MatchingName,
}

/// Error raised while pruning.
#[derive(Debug)]
pub struct PruneError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl std::fmt::Display for PruneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to prune {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for PruneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Removes empty directories left behind by a run.
///
/// `root` and `target_dir` themselves are never removed.
pub struct Pruner<'a> {
    root: &'a Path,
    target_dir: &'a Path,
}

impl<'a> Pruner<'a> {
    pub fn new(root: &'a Path, target_dir: &'a Path) -> Self {
        Self { root, target_dir }
    }

    /// Runs the chosen policy and returns the directories removed.
    ///
    /// # Errors
    ///
    /// Stops at the first directory that cannot be read or removed.
    pub fn prune(
        &self,
        policy: PrunePolicy,
        fragment: &str,
        moved_from: &BTreeSet<PathBuf>,
    ) -> Result<Vec<PathBuf>, PruneError> {
        match policy {
            PrunePolicy::MovedSources => self.prune_sources(moved_from),
            PrunePolicy::MatchingName => {
                let mut removed = Vec::new();
                self.prune_matching(self.root, fragment, &mut removed)?;
                Ok(removed)
            }
        }
    }

    /// Removes each directory in `dirs` that is now empty.
    ///
    /// Only listed directories are considered. They are visited deepest
    /// first, so a listed parent whose only content was a listed child goes
    /// too, but unlisted parents are left alone even when they end up empty.
    pub fn prune_sources(&self, dirs: &BTreeSet<PathBuf>) -> Result<Vec<PathBuf>, PruneError> {
        let mut ordered: Vec<&PathBuf> = dirs.iter().collect();
        ordered.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

        let mut removed = Vec::new();
        for dir in ordered {
            if self.is_protected(dir) || !dir.is_dir() {
                continue;
            }
            if is_empty_dir(dir)? {
                remove_dir(dir)?;
                removed.push(dir.clone());
            }
        }
        Ok(removed)
    }

    /// Walks the tree bottom-up, removing empty directories whose name
    /// contains `fragment`.
    fn prune_matching(
        &self,
        dir: &Path,
        fragment: &str,
        removed: &mut Vec<PathBuf>,
    ) -> Result<(), PruneError> {
        let entries = fs::read_dir(dir).map_err(|e| PruneError {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut subdirs: Vec<PathBuf> = entries
            .flatten()
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .map(|entry| entry.path())
            .collect();
        subdirs.sort();

        for subdir in subdirs {
            self.prune_matching(&subdir, fragment, removed)?;
        }

        let name_hit = dir
            .file_name()
            .is_some_and(|name| name_matches(&name.to_string_lossy(), fragment));

        if name_hit && !self.is_protected(dir) && is_empty_dir(dir)? {
            remove_dir(dir)?;
            removed.push(dir.to_path_buf());
        }

        Ok(())
    }

    fn is_protected(&self, dir: &Path) -> bool {
        dir == self.root || dir == self.target_dir || !dir.starts_with(self.root)
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool, PruneError> {
    let mut entries = fs::read_dir(dir).map_err(|e| PruneError {
        path: dir.to_path_buf(),
        source: e,
    })?;
    Ok(entries.next().is_none())
}

fn remove_dir(dir: &Path) -> Result<(), PruneError> {
    debug!(path = %dir.display(), "removing empty directory");
    fs::remove_dir(dir).map_err(|e| PruneError {
        path: dir.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_prune_sources_removes_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let target = root.join("Show");
        let emptied = root.join("dl").join("Show S1");
        fs::create_dir_all(&emptied).unwrap();
        fs::create_dir(&target).unwrap();

        let dirs = BTreeSet::from([emptied.clone()]);
        let removed = Pruner::new(root, &target).prune_sources(&dirs).unwrap();

        assert_eq!(removed, vec![emptied.clone()]);
        assert!(!emptied.exists());
        // Emptied but never listed.
        assert!(root.join("dl").is_dir());
        assert!(target.exists());
    }

    #[test]
    fn test_prune_sources_listed_parent_goes_after_child() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let target = root.join("Show");
        let emptied = root.join("dl").join("Show S1");
        fs::create_dir_all(&emptied).unwrap();
        fs::create_dir(&target).unwrap();

        let dirs = BTreeSet::from([emptied.clone(), root.join("dl")]);
        let removed = Pruner::new(root, &target).prune_sources(&dirs).unwrap();

        assert_eq!(removed, vec![emptied, root.join("dl")]);
        assert!(!root.join("dl").exists());
    }

    #[test]
    fn test_prune_sources_keeps_non_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let dir = root.join("dl");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("other.txt"), "x").unwrap();

        let dirs = BTreeSet::from([dir.clone()]);
        let removed = Pruner::new(root, &root.join("Show"))
            .prune_sources(&dirs)
            .unwrap();

        assert!(removed.is_empty());
        assert!(dir.exists());
    }

    #[test]
    fn test_prune_sources_ignores_unrelated_empty_dirs() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let unrelated = root.join("empty");
        fs::create_dir(&unrelated).unwrap();

        let removed = Pruner::new(root, &root.join("Show"))
            .prune_sources(&BTreeSet::new())
            .unwrap();

        assert!(removed.is_empty());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_prune_never_removes_root() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let dirs = BTreeSet::from([root.to_path_buf()]);
        let removed = Pruner::new(root, &root.join("Show"))
            .prune_sources(&dirs)
            .unwrap();

        assert!(removed.is_empty());
        assert!(root.exists());
    }

    #[test]
    fn test_prune_matching_name_bottom_up() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let target = root.join("Show");
        fs::create_dir(&target).unwrap();
        fs::create_dir_all(root.join("show pack").join("SHOW extras")).unwrap();
        fs::create_dir(root.join("unrelated")).unwrap();

        let removed = Pruner::new(root, &target)
            .prune(PrunePolicy::MatchingName, "show", &BTreeSet::new())
            .unwrap();

        assert_eq!(removed.len(), 2);
        assert!(!root.join("show pack").exists());
        assert!(root.join("unrelated").exists());
        assert!(target.exists());
    }
}
