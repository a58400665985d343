/// Moving matched files into the series directory.
///
/// This module creates the target directory and moves files into it under
/// their cleaned names, refusing to overwrite anything already there.
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// A single completed move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Where the file was before the move.
    pub source: PathBuf,
    /// Where the file is now.
    pub destination: PathBuf,
}

/// What happened to one matched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The file was renamed into the target directory.
    Moved(MoveRecord),
    /// The file already had its cleaned name inside the target directory.
    AlreadyInPlace(PathBuf),
}

/// Errors that can occur while moving files.
#[derive(Debug)]
pub enum MoveError {
    /// Failed to create the target directory.
    DirectoryCreationFailed { path: PathBuf, source: io::Error },
    /// Something other than a directory occupies the target path.
    TargetNotDirectory { path: PathBuf },
    /// The cleaned name came out empty.
    EmptyName { source: PathBuf },
    /// The cleaned name is not a single plain file name.
    InvalidName { source: PathBuf, name: String },
    /// The file name is not valid UTF-8, so it cannot be cleaned.
    NonUtf8Name { source: PathBuf },
    /// A file already exists at the destination.
    DestinationExists {
        source: PathBuf,
        destination: PathBuf,
    },
    /// The rename itself failed.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: io::Error,
    },
}

impl std::fmt::Display for MoveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::TargetNotDirectory { path } => {
                write!(f, "{} exists and is not a directory", path.display())
            }
            Self::EmptyName { source } => {
                write!(f, "Cleaned name of {} is empty", source.display())
            }
            Self::InvalidName { source, name } => {
                write!(
                    f,
                    "Cleaned name '{}' of {} is not a plain file name",
                    name,
                    source.display()
                )
            }
            Self::NonUtf8Name { source } => {
                write!(f, "{} is not valid UTF-8", source.display())
            }
            Self::DestinationExists {
                source,
                destination,
            } => {
                write!(
                    f,
                    "Not moving {}: {} already exists",
                    source.display(),
                    destination.display()
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
        }
    }
}

impl std::error::Error for MoveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DirectoryCreationFailed { source, .. } => Some(source),
            Self::FileMoveFailure { source_error, .. } => Some(source_error),
            _ => None,
        }
    }
}

/// Result type for move operations.
pub type MoveResult<T> = Result<T, MoveError>;

/// Moves files into one target directory.
pub struct FileMover {
    target_dir: PathBuf,
}

impl FileMover {
    /// Creates the target directory if needed and returns a mover for it.
    ///
    /// # Errors
    ///
    /// Returns `MoveError::TargetNotDirectory` if a file sits at `target_dir`,
    /// or `MoveError::DirectoryCreationFailed` if it cannot be created.
    pub fn prepare(target_dir: &Path) -> MoveResult<Self> {
        Self::ensure_target_dir(target_dir)?;
        Ok(Self::new(target_dir))
    }

    /// Creates a mover without touching the filesystem.
    pub fn new(target_dir: &Path) -> Self {
        Self {
            target_dir: target_dir.to_path_buf(),
        }
    }

    pub fn target_dir(&self) -> &Path {
        &self.target_dir
    }

    /// Makes sure `path` is a directory, creating it and its parents if absent.
    ///
    /// # Errors
    ///
    /// Fails if a non-directory occupies the path or creation fails.
    pub fn ensure_target_dir(path: &Path) -> MoveResult<()> {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(MoveError::TargetNotDirectory {
                path: path.to_path_buf(),
            }),
            Err(_) => {
                debug!(path = %path.display(), "creating target directory");
                fs::create_dir_all(path).map_err(|e| MoveError::DirectoryCreationFailed {
                    path: path.to_path_buf(),
                    source: e,
                })
            }
        }
    }

    /// Returns where `source` would go under `clean_name`.
    ///
    /// # Errors
    ///
    /// Returns `MoveError::EmptyName` if `clean_name` is empty, and
    /// `MoveError::InvalidName` if it is anything but one normal path
    /// component, so nothing lands outside the target directory.
    pub fn destination_for(&self, source: &Path, clean_name: &str) -> MoveResult<PathBuf> {
        if clean_name.is_empty() {
            return Err(MoveError::EmptyName {
                source: source.to_path_buf(),
            });
        }

        let mut components = Path::new(clean_name).components();
        let single_normal = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_normal || clean_name.contains(std::path::is_separator) {
            return Err(MoveError::InvalidName {
                source: source.to_path_buf(),
                name: clean_name.to_string(),
            });
        }

        Ok(self.target_dir.join(clean_name))
    }

    /// Works out what [`FileMover::move_file`] would do without touching
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns the same errors `move_file` reports before it renames.
    pub fn check_move(&self, source: &Path, clean_name: &str) -> MoveResult<MoveOutcome> {
        let destination = self.destination_for(source, clean_name)?;

        if destination == source {
            return Ok(MoveOutcome::AlreadyInPlace(destination));
        }

        if destination.symlink_metadata().is_ok() {
            return Err(MoveError::DestinationExists {
                source: source.to_path_buf(),
                destination,
            });
        }

        Ok(MoveOutcome::Moved(MoveRecord {
            source: source.to_path_buf(),
            destination,
        }))
    }

    /// Moves `source` into the target directory as `clean_name`.
    ///
    /// An existing destination is never overwritten. When `source` already is
    /// the destination nothing happens and `MoveOutcome::AlreadyInPlace` is
    /// returned.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use episort::mover::{FileMover, MoveOutcome};
    /// use std::path::Path;
    ///
    /// let mover = FileMover::prepare(Path::new("/media/Show")).unwrap();
    /// match mover.move_file(Path::new("/media/dl/Show 01 [HD].mkv"), "Show-01.mkv") {
    ///     Ok(MoveOutcome::Moved(record)) => println!("-> {}", record.destination.display()),
    ///     Ok(MoveOutcome::AlreadyInPlace(path)) => println!("{} unchanged", path.display()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `MoveError` describing why this file was not moved.
    pub fn move_file(&self, source: &Path, clean_name: &str) -> MoveResult<MoveOutcome> {
        let outcome = self.check_move(source, clean_name)?;

        if let MoveOutcome::Moved(record) = &outcome {
            move_path(&record.source, &record.destination).map_err(|e| {
                MoveError::FileMoveFailure {
                    source: record.source.clone(),
                    destination: record.destination.clone(),
                    source_error: e,
                }
            })?;
        }

        Ok(outcome)
    }
}

/// Renames `from` to `to`, falling back to copy and delete across filesystems.
fn move_path(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_creates_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("nested").join("Show");

        let mover = FileMover::prepare(&target).expect("Failed to prepare target");

        assert!(target.is_dir());
        assert_eq!(mover.target_dir(), target);
    }

    #[test]
    fn test_prepare_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("Show");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("keep.txt"), "x").unwrap();

        FileMover::prepare(&target).expect("Failed to prepare target");
        assert!(target.join("keep.txt").exists());
    }

    #[test]
    fn test_prepare_rejects_file_at_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("Show");
        fs::write(&target, "not a dir").unwrap();

        let result = FileMover::prepare(&target);
        assert!(matches!(result, Err(MoveError::TargetNotDirectory { .. })));
    }

    #[test]
    fn test_move_file_renames_into_target() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("Show 01.mkv");
        fs::write(&source, "episode").unwrap();

        let mover = FileMover::prepare(&base.join("Show")).unwrap();
        let outcome = mover.move_file(&source, "Show-01.mkv").expect("move failed");

        let destination = base.join("Show").join("Show-01.mkv");
        assert_eq!(
            outcome,
            MoveOutcome::Moved(MoveRecord {
                source: source.clone(),
                destination: destination.clone()
            })
        );
        assert!(!source.exists());
        assert_eq!(fs::read_to_string(destination).unwrap(), "episode");
    }

    #[test]
    fn test_move_file_never_overwrites() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("Show 01.mkv");
        fs::write(&source, "new").unwrap();
        let target = base.join("Show");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("Show-01.mkv"), "old").unwrap();

        let mover = FileMover::new(&target);
        let result = mover.move_file(&source, "Show-01.mkv");

        assert!(matches!(result, Err(MoveError::DestinationExists { .. })));
        assert!(source.exists());
        assert_eq!(fs::read_to_string(target.join("Show-01.mkv")).unwrap(), "old");
    }

    #[test]
    fn test_move_file_already_in_place() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let target = temp_dir.path().join("Show");
        fs::create_dir(&target).unwrap();
        let path = target.join("Show-01.mkv");
        fs::write(&path, "x").unwrap();

        let mover = FileMover::new(&target);
        let outcome = mover.move_file(&path, "Show-01.mkv").unwrap();

        assert_eq!(outcome, MoveOutcome::AlreadyInPlace(path.clone()));
        assert!(path.exists());
    }

    #[test]
    fn test_move_file_empty_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mover = FileMover::new(temp_dir.path());
        let result = mover.move_file(&temp_dir.path().join("x"), "");
        assert!(matches!(result, Err(MoveError::EmptyName { .. })));
    }

    #[test]
    fn test_names_leaving_target_are_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("x Show.mkv");
        fs::write(&source, "x").unwrap();
        let mover = FileMover::prepare(&base.join("Show")).unwrap();

        for name in ["../escaped.mkv", "a/b.mkv", "..", ".", "/abs.mkv"] {
            let result = mover.move_file(&source, name);
            assert!(
                matches!(result, Err(MoveError::InvalidName { .. })),
                "{name} should be rejected"
            );
        }
        assert!(source.exists());
        assert!(!base.join("escaped.mkv").exists());
    }

    #[test]
    fn test_check_move_touches_nothing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        let source = base.join("Show 01.mkv");
        fs::write(&source, "x").unwrap();
        let mover = FileMover::new(&base.join("Show"));

        let outcome = mover.check_move(&source, "Show-01.mkv").unwrap();

        assert!(matches!(outcome, MoveOutcome::Moved(_)));
        assert!(source.exists());
        assert!(!base.join("Show").exists());
    }

    #[test]
    fn test_move_missing_source_fails() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let mover = FileMover::new(temp_dir.path());
        let result = mover.move_file(&temp_dir.path().join("gone.mkv"), "Show-01.mkv");
        assert!(matches!(result, Err(MoveError::FileMoveFailure { .. })));
    }
}
