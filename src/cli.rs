//! Command-line interface module for episort.
//!
//! This module wires the pieces together for one invocation:
//! - Fragment and rule resolution
//! - Target directory preparation
//! - Matching, cleaning and moving
//! - Pruning of emptied directories
//! - Localized reporting

use crate::cleaner::NameCleaner;
use crate::locale::{Language, Messages};
use crate::mover::{FileMover, MoveError, MoveOutcome, MoveRecord};
use crate::output::OutputFormatter;
use crate::pruner::{PrunePolicy, Pruner};
use crate::rules::{RuleError, parse_rules};
use crate::walker::{WalkError, find_matches};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Everything one run needs, resolved at startup.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// File name fragment, optionally prefixed with a relative directory.
    pub fragment: String,
    /// Raw rule arguments, in the order given.
    pub rules: Vec<String>,
    /// Output language.
    pub language: Language,
    /// Only report what would happen.
    pub dry_run: bool,
    /// Extract the episode number after applying rules.
    pub episode: bool,
    /// Remove `[...]` segments before cleaning.
    pub strip_brackets: bool,
    /// Which empty directories to remove afterwards.
    pub prune_policy: PrunePolicy,
}

impl RunConfig {
    /// Creates a config with default options.
    pub fn new(fragment: impl Into<String>, rules: Vec<String>, language: Language) -> Self {
        Self {
            fragment: fragment.into(),
            rules,
            language,
            ..Self::default()
        }
    }
}

/// Errors that abort a run.
#[derive(Debug)]
pub enum RunError {
    /// The fragment has no file name part.
    EmptyFragment,
    /// A rule argument could not be parsed.
    InvalidRule(RuleError),
    /// The target directory could not be prepared.
    TargetDir(MoveError),
    /// The working tree could not be walked.
    Walk(WalkError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyFragment => write!(f, "File name fragment is empty"),
            Self::InvalidRule(e) => write!(f, "{}", e),
            Self::TargetDir(e) => write!(f, "{}", e),
            Self::Walk(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::EmptyFragment => None,
            Self::InvalidRule(e) => Some(e),
            Self::TargetDir(e) => Some(e),
            Self::Walk(e) => Some(e),
        }
    }
}

impl From<RuleError> for RunError {
    fn from(e: RuleError) -> Self {
        Self::InvalidRule(e)
    }
}

impl From<WalkError> for RunError {
    fn from(e: WalkError) -> Self {
        Self::Walk(e)
    }
}

impl RunError {
    /// Describes the error in the given language.
    pub fn localized(&self, messages: &Messages) -> String {
        match self {
            Self::EmptyFragment => messages.empty_fragment().to_string(),
            Self::InvalidRule(e) => messages.invalid_rule(e),
            Self::TargetDir(e) => messages.target_dir_failed(e),
            Self::Walk(e) => messages.walk_failed(e),
        }
    }
}

/// Outcome of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Directory that was searched.
    pub root: PathBuf,
    /// Directory files were moved into.
    pub target_dir: PathBuf,
    /// Files moved, or that would be moved in a dry run.
    pub moved: Vec<MoveRecord>,
    /// Files that already had their cleaned name in the target directory.
    pub unchanged: Vec<PathBuf>,
    /// Files that could not be moved, with the reason.
    pub failed: Vec<(PathBuf, String)>,
    /// Directories removed after the moves.
    pub pruned: Vec<PathBuf>,
    /// Set when pruning stopped early.
    pub prune_error: Option<String>,
}

/// Splits the fragment argument into its directory part and the fragment.
///
/// `"shows/Frieren"` becomes `("shows/", "Frieren")`. A trailing separator
/// leaves an empty fragment.
pub fn split_fragment(arg: &str) -> (&str, &str) {
    match arg.rfind(std::path::is_separator) {
        Some(index) => arg.split_at(index + 1),
        None => ("", arg),
    }
}

/// Runs episort from `working_dir` and prints progress as it goes.
///
/// # Arguments
///
/// * `config` - The resolved run configuration
/// * `working_dir` - Directory the fragment is relative to
///
/// # Examples
///
/// ```no_run
/// use episort::cli::{RunConfig, run_cli};
/// use episort::locale::Language;
/// use std::path::Path;
///
/// let config = RunConfig::new("Frieren", vec!["[SubsPlease]".to_string()], Language::English);
/// match run_cli(&config, Path::new("/media/downloads")) {
///     Ok(report) => println!("{} files moved", report.moved.len()),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
///
/// # Errors
///
/// Returns a `RunError` when the run is aborted before or during the walk.
/// Individual move failures are recorded in the report instead.
pub fn run_cli(config: &RunConfig, working_dir: &Path) -> Result<RunReport, RunError> {
    let messages = config.language.messages();

    let (dir_part, fragment) = split_fragment(&config.fragment);
    if fragment.is_empty() {
        return Err(RunError::EmptyFragment);
    }

    let rules = parse_rules(&config.rules)?;
    for rule in &rules {
        debug!(%rule, "resolved rule");
    }

    let root = working_dir.join(dir_part);
    let target_dir = root.join(fragment);
    info!(root = %root.display(), target = %target_dir.display(), "starting run");

    let mover = if config.dry_run {
        OutputFormatter::info(&messages.dry_run_scanning(&root, fragment));
        check_target_dir(&target_dir).map_err(RunError::TargetDir)?;
        FileMover::new(&target_dir)
    } else {
        OutputFormatter::info(&messages.scanning(&root, fragment));
        FileMover::prepare(&target_dir).map_err(RunError::TargetDir)?
    };

    let matches = find_matches(&root, fragment)?;

    let mut report = RunReport {
        root: root.clone(),
        target_dir: target_dir.clone(),
        ..RunReport::default()
    };

    if matches.is_empty() {
        OutputFormatter::warning(messages.no_matches());
        return Ok(report);
    }

    let cleaner = NameCleaner::new(fragment, rules)
        .with_episode(config.episode)
        .with_strip_brackets(config.strip_brackets);

    if config.dry_run {
        plan_moves(&matches, &cleaner, &mover, &messages, &mut report);
        print_summary(&report, &messages);
        OutputFormatter::success(messages.dry_run_done());
        return Ok(report);
    }

    let moved_from = move_matches(&matches, &cleaner, &mover, &messages, &mut report);

    match Pruner::new(&root, &target_dir).prune(config.prune_policy, fragment, &moved_from) {
        Ok(pruned) => {
            for dir in &pruned {
                OutputFormatter::success(&messages.removed_dir(dir));
            }
            report.pruned = pruned;
        }
        Err(e) => {
            debug!(path = %e.path.display(), "pruning stopped");
            OutputFormatter::error(&messages.prune_failed(&e));
            report.prune_error = Some(e.to_string());
        }
    }

    print_summary(&report, &messages);
    OutputFormatter::success(messages.done());

    Ok(report)
}

/// Moves every match, recording results in `report`.
///
/// Returns the directories that lost a file.
fn move_matches(
    matches: &[PathBuf],
    cleaner: &NameCleaner,
    mover: &FileMover,
    messages: &Messages,
    report: &mut RunReport,
) -> BTreeSet<PathBuf> {
    let mut moved_from = BTreeSet::new();
    let pb = OutputFormatter::create_progress_bar(matches.len() as u64);

    for path in matches {
        let outcome = clean_name_for(cleaner, path).and_then(|clean_name| {
            pb.set_message(clean_name.clone());
            mover.move_file(path, &clean_name)
        });

        match outcome {
            Ok(MoveOutcome::Moved(record)) => {
                pb.suspend(|| {
                    OutputFormatter::success(&messages.moved(&record.source, &record.destination))
                });
                if let Some(parent) = record.source.parent() {
                    moved_from.insert(parent.to_path_buf());
                }
                report.moved.push(record);
            }
            Ok(MoveOutcome::AlreadyInPlace(in_place)) => {
                pb.suspend(|| OutputFormatter::info(&messages.already_in_place(&in_place)));
                report.unchanged.push(in_place);
            }
            Err(e) => {
                pb.suspend(|| OutputFormatter::error(&messages.move_failed(path, &e)));
                report.failed.push((path.clone(), e.to_string()));
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    moved_from
}

/// Dry-run counterpart of [`move_matches`]: runs the same checks as a real
/// move and treats earlier planned destinations as taken.
fn plan_moves(
    matches: &[PathBuf],
    cleaner: &NameCleaner,
    mover: &FileMover,
    messages: &Messages,
    report: &mut RunReport,
) {
    let mut planned: HashSet<PathBuf> = HashSet::new();

    for path in matches {
        let outcome = clean_name_for(cleaner, path)
            .and_then(|clean_name| mover.check_move(path, &clean_name))
            .and_then(|outcome| match outcome {
                MoveOutcome::Moved(record) if planned.contains(&record.destination) => {
                    Err(MoveError::DestinationExists {
                        source: record.source,
                        destination: record.destination,
                    })
                }
                other => Ok(other),
            });

        match outcome {
            Ok(MoveOutcome::Moved(record)) => {
                OutputFormatter::dry_run_notice(
                    &messages.would_move(&record.source, &record.destination),
                );
                planned.insert(record.destination.clone());
                report.moved.push(record);
            }
            Ok(MoveOutcome::AlreadyInPlace(in_place)) => {
                OutputFormatter::info(&messages.already_in_place(&in_place));
                report.unchanged.push(in_place);
            }
            Err(e) => {
                OutputFormatter::error(&messages.move_failed(path, &e));
                report.failed.push((path.clone(), e.to_string()));
            }
        }
    }
}

/// Cleans the file name of `path`. Names that are not UTF-8 are refused
/// rather than mangled.
fn clean_name_for(cleaner: &NameCleaner, path: &Path) -> Result<String, MoveError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| MoveError::NonUtf8Name {
            source: path.to_path_buf(),
        })?;
    Ok(cleaner.clean(name))
}

/// Fails if something other than a directory occupies `path`.
fn check_target_dir(path: &Path) -> Result<(), MoveError> {
    if path.exists() && !path.is_dir() {
        return Err(MoveError::TargetNotDirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn print_summary(report: &RunReport, messages: &Messages) {
    OutputFormatter::header(&messages.summary(
        report.moved.len(),
        report.unchanged.len(),
        report.failed.len(),
    ));
}
