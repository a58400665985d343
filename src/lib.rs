//! episort - collect the episodes of a series into one directory
//!
//! This library finds files whose names contain a series fragment, cleans
//! their names (episode number extraction or user rename rules), moves them
//! into a directory named after the series and removes directories the move
//! left empty.

pub mod cleaner;
pub mod cli;
pub mod locale;
pub mod mover;
pub mod output;
pub mod pruner;
pub mod rules;
pub mod walker;

pub use cleaner::{NameCleaner, clean_file_name};
pub use cli::{RunConfig, RunError, RunReport, run_cli};
pub use locale::{Language, Messages};
pub use mover::{FileMover, MoveError, MoveOutcome, MoveRecord};
pub use pruner::{PrunePolicy, Pruner};
pub use rules::{Rule, RuleError, parse_rules};
