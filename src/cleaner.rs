//! File name cleaning.
//!
//! Turns names like `[Group] Show - 07 [1080p].mkv` into `Show-07.mkv`,
//! either by picking out the episode number or by applying the user's
//! rename rules.

use crate::rules::Rule;
use regex::Regex;
use std::sync::LazyLock;

/// Last run of ASCII digits in a string.
static TRAILING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)[^0-9]*$").expect("valid trailing number regex"));

/// Bracketed tags like `[1080p]` or `[abc-xyz.com]`.
static BRACKETED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid bracket regex"));

/// Computes cleaned file names for one series.
#[derive(Debug, Clone)]
pub struct NameCleaner {
    series: String,
    rules: Vec<Rule>,
    episode: bool,
    strip_brackets: bool,
}

impl NameCleaner {
    /// Creates a cleaner for the given series name and rules.
    pub fn new(series: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            series: series.into(),
            rules,
            episode: false,
            strip_brackets: false,
        }
    }

    /// Extract the episode number after the rules have been applied.
    pub fn with_episode(mut self, episode: bool) -> Self {
        self.episode = episode;
        self
    }

    /// Remove every `[...]` segment before anything else runs.
    pub fn with_strip_brackets(mut self, strip_brackets: bool) -> Self {
        self.strip_brackets = strip_brackets;
        self
    }

    pub fn series(&self) -> &str {
        &self.series
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Returns the cleaned version of `file_name`.
    ///
    /// Without rules the last number in the name becomes the episode number,
    /// giving `<series>-<number><ext>`. Names without a number are returned
    /// unchanged. With rules, each rule is applied in order and the trimmed
    /// result keeps the original extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use episort::cleaner::NameCleaner;
    /// use episort::rules::Rule;
    ///
    /// let cleaner = NameCleaner::new("Show", Vec::new());
    /// assert_eq!(cleaner.clean("Show - 07 [720].mkv"), "Show-720.mkv");
    ///
    /// let cleaner = NameCleaner::new("Show", vec![Rule::parse("_=> ").unwrap()]);
    /// assert_eq!(cleaner.clean("My_Show_07.mkv"), "My Show 07.mkv");
    /// ```
    pub fn clean(&self, file_name: &str) -> String {
        let (stem, extension) = split_extension(file_name);

        let stem = if self.strip_brackets {
            BRACKETED.replace_all(stem, "").into_owned()
        } else {
            stem.to_string()
        };

        if self.rules.is_empty() {
            return match episode_number(&stem) {
                Some(number) => self.numbered(number, extension),
                None if self.strip_brackets => format!("{}{}", stem.trim(), extension),
                None => file_name.to_string(),
            };
        }

        let rewritten = self
            .rules
            .iter()
            .fold(stem, |current, rule| rule.apply(&current));

        if self.episode
            && let Some(number) = episode_number(&rewritten)
        {
            return self.numbered(number, extension);
        }

        format!("{}{}", rewritten.trim(), extension)
    }

    fn numbered(&self, number: &str, extension: &str) -> String {
        format!("{}-{}{}", self.series, number, extension)
    }
}

/// Cleans a single file name with default options.
pub fn clean_file_name(file_name: &str, series: &str, rules: &[Rule]) -> String {
    NameCleaner::new(series, rules.to_vec()).clean(file_name)
}

/// Splits a base name into stem and extension (including the dot).
///
/// A leading dot does not start an extension, so `.nfo` has none.
pub fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        None | Some(0) => (file_name, ""),
        Some(index) => file_name.split_at(index),
    }
}

/// Finds the last run of digits in `text`.
pub fn episode_number(text: &str) -> Option<&str> {
    TRAILING_NUMBER
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map(|number| number.as_str())
}
