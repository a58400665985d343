//! Rename rules given on the command line.
//!
//! Each rule is either a plain string that gets removed from file names, or a
//! `from=>to` pair that replaces every `from` with `to`:
//!
//! ```text
//! episort Naruto "[HorribleSubs]" "_=> "
//! ```
//!
//! Rules are applied in the order they were given.

use std::fmt;

/// Token that separates the two sides of a substitution rule.
pub const SEPARATOR: &str = "=>";

/// Errors that can occur while resolving rule arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// The rule would match the empty string.
    EmptyPattern {
        /// The raw argument as given on the command line.
        raw: String,
    },
}

impl fmt::Display for RuleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleError::EmptyPattern { raw } => {
                write!(f, "Invalid rule '{}': pattern is empty", raw)
            }
        }
    }
}

impl std::error::Error for RuleError {}

/// A single rename directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Delete every occurrence of the text.
    Remove(String),
    /// Replace every occurrence of `from` with `to`.
    Replace { from: String, to: String },
}

impl Rule {
    /// Parses one rule argument.
    ///
    /// Only the first `=>` splits the rule, so `a=>b=>c` replaces `a` with `b=>c`.
    ///
    /// # Errors
    ///
    /// Returns `RuleError::EmptyPattern` if the text to match is empty.
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let rule = match raw.split_once(SEPARATOR) {
            Some((from, to)) => Rule::Replace {
                from: from.to_string(),
                to: to.to_string(),
            },
            None => Rule::Remove(raw.to_string()),
        };

        if rule.pattern().is_empty() {
            return Err(RuleError::EmptyPattern {
                raw: raw.to_string(),
            });
        }

        Ok(rule)
    }

    /// The text this rule looks for.
    pub fn pattern(&self) -> &str {
        match self {
            Rule::Remove(text) => text,
            Rule::Replace { from, .. } => from,
        }
    }

    /// Applies the rule to every occurrence in `text`.
    pub fn apply(&self, text: &str) -> String {
        match self {
            Rule::Remove(pattern) => text.replace(pattern.as_str(), ""),
            Rule::Replace { from, to } => text.replace(from.as_str(), to),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Remove(text) => write!(f, "remove '{}'", text),
            Rule::Replace { from, to } => write!(f, "'{}' -> '{}'", from, to),
        }
    }
}

/// Resolves all rule arguments, keeping their order.
///
/// # Errors
///
/// Fails on the first invalid rule.
pub fn parse_rules<I, S>(args: I) -> Result<Vec<Rule>, RuleError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter().map(|arg| Rule::parse(arg.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_removal() {
        assert_eq!(
            Rule::parse("[1080p]").unwrap(),
            Rule::Remove("[1080p]".to_string())
        );
    }

    #[test]
    fn test_parse_substitution() {
        assert_eq!(
            Rule::parse("_=> ").unwrap(),
            Rule::Replace {
                from: "_".to_string(),
                to: " ".to_string()
            }
        );
    }

    #[test]
    fn test_parse_splits_on_first_separator() {
        assert_eq!(
            Rule::parse("a=>b=>c").unwrap(),
            Rule::Replace {
                from: "a".to_string(),
                to: "b=>c".to_string()
            }
        );
    }

    #[test]
    fn test_substitution_with_empty_replacement() {
        let rule = Rule::parse("EP=>").unwrap();
        assert_eq!(rule.apply("EP01 EP02"), "01 02");
    }

    #[test]
    fn test_empty_patterns_rejected() {
        assert!(Rule::parse("").is_err());
        assert!(Rule::parse("=>x").is_err());
    }

    #[test]
    fn test_parse_rules_keeps_order() {
        let rules = parse_rules(&["x", "a=>b"]).unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].pattern(), "x");
        assert_eq!(rules[1].pattern(), "a");
    }

    #[test]
    fn test_parse_rules_reports_bad_rule() {
        let err = parse_rules(&["ok", "=>oops"]).unwrap_err();
        assert_eq!(
            err,
            RuleError::EmptyPattern {
                raw: "=>oops".to_string()
            }
        );
    }

    #[test]
    fn test_apply_removes_all_occurrences() {
        let rule = Rule::Remove("[Sub]".to_string());
        assert_eq!(rule.apply("[Sub]a[Sub]b[Sub]"), "ab");
    }
}
