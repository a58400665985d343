//! Output language selection and the user-facing strings for each language.

use std::path::Path;

/// Environment variables consulted for the locale, highest priority first.
pub const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_MESSAGES", "LANG"];

/// Supported output languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Language {
    #[value(name = "zh")]
    Chinese,
    #[default]
    #[value(name = "en")]
    English,
}

impl Language {
    /// Maps a locale string such as `zh_CN.UTF-8` to a language.
    pub fn from_locale(locale: &str) -> Self {
        if locale.trim().to_lowercase().starts_with("zh") {
            Language::Chinese
        } else {
            Language::English
        }
    }

    /// Picks the language from locale variables, looked up through `lookup`.
    ///
    /// The first non-empty variable in [`LOCALE_VARS`] decides; English is the
    /// fallback when none is set.
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        LOCALE_VARS
            .iter()
            .filter_map(|name| lookup(name))
            .find(|value| !value.trim().is_empty())
            .map(|value| Self::from_locale(&value))
            .unwrap_or_default()
    }

    /// Resolves the language once at startup: an explicit choice wins over the
    /// process environment.
    pub fn resolve(explicit: Option<Language>) -> Self {
        explicit.unwrap_or_else(|| Self::from_env_with(|name| std::env::var(name).ok()))
    }

    /// Returns the message catalogue for this language.
    pub fn messages(self) -> Messages {
        Messages { language: self }
    }
}

/// All user-visible text, in one language.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    language: Language,
}

impl Messages {
    pub fn usage(&self) -> String {
        match self.language {
            Language::Chinese => format!(
                "用法: {bin} <文件名片段> [规则...]\n\
                 \n\
                 在当前目录及其子目录中查找文件名包含片段的文件，\n\
                 净化文件名后移动到以片段命名的目录中，并删除因此变空的目录。\n\
                 \n\
                 规则:\n\
                 \x20 文本        从文件名中删除所有该文本\n\
                 \x20 旧=>新      将所有“旧”替换为“新”\n\
                 \x20 不提供规则时，提取文件名中最后一组数字，重命名为 <片段>-<数字><扩展名>\n\
                 \x20 以 - 开头的规则请写在 -- 之后，例如: {bin} 片段 -- -\n\
                 \n\
                 选项:\n\
                 \x20 -n, --dry-run          只显示将要执行的操作\n\
                 \x20 -e, --episode          应用规则后提取集数\n\
                 \x20 -b, --strip-brackets   先删除所有 [...] 片段\n\
                 \x20     --prune-by-name    删除名称包含片段的空目录\n\
                 \x20 -l, --lang <zh|en>     输出语言\n\
                 \x20 -v, --verbose          输出调试日志\n\
                 \x20 -h, --help             显示帮助\n\
                 \x20 -V, --version          显示版本\n\
                 \n\
                 示例:\n\
                 \x20 {bin} 进击的巨人\n\
                 \x20 {bin} 进击的巨人 \"[字幕组]\" \"_=> \"",
                bin = env!("CARGO_PKG_NAME")
            ),
            Language::English => format!(
                "Usage: {bin} <fragment> [rule...]\n\
                 \n\
                 Finds files under the current directory whose names contain the fragment,\n\
                 cleans their names, moves them into a directory named after the fragment\n\
                 and removes directories left empty by the move.\n\
                 \n\
                 Rules:\n\
                 \x20 text        remove every occurrence of text\n\
                 \x20 old=>new    replace every occurrence of old with new\n\
                 \x20 Without rules the last number in the name is kept: <fragment>-<number><ext>\n\
                 \x20 Rules starting with - go after --, e.g. {bin} fragment -- -\n\
                 \n\
                 Options:\n\
                 \x20 -n, --dry-run          show what would be done\n\
                 \x20 -e, --episode          extract the episode number after applying rules\n\
                 \x20 -b, --strip-brackets   remove every [...] segment first\n\
                 \x20     --prune-by-name    remove empty directories whose name contains the fragment\n\
                 \x20 -l, --lang <zh|en>     output language\n\
                 \x20 -v, --verbose          print debug logs\n\
                 \x20 -h, --help             print help\n\
                 \x20 -V, --version          print version\n\
                 \n\
                 Examples:\n\
                 \x20 {bin} Frieren\n\
                 \x20 {bin} Frieren \"[SubsPlease]\" \"_=> \"",
                bin = env!("CARGO_PKG_NAME")
            ),
        }
    }

    pub fn missing_fragment(&self) -> &'static str {
        match self.language {
            Language::Chinese => "请提供至少一个参数：文件名片段。",
            Language::English => "Please provide at least one argument: the file name fragment.",
        }
    }

    pub fn empty_fragment(&self) -> &'static str {
        match self.language {
            Language::Chinese => "文件名片段长度不能少于一个字符！",
            Language::English => "The file name fragment must be at least one character long!",
        }
    }

    pub fn invalid_rule(&self, error: &dyn std::fmt::Display) -> String {
        match self.language {
            Language::Chinese => format!("无效的规则: {}", error),
            Language::English => format!("Invalid rule: {}", error),
        }
    }

    pub fn scanning(&self, dir: &Path, fragment: &str) -> String {
        match self.language {
            Language::Chinese => format!("在 {} 中查找包含 \"{}\" 的文件", dir.display(), fragment),
            Language::English => format!(
                "Searching {} for files containing \"{}\"",
                dir.display(),
                fragment
            ),
        }
    }

    pub fn dry_run_scanning(&self, dir: &Path, fragment: &str) -> String {
        match self.language {
            Language::Chinese => format!("[演练] {}", self.scanning(dir, fragment)),
            Language::English => format!("DRY RUN: {}", self.scanning(dir, fragment)),
        }
    }

    pub fn working_dir_failed(&self, error: &dyn std::fmt::Display) -> String {
        match self.language {
            Language::Chinese => format!("获取当前工作目录失败: {}", error),
            Language::English => format!("Failed to get the working directory: {}", error),
        }
    }

    pub fn target_dir_failed(&self, error: &dyn std::fmt::Display) -> String {
        match self.language {
            Language::Chinese => format!("创建目标目录失败: {}", error),
            Language::English => format!("Failed to create target directory: {}", error),
        }
    }

    pub fn walk_failed(&self, error: &dyn std::fmt::Display) -> String {
        match self.language {
            Language::Chinese => format!("遍历目录失败: {}", error),
            Language::English => format!("Failed to walk directory: {}", error),
        }
    }

    pub fn no_matches(&self) -> &'static str {
        match self.language {
            Language::Chinese => "未找到匹配的文件。",
            Language::English => "No matching files found.",
        }
    }

    pub fn moved(&self, from: &Path, to: &Path) -> String {
        match self.language {
            Language::Chinese => format!("已移动并净化: {} -> {}", from.display(), to.display()),
            Language::English => {
                format!("Moved and cleaned: {} -> {}", from.display(), to.display())
            }
        }
    }

    pub fn would_move(&self, from: &Path, to: &Path) -> String {
        match self.language {
            Language::Chinese => format!("将移动: {} -> {}", from.display(), to.display()),
            Language::English => format!("Would move: {} -> {}", from.display(), to.display()),
        }
    }

    pub fn already_in_place(&self, path: &Path) -> String {
        match self.language {
            Language::Chinese => format!("已在目标位置: {}", path.display()),
            Language::English => format!("Already in place: {}", path.display()),
        }
    }

    pub fn move_failed(&self, path: &Path, error: &dyn std::fmt::Display) -> String {
        match self.language {
            Language::Chinese => format!("移动文件 {} 失败: {}", path.display(), error),
            Language::English => format!("Failed to move {}: {}", path.display(), error),
        }
    }

    pub fn removed_dir(&self, dir: &Path) -> String {
        match self.language {
            Language::Chinese => format!("删除空目录: {}", dir.display()),
            Language::English => format!("Removed empty directory: {}", dir.display()),
        }
    }

    pub fn prune_failed(&self, error: &dyn std::fmt::Display) -> String {
        match self.language {
            Language::Chinese => format!("删除空目录失败: {}", error),
            Language::English => format!("Failed to remove empty directories: {}", error),
        }
    }

    pub fn summary(&self, moved: usize, unchanged: usize, failed: usize) -> String {
        match self.language {
            Language::Chinese => format!(
                "已移动 {} 个，未变动 {} 个，失败 {} 个",
                moved, unchanged, failed
            ),
            Language::English => format!(
                "Moved {} {}, {} unchanged, {} failed",
                moved,
                if moved == 1 { "file" } else { "files" },
                unchanged,
                failed
            ),
        }
    }

    pub fn dry_run_done(&self) -> &'static str {
        match self.language {
            Language::Chinese => "演练完成，未修改任何文件。",
            Language::English => "Dry run complete. No files were modified.",
        }
    }

    pub fn done(&self) -> &'static str {
        match self.language {
            Language::Chinese => "操作完成。",
            Language::English => "Done.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_from_locale() {
        assert_eq!(Language::from_locale("zh_CN.UTF-8"), Language::Chinese);
        assert_eq!(Language::from_locale("zh_TW"), Language::Chinese);
        assert_eq!(Language::from_locale("en_US.UTF-8"), Language::English);
        assert_eq!(Language::from_locale("C"), Language::English);
    }

    #[test]
    fn test_lc_all_beats_lang() {
        let language = Language::from_env_with(lookup(&[
            ("LC_ALL", "zh_CN.UTF-8"),
            ("LANG", "en_US.UTF-8"),
        ]));
        assert_eq!(language, Language::Chinese);
    }

    #[test]
    fn test_empty_variable_is_skipped() {
        let language = Language::from_env_with(lookup(&[("LC_ALL", ""), ("LANG", "zh_CN")]));
        assert_eq!(language, Language::Chinese);
    }

    #[test]
    fn test_no_locale_defaults_to_english() {
        assert_eq!(Language::from_env_with(lookup(&[])), Language::English);
    }

    #[test]
    fn test_explicit_language_wins() {
        assert_eq!(Language::resolve(Some(Language::Chinese)), Language::Chinese);
        assert_eq!(Language::resolve(Some(Language::English)), Language::English);
    }

    #[test]
    fn test_usage_in_both_languages() {
        assert!(Language::English.messages().usage().starts_with("Usage:"));
        assert!(Language::Chinese.messages().usage().starts_with("用法:"));
    }
}
