//! Line-oriented salvage for replies that are lists but not JSON.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

static LIST_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*+•]\s*|\d+[.)]\s*)").unwrap());

/// Minimum content a salvaged line must carry to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    /// Strictly more than this many characters.
    MoreThanChars(usize),
    /// Strictly more than this many whitespace-separated words.
    MoreThanWords(usize)
}

impl LineRule {
    pub fn keeps(self, line: &str) -> bool {
        match self {
            Self::MoreThanChars(n) => line.chars().count() > n,
            Self::MoreThanWords(n) => line.split_whitespace().count() > n
        }
    }
}

/// Content lines with list markers, emphasis and JSON debris removed.
///
/// Blank lines and `#` headings are dropped before the rule is applied.
pub fn salvage(text: &str, rule: LineRule) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(clean_line)
        .filter(|line| rule.keeps(line))
        .collect()
}

fn clean_line(line: &str) -> String {
    // A leading `**` opens bold text, not a bullet.
    let stripped = if line.starts_with("**") {
        Cow::Borrowed(line)
    } else {
        LIST_MARKER.replace(line, "")
    };
    let unbolded = stripped.replace("**", "").replace("__", "");
    unbolded
        .trim()
        .trim_end_matches(',')
        .trim_matches('"')
        .trim()
        .to_string()
}
