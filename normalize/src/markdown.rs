//! Light cleanup of model-written markdown.
//!
//! Only line-anchored fixes are applied and fenced code is left untouched:
//! - `##Header` becomes `## Header`, with a blank line before it
//! - `-item`, `•item` and `*   item` become `- item`
//! - `1.item` becomes `1. item`
//! - runs of blank lines collapse to one

use regex::Regex;
use std::sync::LazyLock;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(#{1,6})[ \t]*([^#\s].*)$").unwrap());
static DASH_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-•][ \t]*([^\s\-].*)$").unwrap());
static STAR_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)\*[ \t]+(\S.*)$").unwrap());
static NUMBERED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(\d+)\.[ \t]*([^\d\s].*)$").unwrap());

pub fn tidy_markdown(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut in_fence = false;

    for raw in text.lines() {
        let line = raw.trim_end();

        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push(line.to_string());
            continue;
        }
        if in_fence {
            out.push(line.to_string());
            continue;
        }

        if line.is_empty() {
            if out.last().is_some_and(|prev| !prev.is_empty()) {
                out.push(String::new());
            }
            continue;
        }

        if let Some(caps) = HEADER.captures(line) {
            if out.last().is_some_and(|prev| !prev.is_empty()) {
                out.push(String::new());
            }
            out.push(format!("{}{} {}", &caps[1], &caps[2], &caps[3]));
            continue;
        }

        let fixed = if let Some(caps) = DASH_BULLET.captures(line) {
            format!("{}- {}", &caps[1], &caps[2])
        } else if let Some(caps) = STAR_BULLET.captures(line) {
            format!("{}- {}", &caps[1], &caps[2])
        } else if let Some(caps) = NUMBERED.captures(line) {
            format!("{}{}. {}", &caps[1], &caps[2], &caps[3])
        } else {
            line.to_string()
        };
        out.push(fixed);
    }

    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n").trim_start_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_get_space_and_separation() {
        assert_eq!(
            tidy_markdown("Intro\n##Week 1\n- setup"),
            "Intro\n\n## Week 1\n- setup"
        );
    }

    #[test]
    fn test_list_markers_are_normalized() {
        assert_eq!(
            tidy_markdown("-one\n•  two\n*   three\n1.four\n2. five"),
            "- one\n- two\n- three\n1. four\n2. five"
        );
    }

    #[test]
    fn test_emphasis_rules_and_decimals_survive() {
        let text = "**Bold lead**\n---\n3.14 is pi\n*italic*";
        assert_eq!(tidy_markdown(text), text);
    }

    #[test]
    fn test_blank_runs_collapse() {
        assert_eq!(tidy_markdown("\n\na\n\n\n\nb\n\n"), "a\n\nb");
    }

    #[test]
    fn test_code_fences_are_untouched() {
        let text = "```\n-not a list\n\n\n##nope\n```";
        assert_eq!(tidy_markdown(text), text);
    }

    #[test]
    fn test_nested_list_indent_is_kept() {
        assert_eq!(tidy_markdown("- a\n  -b"), "- a\n  - b");
    }
}
