//! Plain-text recovery from raw model replies.
//!
//! Some SDK paths stringify the reply's content list instead of reading its
//! text, which yields `[TextBlock(text='...', type='text')]` with the payload
//! repr-escaped. When that marker is present the quoted payloads are pulled
//! back out and unescaped; otherwise the text is used as-is.

use lp_core::RawModelReply;
use regex::Regex;
use std::sync::LazyLock;

const BLOCK_MARKER: &str = "TextBlock";

static BLOCK_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\btext=(?:'((?:[^'\\]|\\[\s\S])*)'|"((?:[^"\\]|\\[\s\S])*)")"#).unwrap()
});

/// Text of a raw reply with any leaked content-block wrapper removed.
pub fn extract(reply: &RawModelReply) -> String {
    extract_text(&reply.as_text())
}

/// Same as [`extract`] for a reply already coerced to a string.
///
/// Empty input gives `""`; clean text is only trimmed, so applying this
/// twice changes nothing.
pub fn extract_text(raw: &str) -> String {
    if !raw.contains(BLOCK_MARKER) {
        return raw.trim().to_string();
    }

    let payloads: Vec<String> = BLOCK_TEXT
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| unescape_repr(m.as_str()))
        .collect();

    if payloads.is_empty() {
        tracing::debug!("Content block marker present but no payload matched");
        return raw.trim().to_string();
    }

    payloads.concat().trim().to_string()
}

/// Undo Python-style repr escaping in one pass so `\\n` stays a literal
/// backslash followed by `n`.
fn unescape_repr(escaped: &str) -> String {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\')
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lp_core::ContentSegment;

    #[test]
    fn test_clean_text_is_trimmed_only() {
        assert_eq!(extract_text("  Learn scales\n"), "Learn scales");
    }

    #[test]
    fn test_empty_input_gives_empty_string() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract(&RawModelReply::default()), "");
    }

    #[test]
    fn test_stringified_block_is_unwrapped() {
        let raw = r#"[TextBlock(text='["Learn scales", "Learn chords"]\n', type='text')]"#;
        assert_eq!(extract_text(raw), r#"["Learn scales", "Learn chords"]"#);
    }

    #[test]
    fn test_escapes_are_undone_in_one_pass() {
        let raw = r"[TextBlock(text='It\'s a\nnew line and a \\n literal', type='text')]";
        assert_eq!(extract_text(raw), "It's a\nnew line and a \\n literal");
    }

    #[test]
    fn test_double_quoted_payload() {
        let raw = r#"[TextBlock(text="It's \"quoted\"", type='text')]"#;
        assert_eq!(extract_text(raw), r#"It's "quoted""#);
    }

    #[test]
    fn test_multiline_payload_is_captured() {
        let raw = "[TextBlock(text='line one\nline two', type='text')]";
        assert_eq!(extract_text(raw), "line one\nline two");
    }

    #[test]
    fn test_marker_without_payload_falls_back_to_full_text() {
        assert_eq!(
            extract_text("  The TextBlock type is documented elsewhere. "),
            "The TextBlock type is documented elsewhere."
        );
    }

    #[test]
    fn test_context_field_is_not_mistaken_for_text() {
        let raw = "TextBlock(context='ignore me', text='keep me', type='text')";
        assert_eq!(extract_text(raw), "keep me");
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let once = extract_text("  # Roadmap\n\n- step one  ");
        assert_eq!(extract_text(&once), once);
    }

    #[test]
    fn test_segments_are_joined_before_extraction() {
        let reply = RawModelReply::Segments(vec![
            ContentSegment::text("first "),
            ContentSegment::text("second"),
        ]);
        assert_eq!(extract(&reply), "first second");
    }
}
