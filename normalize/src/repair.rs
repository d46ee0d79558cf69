//! Recovery of JSON embedded in prose.
//!
//! Models wrap JSON in commentary, code fences, trailing commas and
//! Python-style single quotes. These helpers locate a balanced span and
//! produce progressively more aggressive rewrites of it; the parser tries
//! each one in order.

/// Upper bound on opener positions examined in one reply.
const MAX_SPANS: usize = 16;

/// Balanced spans starting at each `opener` in `text`, leftmost first.
///
/// Brackets inside double-quoted strings are ignored. Unbalanced or
/// mismatched spans are skipped.
pub fn balanced_spans(text: &str, opener: char) -> Vec<&str> {
    text.match_indices(opener)
        .take(MAX_SPANS)
        .filter_map(|(start, _)| balanced_from(text, start).map(|end| &text[start..end]))
        .collect()
}

fn balanced_from(text: &str, start: usize) -> Option<usize> {
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ']' | '}' => {
                if stack.pop() != Some(c) {
                    return None;
                }
                if stack.is_empty() {
                    return Some(start + offset + c.len_utf8());
                }
            }
            _ => {}
        }
    }
    None
}

/// Candidate rewrites of one span, in the order they should be tried.
pub fn candidates(span: &str) -> Vec<String> {
    let mut out = vec![span.to_string()];

    let without_commas = strip_trailing_commas(span);
    if without_commas != span {
        out.push(without_commas);
    }

    let requoted = strip_trailing_commas(&single_to_double_quotes(span));
    if !out.contains(&requoted) {
        out.push(requoted);
    }

    out
}

/// Drops a comma that is followed only by whitespace and a closing bracket.
pub fn strip_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = json.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            out.push(c);
            continue;
        }
        if c == ',' {
            let rest = json[i + 1..].trim_start();
            if rest.starts_with(']') || rest.starts_with('}') {
                continue;
            }
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
    }
    out
}

/// Rewrites `'single quoted'` JSON strings as `"double quoted"` ones.
///
/// A single quote only opens a string where a JSON value or key may start
/// (after `[`, `{`, `,` or `:`), and only closes one when followed by a
/// structural character, so apostrophes inside words survive.
pub fn single_to_double_quotes(json: &str) -> String {
    let chars: Vec<char> = json.chars().collect();
    let mut out = String::with_capacity(json.len());
    let mut in_double = false;
    let mut escaped = false;
    let mut last_structural = '\0';
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if in_double {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_double = false,
                _ => {}
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '"' => {
                in_double = true;
                out.push(c);
            }
            '\'' if matches!(last_structural, '[' | '{' | ',' | ':') => {
                if let Some(end) = closing_single_quote(&chars, i + 1) {
                    out.push('"');
                    let mut j = i + 1;
                    while j < end {
                        match chars[j] {
                            '\\' if chars.get(j + 1) == Some(&'\'') => {
                                out.push('\'');
                                j += 2;
                                continue;
                            }
                            '"' => out.push_str("\\\""),
                            other => out.push(other)
                        }
                        j += 1;
                    }
                    out.push('"');
                    i = end + 1;
                    last_structural = '"';
                    continue;
                }
                out.push(c);
            }
            _ => {
                if !c.is_whitespace() {
                    last_structural = c;
                }
                out.push(c);
            }
        }
        i += 1;
    }
    out
}

fn closing_single_quote(chars: &[char], from: usize) -> Option<usize> {
    let mut j = from;
    while j < chars.len() {
        match chars[j] {
            '\\' => j += 2,
            '\'' => {
                let next = chars[j + 1..].iter().find(|c| !c.is_whitespace());
                if matches!(next, None | Some(',' | ']' | '}' | ':')) {
                    return Some(j);
                }
                j += 1;
            }
            _ => j += 1
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_skips_prose_and_fences() {
        let text = "Here you go:\n```json\n[\"a\", \"b\"]\n```\nEnjoy!";
        assert_eq!(balanced_spans(text, '['), vec!["[\"a\", \"b\"]"]);
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        let text = r#"{"cards": [{"title": "Arrays [intro]"}]} trailing }"#;
        assert_eq!(
            balanced_spans(text, '{')[0],
            r#"{"cards": [{"title": "Arrays [intro]"}]}"#
        );
    }

    #[test]
    fn test_opener_positions_are_capped() {
        let text = format!("{}[1]", "[".repeat(MAX_SPANS));
        assert!(balanced_spans(&text, '[').is_empty());

        let text = format!("{}[1]", "[".repeat(MAX_SPANS - 1));
        assert_eq!(balanced_spans(&text, '['), vec!["[1]"]);
    }

    #[test]
    fn test_unbalanced_span_is_skipped() {
        assert!(balanced_spans("[\"a\", \"b\"", '[').is_empty());
    }

    #[test]
    fn test_trailing_commas_removed_outside_strings() {
        assert_eq!(
            strip_trailing_commas(r#"["a, ]", "b",  ]"#),
            r#"["a, ]", "b"  ]"#
        );
        assert_eq!(strip_trailing_commas(r#"{"a": 1,}"#), r#"{"a": 1}"#);
    }

    #[test]
    fn test_single_quotes_become_double_quotes() {
        assert_eq!(
            single_to_double_quotes("['Learn scales', 'Don\\'t rush', 'Say \"hi\"']"),
            r#"["Learn scales", "Don't rush", "Say \"hi\""]"#
        );
    }

    #[test]
    fn test_apostrophes_in_double_quoted_strings_survive() {
        let json = r#"{"questions": ["What's a scale?"]}"#;
        assert_eq!(single_to_double_quotes(json), json);
    }

    #[test]
    fn test_candidates_are_ordered_and_distinct() {
        let got = candidates("['a', 'b',]");
        assert_eq!(got.len(), 3);
        assert_eq!(got[2], r#"["a", "b"]"#);
        assert_eq!(candidates(r#"["a"]"#), vec![r#"["a"]"#.to_string()]);
    }
}
