//! Template parsing and rendering.
//!
//! Syntax: `{identifier}` is a placeholder, `{{` and `}}` are literal braces.
//! A `{` that does not open a well-formed placeholder is kept as text, so
//! prompts can quote stray braces without escaping every one.

use errors::PromptError;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String)
}

/// A parsed prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    name: String,
    segments: Vec<Segment>
}

impl PromptTemplate {
    pub fn parse(name: impl Into<String>, source: &str) -> Self {
        let bytes = source.as_bytes();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    literal.push('{');
                    i += 2;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    literal.push('}');
                    i += 2;
                }
                b'{' => match placeholder_at(bytes, i + 1) {
                    Some(end) => {
                        if !literal.is_empty() {
                            segments.push(Segment::Literal(std::mem::take(&mut literal)));
                        }
                        segments.push(Segment::Placeholder(source[i + 1..end].to_string()));
                        i = end + 1;
                    }
                    None => {
                        literal.push('{');
                        i += 1;
                    }
                },
                _ => {
                    // Copy up to the next brace in one go; keeps multi-byte chars intact.
                    let next = source[i..]
                        .find(['{', '}'])
                        .map_or(bytes.len(), |offset| i + offset.max(1));
                    literal.push_str(&source[i..next]);
                    i = next;
                }
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self {
            name: name.into(),
            segments
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Distinct placeholder names in order of first appearance.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Placeholder(key) = segment {
                if !seen.contains(&key.as_str()) {
                    seen.push(key);
                }
            }
        }
        seen
    }

    pub fn render(&self, params: &HashMap<String, String>) -> Result<String, PromptError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(key) => {
                    let value = params.get(key).ok_or_else(|| PromptError::MissingParameter {
                        template: self.name.clone(),
                        parameter: key.clone()
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Index of the closing `}` when `bytes[start..]` is `identifier}`.
fn placeholder_at(bytes: &[u8], start: usize) -> Option<usize> {
    let first = *bytes.get(start)?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut i = start + 1;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'}' => return Some(i),
            b if b.is_ascii_alphanumeric() || b == b'_' => i += 1,
            _ => return None
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_renders_every_placeholder() {
        let template = PromptTemplate::parse("goals", "Study {topic} as a {proficiency}. {topic}!");
        let rendered = template
            .render(&params(&[("topic", "music theory"), ("proficiency", "beginner")]))
            .unwrap();
        assert_eq!(rendered, "Study music theory as a beginner. music theory!");
        assert_eq!(template.placeholders(), vec!["topic", "proficiency"]);
    }

    #[test]
    fn test_missing_parameter_is_named() {
        let template = PromptTemplate::parse("goals", "{topic} at {proficiency}");
        let err = template.render(&params(&[("topic", "rust")])).unwrap_err();
        match err {
            PromptError::MissingParameter {
                template,
                parameter
            } => {
                assert_eq!(template, "goals");
                assert_eq!(parameter, "proficiency");
            }
            other => panic!("unexpected error: {other:?}")
        }
    }

    #[test]
    fn test_escaped_braces_are_literal() {
        let template = PromptTemplate::parse("cards", r#"{{"cards": [{{"id": 1}}]}} about {topic}"#);
        assert_eq!(template.placeholders(), vec!["topic"]);
        let rendered = template.render(&params(&[("topic", "jazz")])).unwrap();
        assert_eq!(rendered, r#"{"cards": [{"id": 1}]} about jazz"#);
    }

    #[test]
    fn test_stray_braces_survive() {
        let template = PromptTemplate::parse("raw", "a { b } c {not valid} {x");
        assert!(template.placeholders().is_empty());
        assert_eq!(
            template.render(&HashMap::new()).unwrap(),
            "a { b } c {not valid} {x"
        );
    }

    #[test]
    fn test_substituted_values_are_not_reparsed() {
        let template = PromptTemplate::parse("explain", "Explain: {sentence}");
        let rendered = template
            .render(&params(&[("sentence", "use {topic} carefully")]))
            .unwrap();
        assert_eq!(rendered, "Explain: use {topic} carefully");
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let template = PromptTemplate::parse("t", "Café • {topic} → done");
        let rendered = template.render(&params(&[("topic", "crème")])).unwrap();
        assert_eq!(rendered, "Café • crème → done");
    }
}
