//! Layered structured parsing.
//!
//! One parser serves every route. A [`TargetShape`] describes what a reply
//! must become; [`parse`] tries, in order:
//!
//! 1. `Direct`: the whole reply as JSON
//! 2. `Repaired`: the first balanced JSON span in the reply, as-is, without
//!    trailing commas, then with single quotes converted
//! 3. `LineHeuristic`: non-JSON list salvage, for shapes that allow it
//!
//! The first candidate the shape accepts wins. Strict shapes report a
//! `ValidationFailure` when some candidate was valid JSON of the wrong form,
//! so callers can tell "the model ignored the contract" from "the model
//! sent garbage".

use errors::{NormalizeError, ParseStrategy};
use serde_json::Value;

pub use crate::lines::LineRule;
use crate::{lines, repair};

/// Outer JSON container a shape is serialized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Array,
    Object
}

impl Container {
    pub fn opener(self) -> char {
        match self {
            Self::Array => '[',
            Self::Object => '{'
        }
    }
}

/// A JSON contract a reply can be normalized into.
pub trait TargetShape: Sized {
    /// Name used in logs and errors.
    const NAME: &'static str;
    const CONTAINER: Container;
    /// Whether a well-formed but non-conforming value is a validation
    /// failure rather than a parse failure.
    const STRICT: bool = false;

    /// Checks a parsed value against the contract.
    fn accept(value: Value) -> Result<Self, String>;

    fn line_rule() -> Option<LineRule> {
        None
    }

    /// Builds the shape from salvaged lines; only called when
    /// [`TargetShape::line_rule`] is `Some`.
    fn from_lines(_lines: Vec<String>) -> Option<Self> {
        None
    }
}

/// A successfully parsed value and the strategy that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed<T> {
    pub value: T,
    pub strategy: ParseStrategy
}

pub fn parse<S: TargetShape>(text: &str) -> Result<Parsed<S>, NormalizeError> {
    let trimmed = text.trim();
    let mut attempted = vec![ParseStrategy::Direct];
    let mut violation: Option<String> = None;

    if let Some(value) = try_candidate::<S>(trimmed, &mut violation) {
        return Ok(found(value, ParseStrategy::Direct));
    }

    attempted.push(ParseStrategy::Repaired);
    for span in repair::balanced_spans(trimmed, S::CONTAINER.opener()) {
        for candidate in repair::candidates(span) {
            if let Some(value) = try_candidate::<S>(&candidate, &mut violation) {
                return Ok(found(value, ParseStrategy::Repaired));
            }
        }
    }

    if let Some(rule) = S::line_rule() {
        attempted.push(ParseStrategy::LineHeuristic);
        let salvaged = lines::salvage(trimmed, rule);
        if !salvaged.is_empty() {
            if let Some(value) = S::from_lines(salvaged) {
                return Ok(found(value, ParseStrategy::LineHeuristic));
            }
        }
    }

    match violation {
        Some(reason) if S::STRICT => {
            tracing::warn!(shape = S::NAME, %reason, "Reply parsed but violated the contract");
            Err(NormalizeError::ValidationFailure {
                shape: S::NAME.to_string(),
                reason
            })
        }
        _ => {
            tracing::warn!(shape = S::NAME, ?attempted, "Reply could not be parsed");
            Err(NormalizeError::ParseFailure {
                shape: S::NAME.to_string(),
                attempted
            })
        }
    }
}

fn try_candidate<S: TargetShape>(candidate: &str, violation: &mut Option<String>) -> Option<S> {
    let value = serde_json::from_str::<Value>(candidate).ok()?;
    match S::accept(value) {
        Ok(shape) => Some(shape),
        Err(reason) => {
            violation.get_or_insert(reason);
            None
        }
    }
}

fn found<S: TargetShape>(value: S, strategy: ParseStrategy) -> Parsed<S> {
    tracing::debug!(shape = S::NAME, %strategy, "Reply parsed");
    Parsed { value, strategy }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Pair(i64, i64);

    impl TargetShape for Pair {
        const NAME: &'static str = "pair";
        const CONTAINER: Container = Container::Array;
        const STRICT: bool = true;

        fn accept(value: Value) -> Result<Self, String> {
            match value.as_array().map(Vec::as_slice) {
                Some([a, b]) => match (a.as_i64(), b.as_i64()) {
                    (Some(a), Some(b)) => Ok(Pair(a, b)),
                    _ => Err("elements must be integers".to_string())
                },
                _ => Err("expected exactly two elements".to_string())
            }
        }
    }

    #[test]
    fn test_direct_wins_for_clean_json() {
        let parsed = parse::<Pair>(" [1, 2] ").unwrap();
        assert_eq!(parsed.value, Pair(1, 2));
        assert_eq!(parsed.strategy, ParseStrategy::Direct);
    }

    #[test]
    fn test_repaired_finds_embedded_json() {
        let parsed = parse::<Pair>("Sure! Here it is: [3, 4,] hope that helps").unwrap();
        assert_eq!(parsed.value, Pair(3, 4));
        assert_eq!(parsed.strategy, ParseStrategy::Repaired);
    }

    #[test]
    fn test_later_span_is_tried_when_first_is_not_json() {
        let parsed = parse::<Pair>("[see below] then [5, 6]").unwrap();
        assert_eq!(parsed.value, Pair(5, 6));
    }

    #[test]
    fn test_strict_shape_reports_validation_failure() {
        let err = parse::<Pair>("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, NormalizeError::ValidationFailure { ref shape, .. } if shape == "pair"));
    }

    #[test]
    fn test_garbage_reports_attempted_strategies() {
        let err = parse::<Pair>("no json at all").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::ParseFailure {
                shape: "pair".to_string(),
                attempted: vec![ParseStrategy::Direct, ParseStrategy::Repaired]
            }
        );
    }
}
