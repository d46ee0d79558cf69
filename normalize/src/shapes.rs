//! Target shapes for the routes that expect structured replies.

use lp_core::{CardDeck, GoalList, LearningCard, QuestionSet};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::parser::{Container, LineRule, TargetShape};

pub const CARD_COUNT: usize = 3;
pub const QUESTION_COUNT: usize = 3;

impl TargetShape for GoalList {
    const NAME: &'static str = "goals";
    const CONTAINER: Container = Container::Array;

    fn accept(value: Value) -> Result<Self, String> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("goals") {
                Some(Value::Array(items)) => items,
                _ => return Err("object has no goals array".to_string())
            },
            _ => return Err("expected an array of goals".to_string())
        };
        if items.is_empty() {
            return Err("goal list is empty".to_string());
        }
        let goals = items
            .into_iter()
            .map(|item| match item {
                Value::String(goal) => Ok(goal),
                other => Err(format!("goal is not a string: {other}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(GoalList { goals })
    }

    fn line_rule() -> Option<LineRule> {
        Some(LineRule::MoreThanChars(10))
    }

    fn from_lines(lines: Vec<String>) -> Option<Self> {
        Some(GoalList { goals: lines })
    }
}

impl TargetShape for CardDeck {
    const NAME: &'static str = "learning_cards";
    const CONTAINER: Container = Container::Object;
    const STRICT: bool = true;

    fn accept(value: Value) -> Result<Self, String> {
        let mut object = into_object(value)?;
        let cards = match object.remove("cards") {
            Some(Value::Array(cards)) => cards,
            _ => return Err("missing cards array".to_string())
        };
        if cards.len() != CARD_COUNT {
            return Err(format!("expected {CARD_COUNT} cards, got {}", cards.len()));
        }
        let cards = cards
            .into_iter()
            .enumerate()
            .map(|(i, card)| card_from_value(i, card))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CardDeck { cards })
    }
}

fn card_from_value(index: usize, value: Value) -> Result<LearningCard, String> {
    let Value::Object(card) = value else {
        return Err(format!("card {index} is not an object"));
    };
    let id = card
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| format!("card {index} has no integer id"))?;
    let text = |field: &str| {
        card.get(field)
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| format!("card {index} has no string {field}"))
    };
    Ok(LearningCard {
        id,
        title: text("title")?,
        description: text("description")?,
        card_type: text("type")?
    })
}

impl TargetShape for QuestionSet {
    const NAME: &'static str = "questions";
    const CONTAINER: Container = Container::Object;
    const STRICT: bool = true;

    fn accept(value: Value) -> Result<Self, String> {
        let mut object = into_object(value)?;
        let questions = match object.remove("questions") {
            Some(Value::Array(questions)) => questions,
            _ => return Err("missing questions array".to_string())
        };
        if questions.len() != QUESTION_COUNT {
            return Err(format!(
                "expected {QUESTION_COUNT} questions, got {}",
                questions.len()
            ));
        }
        let questions = questions
            .into_iter()
            .map(|q| match q {
                Value::String(q) if !q.trim().is_empty() => Ok(q),
                other => Err(format!("question is not a non-empty string: {other}"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(QuestionSet { questions })
    }
}

fn into_object(value: Value) -> Result<Map<String, Value>, String> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err("expected a JSON object".to_string())
    }
}

/// One example as the model described it, before timestamps and topic are
/// attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleDraft {
    pub description: String,
    pub kind: Option<String>
}

/// Real-world examples extracted from a grounded answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExampleList {
    pub items: Vec<ExampleDraft>
}

impl TargetShape for ExampleList {
    const NAME: &'static str = "examples";
    const CONTAINER: Container = Container::Array;

    fn accept(value: Value) -> Result<Self, String> {
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("examples") {
                Some(Value::Array(items)) => items,
                _ => return Err("object has no examples array".to_string())
            },
            _ => return Err("expected an array of examples".to_string())
        };
        if items.is_empty() {
            return Err("example list is empty".to_string());
        }
        let items = items
            .into_iter()
            .map(|item| match item {
                Value::String(description) => Ok(ExampleDraft {
                    description,
                    kind: None
                }),
                Value::Object(map) => {
                    let description = map
                        .get("description")
                        .and_then(Value::as_str)
                        .ok_or_else(|| "example has no description".to_string())?;
                    Ok(ExampleDraft {
                        description: description.to_string(),
                        kind: map.get("type").and_then(Value::as_str).map(String::from)
                    })
                }
                other => Err(format!("unsupported example: {other}"))
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(ExampleList { items })
    }

    fn line_rule() -> Option<LineRule> {
        Some(LineRule::MoreThanWords(3))
    }

    fn from_lines(lines: Vec<String>) -> Option<Self> {
        Some(ExampleList {
            items: lines
                .into_iter()
                .map(|description| ExampleDraft {
                    description,
                    kind: None
                })
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use errors::{NormalizeError, ParseStrategy};
    use serde_json::json;

    #[test]
    fn test_goals_round_trip() {
        let goals = vec![
            "  Learn scales ".to_string(),
            "Play \"Autumn Leaves\"".to_string(),
            "Use [brackets] and {braces}".to_string(),
        ];
        let text = serde_json::to_string(&goals).unwrap();
        let parsed = parse::<GoalList>(&text).unwrap();
        assert_eq!(parsed.value.goals, goals);
        assert_eq!(parsed.strategy, ParseStrategy::Direct);
    }

    #[test]
    fn test_goals_from_numbered_prose() {
        let parsed =
            parse::<GoalList>("1. Learn scales\n2. Learn chords\n\n3. Practice sight-reading")
                .unwrap();
        assert_eq!(
            parsed.value.goals,
            vec!["Learn scales", "Learn chords", "Practice sight-reading"]
        );
        assert_eq!(parsed.strategy, ParseStrategy::LineHeuristic);
    }

    #[test]
    fn test_goals_reject_non_string_elements() {
        assert!(GoalList::accept(json!(["Learn scales", 3])).is_err());
        assert!(GoalList::accept(json!([])).is_err());
        assert_eq!(
            GoalList::accept(json!({"goals": ["Learn scales"]})).unwrap().goals,
            vec!["Learn scales"]
        );
    }

    fn card(id: i64) -> Value {
        json!({"id": id, "title": "T", "description": "D", "type": "concept"})
    }

    #[test]
    fn test_cards_accept_exactly_three() {
        let deck = CardDeck::accept(json!({"cards": [card(1), card(2), card(3)]})).unwrap();
        assert_eq!(deck.cards.len(), 3);
        assert_eq!(deck.cards[2].id, 3);
    }

    #[test]
    fn test_cards_reject_wrong_length_even_when_json_is_valid() {
        let text = json!({"cards": [card(1), card(2)]}).to_string();
        assert!(matches!(
            parse::<CardDeck>(&text),
            Err(NormalizeError::ValidationFailure { .. })
        ));
        let text = json!({"cards": [card(1), card(2), card(3), card(4)]}).to_string();
        assert!(matches!(
            parse::<CardDeck>(&text),
            Err(NormalizeError::ValidationFailure { .. })
        ));
    }

    #[test]
    fn test_cards_reject_missing_fields() {
        let incomplete = json!({"id": 3, "title": "T", "description": "D"});
        let text = json!({"cards": [card(1), card(2), incomplete]}).to_string();
        match parse::<CardDeck>(&text) {
            Err(NormalizeError::ValidationFailure { reason, .. }) => {
                assert!(reason.contains("type"), "{reason}");
            }
            other => panic!("unexpected: {other:?}")
        }
    }

    #[test]
    fn test_cards_reject_string_ids() {
        let bad = json!({"id": "3", "title": "T", "description": "D", "type": "x"});
        assert!(CardDeck::accept(json!({"cards": [card(1), card(2), bad]})).is_err());
    }

    #[test]
    fn test_cards_in_prose_are_repaired() {
        let text = format!(
            "Here are your cards:\n```json\n{}\n```",
            json!({"cards": [card(1), card(2), card(3)]})
        );
        let parsed = parse::<CardDeck>(&text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Repaired);
    }

    #[test]
    fn test_questions_need_three_strings() {
        assert!(QuestionSet::accept(json!({"questions": ["a?", "b?", "c?"]})).is_ok());
        assert!(QuestionSet::accept(json!({"questions": ["a?", "b?"]})).is_err());
        assert!(QuestionSet::accept(json!({"questions": ["a?", "b?", 3]})).is_err());
        assert!(QuestionSet::accept(json!(["a?", "b?", "c?"])).is_err());
    }

    #[test]
    fn test_questions_unparseable_is_parse_failure() {
        assert!(matches!(
            parse::<QuestionSet>("I could not think of any questions."),
            Err(NormalizeError::ParseFailure { .. })
        ));
    }

    #[test]
    fn test_examples_accept_objects_and_strings() {
        let list = ExampleList::accept(json!([
            {"description": "NASA used it", "type": "news"},
            "A plain string example"
        ]))
        .unwrap();
        assert_eq!(list.items[0].kind.as_deref(), Some("news"));
        assert_eq!(list.items[1].kind, None);
    }

    #[test]
    fn test_examples_fall_back_to_lines() {
        let text = "Examples:\n- In 2023 a bank adopted this model for fraud detection\n- Too short";
        let parsed = parse::<ExampleList>(text).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::LineHeuristic);
        assert_eq!(parsed.value.items.len(), 1);
    }
}
