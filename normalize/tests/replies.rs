//! Observed reply styles run through extraction and parsing together.

use errors::ParseStrategy;
use lp_core::{CardDeck, GoalList, QuestionSet, RawModelReply};
use normalize::{ExampleList, extract, extract_text, parse, tidy_markdown};

#[test]
fn test_questions_wrapped_in_stringified_block() {
    let raw = r#"[TextBlock(text='{"questions": ["What is a scale?", "Why do chords resolve?", "How is rhythm notated?"]}', type='text')]"#;
    let parsed = parse::<QuestionSet>(&extract_text(raw)).unwrap();
    assert_eq!(parsed.value.questions.len(), 3);
    assert_eq!(parsed.value.questions[0], "What is a scale?");
    assert_eq!(parsed.strategy, ParseStrategy::Direct);
}

#[test]
fn test_goals_with_commentary_and_trailing_comma() {
    let reply = RawModelReply::from(
        "Great choice! Here are some goals:\n[\n  \"Read treble clef fluently\",\n  \"Play a C major scale\",\n]\nLet me know if you want more."
    );
    let parsed = parse::<GoalList>(&extract(&reply)).unwrap();
    assert_eq!(
        parsed.value.goals,
        vec!["Read treble clef fluently", "Play a C major scale"]
    );
    assert_eq!(parsed.strategy, ParseStrategy::Repaired);
}

#[test]
fn test_goals_as_python_list_repr() {
    let raw = r"[TextBlock(text='[\'Learn scales\', \'Learn chords\']', type='text')]";
    let text = extract_text(raw);
    assert_eq!(text, "['Learn scales', 'Learn chords']");
    let parsed = parse::<GoalList>(&text).unwrap();
    assert_eq!(parsed.value.goals, vec!["Learn scales", "Learn chords"]);
}

#[test]
fn test_cards_with_multiline_escapes() {
    let raw = r#"[TextBlock(text='{\n  "cards": [\n    {"id": 1, "title": "Pitch", "description": "How high a note sounds", "type": "concept"},\n    {"id": 2, "title": "Rhythm", "description": "When notes happen", "type": "concept"},\n    {"id": 3, "title": "Try it", "description": "Clap a 4/4 beat", "type": "practice"}\n  ]\n}', type='text')]"#;
    let deck = parse::<CardDeck>(&extract_text(raw)).unwrap().value;
    assert_eq!(deck.cards[2].card_type, "practice");
}

#[test]
fn test_examples_object_wrapper() {
    let text = r#"{"examples": [{"description": "Spotify uses collaborative filtering for Discover Weekly", "type": "application"}]}"#;
    let parsed = parse::<ExampleList>(text).unwrap();
    assert_eq!(parsed.value.items.len(), 1);
    assert_eq!(parsed.value.items[0].kind.as_deref(), Some("application"));
}

#[test]
fn test_roadmap_markdown_is_tidied_after_extraction() {
    let raw = r"[TextBlock(text='##Phase 1\n-Install tools\n\n\n\n##Phase 2\n1.Build', type='text')]";
    assert_eq!(
        tidy_markdown(&extract_text(raw)),
        "## Phase 1\n- Install tools\n\n## Phase 2\n1. Build"
    );
}
