//! Deterministic payloads: recovery when a reply cannot be shaped, and the
//! canned responses served in dummy mode.

use lp_core::{
    CardDeck, GoalList, LearningCard, MiniModule, MiniModuleContent, ModuleContent, Resource,
    Roadmap
};

/// Three generic cards about `topic`.
pub fn learning_cards(topic: &str) -> CardDeck {
    let card = |id, title: String, description: String, card_type: &str| LearningCard {
        id,
        title,
        description,
        card_type: card_type.to_string()
    };
    CardDeck {
        cards: vec![
            card(
                1,
                format!("What is {topic}?"),
                format!("{topic} is built on a few core ideas. Start by naming them and how they relate."),
                "concept"
            ),
            card(
                2,
                format!("{topic} in the real world"),
                format!("Look for one place where {topic} shows up in everyday tools or work."),
                "example"
            ),
            card(
                3,
                "Try it yourself".to_string(),
                format!("Spend ten minutes applying one idea from {topic} to a small problem of your own."),
                "practice"
            ),
        ]
    }
}

pub fn mini_module(topic: &str, proficiency: &str) -> MiniModule {
    MiniModule {
        topic: topic.to_string(),
        proficiency: proficiency.to_string(),
        content: MiniModuleContent {
            description: format!("A short introduction to {topic} for a {proficiency} learner."),
            fundamentals: format!(
                "- The core vocabulary of {topic}\n- How its main ideas fit together\n- Where it is applied"
            ),
            summary: format!("Review the fundamentals of {topic}, then practise with a small example.")
        }
    }
}

pub fn dummy_goals() -> GoalList {
    GoalList {
        goals: vec![
            "Learn object-oriented programming principles".to_string(),
            "Build simple command-line applications".to_string(),
            "Understand web development basics with Python".to_string(),
        ]
    }
}

pub fn dummy_roadmap() -> Roadmap {
    Roadmap {
        roadmap: "Dummy roadmap content".to_string(),
        resources: vec![
            Resource {
                title: "Dummy Resource 1".to_string(),
                url: "https://example.com/1".to_string()
            },
            Resource {
                title: "Dummy Resource 2".to_string(),
                url: "https://example.com/2".to_string()
            },
        ]
    }
}

pub fn dummy_module_content() -> ModuleContent {
    ModuleContent {
        first_principles: "Dummy first principles content".to_string(),
        key_information: "Dummy key information".to_string(),
        practice_exercise: "Dummy practice exercise".to_string(),
        ..ModuleContent::default()
    }
}
