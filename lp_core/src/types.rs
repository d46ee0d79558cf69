//! Core types for the LearnPath backend
//!
//! Every struct that reaches the front end keeps the exact JSON field names
//! the browser code reads, so renames here are wire-visible.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Speaker of a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant
}

/// One turn of a conversation sent to a generation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into()
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into()
        }
    }
}

/// Everything a generation provider needs for one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub model: String,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<ChatMessage>
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
            system: None,
            messages: Vec::new()
        }
    }

    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: impl IntoIterator<Item = ChatMessage>) -> Self {
        self.messages.extend(messages);
        self
    }

    #[must_use]
    pub fn with_user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user(content));
        self
    }
}

/// Kind of a typed content segment in a provider reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SegmentKind {
    Text,
    ToolUse,
    Other
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSegment {
    pub kind: SegmentKind,
    pub text: String
}

impl ContentSegment {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Text,
            text: text.into()
        }
    }
}

/// What a generation provider hands back before any normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawModelReply {
    Segments(Vec<ContentSegment>),
    Text(String)
}

impl Default for RawModelReply {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

impl RawModelReply {
    /// Textual representation: the text segments concatenated, or the payload.
    pub fn as_text(&self) -> String {
        match self {
            Self::Segments(segments) => segments
                .iter()
                .filter(|s| s.kind == SegmentKind::Text)
                .map(|s| s.text.as_str())
                .collect(),
            Self::Text(text) => text.clone()
        }
    }
}

impl From<String> for RawModelReply {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RawModelReply {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
    pub result_count: usize
}

/// A raw search hit; either field may be absent upstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: Option<String>,
    pub url: Option<String>
}

/// Answer text plus the URLs a grounded provider consulted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundedAnswer {
    pub content: String,
    pub citations: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalList {
    pub goals: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String
}

impl Resource {
    /// Fills gaps left by the search provider. `position` is zero-based.
    pub fn from_search(result: SearchResult, position: usize) -> Self {
        Self {
            title: result
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| format!("Resource {}", position + 1)),
            url: result.url.unwrap_or_default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roadmap {
    pub roadmap: String,
    pub resources: Vec<Resource>
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContent {
    pub first_principles: String,
    pub fundamental_truths: String,
    pub cross_domain_connections: String,
    pub key_information: String,
    pub practice_exercise: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningCard {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub card_type: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDeck {
    pub cards: Vec<LearningCard>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSet {
    pub questions: Vec<String>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealWorldExample {
    pub description: String,
    #[serde(rename = "type")]
    pub example_type: String,
    pub timestamp: String,
    pub text: String,
    pub topic: String
}

/// A source link shown under generated content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Bare domain of `url`.
    pub text: String,
    pub url: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamplesResult {
    pub examples: Vec<RealWorldExample>,
    pub citations: Vec<Citation>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniModuleContent {
    pub description: String,
    pub fundamentals: String,
    pub summary: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiniModule {
    pub topic: String,
    pub proficiency: String,
    pub content: MiniModuleContent
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_segments_keep_only_text() {
        let reply = RawModelReply::Segments(vec![
            ContentSegment::text("Hello "),
            ContentSegment {
                kind: SegmentKind::ToolUse,
                text: "ignored".to_string()
            },
            ContentSegment::text("world"),
        ]);
        assert_eq!(reply.as_text(), "Hello world");
    }

    #[test]
    fn test_default_reply_is_empty_text() {
        assert_eq!(RawModelReply::default().as_text(), "");
    }

    #[test]
    fn test_module_content_uses_camel_case() {
        let value = serde_json::to_value(ModuleContent {
            first_principles: "a".to_string(),
            fundamental_truths: "b".to_string(),
            cross_domain_connections: "c".to_string(),
            key_information: "d".to_string(),
            practice_exercise: "e".to_string()
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "firstPrinciples": "a",
                "fundamentalTruths": "b",
                "crossDomainConnections": "c",
                "keyInformation": "d",
                "practiceExercise": "e"
            })
        );
    }

    #[test]
    fn test_card_type_field_is_named_type() {
        let card: LearningCard = serde_json::from_value(json!({
            "id": 1,
            "title": "Scales",
            "description": "Ordered notes",
            "type": "concept"
        }))
        .unwrap();
        assert_eq!(card.card_type, "concept");
        assert_eq!(serde_json::to_value(&card).unwrap()["type"], "concept");
    }

    #[test]
    fn test_resource_fills_missing_fields() {
        let resource = Resource::from_search(SearchResult::default(), 2);
        assert_eq!(resource.title, "Resource 3");
        assert_eq!(resource.url, "");
    }

    #[test]
    fn test_request_builder_omits_absent_system() {
        let request = GenerationRequest::new("claude-3-haiku-20240307", 1000).with_user("hi");
        let value = serde_json::to_value(&request).unwrap();
        assert!(value.get("system").is_none());
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_chat_role_round_trips_through_strum() {
        assert_eq!(ChatRole::Assistant.to_string(), "assistant");
        assert_eq!(ChatRole::from_str("user").unwrap(), ChatRole::User);
    }
}
