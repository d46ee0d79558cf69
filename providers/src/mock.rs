//! Scripted providers for tests and offline runs.

use crate::retry::Sleeper;
use async_trait::async_trait;
use errors::ProviderError;
use lp_core::{
    AnsweringProvider, GenerationProvider, GenerationRequest, GroundedAnswer, RawModelReply,
    SearchProvider, SearchQuery, SearchResult
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Records requested waits instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    sleeps: Mutex<Vec<Duration>>
}

impl RecordingSleeper {
    pub fn recorded(&self) -> Vec<Duration> {
        self.sleeps.lock().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().push(duration);
    }
}

fn exhausted(provider: &str) -> ProviderError {
    ProviderError::InvalidResponse {
        provider: provider.to_string(),
        reason: "no scripted reply left".to_string()
    }
}

/// Generation provider answering from rules and a reply queue.
///
/// Rules match a substring of the request's last message and are reusable;
/// they are checked before the queue.
#[derive(Default)]
pub struct ScriptedGenerator {
    rules: Mutex<Vec<(String, String)>>,
    replies: Mutex<VecDeque<Result<RawModelReply, ProviderError>>>,
    requests: Mutex<Vec<GenerationRequest>>
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>
    {
        let generator = Self::new();
        for reply in replies {
            generator.push_reply(reply);
        }
        generator
    }

    pub fn push_reply(&self, reply: impl Into<String>) -> &Self {
        self.replies
            .lock()
            .push_back(Ok(RawModelReply::Text(reply.into())));
        self
    }

    pub fn push_segments(&self, reply: RawModelReply) -> &Self {
        self.replies.lock().push_back(Ok(reply));
        self
    }

    pub fn push_error(&self, error: ProviderError) -> &Self {
        self.replies.lock().push_back(Err(error));
        self
    }

    pub fn on_prompt_containing(&self, needle: impl Into<String>, reply: impl Into<String>) -> &Self {
        self.rules.lock().push((needle.into(), reply.into()));
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl GenerationProvider for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<RawModelReply, ProviderError> {
        self.requests.lock().push(request.clone());

        let prompt = request
            .messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let matched = self
            .rules
            .lock()
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());
        if let Some(reply) = matched {
            return Ok(RawModelReply::Text(reply));
        }

        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted(self.name())))
    }
}

/// Search provider returning a fixed outcome.
pub struct ScriptedSearch {
    outcome: Result<Vec<SearchResult>, ProviderError>,
    queries: Mutex<Vec<SearchQuery>>
}

impl ScriptedSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            outcome: Ok(results),
            queries: Mutex::new(Vec::new())
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            outcome: Err(error),
            queries: Mutex::new(Vec::new())
        }
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchProvider for ScriptedSearch {
    fn name(&self) -> &str {
        "scripted-search"
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError> {
        self.queries.lock().push(query.clone());
        self.outcome.clone()
    }
}

/// Answering provider popping scripted answers in order.
#[derive(Default)]
pub struct ScriptedAnswerer {
    answers: Mutex<VecDeque<Result<GroundedAnswer, ProviderError>>>,
    prompts: Mutex<Vec<String>>
}

impl ScriptedAnswerer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_answer(&self, content: impl Into<String>, citations: Vec<String>) -> &Self {
        self.answers.lock().push_back(Ok(GroundedAnswer {
            content: content.into(),
            citations
        }));
        self
    }

    pub fn push_error(&self, error: ProviderError) -> &Self {
        self.answers.lock().push_back(Err(error));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl AnsweringProvider for ScriptedAnswerer {
    fn name(&self) -> &str {
        "scripted-answers"
    }

    async fn answer(&self, prompt: &str) -> Result<GroundedAnswer, ProviderError> {
        self.prompts.lock().push(prompt.to_string());
        self.answers
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(exhausted(self.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rules_take_priority_over_queue() {
        let generator = ScriptedGenerator::with_replies(["queued"]);
        generator.on_prompt_containing("cards", "{\"cards\": []}");

        let cards = GenerationRequest::new("m", 10).with_user("make cards");
        let other = GenerationRequest::new("m", 10).with_user("make goals");

        let first = generator.generate(&cards).await.unwrap();
        let second = generator.generate(&other).await.unwrap();
        assert_eq!(first.as_text(), "{\"cards\": []}");
        assert_eq!(second.as_text(), "queued");
        assert_eq!(generator.call_count(), 2);
    }

    #[tokio::test]
    async fn test_empty_queue_is_an_error() {
        let generator = ScriptedGenerator::new();
        let result = generator
            .generate(&GenerationRequest::new("m", 10).with_user("hi"))
            .await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse { .. })));
    }

    #[tokio::test]
    async fn test_answerer_records_prompts() {
        let answerer = ScriptedAnswerer::new();
        answerer.push_answer("text", vec!["https://a.example".to_string()]);
        let answer = answerer.answer("find examples").await.unwrap();
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answerer.prompts(), vec!["find examples"]);
    }
}
