//! Perplexity chat completions client.
//!
//! Citations come from the top-level `citations` array. Newer responses may
//! carry only `search_results`; their URLs are used when `citations` is
//! absent or empty.

use crate::http::{build_client, check_status, decode, join_url, require_key, transport_error};
use async_trait::async_trait;
use config::PerplexityConfig;
use errors::ProviderError;
use lp_core::{AnsweringProvider, ChatMessage, GroundedAnswer};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "perplexity";

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    citations: Vec<String>,
    #[serde(default)]
    search_results: Vec<SearchResultRef>
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: String
}

#[derive(Debug, Deserialize)]
struct SearchResultRef {
    #[serde(default)]
    url: Option<String>
}

pub struct PerplexityClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration
}

impl PerplexityClient {
    pub fn new(config: &PerplexityConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout
        })
    }
}

#[async_trait]
impl AnsweringProvider for PerplexityClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn answer(&self, prompt: &str) -> Result<GroundedAnswer, ProviderError> {
        let api_key = require_key(PROVIDER, self.api_key.as_deref())?;
        let body = CompletionBody {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)]
        };

        let response = self
            .client
            .post(join_url(&self.base_url, "chat/completions"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &e, self.timeout))?;

        let response = check_status(PROVIDER, response).await?;
        let parsed: CompletionResponse = decode(PROVIDER, response).await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::InvalidResponse {
                provider: PROVIDER.to_string(),
                reason: "response has no choices".to_string()
            })?;

        let citations = if parsed.citations.is_empty() {
            parsed
                .search_results
                .into_iter()
                .filter_map(|r| r.url)
                .collect()
        } else {
            parsed.citations
        };

        tracing::debug!(citations = citations.len(), "Perplexity answer received");

        Ok(GroundedAnswer { content, citations })
    }
}
