//! Anthropic Messages API client.

use crate::http::{build_client, check_status, decode, join_url, require_key, transport_error};
use async_trait::async_trait;
use config::AnthropicConfig;
use errors::ProviderError;
use lp_core::{ContentSegment, GenerationProvider, GenerationRequest, RawModelReply, SegmentKind};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const PROVIDER: &str = "anthropic";

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>
}

#[derive(Debug, Deserialize)]
struct ResponseBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>
}

impl From<ResponseBlock> for ContentSegment {
    fn from(block: ResponseBlock) -> Self {
        let kind = match block.kind.as_str() {
            "text" => SegmentKind::Text,
            "tool_use" => SegmentKind::ToolUse,
            _ => SegmentKind::Other
        };
        ContentSegment {
            kind,
            text: block.text.unwrap_or_default()
        }
    }
}

pub struct AnthropicClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    api_version: String,
    timeout: Duration
}

impl AnthropicClient {
    pub fn new(config: &AnthropicConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            timeout
        })
    }
}

#[async_trait]
impl GenerationProvider for AnthropicClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<RawModelReply, ProviderError> {
        let api_key = require_key(PROVIDER, self.api_key.as_deref())?;
        let url = join_url(&self.base_url, "v1/messages");

        tracing::debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            messages = request.messages.len(),
            "Sending Anthropic request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .json(request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &e, self.timeout))?;

        let response = check_status(PROVIDER, response).await?;
        let body: MessagesResponse = decode(PROVIDER, response).await?;

        Ok(RawModelReply::Segments(
            body.content.into_iter().map(ContentSegment::from).collect()
        ))
    }
}
