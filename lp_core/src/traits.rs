//! Provider traits for the LearnPath backend

use async_trait::async_trait;
use errors::ProviderError;

use crate::types::{GenerationRequest, GroundedAnswer, RawModelReply, SearchQuery, SearchResult};

/// A chat-completion model that turns a prompt into a reply.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<RawModelReply, ProviderError>;
}

/// A web search API returning ranked links.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError>;
}

/// A search-augmented chat model that cites the URLs it used.
#[async_trait]
pub trait AnsweringProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn answer(&self, prompt: &str) -> Result<GroundedAnswer, ProviderError>;
}
