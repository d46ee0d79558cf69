//! # Providers
//!
//! Adapters for the external APIs LearnPath depends on, and the retry policy
//! wrapped around every call.
//!
//! - [`anthropic::AnthropicClient`]: text generation (Messages API)
//! - [`exa::ExaClient`]: web search for roadmap resources
//! - [`perplexity::PerplexityClient`]: search-grounded answers with citations
//! - [`retry::RetryingInvoker`]: exponential backoff on rate limits only
//! - [`mock`]: scripted providers and a recording sleeper for tests

pub mod anthropic;
pub mod exa;
pub mod http;
pub mod mock;
pub mod perplexity;
pub mod retry;

pub use anthropic::AnthropicClient;
pub use exa::ExaClient;
pub use perplexity::PerplexityClient;
pub use retry::{RetryPolicy, RetryingInvoker, Sleeper, TokioSleeper};
