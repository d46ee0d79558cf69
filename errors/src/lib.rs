//! # LearnPath Errors
//!
//! Error taxonomy shared by every layer of the LearnPath backend.
//!
//! - `PromptError`: template lookup and rendering
//! - `RequestError`: inbound request validation
//! - `ProviderError`: a single call to an external provider
//! - `InvokeError`: the outcome of a retried provider call
//! - `NormalizeError`: coercing a reply into a target shape

use serde::Serialize;
use strum::{AsRefStr, Display};
use thiserror::Error;

/// Prompt catalog errors
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Template {template} is missing parameter: {parameter}")]
    MissingParameter { template: String, parameter: String },

    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    #[error("Failed to read template {name}: {reason}")]
    Io { name: String, reason: String }
}

/// Inbound request validation errors
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("{reason}")]
    MalformedBody { reason: String }
}

impl RequestError {
    /// The message sent when a body is absent or not declared as JSON.
    pub fn not_json() -> Self {
        Self::MalformedBody {
            reason: "Content-Type must be application/json".to_string()
        }
    }
}

/// Classified failure of one provider call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider} rate limited the request: {message}")]
    RateLimited {
        provider: String,
        retry_after_secs: Option<u64>,
        message: String
    },

    #[error("{provider} request failed: {message}")]
    Request {
        provider: String,
        status: Option<u16>,
        message: String
    },

    #[error("{provider} did not answer within {timeout_ms}ms")]
    Timeout { provider: String, timeout_ms: u64 },

    #[error("{provider} returned an unusable response: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("{provider} is not configured")]
    NotConfigured { provider: String }
}

impl ProviderError {
    /// Only rate limits are worth retrying.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    pub fn provider(&self) -> &str {
        match self {
            Self::RateLimited { provider, .. }
            | Self::Request { provider, .. }
            | Self::Timeout { provider, .. }
            | Self::InvalidResponse { provider, .. }
            | Self::NotConfigured { provider } => provider
        }
    }
}

/// Outcome of a provider call driven by the retrying invoker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvokeError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Gave up after {attempts} rate-limited attempts: {last}")]
    RetriesExhausted { attempts: u32, last: ProviderError }
}

impl InvokeError {
    pub fn provider_error(&self) -> &ProviderError {
        match self {
            Self::Provider(err) | Self::RetriesExhausted { last: err, .. } => err
        }
    }
}

/// Strategies the structured parser may try, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ParseStrategy {
    Direct,
    Repaired,
    LineHeuristic
}

/// Response normalization errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Could not parse {shape} after trying {attempted:?}")]
    ParseFailure {
        shape: String,
        attempted: Vec<ParseStrategy>
    },

    #[error("Parsed {shape} does not match the expected contract: {reason}")]
    ValidationFailure { shape: String, reason: String }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_lists_every_field() {
        let err = RequestError::MissingFields {
            fields: vec!["topic".to_string(), "proficiency".to_string()]
        };
        assert_eq!(err.to_string(), "Missing required fields: topic, proficiency");
    }

    #[test]
    fn test_not_json_message() {
        assert_eq!(
            RequestError::not_json().to_string(),
            "Content-Type must be application/json"
        );
    }

    #[test]
    fn test_only_rate_limit_is_retryable() {
        let limited = ProviderError::RateLimited {
            provider: "anthropic".to_string(),
            retry_after_secs: Some(2),
            message: "slow down".to_string()
        };
        let timeout = ProviderError::Timeout {
            provider: "anthropic".to_string(),
            timeout_ms: 30_000
        };
        assert!(limited.is_rate_limited());
        assert!(!timeout.is_rate_limited());
        assert_eq!(timeout.provider(), "anthropic");
    }

    #[test]
    fn test_invoke_error_exposes_last_provider_error() {
        let last = ProviderError::RateLimited {
            provider: "exa".to_string(),
            retry_after_secs: None,
            message: "429".to_string()
        };
        let err = InvokeError::RetriesExhausted {
            attempts: 3,
            last: last.clone()
        };
        assert_eq!(err.provider_error(), &last);
        assert!(err.to_string().contains("3 rate-limited attempts"));
    }

    #[test]
    fn test_parse_failure_names_strategies() {
        let err = NormalizeError::ParseFailure {
            shape: "goals".to_string(),
            attempted: vec![
                ParseStrategy::Direct,
                ParseStrategy::Repaired,
                ParseStrategy::LineHeuristic,
            ]
        };
        assert!(err.to_string().contains("LineHeuristic"));
    }

    #[test]
    fn test_parse_strategy_names_are_snake_case() {
        assert_eq!(ParseStrategy::LineHeuristic.as_ref(), "line_heuristic");
        assert_eq!(ParseStrategy::Repaired.to_string(), "repaired");
    }
}
