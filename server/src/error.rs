//! Error types for the LearnPath HTTP surface.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response}
};
use errors::{InvokeError, NormalizeError, PromptError, ProviderError, RequestError};
use serde::Serialize;
use thiserror::Error;

/// Result type alias for handlers and the learning service.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Everything a route can fail with.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request body is missing, not JSON, or lacks required fields.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// A prompt template could not be loaded or rendered.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// A provider call failed, possibly after retries.
    #[error(transparent)]
    Invoke(#[from] InvokeError),

    /// The provider answered with something that cannot be shaped.
    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Server startup error.
    #[error("Server error: {0}")]
    Server(String)
}

impl From<ProviderError> for ApiError {
    fn from(error: ProviderError) -> Self {
        Self::Invoke(InvokeError::Provider(error))
    }
}

impl ApiError {
    /// Machine-readable code carried in the response body and metrics.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Request(RequestError::MissingFields { .. }) => "MISSING_FIELDS",
            Self::Request(RequestError::MalformedBody { .. }) => "INVALID_REQUEST",
            Self::Prompt(_) => "PROMPT_ERROR",
            Self::Invoke(InvokeError::RetriesExhausted { .. }) => "RETRIES_EXHAUSTED",
            Self::Invoke(InvokeError::Provider(e)) => match e {
                ProviderError::RateLimited { .. } => "RATE_LIMITED",
                ProviderError::Timeout { .. } => "PROVIDER_TIMEOUT",
                ProviderError::NotConfigured { .. } => "PROVIDER_NOT_CONFIGURED",
                ProviderError::Request { .. } | ProviderError::InvalidResponse { .. } => {
                    "PROVIDER_ERROR"
                }
            },
            Self::Normalize(_) => "UNUSABLE_PROVIDER_RESPONSE",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Server(_) => "SERVER_ERROR"
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Request(_) => StatusCode::BAD_REQUEST,
            Self::Invoke(InvokeError::RetriesExhausted { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Invoke(InvokeError::Provider(e)) => match e {
                ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                ProviderError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY
            },
            Self::Normalize(_) => StatusCode::BAD_GATEWAY,
            Self::Prompt(_) | Self::Configuration(_) | Self::Server(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Error response body for HTTP endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (message, details) = match &self {
            Self::Request(e) => (e.to_string(), None),
            Self::Prompt(e) => {
                tracing::error!(error = %e, "Prompt error");
                ("Failed to build the prompt for this request".to_string(), None)
            }
            Self::Invoke(InvokeError::RetriesExhausted { attempts, last }) => {
                tracing::error!(error = %last, attempts, "Provider retries exhausted");
                (
                    format!("{} is busy, please try again later", last.provider()),
                    None
                )
            }
            Self::Invoke(InvokeError::Provider(e)) => {
                tracing::error!(error = %e, "Provider error");
                let details = match e {
                    ProviderError::RateLimited {
                        retry_after_secs: Some(secs),
                        ..
                    } => Some(format!("retry after {secs} seconds")),
                    _ => None
                };
                (provider_message(e), details)
            }
            Self::Normalize(e) => {
                tracing::error!(error = %e, "Unusable provider response");
                (
                    "The model returned a response that could not be used".to_string(),
                    None
                )
            }
            Self::Configuration(msg) | Self::Server(msg) => {
                tracing::error!(message = %msg, "Internal error");
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = ErrorResponse {
            error: message,
            code: self.code().to_string(),
            details
        };

        (self.status(), Json(body)).into_response()
    }
}

fn provider_message(error: &ProviderError) -> String {
    match error {
        ProviderError::RateLimited { provider, .. } => format!("{provider} rate limit reached"),
        ProviderError::Timeout { provider, .. } => format!("{provider} did not respond in time"),
        ProviderError::NotConfigured { provider } => format!("{provider} is not configured"),
        ProviderError::Request { provider, .. } | ProviderError::InvalidResponse { provider, .. } => {
            format!("{provider} request failed")
        }
    }
}
