//! HTTP plumbing shared by the provider clients.
//!
//! Status classification is uniform: `429` is a rate limit (retryable),
//! any other non-2xx is a request failure, a transport timeout is a
//! timeout, and a body that does not decode is an invalid response.

use errors::ProviderError;
use reqwest::{Client, Response, StatusCode, header::RETRY_AFTER};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest slice of an error body carried into the error message.
const MAX_ERROR_BODY: usize = 512;

pub fn build_client(provider: &str, timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::Request {
            provider: provider.to_string(),
            status: None,
            message: format!("failed to build HTTP client: {e}")
        })
}

pub fn require_key<'a>(provider: &str, key: Option<&'a str>) -> Result<&'a str, ProviderError> {
    key.filter(|k| !k.trim().is_empty())
        .ok_or_else(|| ProviderError::NotConfigured {
            provider: provider.to_string()
        })
}

pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Maps a transport-level failure.
pub fn transport_error(provider: &str, error: &reqwest::Error, timeout: Duration) -> ProviderError {
    if error.is_timeout() {
        return ProviderError::Timeout {
            provider: provider.to_string(),
            timeout_ms: timeout.as_millis() as u64
        };
    }
    ProviderError::Request {
        provider: provider.to_string(),
        status: error.status().map(|s| s.as_u16()),
        message: error.to_string()
    }
}

/// Passes successful responses through and classifies the rest.
pub async fn check_status(provider: &str, response: Response) -> Result<Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();
    let message = format!("HTTP {status}: {}", truncate(&body));

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(ProviderError::RateLimited {
            provider: provider.to_string(),
            retry_after_secs,
            message
        });
    }

    Err(ProviderError::Request {
        provider: provider.to_string(),
        status: Some(status.as_u16()),
        message
    })
}

pub async fn decode<T: DeserializeOwned>(provider: &str, response: Response) -> Result<T, ProviderError> {
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidResponse {
            provider: provider.to_string(),
            reason: e.to_string()
        })
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((index, _)) => &body[..index],
        None => body
    }
}
