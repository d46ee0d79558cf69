//! Exa search API client.

use crate::http::{build_client, check_status, decode, join_url, require_key, transport_error};
use async_trait::async_trait;
use config::ExaConfig;
use errors::ProviderError;
use lp_core::{SearchProvider, SearchQuery, SearchResult};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const PROVIDER: &str = "exa";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    query: &'a str,
    num_results: usize,
    use_autoprompt: bool
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>
}

pub struct ExaClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    use_autoprompt: bool,
    timeout: Duration
}

impl ExaClient {
    pub fn new(config: &ExaConfig, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: build_client(PROVIDER, timeout)?,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            use_autoprompt: config.use_autoprompt,
            timeout
        })
    }
}

#[async_trait]
impl SearchProvider for ExaClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, ProviderError> {
        let api_key = require_key(PROVIDER, self.api_key.as_deref())?;
        let body = SearchBody {
            query: &query.query,
            num_results: query.result_count,
            use_autoprompt: self.use_autoprompt
        };

        let response = self
            .client
            .post(join_url(&self.base_url, "search"))
            .header("x-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, &e, self.timeout))?;

        let response = check_status(PROVIDER, response).await?;
        let parsed: SearchResponse = decode(PROVIDER, response).await?;

        tracing::debug!(query = %query.query, hits = parsed.results.len(), "Exa search completed");

        Ok(parsed
            .results
            .into_iter()
            .map(|hit| SearchResult {
                title: hit.title,
                url: hit.url
            })
            .collect())
    }
}
