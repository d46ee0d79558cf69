//! Application state for the LearnPath server.

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

use config::Config;
use prompts::{PromptCatalog, PromptName};
use providers::{RetryPolicy, RetryingInvoker};

use crate::error::{ApiError, Result};
use crate::service::{GenerationSettings, LearningService, Providers};
use crate::sessions::SessionStore;

/// Shared application state for Axum handlers.
pub struct AppState {
    pub config: Config,
    pub service: LearningService,
    pub metrics: Option<PrometheusHandle>
}

impl AppState {
    #[must_use]
    pub fn builder(config: Config) -> AppStateBuilder {
        AppStateBuilder {
            config,
            providers: None,
            invoker: None,
            prompts: None,
            metrics: None
        }
    }
}

/// Builder for `AppState`, used to swap in scripted providers and a
/// recording sleeper.
pub struct AppStateBuilder {
    config: Config,
    providers: Option<Providers>,
    invoker: Option<RetryingInvoker>,
    prompts: Option<PromptCatalog>,
    metrics: Option<PrometheusHandle>
}

impl AppStateBuilder {
    #[must_use]
    pub fn providers(mut self, providers: Providers) -> Self {
        self.providers = Some(providers);
        self
    }

    #[must_use]
    pub fn invoker(mut self, invoker: RetryingInvoker) -> Self {
        self.invoker = Some(invoker);
        self
    }

    #[must_use]
    pub fn prompts(mut self, prompts: PromptCatalog) -> Self {
        self.prompts = Some(prompts);
        self
    }

    #[must_use]
    pub fn metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Builds the state, loading every prompt template up front.
    pub fn build(self) -> Result<AppState> {
        let providers = self
            .providers
            .ok_or_else(|| ApiError::Configuration("providers are required".to_string()))?;

        let prompts = match self.prompts {
            Some(prompts) => prompts,
            None => match &self.config.prompts.directory {
                Some(dir) => PromptCatalog::from_directory(dir),
                None => PromptCatalog::embedded()
            }
        };
        let loaded = prompts.preload(PromptName::all())?;
        tracing::info!(templates = loaded, "Prompt templates loaded");

        let invoker = self
            .invoker
            .unwrap_or_else(|| RetryingInvoker::new(RetryPolicy::from(&self.config.retry)));
        let sessions = Arc::new(SessionStore::new(&self.config.sessions));
        let settings = GenerationSettings::from(&self.config);

        let service = LearningService::new(Arc::new(prompts), providers, invoker, sessions, settings);

        Ok(AppState {
            config: self.config,
            service,
            metrics: self.metrics
        })
    }
}
