//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. Environment variables (highest priority)
//! 2. Configuration file
//! 3. Default values (lowest priority)
//!
//! A field only overrides the layer below when it differs from its default,
//! so an unset environment variable never clobbers a file value.

use crate::config::Config;
use crate::file_loader::{ConfigFileError, load_from_file};
use crate::loader::load_from_env;
use std::fmt::Debug;
use std::path::Path;
use validator::Validate;

/// Failure to assemble a usable configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    File(#[from] ConfigFileError),

    #[error("Invalid environment configuration: {reason}")]
    Env { reason: String },

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors)
}

/// Merge file and environment layers over the defaults.
pub fn merge_configs(
    defaults: Config,
    file_config: Config,
    file_source_name: &str,
    env_config: Config,
    env_source_name: &str
) -> Config {
    let config = merge_with_logging(defaults, &file_config, file_source_name);
    merge_with_logging(config, &env_config, env_source_name)
}

/// Defaults, then the optional file, then the environment; validated.
pub fn load_layered(file: Option<&Path>) -> Result<Config, ConfigError> {
    let file_config = match file {
        Some(path) => load_from_file(path)?,
        None => Config::default()
    };
    let env_config = load_from_env().map_err(|e| ConfigError::Env {
        reason: e.to_string()
    })?;

    let source = file
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());
    let config = merge_configs(Config::default(), file_config, &source, env_config, "env");
    config.validate()?;
    Ok(config)
}

fn merge_with_logging(mut base: Config, over: &Config, source_name: &str) -> Config {
    let defaults = Config::default();
    let mut changes = Vec::new();

    {
        let (b, o, d) = (&mut base.server, &over.server, &defaults.server);
        overlay(&mut b.host, &o.host, &d.host, "server.host", &mut changes);
        overlay(&mut b.port, &o.port, &d.port, "server.port", &mut changes);
        overlay(
            &mut b.cors_origins,
            &o.cors_origins,
            &d.cors_origins,
            "server.cors_origins",
            &mut changes
        );
        overlay(
            &mut b.dummy_mode,
            &o.dummy_mode,
            &d.dummy_mode,
            "server.dummy_mode",
            &mut changes
        );
    }

    {
        let (b, o, d) = (
            &mut base.providers.anthropic,
            &over.providers.anthropic,
            &defaults.providers.anthropic
        );
        overlay_secret(&mut b.api_key, &o.api_key, "providers.anthropic.api_key", &mut changes);
        overlay(&mut b.base_url, &o.base_url, &d.base_url, "providers.anthropic.base_url", &mut changes);
        overlay(&mut b.model, &o.model, &d.model, "providers.anthropic.model", &mut changes);
        overlay(
            &mut b.api_version,
            &o.api_version,
            &d.api_version,
            "providers.anthropic.api_version",
            &mut changes
        );
        overlay(
            &mut b.short_max_tokens,
            &o.short_max_tokens,
            &d.short_max_tokens,
            "providers.anthropic.short_max_tokens",
            &mut changes
        );
        overlay(
            &mut b.long_max_tokens,
            &o.long_max_tokens,
            &d.long_max_tokens,
            "providers.anthropic.long_max_tokens",
            &mut changes
        );
    }

    {
        let (b, o, d) = (&mut base.providers.exa, &over.providers.exa, &defaults.providers.exa);
        overlay_secret(&mut b.api_key, &o.api_key, "providers.exa.api_key", &mut changes);
        overlay(&mut b.base_url, &o.base_url, &d.base_url, "providers.exa.base_url", &mut changes);
        overlay(
            &mut b.num_results,
            &o.num_results,
            &d.num_results,
            "providers.exa.num_results",
            &mut changes
        );
        overlay(
            &mut b.use_autoprompt,
            &o.use_autoprompt,
            &d.use_autoprompt,
            "providers.exa.use_autoprompt",
            &mut changes
        );
    }

    {
        let (b, o, d) = (
            &mut base.providers.perplexity,
            &over.providers.perplexity,
            &defaults.providers.perplexity
        );
        overlay_secret(&mut b.api_key, &o.api_key, "providers.perplexity.api_key", &mut changes);
        overlay(
            &mut b.base_url,
            &o.base_url,
            &d.base_url,
            "providers.perplexity.base_url",
            &mut changes
        );
        overlay(&mut b.model, &o.model, &d.model, "providers.perplexity.model", &mut changes);
    }

    overlay(
        &mut base.providers.timeout_seconds,
        &over.providers.timeout_seconds,
        &defaults.providers.timeout_seconds,
        "providers.timeout_seconds",
        &mut changes
    );

    overlay(
        &mut base.retry.max_attempts,
        &over.retry.max_attempts,
        &defaults.retry.max_attempts,
        "retry.max_attempts",
        &mut changes
    );
    overlay(
        &mut base.retry.base_delay_ms,
        &over.retry.base_delay_ms,
        &defaults.retry.base_delay_ms,
        "retry.base_delay_ms",
        &mut changes
    );

    {
        let (b, o, d) = (&mut base.sessions, &over.sessions, &defaults.sessions);
        overlay(&mut b.max_sessions, &o.max_sessions, &d.max_sessions, "sessions.max_sessions", &mut changes);
        overlay(&mut b.max_turns, &o.max_turns, &d.max_turns, "sessions.max_turns", &mut changes);
        overlay(&mut b.max_topics, &o.max_topics, &d.max_topics, "sessions.max_topics", &mut changes);
        overlay(&mut b.ttl_seconds, &o.ttl_seconds, &d.ttl_seconds, "sessions.ttl_seconds", &mut changes);
    }

    overlay(
        &mut base.prompts.directory,
        &over.prompts.directory,
        &defaults.prompts.directory,
        "prompts.directory",
        &mut changes
    );

    {
        let (b, o, d) = (&mut base.observability, &over.observability, &defaults.observability);
        overlay(
            &mut b.logging_level,
            &o.logging_level,
            &d.logging_level,
            "observability.logging_level",
            &mut changes
        );
        overlay(&mut b.log_json, &o.log_json, &d.log_json, "observability.log_json", &mut changes);
        overlay(
            &mut b.metrics_enabled,
            &o.metrics_enabled,
            &d.metrics_enabled,
            "observability.metrics_enabled",
            &mut changes
        );
    }

    if !changes.is_empty() {
        tracing::info!(source = source_name, ?changes, "Configuration overrides applied");
    }

    base
}

fn overlay<T>(base: &mut T, over: &T, default: &T, path: &str, changes: &mut Vec<String>)
where
    T: Clone + PartialEq + Debug
{
    if over != default && over != base {
        changes.push(format!("{path} = {over:?}"));
        base.clone_from(over);
    }
}

fn overlay_secret(
    base: &mut Option<String>,
    over: &Option<String>,
    path: &str,
    changes: &mut Vec<String>
) {
    if over.is_some() && over != base {
        changes.push(format!("{path} = ***"));
        base.clone_from(over);
    }
}
