//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `ANTHROPIC_*`, `EXA_*`, `PERPLEXITY_*`: provider credentials and
//!   endpoints, named the way the providers document them
//! - `LP_*`: everything else

use crate::config::{
    AnthropicConfig, Config, ExaConfig, ObservabilityConfig, PerplexityConfig, PromptConfig,
    ProviderConfig, RetryConfig, ServerConfig, SessionConfig
};
use std::env;

/// Load configuration from environment variables.
///
/// Unset variables keep their default. A variable that is set but cannot be
/// parsed is an error rather than a silent fallback.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_env;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_env()?;
///     println!("Port: {}", config.server.port);
///     Ok(())
/// }
/// ```
///
/// ## Environment Variables
/// ### Server (`LP_*`)
/// - `LP_HOST`: bind address (default: "0.0.0.0")
/// - `LP_PORT`: bind port (default: 5001)
/// - `LP_CORS_ORIGINS`: comma separated allowed origins (default: any)
/// - `LP_DUMMY_MODE`: serve canned responses (true/false, default: false)
///
/// ### Providers
/// - `ANTHROPIC_API_KEY`, `ANTHROPIC_BASE_URL`, `ANTHROPIC_MODEL`
/// - `EXA_API_KEY`, `EXA_BASE_URL`
/// - `PERPLEXITY_API_KEY`, `PERPLEXITY_BASE_URL`, `PERPLEXITY_MODEL`
/// - `LP_PROVIDER_TIMEOUT_SECONDS`: per-call timeout (default: 60)
///
/// ### Retry
/// - `LP_RETRY_MAX_ATTEMPTS` (default: 3)
/// - `LP_RETRY_BASE_DELAY_MS` (default: 1000)
///
/// ### Sessions
/// - `LP_SESSION_MAX_SESSIONS` (default: 1000)
/// - `LP_SESSION_MAX_TURNS` (default: 20)
/// - `LP_SESSION_MAX_TOPICS` (default: 16)
/// - `LP_SESSION_TTL_SECONDS` (default: 3600)
///
/// ### Prompts and observability
/// - `LP_PROMPTS_DIR`: template directory (default: built-in templates)
/// - `LP_LOG_LEVEL` (default: "info")
/// - `LP_LOG_JSON` (default: false)
/// - `LP_METRICS_ENABLED` (default: true)
pub fn load_from_env() -> Result<Config, Box<dyn std::error::Error>> {
    let config = Config {
        server: load_server_from_env()?,
        providers: load_providers_from_env()?,
        retry: load_retry_from_env()?,
        sessions: load_sessions_from_env()?,
        prompts: PromptConfig {
            directory: non_empty_var("LP_PROMPTS_DIR")
        },
        observability: load_observability_from_env()?
    };

    Ok(config)
}

fn load_server_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let defaults = ServerConfig::default();
    Ok(ServerConfig {
        host: env::var("LP_HOST").unwrap_or(defaults.host),
        port: parse_optional_env("LP_PORT")?.unwrap_or(defaults.port),
        cors_origins: env::var("LP_CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or(defaults.cors_origins),
        dummy_mode: parse_optional_env("LP_DUMMY_MODE")?.unwrap_or(defaults.dummy_mode)
    })
}

fn load_providers_from_env() -> Result<ProviderConfig, Box<dyn std::error::Error>> {
    let anthropic = AnthropicConfig::default();
    let exa = ExaConfig::default();
    let perplexity = PerplexityConfig::default();

    Ok(ProviderConfig {
        anthropic: AnthropicConfig {
            api_key: non_empty_var("ANTHROPIC_API_KEY"),
            base_url: env::var("ANTHROPIC_BASE_URL").unwrap_or(anthropic.base_url),
            model: env::var("ANTHROPIC_MODEL").unwrap_or(anthropic.model),
            ..anthropic
        },
        exa: ExaConfig {
            api_key: non_empty_var("EXA_API_KEY"),
            base_url: env::var("EXA_BASE_URL").unwrap_or(exa.base_url),
            ..exa
        },
        perplexity: PerplexityConfig {
            api_key: non_empty_var("PERPLEXITY_API_KEY"),
            base_url: env::var("PERPLEXITY_BASE_URL").unwrap_or(perplexity.base_url),
            model: env::var("PERPLEXITY_MODEL").unwrap_or(perplexity.model)
        },
        timeout_seconds: parse_optional_env("LP_PROVIDER_TIMEOUT_SECONDS")?
            .unwrap_or(ProviderConfig::default().timeout_seconds)
    })
}

fn load_retry_from_env() -> Result<RetryConfig, Box<dyn std::error::Error>> {
    let defaults = RetryConfig::default();
    Ok(RetryConfig {
        max_attempts: parse_optional_env("LP_RETRY_MAX_ATTEMPTS")?
            .unwrap_or(defaults.max_attempts),
        base_delay_ms: parse_optional_env("LP_RETRY_BASE_DELAY_MS")?
            .unwrap_or(defaults.base_delay_ms)
    })
}

fn load_sessions_from_env() -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let defaults = SessionConfig::default();
    Ok(SessionConfig {
        max_sessions: parse_optional_env("LP_SESSION_MAX_SESSIONS")?
            .unwrap_or(defaults.max_sessions),
        max_turns: parse_optional_env("LP_SESSION_MAX_TURNS")?.unwrap_or(defaults.max_turns),
        max_topics: parse_optional_env("LP_SESSION_MAX_TOPICS")?.unwrap_or(defaults.max_topics),
        ttl_seconds: parse_optional_env("LP_SESSION_TTL_SECONDS")?
            .unwrap_or(defaults.ttl_seconds)
    })
}

fn load_observability_from_env() -> Result<ObservabilityConfig, Box<dyn std::error::Error>> {
    let defaults = ObservabilityConfig::default();
    Ok(ObservabilityConfig {
        logging_level: env::var("LP_LOG_LEVEL").unwrap_or(defaults.logging_level),
        log_json: parse_optional_env("LP_LOG_JSON")?.unwrap_or(defaults.log_json),
        metrics_enabled: parse_optional_env("LP_METRICS_ENABLED")?
            .unwrap_or(defaults.metrics_enabled)
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str) -> Result<T, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    match env::var(key) {
        Ok(s) => s
            .trim()
            .parse::<T>()
            .map_err(|e| Box::<dyn std::error::Error>::from(format!("{key}: {e}"))),
        Err(e) => Err(Box::new(e) as Box<dyn std::error::Error>)
    }
}

fn parse_optional_env<T>(key: &str) -> Result<Option<T>, Box<dyn std::error::Error>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static
{
    if env::var_os(key).is_none() {
        return Ok(None);
    }
    parse_env(key).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "LP_HOST",
        "LP_PORT",
        "LP_CORS_ORIGINS",
        "LP_DUMMY_MODE",
        "ANTHROPIC_API_KEY",
        "ANTHROPIC_MODEL",
        "EXA_API_KEY",
        "PERPLEXITY_API_KEY",
        "LP_PROVIDER_TIMEOUT_SECONDS",
        "LP_RETRY_MAX_ATTEMPTS",
        "LP_RETRY_BASE_DELAY_MS",
        "LP_SESSION_MAX_TURNS",
        "LP_SESSION_MAX_TOPICS",
        "LP_PROMPTS_DIR",
        "LP_LOG_LEVEL",
    ];

    fn clear_vars() {
        for key in VARS {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_load_from_env_defaults() {
        clear_vars();
        let config = load_from_env().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    #[serial]
    fn test_load_from_env_overrides() {
        clear_vars();
        unsafe {
            env::set_var("LP_PORT", "9999");
            env::set_var("LP_CORS_ORIGINS", "http://localhost:3000, https://learn.example");
            env::set_var("ANTHROPIC_API_KEY", "sk-test");
            env::set_var("LP_RETRY_MAX_ATTEMPTS", "5");
            env::set_var("LP_PROMPTS_DIR", "/srv/prompts");
            env::set_var("LP_LOG_LEVEL", "debug");
        }

        let config = load_from_env().unwrap();
        assert_eq!(config.server.port, 9999);
        assert_eq!(
            config.server.cors_origins,
            vec!["http://localhost:3000", "https://learn.example"]
        );
        assert_eq!(config.providers.anthropic.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.prompts.directory.as_deref(), Some("/srv/prompts"));
        assert_eq!(config.observability.logging_level, "debug");

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_blank_api_key_is_treated_as_absent() {
        clear_vars();
        unsafe {
            env::set_var("EXA_API_KEY", "  ");
        }
        let config = load_from_env().unwrap();
        assert!(config.providers.exa.api_key.is_none());
        clear_vars();
    }

    #[test]
    #[serial]
    fn test_unparsable_value_is_an_error() {
        clear_vars();
        unsafe {
            env::set_var("LP_PORT", "not-a-port");
        }
        let err = load_from_env().unwrap_err();
        assert!(err.to_string().contains("LP_PORT"));
        clear_vars();
    }

    #[test]
    fn test_parse_env_missing() {
        let result: Result<u32, _> = parse_env("LP_NONEXISTENT_VAR");
        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn test_parse_env_valid_number() {
        unsafe {
            env::set_var("LP_TEST_VAR", " 123 ");
        }
        let result: Result<u32, _> = parse_env("LP_TEST_VAR");
        assert_eq!(result.unwrap(), 123);
        unsafe {
            env::remove_var("LP_TEST_VAR");
        }
    }
}
