//! # Configuration Structures
//!
//! This module defines all configuration structures for the LearnPath
//! backend.
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization
//! - Use `validator` for input validation
//! - Carry a default for every field except provider API keys

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main configuration structure for the LearnPath backend.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Listening on {}:{}", config.server.host, config.server.port);
/// ```
///
/// ## Fields
/// - `server`: HTTP listener, CORS and dummy mode
/// - `providers`: Anthropic, Exa and Perplexity endpoints and credentials
/// - `retry`: rate-limit retry policy
/// - `sessions`: bounds of the per-session context store
/// - `prompts`: where prompt templates are loaded from
/// - `observability`: logging and metrics
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    #[validate(nested)]
    pub server: ServerConfig,

    #[serde(default)]
    #[validate(nested)]
    pub providers: ProviderConfig,

    #[serde(default)]
    #[validate(nested)]
    pub retry: RetryConfig,

    #[serde(default)]
    #[validate(nested)]
    pub sessions: SessionConfig,

    #[serde(default)]
    pub prompts: PromptConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

/// HTTP server configuration.
///
/// ## Fields
/// - `host`: bind address (default: "0.0.0.0")
/// - `port`: bind port (default: 5001, range: 1-65535)
/// - `cors_origins`: allowed origins, empty means any (default: empty)
/// - `dummy_mode`: serve canned goals, roadmap and module content
///   (default: false)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    #[validate(length(min = 1, max = 255))]
    pub host: String,

    #[serde(default = "default_server_port")]
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default)]
    pub dummy_mode: bool
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    5001
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cors_origins: Vec::new(),
            dummy_mode: false
        }
    }
}

/// External provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ProviderConfig {
    #[serde(default)]
    #[validate(nested)]
    pub anthropic: AnthropicConfig,

    #[serde(default)]
    #[validate(nested)]
    pub exa: ExaConfig,

    #[serde(default)]
    #[validate(nested)]
    pub perplexity: PerplexityConfig,

    /// Uniform per-call timeout applied to every provider
    #[serde(default = "default_provider_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: u64
}

fn default_provider_timeout() -> u64 {
    60
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            anthropic: AnthropicConfig::default(),
            exa: ExaConfig::default(),
            perplexity: PerplexityConfig::default(),
            timeout_seconds: default_provider_timeout()
        }
    }
}

/// Anthropic Messages API configuration.
///
/// ## Fields
/// - `api_key`: optional; calls fail with `NotConfigured` while absent
/// - `base_url`: API root (default: "https://api.anthropic.com")
/// - `model`: model id (default: "claude-3-haiku-20240307")
/// - `api_version`: `anthropic-version` header value
/// - `short_max_tokens`: budget for goals, cards, questions, explanations
///   and module sections (default: 1000)
/// - `long_max_tokens`: budget for the roadmap (default: 2000)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct AnthropicConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_anthropic_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,

    #[serde(default = "default_anthropic_model")]
    #[validate(length(min = 1, max = 255))]
    pub model: String,

    #[serde(default = "default_anthropic_version")]
    #[validate(length(min = 1))]
    pub api_version: String,

    #[serde(default = "default_short_max_tokens")]
    #[validate(range(min = 1, max = 8192))]
    pub short_max_tokens: u32,

    #[serde(default = "default_long_max_tokens")]
    #[validate(range(min = 1, max = 8192))]
    pub long_max_tokens: u32
}

fn default_anthropic_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_anthropic_version() -> String {
    "2023-06-01".to_string()
}

fn default_short_max_tokens() -> u32 {
    1000
}

fn default_long_max_tokens() -> u32 {
    2000
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_anthropic_base_url(),
            model: default_anthropic_model(),
            api_version: default_anthropic_version(),
            short_max_tokens: default_short_max_tokens(),
            long_max_tokens: default_long_max_tokens()
        }
    }
}

/// Exa search API configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ExaConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_exa_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,

    /// Resources attached to a roadmap
    #[serde(default = "default_exa_num_results")]
    #[validate(range(min = 1, max = 25))]
    pub num_results: usize,

    #[serde(default = "default_exa_use_autoprompt")]
    pub use_autoprompt: bool
}

fn default_exa_base_url() -> String {
    "https://api.exa.ai".to_string()
}

fn default_exa_num_results() -> usize {
    5
}

fn default_exa_use_autoprompt() -> bool {
    true
}

impl Default for ExaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_exa_base_url(),
            num_results: default_exa_num_results(),
            use_autoprompt: default_exa_use_autoprompt()
        }
    }
}

/// Perplexity chat completions configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct PerplexityConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_perplexity_base_url")]
    #[validate(length(min = 1))]
    pub base_url: String,

    #[serde(default = "default_perplexity_model")]
    #[validate(length(min = 1, max = 255))]
    pub model: String
}

fn default_perplexity_base_url() -> String {
    "https://api.perplexity.ai".to_string()
}

fn default_perplexity_model() -> String {
    "sonar".to_string()
}

impl Default for PerplexityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_perplexity_base_url(),
            model: default_perplexity_model()
        }
    }
}

/// Rate-limit retry policy.
///
/// ## Fields
/// - `max_attempts`: total attempts including the first (default: 3,
///   range: 1-10)
/// - `base_delay_ms`: backoff unit; attempt `n` waits `unit * 2^n`
///   (default: 1000)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct RetryConfig {
    #[serde(default = "default_retry_max_attempts")]
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    #[validate(range(min = 1, max = 60000))]
    pub base_delay_ms: u64
}

fn default_retry_max_attempts() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            base_delay_ms: default_retry_base_delay_ms()
        }
    }
}

/// Bounds of the session context store.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SessionConfig {
    /// Sessions kept before the least recently used is evicted
    #[serde(default = "default_session_max_sessions")]
    #[validate(range(min = 1, max = 1_000_000))]
    pub max_sessions: usize,

    /// Exchanges kept per explanation conversation
    #[serde(default = "default_session_max_turns")]
    #[validate(range(min = 2, max = 200))]
    pub max_turns: usize,

    /// Explanation topics kept per session before the least recently used
    /// is dropped
    #[serde(default = "default_session_max_topics")]
    #[validate(range(min = 1, max = 1000))]
    pub max_topics: usize,

    /// Idle time after which a session is discarded
    #[serde(default = "default_session_ttl_seconds")]
    #[validate(range(min = 1, max = 604_800))]
    pub ttl_seconds: u64
}

fn default_session_max_sessions() -> usize {
    1000
}

fn default_session_max_turns() -> usize {
    20
}

fn default_session_max_topics() -> usize {
    16
}

fn default_session_ttl_seconds() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: default_session_max_sessions(),
            max_turns: default_session_max_turns(),
            max_topics: default_session_max_topics(),
            ttl_seconds: default_session_ttl_seconds()
        }
    }
}

/// Prompt template source. Without a directory the built-in set is used.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PromptConfig {
    #[serde(default)]
    pub directory: Option<String>
}

/// Observability configuration.
///
/// ## Fields
/// - `logging_level`: trace/debug/info/warn/error (default: "info")
/// - `log_json`: emit JSON log lines (default: false)
/// - `metrics_enabled`: install the Prometheus recorder (default: true)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    #[serde(default = "default_logging_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub logging_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool
}

fn default_logging_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            logging_level: default_logging_level(),
            log_json: false,
            metrics_enabled: default_metrics_enabled()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 5001);
        assert_eq!(config.providers.anthropic.model, "claude-3-haiku-20240307");
        assert_eq!(config.providers.anthropic.short_max_tokens, 1000);
        assert_eq!(config.providers.anthropic.long_max_tokens, 2000);
        assert_eq!(config.providers.exa.num_results, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 1000);
        assert!(config.providers.anthropic.api_key.is_none());
        assert!(config.prompts.directory.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
[server]
port = 8080
"#
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.sessions.max_turns, 20);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_logging_level_rejects_unknown() {
        let mut config = Config::default();
        config.observability.logging_level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
