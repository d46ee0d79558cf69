//! # Configuration Validation
//!
//! Provides validation for all configuration structures using the `validator` crate.

use crate::config::Config;
use validator::Validate;

/// Validate configuration structure.
///
/// ## Validation Rules
/// ### Server
/// - `host`: 1-255 characters
/// - `port`: 1-65535
///
/// ### Providers
/// - `timeout_seconds`: 1-600
/// - `anthropic.short_max_tokens`, `anthropic.long_max_tokens`: 1-8192
/// - `exa.num_results`: 1-25
///
/// ### Retry
/// - `max_attempts`: 1-10
/// - `base_delay_ms`: 1-60000
///
/// ### Sessions
/// - `max_sessions`: 1-1000000
/// - `max_turns`: 2-200
/// - `max_topics`: 1-1000
///
/// ### Observability
/// - `logging_level`: must be "trace", "debug", "info", "warn", or "error"
pub fn validate(config: &Config) -> Result<(), validator::ValidationErrors> {
    config.validate()
}
