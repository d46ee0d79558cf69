//! # Configuration File Loading
//!
//! Loads configuration from TOML or YAML files, picking the format from the
//! file extension.

use crate::config::Config;
use std::path::Path;

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not readable: {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Failed to parse TOML in {path}: {reason}")]
    TomlParse { path: String, reason: String },

    #[error("Failed to parse YAML in {path}: {reason}")]
    YamlParse { path: String, reason: String },

    #[error("Config file has no extension: {path}")]
    NoExtension { path: String },

    #[error("Unsupported config file format: {extension}")]
    UnsupportedFormat { extension: String }
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path).map_err(|e| ConfigFileError::Unreadable {
        path: path.display().to_string(),
        reason: e.to_string()
    })
}

/// Load configuration from a TOML file. Absent sections take defaults.
pub fn load_from_toml(path: &Path) -> Result<Config, ConfigFileError> {
    let contents = read(path)?;
    toml::from_str(&contents).map_err(|e| ConfigFileError::TomlParse {
        path: path.display().to_string(),
        reason: e.to_string()
    })
}

/// Load configuration from a YAML file. Absent sections take defaults.
pub fn load_from_yaml(path: &Path) -> Result<Config, ConfigFileError> {
    let contents = read(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigFileError::YamlParse {
        path: path.display().to_string(),
        reason: e.to_string()
    })
}

/// Load configuration from file with auto-detection.
///
/// ## Supported Formats
/// - `.toml`
/// - `.yaml` / `.yml`
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_file;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_file(Path::new("learnpath.toml"))?;
///     println!("Model: {}", config.providers.anthropic.model);
///     Ok(())
/// }
/// ```
pub fn load_from_file(path: &Path) -> Result<Config, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ConfigFileError::NoExtension {
            path: path.display().to_string()
        })?;

    match extension.to_lowercase().as_str() {
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigFileError::UnsupportedFormat {
            extension: other.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learnpath.toml");
        fs::write(
            &path,
            r#"
[server]
port = 8080
dummy_mode = true

[providers]
timeout_seconds = 15

[providers.anthropic]
model = "claude-3-5-haiku-latest"

[retry]
max_attempts = 4

[observability]
logging_level = "debug"
"#
        )
        .unwrap();

        let config = load_from_toml(&path).unwrap();
        assert_eq!(config.server.port, 8080);
        assert!(config.server.dummy_mode);
        assert_eq!(config.providers.timeout_seconds, 15);
        assert_eq!(config.providers.anthropic.model, "claude-3-5-haiku-latest");
        assert_eq!(config.providers.exa.num_results, 5);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.observability.logging_level, "debug");
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learnpath.yml");
        fs::write(
            &path,
            r#"
sessions:
  max_turns: 8
  ttl_seconds: 600
prompts:
  directory: /srv/prompts
"#
        )
        .unwrap();

        let config = load_from_file(&path).unwrap();
        assert_eq!(config.sessions.max_turns, 8);
        assert_eq!(config.sessions.ttl_seconds, 600);
        assert_eq!(config.prompts.directory.as_deref(), Some("/srv/prompts"));
    }

    #[test]
    fn test_load_from_file_unsupported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learnpath.json");
        fs::write(&path, "{}").unwrap();

        let result = load_from_file(&path);
        assert!(matches!(
            result,
            Err(ConfigFileError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_from_file_no_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("learnpath");
        fs::write(&path, "").unwrap();

        let result = load_from_file(&path);
        assert!(matches!(result, Err(ConfigFileError::NoExtension { .. })));
    }

    #[test]
    fn test_load_from_toml_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "[server\n").unwrap();

        let result = load_from_toml(&path);
        assert!(matches!(result, Err(ConfigFileError::TomlParse { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_from_file(Path::new("/nonexistent/learnpath.toml"));
        assert!(matches!(result, Err(ConfigFileError::Unreadable { .. })));
    }
}
