//! Startup paths: layered configuration and prompt preloading.

use config::Config;
use learnpath_server::server::{CONFIG_FILE_ENV, load_config};
use learnpath_server::{AppState, Providers};
use providers::mock::{ScriptedAnswerer, ScriptedGenerator, ScriptedSearch};
use serial_test::serial;
use std::env;
use std::sync::Arc;
use tempfile::TempDir;

fn scripted() -> Providers {
    Providers {
        generator: Arc::new(ScriptedGenerator::new()),
        search: Arc::new(ScriptedSearch::returning(Vec::new())),
        answerer: Arc::new(ScriptedAnswerer::new())
    }
}

#[test]
#[serial]
fn test_config_file_from_env_is_layered_under_env_vars() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("learnpath.toml");
    std::fs::write(
        &path,
        "[server]\nport = 6100\ndummy_mode = true\n\n[retry]\nmax_attempts = 5\n"
    )
    .unwrap();

    unsafe {
        env::set_var(CONFIG_FILE_ENV, &path);
        env::set_var("LP_RETRY_MAX_ATTEMPTS", "2");
    }
    let config = load_config();
    unsafe {
        env::remove_var(CONFIG_FILE_ENV);
        env::remove_var("LP_RETRY_MAX_ATTEMPTS");
    }

    let config = config.unwrap();
    assert_eq!(config.server.port, 6100);
    assert!(config.server.dummy_mode);
    assert_eq!(config.retry.max_attempts, 2);
}

#[test]
#[serial]
fn test_unreadable_config_file_fails_startup() {
    unsafe {
        env::set_var(CONFIG_FILE_ENV, "/nonexistent/learnpath.toml");
    }
    let result = load_config();
    unsafe {
        env::remove_var(CONFIG_FILE_ENV);
    }
    assert!(result.is_err());
}

#[test]
fn test_prompt_directory_missing_templates_fails_fast() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("system_prompt.txt"), "You are a tutor.").unwrap();

    let mut config = Config::default();
    config.prompts.directory = Some(dir.path().display().to_string());

    let result = AppState::builder(config).providers(scripted()).build();
    assert!(result.is_err());
}

#[test]
fn test_embedded_prompts_load_by_default() {
    let state = AppState::builder(Config::default())
        .providers(scripted())
        .build()
        .unwrap();
    assert!(!state.service.settings().dummy_mode);
    assert_eq!(state.service.settings().model, "claude-3-haiku-20240307");
}
