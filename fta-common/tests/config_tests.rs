//! Unit tests for configuration loading and API key resolution
//!
//! Tests cover:
//! - Missing TOML files fall back to compiled defaults
//! - Partial TOML files keep defaults for omitted fields
//! - Explicit config paths must exist
//! - API key priority: FTA_LLM_API_KEY → OPENAI_API_KEY → TOML
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate the API key variables are marked with #[serial].

use fta_common::config::{
    load_config, load_toml_config, parse_toml_config, resolve_api_key, ApiKeySource,
    ConfigSource, LlmConfig, TomlConfig,
};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn clear_key_env() {
    env::remove_var("FTA_LLM_API_KEY");
    env::remove_var("OPENAI_API_KEY");
}

#[test]
fn test_empty_toml_uses_defaults() {
    let config = parse_toml_config("").unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.server.port, 5780);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.llm.timeout_secs, 30);
    assert!(config.llm.local_fallback);
    assert!(config.llm.api_key.is_none());
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let config = parse_toml_config(
        r#"
        [server]
        port = 9000

        [llm]
        model = "gpt-4o"
        local_fallback = false
        "#,
    )
    .unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.max_upload_bytes, 2 * 1024 * 1024);
    assert_eq!(config.llm.model, "gpt-4o");
    assert!(!config.llm.local_fallback);
    assert_eq!(config.llm.base_url, "https://api.openai.com/v1");
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_toml_is_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = \"not a number\"").unwrap();

    let result = load_toml_config(file.path());
    assert!(result.is_err());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Parse TOML failed"), "got: {}", message);
}

#[test]
fn test_explicit_path_is_loaded() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[logging]\nlevel = \"debug\"").unwrap();

    let loaded = load_config(Some(file.path())).unwrap();
    assert_eq!(loaded.config.logging.level, "debug");
    assert_eq!(loaded.source, ConfigSource::File(file.path().to_path_buf()));
}

#[test]
fn test_explicit_missing_path_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = load_config(Some(&missing));
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

#[test]
fn test_round_trip_through_toml_serializer() {
    let mut config = TomlConfig::default();
    config.server.port = 8123;
    config.llm.temperature = 0.0;

    let text = toml::to_string(&config).unwrap();
    let parsed = parse_toml_config(&text).unwrap();
    assert_eq!(parsed, config);
}

#[test]
#[serial]
fn test_api_key_none_when_unconfigured() {
    clear_key_env();
    assert!(resolve_api_key(&LlmConfig::default()).is_none());
}

#[test]
#[serial]
fn test_api_key_from_toml() {
    clear_key_env();
    let llm = LlmConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let resolved = resolve_api_key(&llm).unwrap();
    assert_eq!(resolved.key, "toml-key");
    assert_eq!(resolved.source, ApiKeySource::Toml);
}

#[test]
#[serial]
fn test_env_key_wins_over_toml() {
    clear_key_env();
    env::set_var("OPENAI_API_KEY", "env-key");
    let llm = LlmConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let resolved = resolve_api_key(&llm).unwrap();
    assert_eq!(resolved.key, "env-key");
    assert_eq!(resolved.source, ApiKeySource::Environment("OPENAI_API_KEY"));
    clear_key_env();
}

#[test]
#[serial]
fn test_fta_key_wins_over_openai_key() {
    clear_key_env();
    env::set_var("FTA_LLM_API_KEY", "fta-key");
    env::set_var("OPENAI_API_KEY", "openai-key");

    let resolved = resolve_api_key(&LlmConfig::default()).unwrap();
    assert_eq!(resolved.key, "fta-key");
    assert_eq!(resolved.source, ApiKeySource::Environment("FTA_LLM_API_KEY"));
    clear_key_env();
}

#[test]
#[serial]
fn test_whitespace_key_is_ignored() {
    clear_key_env();
    env::set_var("FTA_LLM_API_KEY", "   ");
    let llm = LlmConfig {
        api_key: Some("toml-key".to_string()),
        ..Default::default()
    };

    let resolved = resolve_api_key(&llm).unwrap();
    assert_eq!(resolved.source, ApiKeySource::Toml);
    clear_key_env();
}
