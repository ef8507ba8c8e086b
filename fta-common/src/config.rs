//! Bootstrap configuration loading and API key resolution
//!
//! Configuration is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled defaults (fallback)
//!
//! A missing config file is not an error: the service logs a warning and
//! starts with compiled defaults. An unreadable or unparsable file is.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Directory name under the platform config dir (`~/.config/fta` on Linux)
pub const CONFIG_DIR_NAME: &str = "fta";

/// Config file name inside [`CONFIG_DIR_NAME`]
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variables checked for the LLM API key, highest priority first
pub const API_KEY_ENV_VARS: [&str; 2] = ["FTA_LLM_API_KEY", "OPENAI_API_KEY"];

/// Bootstrap configuration loaded from TOML file
///
/// Every section is optional; omitted fields fall back to compiled defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct TomlConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Text-generation service settings
    #[serde(default)]
    pub llm: LlmConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body (pasted text or uploaded file)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Text-generation service configuration
#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API key (environment variables take precedence)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Upper bound for a single generation call
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,

    /// Completion length limit
    #[serde(default = "default_llm_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_llm_temperature")]
    pub temperature: f32,

    /// Use the offline extractive summarizer when the service is unavailable
    #[serde(default = "default_local_fallback")]
    pub local_fallback: bool,
}

impl LlmConfig {
    /// Timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key: None,
            timeout_secs: default_llm_timeout_secs(),
            max_tokens: default_llm_max_tokens(),
            temperature: default_llm_temperature(),
            local_fallback: default_local_fallback(),
        }
    }
}

// Keys never reach the logs, only their length.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|k| format!("<{} chars>", k.len())),
            )
            .field("timeout_secs", &self.timeout_secs)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("local_fallback", &self.local_fallback)
            .finish()
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_max_upload_bytes() -> usize {
    2 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    30
}

fn default_llm_max_tokens() -> u32 {
    800
}

fn default_llm_temperature() -> f32 {
    0.3
}

fn default_local_fallback() -> bool {
    true
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from a TOML file
    File(PathBuf),
    /// No file found, compiled defaults in use
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "compiled defaults"),
        }
    }
}

/// Configuration together with its origin
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Load bootstrap configuration
///
/// `explicit_path` comes from `--config` / `FTA_CONFIG`. An explicit path
/// that does not exist is an error; a missing default file is not.
pub fn load_config(explicit_path: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let config = load_toml_config(path)?;
        return Ok(LoadedConfig {
            config,
            source: ConfigSource::File(path.to_path_buf()),
        });
    }

    match default_config_path() {
        Some(path) => {
            let config = load_toml_config(&path)?;
            Ok(LoadedConfig {
                config,
                source: ConfigSource::File(path),
            })
        }
        None => Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        }),
    }
}

impl TomlConfig {
    /// Reject values that parse but cannot work
    pub fn validate(&self) -> Result<()> {
        if self.server.max_upload_bytes == 0 {
            return Err(Error::InvalidInput(
                "server.max_upload_bytes must be greater than 0".to_string(),
            ));
        }
        if self.llm.timeout_secs == 0 {
            return Err(Error::InvalidInput(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(Error::InvalidInput(format!(
                "llm.temperature must be between 0 and 2, got {}",
                self.llm.temperature
            )));
        }
        Ok(())
    }
}

/// Read, parse and validate a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let config = parse_toml_config(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.validate()?;
    Ok(config)
}

/// Parse TOML text into a config
pub fn parse_toml_config(content: &str) -> std::result::Result<TomlConfig, toml::de::Error> {
    toml::from_str(content)
}

/// First existing config file among the platform locations
///
/// Linux checks `~/.config/fta/config.toml`, then `/etc/fta/config.toml`.
/// Other platforms check only the user config directory.
pub fn default_config_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME));
    if let Some(path) = user_config {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc")
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// Origin of a resolved API key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    Environment(&'static str),
    Toml,
}

impl fmt::Display for ApiKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiKeySource::Environment(var) => write!(f, "environment ({})", var),
            ApiKeySource::Toml => write!(f, "TOML config"),
        }
    }
}

/// Resolved API key
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedApiKey {
    pub key: String,
    pub source: ApiKeySource,
}

impl fmt::Debug for ResolvedApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedApiKey")
            .field("key", &format!("<{} chars>", self.key.len()))
            .field("source", &self.source)
            .finish()
    }
}

/// Resolve the LLM API key
///
/// **Priority:** `FTA_LLM_API_KEY` → `OPENAI_API_KEY` → TOML `llm.api_key`
///
/// Whitespace-only values are ignored. Returns `None` when no source holds
/// a usable key; the caller reports the service as unavailable.
pub fn resolve_api_key(llm: &LlmConfig) -> Option<ResolvedApiKey> {
    let mut candidates: Vec<ResolvedApiKey> = Vec::new();

    for var in API_KEY_ENV_VARS {
        if let Ok(key) = std::env::var(var) {
            if is_valid_key(&key) {
                candidates.push(ResolvedApiKey {
                    key: key.trim().to_string(),
                    source: ApiKeySource::Environment(var),
                });
            }
        }
    }

    if let Some(key) = &llm.api_key {
        if is_valid_key(key) {
            candidates.push(ResolvedApiKey {
                key: key.trim().to_string(),
                source: ApiKeySource::Toml,
            });
        }
    }

    if candidates.len() > 1 {
        let sources: Vec<String> = candidates.iter().map(|c| c.source.to_string()).collect();
        warn!(
            "LLM API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            candidates[0].source
        );
    }

    let resolved = candidates.into_iter().next();
    if let Some(ref key) = resolved {
        info!(key_len = key.key.len(), "LLM API key loaded from {}", key.source);
    }
    resolved
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
