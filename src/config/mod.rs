//! Configuration management for appforge
//!
//! Settings are resolved in layers: built-in defaults, then a TOML file,
//! then a `.env` file in the working directory, then process environment.
//! A missing or placeholder credential is *not* a load error; it is rejected
//! by the LLM client the first time a pipeline run needs it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Value the credential holds until an operator supplies a real one
pub const PLACEHOLDER_API_KEY: &str = "YOUR_CEREBRAS_API_KEY";

/// Environment variable carrying the LLM credential
pub const API_KEY_ENV: &str = "CEREBRAS_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub llm: LlmConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name understood by `llm::create_provider`
    pub provider: String,
    pub api_key: String,
    /// Full chat-completions endpoint
    pub base_url: String,
    pub model: String,
    pub max_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    /// Transport timeout for a single completion call
    pub timeout_secs: u64,
    /// Let `GenerationOptions` in the request override model parameters
    pub honor_request_options: bool,
    pub retry: RetryConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "cerebras".to_string(),
            api_key: PLACEHOLDER_API_KEY.to_string(),
            base_url: "https://api.cerebras.ai/v1/chat/completions".to_string(),
            model: "llama-4-maverick-17b-128e-instruct".to_string(),
            max_tokens: 32768,
            temperature: 0.7,
            top_p: 0.9,
            timeout_secs: 300,
            honor_request_options: false,
            retry: RetryConfig::default(),
        }
    }
}

impl LlmConfig {
    /// True when the credential is present and not the placeholder
    pub fn has_usable_api_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && key != PLACEHOLDER_API_KEY
    }

    /// Credential shown in logs and `check-config` output
    pub fn redacted_api_key(&self) -> String {
        if !self.has_usable_api_key() {
            return "<unset>".to_string();
        }
        let tail: String = self
            .api_key
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("****{}", tail)
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &self.redacted_api_key())
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("timeout_secs", &self.timeout_secs)
            .field("honor_request_options", &self.honor_request_options)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Bounded retry policy around the LLM client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call; 1 means a single best-effort attempt
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 500,
            max_backoff_ms: 8000,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// When set, `/v1/*` requires a matching `X-API-Key` header
    pub api_key: Option<String>,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            api_key: None,
            cors_origins: Vec::new(),
        }
    }
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location if `None`
    ///
    /// An explicit path must exist. The default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::config_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Config::default(),
            },
        };

        // `.env` never overrides variables already set in the environment
        if let Ok(env_path) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {:?}", env_path);
        }

        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Default configuration file path (`<config dir>/appforge/config.toml`)
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "appforge")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Overlay environment variables, looked up through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.llm.api_key = key;
        }
        if let Some(model) = non_empty("APPFORGE_MODEL") {
            self.llm.model = model;
        }
        if let Some(url) = non_empty("APPFORGE_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(key) = non_empty("APPFORGE_SERVER_API_KEY") {
            self.server.api_key = Some(key);
        }
    }
}
