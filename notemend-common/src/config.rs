//! Configuration loading for the notemend middleware
//!
//! Provides layered configuration resolution with ENV → TOML → default
//! priority. The resolved `ServiceConfig` is constructed once at startup and
//! passed by parameter thereafter, so nothing reads the process environment
//! after boot.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Default listen port when neither ENV nor TOML configures one
pub const DEFAULT_PORT: u16 = 3000;

/// Default base URL of the chat-completion service
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com";

/// Default ordered model tiers: fast/cheap primary, fallback secondary
pub const DEFAULT_MODEL_TIERS: [&str; 2] = ["gpt-4o-mini", "gpt-3.5-turbo"];

/// Default per-attempt timeout for outbound completion calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter level (e.g., "info", "debug")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// On-disk TOML configuration (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub openai_api_key: Option<String>,
    pub port: Option<u16>,
    pub completion_base_url: Option<String>,
    pub model_tiers: Option<Vec<String>>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Credential for the completion service. Absence is not a startup
    /// error; the polish endpoint reports it per request instead.
    pub openai_api_key: Option<String>,
    /// HTTP listen port
    pub port: u16,
    /// Base URL of the chat-completion service
    pub completion_base_url: String,
    /// Ordered model tiers, evaluated first to last
    pub model_tiers: Vec<String>,
    /// Bounded per-attempt timeout for outbound completion calls
    pub request_timeout_secs: u64,
    /// Tracing filter level
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            port: DEFAULT_PORT,
            completion_base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            model_tiers: DEFAULT_MODEL_TIERS.iter().map(|t| t.to_string()).collect(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            log_level: LoggingConfig::default().level,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the process environment and the optional TOML
    /// config file.
    ///
    /// **Priority:** ENV → TOML → compiled default, per setting.
    pub fn load() -> Result<Self> {
        let toml_config = load_toml_config()?.unwrap_or_default();
        Ok(Self::resolve(&toml_config))
    }

    /// Resolve each setting against the given TOML configuration.
    ///
    /// Split out from [`ServiceConfig::load`] so tests can supply a
    /// `TomlConfig` without a file on disk.
    pub fn resolve(toml_config: &TomlConfig) -> Self {
        let openai_api_key = resolve_api_key(toml_config);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse::<u16>().ok())
            .or(toml_config.port)
            .unwrap_or(DEFAULT_PORT);

        let completion_base_url = std::env::var("NOTEMEND_COMPLETION_BASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| toml_config.completion_base_url.clone())
            .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string());

        let model_tiers = std::env::var("NOTEMEND_MODEL_TIERS")
            .ok()
            .map(|raw| parse_model_tiers(&raw))
            .filter(|tiers| !tiers.is_empty())
            .or_else(|| toml_config.model_tiers.clone().filter(|tiers| !tiers.is_empty()))
            .unwrap_or_else(|| DEFAULT_MODEL_TIERS.iter().map(|t| t.to_string()).collect());

        let request_timeout_secs = std::env::var("NOTEMEND_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .or(toml_config.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);

        let log_level = std::env::var("NOTEMEND_LOG_LEVEL")
            .ok()
            .filter(|level| !level.trim().is_empty())
            .unwrap_or_else(|| toml_config.logging.level.clone());

        Self {
            openai_api_key,
            port,
            completion_base_url,
            model_tiers,
            request_timeout_secs,
            log_level,
        }
    }
}

/// Resolve the completion-service credential from ENV → TOML.
fn resolve_api_key(toml_config: &TomlConfig) -> Option<String> {
    let env_key = std::env::var("OPENAI_API_KEY").ok().filter(|k| is_valid_key(k));
    let toml_key = toml_config.openai_api_key.clone().filter(|k| is_valid_key(k));

    // Warn if multiple sources (potential misconfiguration)
    if env_key.is_some() && toml_key.is_some() {
        warn!("OPENAI_API_KEY found in both environment and TOML. Using environment (highest priority).");
    }

    if env_key.is_some() {
        info!("Completion API key loaded from environment variable");
        return env_key;
    }

    if toml_key.is_some() {
        info!("Completion API key loaded from TOML config");
        return toml_key;
    }

    None
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Parse a comma-separated tier list, dropping empty entries.
pub fn parse_model_tiers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tier| tier.trim())
        .filter(|tier| !tier.is_empty())
        .map(|tier| tier.to_string())
        .collect()
}

/// Get the platform config file path: `<config dir>/notemend/notemend.toml`
fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("notemend").join("notemend.toml"))
}

/// Read and parse the TOML config file, if one exists.
fn load_toml_config() -> Result<Option<TomlConfig>> {
    let Some(path) = config_file_path() else {
        return Ok(None);
    };
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path)?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!("Loaded TOML config: {}", path.display());
    Ok(Some(config))
}
