use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{OmnesError, Result};
use crate::types::DEFAULT_HISTORY_CAPACITY;

/// Environment variable holding the provider credential.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the provider model.
pub const ENV_MODEL: &str = "OPENAI_MODEL";
/// Environment variable overriding the provider base URL.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
/// Environment variable overriding the relay port.
pub const ENV_PORT: &str = "OMNES_PORT";

/// Top-level configuration for the Omnes assistant.
///
/// Loaded from `~/.omnes/config.toml` by default, then overlaid with
/// environment variables. Each section corresponds to one component.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OmnesConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub widget: WidgetConfig,
}

impl OmnesConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: OmnesConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the configuration to a TOML file. The provider credential is
    /// never written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| OmnesError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary variable lookup.
    ///
    /// Blank values are ignored so that an exported-but-empty credential is
    /// treated the same as a missing one.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = get(ENV_API_KEY) {
            self.provider.api_key = Some(key);
        }
        if let Some(model) = get(ENV_MODEL) {
            self.provider.model = model;
        }
        if let Some(base_url) = get(ENV_BASE_URL) {
            self.provider.base_url = base_url;
        }
        if let Some(port) = get(ENV_PORT) {
            match port.parse::<u16>() {
                Ok(p) => self.relay.port = p,
                Err(_) => warn!(value = %port, "Ignoring invalid {}", ENV_PORT),
            }
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Relay HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Origins allowed by CORS. Empty permits any origin.
    pub allowed_origins: Vec<String>,
    /// Chat requests accepted per second before answering with a busy reply.
    pub rate_limit_per_sec: u64,
    /// Maximum accepted request body in bytes.
    pub max_body_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8788,
            allowed_origins: Vec::new(),
            rate_limit_per_sec: 20,
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Language-model provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Secret credential. Required for chat; never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL of the chat-completions API.
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Timeout for one provider call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// The credential, if present and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Client-side widget settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Relay endpoint the widget posts to.
    pub relay_url: String,
    /// Turns retained in conversation history.
    pub history_capacity: usize,
    /// Seconds to wait for a reply before failing the exchange. 0 disables.
    pub request_timeout_secs: u64,
    /// Language tag for speech recognition and synthesis.
    pub speech_lang: String,
    /// Speech synthesis rate.
    pub speech_rate: f32,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:8788/api/chat".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            request_timeout_secs: 30,
            speech_lang: "es-CL".to_string(),
            speech_rate: 1.05,
        }
    }
}
