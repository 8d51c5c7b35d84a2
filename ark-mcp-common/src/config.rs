//! Configuration module for loading environment variables and settings.

use crate::error::ConfigError;

/// Default Ark API base URL (Beijing region).
pub const DEFAULT_BASE_URL: &str = "https://ark.cn-beijing.volces.com/api/v3";

/// Default Seedream endpoint/model identifier.
pub const DEFAULT_MODEL: &str = "ep-20251002170303-b2mr4";

/// Path of the image generation API, relative to the base URL.
pub const IMAGES_GENERATIONS_PATH: &str = "/images/generations";

/// Application configuration loaded from environment variables.
#[derive(Clone)]
pub struct Config {
    /// Fallback API key used when a tool call does not carry its own
    pub api_key: Option<String>,
    /// Ark API base URL
    pub base_url: String,
    /// Model used when a tool call does not name one
    pub default_model: String,
    /// HTTP server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables and .env file.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if ARK_BASE_URL or ARK_DEFAULT_MODEL
    /// is set but empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// `from_env` delegates here; tests pass a closure over a map instead of
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("ARK_API_KEY").filter(|key| !key.is_empty());

        let base_url = match lookup("ARK_BASE_URL") {
            Some(url) if url.trim().is_empty() => {
                return Err(ConfigError::invalid_value("ARK_BASE_URL", "must not be empty"));
            }
            Some(url) => url,
            None => DEFAULT_BASE_URL.to_string(),
        };

        let default_model = match lookup("ARK_DEFAULT_MODEL") {
            Some(model) if model.trim().is_empty() => {
                return Err(ConfigError::invalid_value("ARK_DEFAULT_MODEL", "must not be empty"));
            }
            Some(model) => model,
            None => DEFAULT_MODEL.to_string(),
        };

        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Ok(Self {
            api_key,
            base_url,
            default_model,
            port,
        })
    }

    /// Override the base URL (e.g. to point at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the fallback API key.
    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Get the image generation endpoint URL.
    pub fn images_endpoint(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            IMAGES_GENERATIONS_PATH
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            port: 8080,
        }
    }
}

// The API key must never end up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("port", &self.port)
            .finish()
    }
}
