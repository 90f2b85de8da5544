//! Application configuration types.
//!
//! The top-level [`Config`] is deserialized from JSON. Every section has
//! sensible defaults so an empty `{}` file is valid, and the API key can be
//! supplied through the environment instead of the file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["TMDB_API_KEY", "CATALOG_API_KEY"];

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub fetch: FetchConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Fill in the API key from the process environment when the file did
    /// not provide one.
    pub fn with_env(self) -> Self {
        self.with_env_from(|name| std::env::var(name).ok())
    }

    /// Like [`Config::with_env`] but reading variables through `lookup`.
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let configured = self.catalog.api_key.as_deref().and_then(normalize_key);
        self.catalog.api_key = configured.or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .find_map(|name| lookup(name).as_deref().and_then(normalize_key))
        });
        self
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let base = self.catalog.base_url.to_ascii_lowercase();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            warnings.push(format!(
                "catalog.base_url '{}' is not an http(s) URL",
                self.catalog.base_url
            ));
        }

        if self.catalog.api_key.is_none() {
            warnings.push(format!(
                "no API key configured; set catalog.api_key or {}",
                API_KEY_ENV_VARS.join(" / ")
            ));
        }

        if self.fetch.timeout_ms == 0 {
            warnings.push("fetch.timeout_ms is 0; every request will abort immediately".into());
        }

        if self.fetch.rate_limit_per_second == Some(0) {
            warnings.push("fetch.rate_limit_per_second is 0; rate limiting is disabled".into());
        }

        warnings
    }
}

fn normalize_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Where the catalog lives and how to address it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base address that relative request paths are joined onto.
    pub base_url: String,
    /// Base address for poster and backdrop artwork.
    pub image_base_url: String,
    /// API key injected as the `api_key` query parameter.
    pub api_key: Option<String>,
    /// Language tag sent with browse and search requests.
    pub language: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".into(),
            image_base_url: "https://image.tmdb.org/t/p".into(),
            api_key: None,
            language: "en-US".into(),
        }
    }
}

/// Request client behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Default per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Outbound requests per second; `None` or `0` disables pacing.
    pub rate_limit_per_second: Option<u32>,
    /// Evict successful responses after this many milliseconds. `None`
    /// keeps them for the lifetime of the client.
    pub cache_ttl_ms: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8000,
            rate_limit_per_second: Some(40),
            cache_ttl_ms: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl_ms.map(Duration::from_millis)
    }
}
