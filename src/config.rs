//! Configuration management using the prefer crate for file discovery.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scrapers::site::DEFAULT_BASE_URL;
use crate::scrapers::BrowserEngineConfig;

/// Default bind address for the API server.
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// Default number of entries in the latest-reviewed listing.
pub const DEFAULT_LATEST_LIMIT: usize = 5;

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Site root all URLs are built from.
    pub base_url: String,
    /// User agent configuration for static pages ("impersonate" or a custom string).
    pub user_agent: Option<String>,
    /// Static page request timeout in seconds.
    pub request_timeout: u64,
    /// Server bind address.
    pub bind: String,
    /// Default size of the latest-reviewed listing.
    pub latest_limit: usize,
    /// Headless browser settings for searches.
    pub browser: BrowserEngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: None,
            request_timeout: 30,
            bind: DEFAULT_BIND.to_string(),
            latest_limit: DEFAULT_LATEST_LIMIT,
            browser: BrowserEngineConfig::default(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Apply environment variable overrides.
    ///
    /// - `GAMEREVIEWS_BASE_URL`
    /// - `GAMEREVIEWS_USER_AGENT`
    /// - `GAMEREVIEWS_REQUEST_TIMEOUT` (seconds)
    /// - `GAMEREVIEWS_BIND`
    /// - `BROWSER_URL`, `BROWSER_HEADLESS` (see [`BrowserEngineConfig`])
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(url) = env_string("GAMEREVIEWS_BASE_URL") {
            self.base_url = url;
        }
        if let Some(ua) = env_string("GAMEREVIEWS_USER_AGENT") {
            self.user_agent = Some(ua);
        }
        if let Some(timeout) =
            env_string("GAMEREVIEWS_REQUEST_TIMEOUT").and_then(|v| v.parse().ok())
        {
            self.request_timeout = timeout;
        }
        if let Some(bind) = env_string("GAMEREVIEWS_BIND") {
            self.bind = bind;
        }
        self.browser = self.browser.with_env_overrides();
        self
    }
}

fn env_string(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Site root URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// User agent string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    /// Server bind address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    /// Default latest-reviewed listing size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_limit: Option<usize>,
    /// Browser configuration for the search page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserEngineConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Automatically discovers gamereviews config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("gamereviews").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let mut config = Self::parse(&contents, path)?;
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, String> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        match ext {
            "toml" => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e)),
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(ref bind) = self.bind {
            settings.bind = bind.clone();
        }
        if let Some(limit) = self.latest_limit {
            settings.latest_limit = limit;
        }
        if let Some(ref browser) = self.browser {
            settings.browser = browser.clone();
        }
    }
}

/// Resolve settings: defaults, then config file, then environment.
pub async fn load_settings(config_path: Option<&Path>) -> anyhow::Result<Settings> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path)
            .await
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?,
        None => Config::load().await,
    };

    if let Some(ref path) = config.source_path {
        tracing::info!("Using config file {}", path.display());
    }

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    Ok(settings.with_env_overrides())
}
