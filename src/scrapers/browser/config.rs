//! Browser engine configuration.

use std::env;

use serde::{Deserialize, Serialize};

/// Headless browser settings for the search page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Page load timeout in seconds. On expiry loading is stopped.
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// How long to wait for search results to render, in seconds.
    #[serde(default = "default_search_wait")]
    pub search_wait: u64,

    /// Interval between DOM polls while waiting, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_headless() -> bool {
    true
}

fn default_page_load_timeout() -> u64 {
    10
}

fn default_search_wait() -> u64 {
    6
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            remote_url: None,
            chrome_args: Vec::new(),
            page_load_timeout: default_page_load_timeout(),
            search_wait: default_search_wait(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl BrowserEngineConfig {
    /// Apply environment variable overrides.
    ///
    /// - `BROWSER_URL` - remote DevTools endpoint
    /// - `BROWSER_HEADLESS` - `0`/`false` to show the window
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = env::var("BROWSER_URL") {
            if !url.trim().is_empty() {
                self.remote_url = Some(url.trim().to_string());
            }
        }

        if let Ok(headless) = env::var("BROWSER_HEADLESS") {
            match headless.to_lowercase().as_str() {
                "0" | "false" | "no" => self.headless = false,
                "1" | "true" | "yes" => self.headless = true,
                _ => {}
            }
        }

        self
    }
}
