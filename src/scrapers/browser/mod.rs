//! Interactive search through a headless browser.
//!
//! The site renders search results client-side, so the search page is loaded
//! in Chromium (chromiumoxide, CDP) and polled until result links appear.

mod config;

pub use config::BrowserEngineConfig;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[cfg(feature = "browser")]
use std::path::PathBuf;
#[cfg(feature = "browser")]
use std::time::Instant;

#[cfg(feature = "browser")]
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;
#[cfg(feature = "browser")]
use serde::Deserialize;
#[cfg(feature = "browser")]
use tokio::task::JoinHandle;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use super::http_client::BROWSER_USER_AGENT;

/// Errors from the browser session itself. Running out of time is not an
/// error; see [`NavigateOutcome`] and [`SearchClient::wait_for_links`].
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("failed to start browser: {0}")]
    Launch(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("browser support not compiled; rebuild with --features browser")]
    NotCompiled,
}

/// Result of starting a page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigateOutcome {
    Loaded,
    /// The load did not finish within the page-load timeout and is still
    /// in flight.
    TimedOut,
}

/// A stateful interactive page that can be searched.
///
/// Implementations hold a single page; callers serialize access (the server
/// keeps one behind a mutex).
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Load `url`, bounded by the page-load timeout.
    async fn navigate(&mut self, url: &str) -> Result<NavigateOutcome, SearchError>;

    /// Cancel any in-flight page load.
    async fn stop_loading(&mut self) -> Result<(), SearchError>;

    /// Wait until at least one element matches `selector` and return the
    /// `href` of every match in DOM order, or `None` if `timeout` elapses.
    async fn wait_for_links(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<String>>, SearchError>;

    /// How long searches should wait for results.
    fn search_wait(&self) -> Duration;

    /// Release the session. Called once on server shutdown.
    async fn shutdown(&mut self) {}
}

/// Chromium-backed search client.
#[cfg(feature = "browser")]
pub struct BrowserSearchClient {
    config: BrowserEngineConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    handler: Option<JoinHandle<()>>,
}

/// Chromium binaries checked on disk before falling back to `PATH`.
#[cfg(feature = "browser")]
const CHROMIUM_LOCATIONS: &[&str] = &[
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/usr/bin/google-chrome",
    "/snap/bin/chromium",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

#[cfg(feature = "browser")]
const CHROMIUM_COMMANDS: &[&str] = &["chromium", "chromium-browser", "google-chrome"];

/// Flags for a throwaway search profile.
#[cfg(feature = "browser")]
const LAUNCH_FLAGS: &[&str] = &[
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--no-first-run",
    "--mute-audio",
];

/// The part of DevTools' `/json/version` answer needed to attach.
#[cfg(feature = "browser")]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DevToolsVersion {
    web_socket_debugger_url: String,
}

#[cfg(feature = "browser")]
fn locate_chromium() -> Result<PathBuf, SearchError> {
    if let Some(path) = CHROMIUM_LOCATIONS
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    {
        return Ok(path);
    }

    CHROMIUM_COMMANDS
        .iter()
        .find_map(|cmd| on_path(cmd))
        .ok_or_else(|| {
            SearchError::Launch(
                "no Chromium binary found; install one or point BROWSER_URL at a running instance"
                    .to_string(),
            )
        })
}

#[cfg(feature = "browser")]
fn on_path(cmd: &str) -> Option<PathBuf> {
    let output = std::process::Command::new("which").arg(cmd).output().ok()?;
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (output.status.success() && !path.is_empty()).then(|| PathBuf::from(path))
}

#[cfg(feature = "browser")]
impl BrowserSearchClient {
    /// Create a new search client. The browser starts on first use.
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self {
            config,
            browser: None,
            page: None,
            handler: None,
        }
    }

    /// Launch or attach to the browser and open the search tab.
    async fn ensure_page(&mut self) -> Result<&Page, SearchError> {
        if self.browser.is_none() {
            let (browser, mut events) = match self.config.remote_url.clone() {
                Some(endpoint) => Self::attach(&endpoint).await?,
                None => self.launch().await?,
            };

            // The CDP connection only makes progress while its event stream is polled.
            self.handler = Some(tokio::spawn(async move {
                while let Some(event) = events.next().await {
                    if event.is_err() {
                        break;
                    }
                }
            }));
            self.browser = Some(browser);
        }

        if self.page.is_none() {
            let browser = self
                .browser
                .as_ref()
                .ok_or_else(|| SearchError::Browser("browser not running".to_string()))?;
            let page = browser.new_page("about:blank").await.map_err(browser_err)?;
            page.execute(SetUserAgentOverrideParams::new(BROWSER_USER_AGENT.to_string()))
                .await
                .map_err(browser_err)?;
            self.page = Some(page);
        }

        self.page
            .as_ref()
            .ok_or_else(|| SearchError::Browser("no page".to_string()))
    }

    async fn launch(&self) -> Result<(Browser, chromiumoxide::Handler), SearchError> {
        let executable = locate_chromium()?;
        info!(
            "Starting Chromium {} (headless={})",
            executable.display(),
            self.config.headless
        );

        let mut builder = BrowserConfig::builder().chrome_executable(executable);
        if !self.config.headless {
            builder = builder.with_head();
        }
        let flags = LAUNCH_FLAGS
            .iter()
            .copied()
            .chain(self.config.chrome_args.iter().map(String::as_str));
        for flag in flags {
            builder = builder.arg(flag);
        }

        let config = builder.build().map_err(SearchError::Launch)?;
        Browser::launch(config)
            .await
            .map_err(|e| SearchError::Launch(e.to_string()))
    }

    /// Attach to an already running browser through its DevTools endpoint.
    async fn attach(endpoint: &str) -> Result<(Browser, chromiumoxide::Handler), SearchError> {
        let mut version_url = url::Url::parse(endpoint).map_err(|e| attach_err(endpoint, e))?;
        let scheme = match version_url.scheme() {
            "wss" | "https" => "https",
            _ => "http",
        };
        version_url
            .set_scheme(scheme)
            .map_err(|_| attach_err(endpoint, "unsupported DevTools URL"))?;
        version_url.set_path("/json/version");

        info!("Attaching to browser at {}", endpoint);
        let version: DevToolsVersion = reqwest::get(version_url)
            .await
            .map_err(|e| attach_err(endpoint, e))?
            .json()
            .await
            .map_err(|e| attach_err(endpoint, e))?;

        Browser::connect(version.web_socket_debugger_url)
            .await
            .map_err(|e| attach_err(endpoint, e))
    }

    /// Close the search tab and the browser, then stop the event task.
    pub async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!("Search tab close failed: {}", e);
            }
        }
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Browser close failed: {}", e);
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }
    }

    /// Drop the page so the next search opens a fresh one.
    fn discard_page(&mut self) {
        self.page = None;
    }
}

#[cfg(feature = "browser")]
fn attach_err(endpoint: &str, e: impl std::fmt::Display) -> SearchError {
    SearchError::Launch(format!("{}: {}", endpoint, e))
}

#[cfg(feature = "browser")]
fn browser_err(e: chromiumoxide::error::CdpError) -> SearchError {
    SearchError::Browser(e.to_string())
}

#[cfg(feature = "browser")]
#[async_trait]
impl SearchClient for BrowserSearchClient {
    async fn navigate(&mut self, url: &str) -> Result<NavigateOutcome, SearchError> {
        let load_timeout = Duration::from_secs(self.config.page_load_timeout);
        let page = self.ensure_page().await?;

        debug!("Navigating to {}", url);
        let outcome = match tokio::time::timeout(load_timeout, page.goto(url)).await {
            Ok(Ok(_)) => Ok(NavigateOutcome::Loaded),
            Ok(Err(e)) => Err(browser_err(e)),
            Err(_) => {
                debug!("Page load exceeded {:?}", load_timeout);
                Ok(NavigateOutcome::TimedOut)
            }
        };

        if outcome.is_err() {
            self.discard_page();
        }
        outcome
    }

    async fn stop_loading(&mut self) -> Result<(), SearchError> {
        let Some(page) = self.page.as_ref() else {
            return Ok(());
        };
        page.evaluate("window.stop();".to_string())
            .await
            .map(|_| ())
            .map_err(browser_err)
    }

    async fn wait_for_links(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Option<Vec<String>>, SearchError> {
        let poll = Duration::from_millis(self.config.poll_interval_ms.max(10));
        let page = self.ensure_page().await?;
        let deadline = Instant::now() + timeout;

        let poll_links = async {
            loop {
                match page.find_elements(selector).await {
                    Ok(elements) if !elements.is_empty() => {
                        let mut hrefs = Vec::with_capacity(elements.len());
                        for element in &elements {
                            match element.attribute("href").await {
                                Ok(Some(href)) => hrefs.push(href),
                                Ok(None) => {}
                                Err(e) => debug!("Could not read href: {}", e),
                            }
                        }
                        return hrefs;
                    }
                    Ok(_) => {}
                    // The document may be mid-navigation; keep polling.
                    Err(e) => debug!("Selector lookup failed: {}", e),
                }
                if Instant::now() >= deadline {
                    return Vec::new();
                }
                tokio::time::sleep(poll).await;
            }
        };

        match tokio::time::timeout(timeout, poll_links).await {
            Ok(hrefs) if !hrefs.is_empty() => Ok(Some(hrefs)),
            Ok(_) | Err(_) => {
                warn!("No elements matched {} within {:?}", selector, timeout);
                Ok(None)
            }
        }
    }

    fn search_wait(&self) -> Duration {
        Duration::from_secs(self.config.search_wait)
    }

    async fn shutdown(&mut self) {
        self.close().await;
    }
}

// Built without Chromium: every search reports NotCompiled.
#[cfg(not(feature = "browser"))]
pub struct BrowserSearchClient {
    config: BrowserEngineConfig,
}

#[cfg(not(feature = "browser"))]
impl BrowserSearchClient {
    pub fn new(config: BrowserEngineConfig) -> Self {
        Self { config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl SearchClient for BrowserSearchClient {
    async fn navigate(&mut self, _url: &str) -> Result<NavigateOutcome, SearchError> {
        Err(SearchError::NotCompiled)
    }

    async fn stop_loading(&mut self) -> Result<(), SearchError> {
        Ok(())
    }

    async fn wait_for_links(
        &mut self,
        _selector: &str,
        _timeout: Duration,
    ) -> Result<Option<Vec<String>>, SearchError> {
        Err(SearchError::NotCompiled)
    }

    fn search_wait(&self) -> Duration {
        Duration::from_secs(self.config.search_wait)
    }
}
