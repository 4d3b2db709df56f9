//! JSON API over the scrapers.
//!
//! Three lookups are exposed:
//! - game reviews by name (interactive search)
//! - latest reviewed games, optionally per platform
//! - the monthly release calendar

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Mutex;

use crate::config::Settings;
use crate::scrapers::{
    BrowserSearchClient, HttpClient, ListingsFetcher, PageFetcher, ReviewResolver,
    SharedSearchClient, SiteUrls,
};

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<ReviewResolver>,
    pub listings: Arc<ListingsFetcher>,
    /// The search session, kept so it can be shut down with the server.
    pub search: SharedSearchClient,
    pub default_limit: usize,
}

impl AppState {
    /// Build the HTTP session and browser session once and share them.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(
            HttpClient::with_user_agent(settings.request_timeout(), settings.user_agent.as_deref())
                .context("failed to build HTTP client")?,
        );
        let search: SharedSearchClient = Arc::new(Mutex::new(Box::new(
            BrowserSearchClient::new(settings.browser.clone()),
        )));

        Self::from_parts(
            SiteUrls::new(&settings.base_url),
            search,
            fetcher,
            settings.latest_limit,
        )
    }

    /// Assemble state from already-built clients.
    pub fn from_parts(
        urls: SiteUrls,
        search: SharedSearchClient,
        fetcher: Arc<dyn PageFetcher>,
        default_limit: usize,
    ) -> anyhow::Result<Self> {
        let reviews = ReviewResolver::new(urls.clone(), search.clone(), fetcher.clone())?;
        let listings = ListingsFetcher::new(urls, fetcher)?;

        Ok(Self {
            reviews: Arc::new(reviews),
            listings: Arc::new(listings),
            search,
            default_limit,
        })
    }
}

/// Start the web server. Runs until Ctrl-C, then closes the browser.
pub async fn serve(settings: &Settings, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let search = state.search.clone();
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    search.lock().await.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
