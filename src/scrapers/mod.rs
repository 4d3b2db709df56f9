//! Scraping layer for the review site.
//!
//! Static pages go through [`HttpClient`]; the client-rendered search page
//! goes through a [`SearchClient`] (headless browser by default).

pub mod browser;
pub mod extract;
pub mod http_client;
pub mod listings;
pub mod matching;
pub mod reviews;
pub mod site;

pub use browser::{
    BrowserEngineConfig, BrowserSearchClient, NavigateOutcome, SearchClient, SearchError,
};
pub use extract::{ExtractError, ReviewExtractor};
pub use http_client::{FetchError, HttpClient, PageFetcher};
pub use listings::{ListingError, ListingsFetcher};
pub use reviews::{ReviewResolver, SharedSearchClient};
pub use site::{Platform, SiteUrls};

use scraper::{ElementRef, Selector};

/// A CSS selector from a markup table failed to compile.
#[derive(Debug, thiserror::Error)]
#[error("invalid selector {css:?}: {message}")]
pub struct SelectorError {
    pub css: String,
    pub message: String,
}

/// Compile a CSS selector.
pub(crate) fn selector(css: &str) -> Result<Selector, SelectorError> {
    Selector::parse(css).map_err(|e| SelectorError {
        css: css.to_string(),
        message: e.to_string(),
    })
}

/// All descendant text of an element, trimmed.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
