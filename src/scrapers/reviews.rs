//! Review lookup: search, filter candidate links, fetch and extract.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::browser::{NavigateOutcome, SearchClient, SearchError};
use super::extract::{ExtractError, ReviewExtractor};
use super::http_client::PageFetcher;
use super::matching;
use super::site::{SiteUrls, LISTING_MARKUP};
use crate::models::{ReviewLookup, ReviewSearchResult};

/// Shared handle to the single interactive search session.
pub type SharedSearchClient = Arc<Mutex<Box<dyn SearchClient>>>;

/// Resolves a game name into its reviews.
pub struct ReviewResolver {
    urls: SiteUrls,
    search: SharedSearchClient,
    fetcher: Arc<dyn PageFetcher>,
    extractor: ReviewExtractor,
}

impl ReviewResolver {
    pub fn new(
        urls: SiteUrls,
        search: SharedSearchClient,
        fetcher: Arc<dyn PageFetcher>,
    ) -> Result<Self, ExtractError> {
        Ok(Self {
            urls,
            search,
            fetcher,
            extractor: ReviewExtractor::new()?,
        })
    }

    /// Look up every review whose link matches `game`.
    ///
    /// Candidates that cannot be fetched or extracted are logged and skipped;
    /// only a broken browser session is an error.
    pub async fn resolve(&self, game: &str) -> Result<ReviewLookup, SearchError> {
        let Some(candidates) = self.search_candidates(game).await? else {
            info!("No search results for {:?}; not reviewed yet", game);
            return Ok(ReviewLookup::SearchTimeout);
        };

        let mut result = ReviewSearchResult::default();
        for href in candidates {
            if !matching::matches(game, &href) {
                debug!("Skipping non-matching candidate {}", href);
                continue;
            }

            let url = self.urls.resolve(&href);
            let html = match self.fetcher.fetch_html(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("{} not reachable: {}", url, e);
                    continue;
                }
            };

            match self.extractor.extract_html(&html) {
                Ok(record) => result.reviews.push(record),
                Err(e) => warn!("Dropping review at {}: {}", url, e),
            }
        }

        Ok(ReviewLookup::Found(result))
    }

    /// Run the interactive search and return candidate hrefs in DOM order,
    /// or `None` if nothing rendered in time.
    async fn search_candidates(&self, game: &str) -> Result<Option<Vec<String>>, SearchError> {
        let url = self.urls.search(game);
        let mut search = self.search.lock().await;

        if search.navigate(&url).await? == NavigateOutcome::TimedOut {
            // Results may already be in the DOM; stop the load and look anyway.
            search.stop_loading().await?;
        }

        let wait = search.search_wait();
        let links = search
            .wait_for_links(LISTING_MARKUP.search_result_link, wait)
            .await?;

        if links.is_none() {
            if let Err(e) = search.stop_loading().await {
                debug!("Failed to stop page load after timeout: {}", e);
            }
        }

        Ok(links)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::scrapers::http_client::FetchError;

    /// Search client returning canned links.
    #[derive(Default)]
    pub(crate) struct FakeSearch {
        pub links: Option<Vec<String>>,
        pub load_times_out: bool,
        pub stops: Arc<std::sync::atomic::AtomicUsize>,
        pub visited: Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl SearchClient for FakeSearch {
        async fn navigate(&mut self, url: &str) -> Result<NavigateOutcome, SearchError> {
            self.visited.lock().unwrap().push(url.to_string());
            Ok(if self.load_times_out {
                NavigateOutcome::TimedOut
            } else {
                NavigateOutcome::Loaded
            })
        }

        async fn stop_loading(&mut self) -> Result<(), SearchError> {
            self.stops
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }

        async fn wait_for_links(
            &mut self,
            _selector: &str,
            _timeout: Duration,
        ) -> Result<Option<Vec<String>>, SearchError> {
            Ok(self.links.clone())
        }

        fn search_wait(&self) -> Duration {
            Duration::from_millis(10)
        }
    }

    /// Page fetcher serving canned bodies; unknown URLs are unreachable.
    #[derive(Default)]
    pub(crate) struct FakePages {
        pub pages: HashMap<String, String>,
    }

    impl FakePages {
        pub fn with(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakePages {
        async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
            self.pages.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    /// Search client that records how many searches overlap.
    #[derive(Default)]
    struct OverlapSearch {
        active: Arc<std::sync::atomic::AtomicUsize>,
        peak: Arc<std::sync::atomic::AtomicUsize>,
    }

    #[async_trait]
    impl SearchClient for OverlapSearch {
        async fn navigate(&mut self, _url: &str) -> Result<NavigateOutcome, SearchError> {
            use std::sync::atomic::Ordering;
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(NavigateOutcome::Loaded)
        }

        async fn stop_loading(&mut self) -> Result<(), SearchError> {
            Ok(())
        }

        async fn wait_for_links(
            &mut self,
            _selector: &str,
            _timeout: Duration,
        ) -> Result<Option<Vec<String>>, SearchError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active
                .fetch_sub(1, std::sync::atomic::Ordering::SeqCst);
            Ok(Some(Vec::new()))
        }

        fn search_wait(&self) -> Duration {
            Duration::from_millis(10)
        }
    }

    pub(crate) fn review_html(name: &str, platform: &str, critic: &str) -> String {
        format!(
            r#"<div class="fftit s20 b"><span>{name}</span> ({platform})</div>
            <dt>Desarrollador:</dt><dd>Codemasters</dd>
            <span itemprop="releaseDate" content="2017-08-25"></span>
            <div class="dtc wi36"><span>{critic}</span></div>"#
        )
    }

    const PS4: &str = "http://www.3djuegos.com/juegos/analisis/25011/0/f1-2017/";
    const PC: &str = "http://www.3djuegos.com/juegos/analisis/25012/0/f1-2017/";
    const OTHER: &str = "http://www.3djuegos.com/juegos/analisis/24000/0/f1-2016/";

    fn resolver(search: FakeSearch, pages: FakePages) -> ReviewResolver {
        let search: SharedSearchClient = Arc::new(Mutex::new(Box::new(search)));
        ReviewResolver::new(SiteUrls::default(), search, Arc::new(pages)).unwrap()
    }

    fn found(lookup: ReviewLookup) -> ReviewSearchResult {
        match lookup {
            ReviewLookup::Found(result) => result,
            ReviewLookup::SearchTimeout => panic!("unexpected search timeout"),
        }
    }

    #[tokio::test]
    async fn resolves_matching_candidates_in_order() {
        let search = FakeSearch {
            links: Some(vec![PS4.to_string(), OTHER.to_string(), PC.to_string()]),
            ..Default::default()
        };
        let pages = FakePages::default()
            .with(PS4, &review_html("F1 2017", "PS4", "86"))
            .with(PC, &review_html("F1 2017", "PC", "88"))
            .with(OTHER, &review_html("F1 2016", "PC", "80"));

        let result = found(resolver(search, pages).resolve("F1 2017").await.unwrap());

        let platforms: Vec<_> = result
            .reviews
            .iter()
            .map(|r| r.platform.as_deref().unwrap())
            .collect();
        assert_eq!(platforms, vec!["PS4", "PC"]);
    }

    #[tokio::test]
    async fn no_matching_candidates_is_empty_not_error() {
        let search = FakeSearch {
            links: Some(vec![OTHER.to_string()]),
            ..Default::default()
        };

        let result = found(
            resolver(search, FakePages::default())
                .resolve("F1 2017")
                .await
                .unwrap(),
        );
        assert!(result.reviews.is_empty());
    }

    #[tokio::test]
    async fn wait_elapsing_is_search_timeout_and_stops_loading() {
        let search = FakeSearch::default();
        let stops = search.stops.clone();

        let lookup = resolver(search, FakePages::default())
            .resolve("F1 2017")
            .await
            .unwrap();

        assert_eq!(lookup, ReviewLookup::SearchTimeout);
        assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn slow_page_load_is_stopped_before_waiting() {
        let search = FakeSearch {
            links: Some(vec![PS4.to_string()]),
            load_times_out: true,
            ..Default::default()
        };
        let stops = search.stops.clone();
        let pages = FakePages::default().with(PS4, &review_html("F1 2017", "PS4", "86"));

        let result = found(resolver(search, pages).resolve("F1 2017").await.unwrap());

        assert_eq!(result.reviews.len(), 1);
        assert_eq!(stops.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_candidate_is_skipped() {
        let search = FakeSearch {
            links: Some(vec![PS4.to_string(), PC.to_string()]),
            ..Default::default()
        };
        let pages = FakePages::default().with(PC, &review_html("F1 2017", "PC", "88"));

        let result = found(resolver(search, pages).resolve("F1 2017").await.unwrap());
        assert_eq!(result.reviews.len(), 1);
        assert_eq!(result.reviews[0].platform.as_deref(), Some("PC"));
    }

    #[tokio::test]
    async fn malformed_page_drops_only_that_record() {
        let search = FakeSearch {
            links: Some(vec![PS4.to_string(), PC.to_string()]),
            ..Default::default()
        };
        let pages = FakePages::default()
            .with(PS4, "<html><body>maintenance</body></html>")
            .with(PC, &review_html("F1 2017", "PC", "88"));

        let result = found(resolver(search, pages).resolve("F1 2017").await.unwrap());
        assert_eq!(result.reviews.len(), 1);
    }

    #[tokio::test]
    async fn relative_links_are_resolved_against_site() {
        let search = FakeSearch {
            links: Some(vec!["/juegos/analisis/25011/0/f1-2017/".to_string()]),
            ..Default::default()
        };
        let visited = search.visited.clone();
        let pages = FakePages::default().with(PS4, &review_html("F1 2017", "PS4", "86"));

        let result = found(resolver(search, pages).resolve("F1 2017").await.unwrap());
        assert_eq!(result.reviews.len(), 1);
        assert_eq!(
            visited.lock().unwrap().as_slice(),
            ["http://www.3djuegos.com/?q=F1%202017&zona=resultados-buscador&ni=1"]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lookups_share_one_search_at_a_time() {
        let search = OverlapSearch::default();
        let peak = search.peak.clone();
        let shared: SharedSearchClient = Arc::new(Mutex::new(Box::new(search)));
        let resolver = Arc::new(
            ReviewResolver::new(SiteUrls::default(), shared, Arc::new(FakePages::default()))
                .unwrap(),
        );

        let lookups: Vec<_> = ["F1 2017", "Celeste", "Cuphead", "Hollow Knight", "Inside"]
            .into_iter()
            .map(|game| {
                let resolver = resolver.clone();
                tokio::spawn(async move { resolver.resolve(game).await })
            })
            .collect();
        for lookup in lookups {
            assert!(matches!(
                lookup.await.unwrap().unwrap(),
                ReviewLookup::Found(_)
            ));
        }

        assert_eq!(peak.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
