//! Static listing pages: latest reviews and the monthly release calendar.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, warn};

use super::http_client::{FetchError, PageFetcher};
use super::site::{ListingMarkup, Platform, SiteUrls, LISTING_MARKUP};
use super::{element_text, selector, SelectorError};
use crate::models::{LatestGameEntry, ReleaseEntry};

#[derive(Debug, Error)]
pub enum ListingError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("listing page has no {0} container")]
    MissingContainer(String),

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// A calendar node classified by its exact class set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarNode {
    /// Day header; `None` when its text holds no usable day.
    DateHeader(Option<u32>),
    Entry { name: String, platform: String },
}

/// Fold calendar nodes into entries, carrying the running release date.
///
/// Entries seen before the first date header, or after a header without a
/// usable day, have no date and are skipped.
pub fn collect_releases(
    nodes: impl IntoIterator<Item = CalendarNode>,
    year: i32,
    month: u32,
) -> Vec<ReleaseEntry> {
    let (_, entries) = nodes.into_iter().fold(
        (None::<String>, Vec::new()),
        |(current, mut entries), node| match node {
            CalendarNode::DateHeader(Some(day)) => {
                (Some(release_date(year, month, day)), entries)
            }
            CalendarNode::DateHeader(None) => {
                warn!("Date header without a day; following releases are undated");
                (None, entries)
            }
            CalendarNode::Entry { name, platform } => {
                match &current {
                    Some(date) => entries.push(ReleaseEntry {
                        name,
                        platform,
                        release_date: date.clone(),
                    }),
                    None => warn!("Release {:?} has no date header; skipped", name),
                }
                (current, entries)
            }
        },
    );
    entries
}

/// `YYYY-MM-DD`, falling back to the unchecked form when the site lists an
/// impossible day.
fn release_date(year: i32, month: u32, day: u32) -> String {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date.format("%Y-%m-%d").to_string(),
        None => format!("{:04}-{:02}-{:02}", year, month, day),
    }
}

/// Fetches and parses the listing pages.
pub struct ListingsFetcher {
    urls: SiteUrls,
    fetcher: Arc<dyn PageFetcher>,
    markup: ListingMarkup,
    news_item: Selector,
    news_title: Selector,
    calendar: Selector,
    div: Selector,
    link: Selector,
    span: Selector,
    day: Regex,
    title_suffix: Regex,
}

impl ListingsFetcher {
    pub fn new(urls: SiteUrls, fetcher: Arc<dyn PageFetcher>) -> Result<Self, ListingError> {
        let markup = LISTING_MARKUP;
        Ok(Self {
            urls,
            fetcher,
            markup,
            news_item: selector(markup.news_item)?,
            news_title: selector(markup.news_title)?,
            calendar: selector(markup.calendar)?,
            div: selector("div")?,
            link: selector("a")?,
            span: selector("span")?,
            day: Regex::new(r"\d+")?,
            title_suffix: Regex::new(r" - .*$")?,
        })
    }

    /// Most recently reviewed titles, newest first, at most `limit`.
    pub async fn latest_reviewed(
        &self,
        platform: &str,
        limit: usize,
    ) -> Result<Vec<LatestGameEntry>, ListingError> {
        let url = self.urls.latest_reviews(Platform::lookup(platform));
        let html = self.fetcher.fetch_html(&url).await?;
        Ok(self.parse_latest(&html, limit))
    }

    /// Release calendar for one month.
    pub async fn releases(
        &self,
        platform: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ReleaseEntry>, ListingError> {
        let url = self.urls.releases(Platform::lookup(platform), year, month);
        let html = self.fetcher.fetch_html(&url).await?;
        self.parse_releases(&html, year, month)
    }

    pub fn parse_latest(&self, html: &str, limit: usize) -> Vec<LatestGameEntry> {
        let document = Html::parse_document(html);
        document
            .select(&self.news_item)
            .take(limit)
            .filter_map(|item| {
                let title = item.select(&self.news_title).next()?;
                let name = self
                    .title_suffix
                    .replace(&element_text(title), "")
                    .trim()
                    .to_string();
                Some(LatestGameEntry { name })
            })
            .collect()
    }

    pub fn parse_releases(
        &self,
        html: &str,
        year: i32,
        month: u32,
    ) -> Result<Vec<ReleaseEntry>, ListingError> {
        let document = Html::parse_document(html);
        let calendar = document
            .select(&self.calendar)
            .next()
            .ok_or_else(|| ListingError::MissingContainer(self.markup.calendar.to_string()))?;

        let nodes = calendar
            .select(&self.div)
            .filter_map(|div| self.classify(div));
        Ok(collect_releases(nodes, year, month))
    }

    fn classify(&self, div: ElementRef<'_>) -> Option<CalendarNode> {
        let classes: BTreeSet<&str> = div.value().classes().collect();
        let header: BTreeSet<&str> = self.markup.date_header_classes.iter().copied().collect();
        let entry: BTreeSet<&str> = self.markup.entry_classes.iter().copied().collect();

        if classes == header {
            let text = self.first_text(div, &self.span);
            let day = self
                .day
                .find(&text)
                .and_then(|m| m.as_str().parse().ok());
            return Some(CalendarNode::DateHeader(day));
        }

        if classes == entry {
            let name = div
                .select(&self.link)
                .next()
                .map(|a| self.first_text(a, &self.span))
                .unwrap_or_default();
            let platform = div
                .select(&self.div)
                .next()
                .map(|inner| self.first_text(inner, &self.span))
                .unwrap_or_default();
            if name.is_empty() {
                debug!("Calendar entry without a title; skipped");
                return None;
            }
            return Some(CalendarNode::Entry { name, platform });
        }

        None
    }

    /// Text of the first `sel` descendant, or of the element itself.
    fn first_text(&self, element: ElementRef<'_>, sel: &Selector) -> String {
        element
            .select(sel)
            .next()
            .map(element_text)
            .unwrap_or_else(|| element_text(element))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::scrapers::reviews::tests::FakePages;

    fn header(day: &str) -> String {
        format!(r#"<div class="s20 ffnav b mar_t50"><span>Día {}</span></div>"#, day)
    }

    fn entry(name: &str, platform: &str) -> String {
        format!(
            r#"<div class="dtc vam"><a href="/x/"><span>{}</span></a><div class="s12"><span>{}</span></div></div>"#,
            name, platform
        )
    }

    fn calendar(body: &str) -> String {
        format!(
            r#"<html><body><div class="wi100"><div class="pad_rl10">{}</div></div></body></html>"#,
            body
        )
    }

    fn listings(pages: FakePages) -> ListingsFetcher {
        ListingsFetcher::new(SiteUrls::default(), Arc::new(pages)).unwrap()
    }

    #[test]
    fn running_date_carries_forward() {
        let body = [
            header("15"),
            entry("Gran Turismo Sport", "PS4"),
            entry("Forza Motorsport 7", "ONE"),
            entry("Cuphead", "PC"),
            header("22"),
            entry("Super Mario Odyssey", "SWI"),
        ]
        .concat();

        let entries = listings(FakePages::default())
            .parse_releases(&calendar(&body), 2017, 10)
            .unwrap();

        assert_eq!(entries.len(), 4);
        assert!(entries[..3].iter().all(|e| e.release_date == "2017-10-15"));
        assert_eq!(entries[3].release_date, "2017-10-22");
        assert_eq!(entries[3].name, "Super Mario Odyssey");
        assert_eq!(entries[3].platform, "SWI");
    }

    #[test]
    fn entries_before_first_header_are_skipped() {
        let nodes = vec![
            CalendarNode::Entry {
                name: "Orphan".to_string(),
                platform: "PC".to_string(),
            },
            CalendarNode::DateHeader(Some(3)),
            CalendarNode::Entry {
                name: "Dated".to_string(),
                platform: "PC".to_string(),
            },
        ];

        let entries = collect_releases(nodes, 2017, 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Dated");
        assert_eq!(entries[0].release_date, "2017-02-03");
    }

    #[test]
    fn undated_header_does_not_inherit_previous_date() {
        let body = [
            header("15"),
            entry("Gran Turismo Sport", "PS4"),
            header("Sin fecha"),
            entry("Anthem", "PC"),
            header("99999999999"),
            entry("Days Gone", "PS4"),
        ]
        .concat();

        let entries = listings(FakePages::default())
            .parse_releases(&calendar(&body), 2017, 10)
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Gran Turismo Sport");
        assert_eq!(entries[0].release_date, "2017-10-15");
    }

    #[test]
    fn class_sets_must_match_exactly() {
        let body = [
            header("1"),
            r#"<div class="dtc vam extra"><a><span>Not an entry</span></a></div>"#.to_string(),
            r#"<div class="vam dtc"><a><span>Reordered</span></a><div><span>PC</span></div></div>"#
                .to_string(),
        ]
        .concat();

        let entries = listings(FakePages::default())
            .parse_releases(&calendar(&body), 2018, 1)
            .unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Reordered"]);
    }

    #[test]
    fn missing_calendar_is_an_error() {
        let err = listings(FakePages::default())
            .parse_releases("<html><body></body></html>", 2018, 1)
            .unwrap_err();
        assert!(matches!(err, ListingError::MissingContainer(_)));
    }

    #[test]
    fn impossible_day_keeps_unchecked_date() {
        assert_eq!(release_date(2017, 2, 31), "2017-02-31");
    }

    fn news(titles: &[&str]) -> String {
        let items: String = titles
            .iter()
            .map(|t| {
                format!(
                    r#"<div class="nov_int_txt wi100"><h2><a href="/x/">{}</a></h2></div>"#,
                    t
                )
            })
            .collect();
        format!("<html><body>{}</body></html>", items)
    }

    #[test]
    fn latest_strips_suffix_and_truncates() {
        let html = news(&[
            "Celeste - Análisis de un plataformas brillante",
            "Hollow Knight - Análisis",
            "Cuphead",
        ]);

        let entries = listings(FakePages::default()).parse_latest(&html, 2);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Celeste", "Hollow Knight"]);
    }

    #[tokio::test]
    async fn unknown_platform_uses_all_platforms_listing() {
        let url = "http://www.3djuegos.com/novedades/analisis/juegos/0f0f0f0/fecha/";
        let pages = FakePages::default().with(url, &news(&["Cuphead - Análisis"]));

        let entries = listings(pages).latest_reviewed("dreamcast", 5).await.unwrap();
        assert_eq!(entries, vec![LatestGameEntry { name: "Cuphead".to_string() }]);
    }

    #[tokio::test]
    async fn releases_fetches_platform_calendar() {
        let url = "http://www.3djuegos.com/lanzamientos-juegos/ps4/por-mes/37/2017/10/";
        let body = [header("10"), entry("The Evil Within 2", "PS4")].concat();
        let pages = FakePages::default().with(url, &calendar(&body));

        let entries = listings(pages).releases("PS4", 2017, 10).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].release_date, "2017-10-10");
    }

    #[tokio::test]
    async fn fetch_failure_surfaces_as_listing_error() {
        let err = listings(FakePages::default())
            .releases("all", 2017, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::Fetch(_)));
    }
}
