//! Review page extraction.
//!
//! Turns the parsed document of one review page into a [`GameReviewRecord`]
//! using the rule table in [`REVIEW_MARKUP`].

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;

use super::site::{LabelField, ReviewMarkup, REVIEW_MARKUP};
use super::{element_text, selector, SelectorError};
use crate::models::{GameReviewRecord, Score};

/// Errors that make a review page unusable.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("review page has no title block")]
    MissingTitle,

    #[error("review page has no release date")]
    MissingReleaseDate,

    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Compiled review page rules.
pub struct ReviewExtractor {
    markup: ReviewMarkup,
    title: Selector,
    title_name: Selector,
    term: Selector,
    definition: Selector,
    release_date: Selector,
    score: Selector,
    score_value: Selector,
    platform_suffix: Regex,
}

impl ReviewExtractor {
    /// Compile the default site rules.
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_markup(REVIEW_MARKUP)
    }

    pub fn with_markup(markup: ReviewMarkup) -> Result<Self, ExtractError> {
        Ok(Self {
            markup,
            title: selector(markup.title)?,
            title_name: selector(markup.title_name)?,
            term: selector(markup.term)?,
            definition: selector(markup.definition)?,
            release_date: selector(markup.release_date)?,
            score: selector(markup.score)?,
            score_value: selector(markup.score_value)?,
            platform_suffix: Regex::new(r"\((.*?)\)")?,
        })
    }

    /// Parse raw HTML and extract.
    pub fn extract_html(&self, html: &str) -> Result<GameReviewRecord, ExtractError> {
        self.extract(&Html::parse_document(html))
    }

    /// Extract a review record from a parsed review page.
    pub fn extract(&self, document: &Html) -> Result<GameReviewRecord, ExtractError> {
        let mut record = GameReviewRecord::default();

        // The page repeats the title block in sticky headers; the last one is
        // the article's.
        let title = document
            .select(&self.title)
            .last()
            .ok_or(ExtractError::MissingTitle)?;
        record.name = self.title_name(title);
        record.platform = self.platform(title);

        let terms = document.select(&self.term);
        let definitions = document.select(&self.definition);
        for (term, definition) in terms.zip(definitions) {
            let label = element_text(term);
            let Some(field) = self.label_field(&label) else {
                continue;
            };
            let value = Some(element_text(definition)).filter(|v| !v.is_empty());
            match field {
                LabelField::Studio => record.studio = value,
                LabelField::Publisher => record.publisher = value,
                LabelField::Genre => record.genre = value,
            }
        }

        let release_date = document
            .select(&self.release_date)
            .find_map(|el| el.value().attr(self.markup.release_date_attr))
            .ok_or(ExtractError::MissingReleaseDate)?;
        record.release_date = Some(release_date.trim().to_string());

        let mut scores = document.select(&self.score).map(|widget| {
            let text = widget
                .select(&self.score_value)
                .next()
                .map(element_text)
                .unwrap_or_else(|| element_text(widget));
            Some(text).filter(|t| !t.is_empty()).map(|t| Score::parse(&t))
        });
        record.critic_score = scores.next().flatten();
        record.user_score = scores.next().flatten();

        Ok(record)
    }

    fn label_field(&self, label: &str) -> Option<LabelField> {
        self.markup
            .labels
            .iter()
            .find(|(text, _)| *text == label)
            .map(|&(_, field)| field)
    }

    fn title_name(&self, title: ElementRef<'_>) -> Option<String> {
        let name = match title.select(&self.title_name).next() {
            Some(span) => element_text(span),
            None => direct_text(title),
        };
        Some(name).filter(|n| !n.is_empty())
    }

    fn platform(&self, title: ElementRef<'_>) -> Option<String> {
        let full = title.text().collect::<String>();
        self.platform_suffix
            .captures(&full)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|p| !p.is_empty())
    }
}

/// Text nodes that are immediate children of `element`, without the
/// "(Platform)" suffix.
fn direct_text(element: ElementRef<'_>) -> String {
    let text: String = element
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();
    match text.find('(') {
        Some(idx) => text[..idx].trim().to_string(),
        None => text.trim().to_string(),
    }
}
