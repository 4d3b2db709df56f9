//! Data models for gamereviews.

mod listing;
mod review;

pub use listing::{LatestGameEntry, LatestGames, ReleaseCalendar, ReleaseEntry};
pub use review::{GameReviewRecord, ReviewLookup, ReviewSearchResult, Score};
