//! Listing page entries: latest reviews and the monthly release calendar.

use serde::{Deserialize, Serialize};

/// A recently reviewed title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestGameEntry {
    pub name: String,
}

/// Wire wrapper for the latest-reviewed listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestGames {
    pub latest_games: Vec<LatestGameEntry>,
}

/// A release calendar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEntry {
    pub name: String,
    pub platform: String,
    /// `YYYY-MM-DD`, built from the running date header plus the queried month.
    pub release_date: String,
}

/// Wire wrapper for the release calendar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseCalendar {
    pub games: Vec<ReleaseEntry>,
}
