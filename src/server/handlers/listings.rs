//! Latest-reviewed and release calendar listings.
//!
//! Every answer is a JSON listing. Upstream failures and unusable parameters
//! are logged and answered with an empty list.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Datelike;
use serde::Deserialize;

use super::super::AppState;
use crate::models::{LatestGames, ReleaseCalendar};
use crate::scrapers::site::ALL_PLATFORMS;

/// Parameters for the latest-reviewed listing.
///
/// `limit` stays raw text so a malformed value falls back to the default.
#[derive(Debug, Default, Deserialize)]
pub struct LatestParams {
    pub limit: Option<String>,
}

impl LatestParams {
    fn limit_or(&self, default: usize) -> usize {
        let Some(raw) = self.limit.as_deref() else {
            return default;
        };
        raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring limit {:?}; using {}", raw, default);
            default
        })
    }
}

pub async fn latest_reviewed(
    State(state): State<AppState>,
    params: Option<Query<LatestParams>>,
) -> Json<LatestGames> {
    latest(&state, ALL_PLATFORMS, params).await
}

pub async fn latest_reviewed_for_platform(
    State(state): State<AppState>,
    Path(platform): Path<String>,
    params: Option<Query<LatestParams>>,
) -> Json<LatestGames> {
    latest(&state, &platform, params).await
}

async fn latest(
    state: &AppState,
    platform: &str,
    params: Option<Query<LatestParams>>,
) -> Json<LatestGames> {
    let limit = params
        .map(|Query(p)| p.limit_or(state.default_limit))
        .unwrap_or(state.default_limit);
    let latest_games = state
        .listings
        .latest_reviewed(platform, limit)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Latest reviews for {} unavailable: {}", platform, e);
            Vec::new()
        });
    Json(LatestGames { latest_games })
}

/// Calendar for the current local month, all platforms.
pub async fn releases_this_month(State(state): State<AppState>) -> Json<ReleaseCalendar> {
    let today = chrono::Local::now().date_naive();
    calendar(&state, ALL_PLATFORMS, today.year(), today.month()).await
}

pub async fn releases(
    State(state): State<AppState>,
    Path((year, month)): Path<(String, String)>,
) -> Json<ReleaseCalendar> {
    match parse_month(&year, &month) {
        Some((year, month)) => calendar(&state, ALL_PLATFORMS, year, month).await,
        None => Json(ReleaseCalendar::default()),
    }
}

pub async fn releases_for_platform(
    State(state): State<AppState>,
    Path((year, month, platform)): Path<(String, String, String)>,
) -> Json<ReleaseCalendar> {
    match parse_month(&year, &month) {
        Some((year, month)) => calendar(&state, &platform, year, month).await,
        None => Json(ReleaseCalendar::default()),
    }
}

/// Year and month 1-12 from path segments.
fn parse_month(year: &str, month: &str) -> Option<(i32, u32)> {
    let parsed = year
        .parse::<i32>()
        .ok()
        .zip(month.parse::<u32>().ok())
        .filter(|(_, m)| (1..=12).contains(m));
    if parsed.is_none() {
        tracing::warn!("No release calendar for {:?}/{:?}", year, month);
    }
    parsed
}

async fn calendar(state: &AppState, platform: &str, year: i32, month: u32) -> Json<ReleaseCalendar> {
    let games = state
        .listings
        .releases(platform, year, month)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Releases for {} {}-{:02} unavailable: {}", platform, year, month, e);
            Vec::new()
        });
    Json(ReleaseCalendar { games })
}
