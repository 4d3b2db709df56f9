//! One-shot lookups printed as JSON.

use anyhow::Context;
use chrono::Datelike;
use console::style;
use serde::Serialize;

use crate::config::Settings;
use crate::models::{LatestGames, ReleaseCalendar};
use crate::scrapers::site::ALL_PLATFORMS;
use crate::server::AppState;

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Search for a game and print its reviews.
pub async fn cmd_review(settings: &Settings, game: &str) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    eprintln!("{} Searching for {}...", style("→").cyan(), style(game).bold());

    let lookup = state.reviews.resolve(game).await;
    state.search.lock().await.shutdown().await;

    match lookup.context("search failed")?.into_option() {
        Some(result) => {
            eprintln!(
                "  {} {} review(s) found",
                style("✓").green(),
                result.reviews.len()
            );
            print_json(&result)
        }
        None => {
            eprintln!(
                "  {} No search results in time; {} may not be reviewed yet",
                style("!").yellow(),
                game
            );
            print_json(&serde_json::Value::Null)
        }
    }
}

/// Print the latest reviewed games.
pub async fn cmd_latest(
    settings: &Settings,
    platform: Option<&str>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let limit = limit.unwrap_or(settings.latest_limit);
    let latest_games = state
        .listings
        .latest_reviewed(platform.unwrap_or(ALL_PLATFORMS), limit)
        .await
        .context("latest reviews unavailable")?;
    print_json(&LatestGames { latest_games })
}

/// Print the release calendar for a month.
pub async fn cmd_releases(
    settings: &Settings,
    platform: Option<&str>,
    year: Option<i32>,
    month: Option<u32>,
) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());

    let state = AppState::new(settings)?;
    let games = state
        .listings
        .releases(platform.unwrap_or(ALL_PLATFORMS), year, month)
        .await
        .with_context(|| format!("release calendar for {}-{:02} unavailable", year, month))?;
    print_json(&ReleaseCalendar { games })
}
