//! Review lookup by game name.

use axum::{
    extract::{Path, State},
    Json,
};

use super::super::AppState;
use crate::models::ReviewSearchResult;

/// Reviews for `game`, or `null` when the search produced nothing in time.
///
/// A failed browser session is logged and also answered with `null`.
pub async fn game_reviews(
    State(state): State<AppState>,
    Path(game): Path<String>,
) -> Json<Option<ReviewSearchResult>> {
    match state.reviews.resolve(&game).await {
        Ok(lookup) => Json(lookup.into_option()),
        Err(e) => {
            tracing::error!("Search for {:?} failed: {}", game, e);
            Json(None)
        }
    }
}
