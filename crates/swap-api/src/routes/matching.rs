//! Deck, swipe and match routes.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use swap_core::{Direction, Match, Profile, RankedCandidate, SwipeOutcome};

use crate::error::{ApiError, Result};
use crate::state::{AppState, CurrentUser};

/// Swipe body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeRequest {
    pub swiped_id: String,
    /// `accept`/`reject`, or the older `right`/`left`.
    pub direction: String,
}

/// The caller's ranked deck.
pub async fn deck(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<RankedCandidate>>> {
    Ok(Json(state.service.ranked_deck(&user_id).await?))
}

pub async fn swipe(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<SwipeRequest>,
) -> Result<Json<SwipeOutcome>> {
    let direction = Direction::parse(&req.direction)
        .ok_or_else(|| ApiError::BadRequest(format!("unknown swipe direction {:?}", req.direction)))?;

    let outcome = state
        .service
        .record_swipe(&user_id, &req.swiped_id, direction)
        .await?;
    Ok(Json(outcome))
}

pub async fn matches(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Match>>> {
    Ok(Json(state.service.matches_for(&user_id).await?))
}

/// Profiles the caller has accepted.
pub async fn connections(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Profile>>> {
    Ok(Json(state.service.connections(&user_id).await?))
}
