//! Direct messages, study sessions and the weekly leaderboard.

use axum::extract::{Path, Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use swap_core::{InboxEntry, LeaderboardEntry, Message, SessionProposal};

use crate::error::Result;
use crate::state::{AppState, CurrentUser};

/// Default number of leaderboard rows.
const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub text: String,
}

/// Session request body: the helper plus what is proposed.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequestBody {
    pub helper_id: String,
    #[serde(flatten)]
    pub proposal: SessionProposal,
}

#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    pub accept: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeaderboardQuery {
    pub limit: Option<usize>,
}

/// One entry per conversation, newest first.
pub async fn inbox(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<InboxEntry>>> {
    Ok(Json(state.service.inbox(&user_id).await?))
}

pub async fn conversation(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(peer): Path<String>,
) -> Result<Json<Vec<Message>>> {
    Ok(Json(state.service.conversation(&user_id, &peer).await?))
}

/// Send a text message to a matched peer.
pub async fn send(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(peer): Path<String>,
    Json(req): Json<SendRequest>,
) -> Result<Json<Message>> {
    Ok(Json(state.service.send_message(&user_id, &peer, &req.text).await?))
}

pub async fn request_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<SessionRequestBody>,
) -> Result<Json<Message>> {
    let message = state
        .service
        .request_session(&user_id, &req.helper_id, req.proposal)
        .await?;
    Ok(Json(message))
}

pub async fn respond_to_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<RespondRequest>,
) -> Result<Json<Message>> {
    Ok(Json(state.service.respond_to_session(&id, &user_id, req.accept).await?))
}

/// Mark an accepted session as held; the caller must be the helper.
pub async fn complete_session(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Message>> {
    Ok(Json(state.service.complete_session(&id, &user_id).await?))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    Ok(Json(state.service.weekly_leaderboard(Utc::now(), limit).await?))
}
