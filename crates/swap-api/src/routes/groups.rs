//! Study group routes, including group chat and its live event stream.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::Utc;
use futures::stream::{self, Stream};
use serde::Deserialize;
use swap_core::{
    Group, GroupEvent, GroupMessage, GroupSubscription, Invitation, Profile, SwapError,
    TypingStatus,
};
use tracing::{info, warn};

use crate::error::Result;
use crate::state::{AppState, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct PostRequest {
    pub text: String,
}

pub async fn list(State(state): State<AppState>, _user: CurrentUser) -> Result<Json<Vec<Group>>> {
    Ok(Json(state.service.list_groups().await?))
}

/// Create a group with the caller as its first member.
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<Group>)> {
    let group = state
        .service
        .create_group(&user_id, &req.name, &req.description)
        .await?;
    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn get(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Group>> {
    Ok(Json(state.service.get_group(&id).await?))
}

/// Delete a group. Only its creator may do this.
pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service.delete_group(&id, &user_id).await?;
    info!(group_id = %id, "Group deleted via API");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn join(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Group>> {
    Ok(Json(state.service.join_group(&id, &user_id).await?))
}

pub async fn leave(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Group>> {
    Ok(Json(state.service.leave_group(&id, &user_id).await?))
}

pub async fn invite(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<InviteRequest>,
) -> Result<(StatusCode, Json<Invitation>)> {
    let invitation = state.service.invite(&id, &user_id, &req.user_id).await?;
    Ok((StatusCode::CREATED, Json(invitation)))
}

pub async fn members(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Profile>>> {
    Ok(Json(state.service.group_members(&id).await?))
}

/// The group's chat, oldest first.
pub async fn messages(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<GroupMessage>>> {
    Ok(Json(state.service.group_messages(&id).await?))
}

pub async fn post_message(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<PostRequest>,
) -> Result<(StatusCode, Json<GroupMessage>)> {
    let message = state.service.post_group_message(&id, &user_id, &req.text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Server-sent events for one group.
///
/// Members only. The stream ends after the group is deleted.
pub async fn events(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let group = state.service.get_group(&id).await?;
    if !group.is_member(&user_id) {
        return Err(SwapError::Forbidden("only members can follow a group".to_string()).into());
    }

    let subscription = state.service.subscribe(&id).await?;
    info!(group_id = %id, user_id = %user_id, "Group event stream opened");

    Ok(Sse::new(event_stream(subscription)).keep_alive(KeepAlive::default()))
}

fn event_stream(
    subscription: GroupSubscription,
) -> impl Stream<Item = std::result::Result<Event, Infallible>> {
    stream::unfold(Some(subscription), |subscription| async move {
        let mut subscription = subscription?;
        let event = subscription.next().await?;

        let sse = to_sse(&event);
        let next = match event {
            GroupEvent::GroupDeleted { .. } => None,
            _ => Some(subscription),
        };
        Some((Ok(sse), next))
    })
}

fn to_sse(event: &GroupEvent) -> Event {
    Event::default()
        .event(event.name())
        .json_data(event)
        .unwrap_or_else(|err| {
            warn!("Failed to encode group event: {}", err);
            Event::default().event("error").data(err.to_string())
        })
}

/// Who else is typing right now.
pub async fn typing(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<TypingStatus>>> {
    Ok(Json(state.service.typing_users(&id, &user_id, Utc::now()).await?))
}

pub async fn start_typing(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TypingStatus>> {
    Ok(Json(state.service.set_typing(&id, &user_id).await?))
}

pub async fn stop_typing(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service.clear_typing(&id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's pending invitations.
pub async fn invitations(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<Invitation>>> {
    Ok(Json(state.service.pending_invitations(&user_id).await?))
}

pub async fn accept_invitation(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Group>> {
    Ok(Json(state.service.accept_invitation(&id, &user_id).await?))
}

pub async fn decline_invitation(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.service.decline_invitation(&id, &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
