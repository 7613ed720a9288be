//! Profile and search routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use swap_core::{Profile, SearchResults};
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::{AppState, CurrentUser};

/// Photo update body.
#[derive(Debug, Deserialize)]
pub struct PhotoRequest {
    #[serde(rename = "photoURL", alias = "photoUrl", alias = "url")]
    pub photo_url: String,
}

/// Search query string.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Create or update the caller's profile from a profile document.
///
/// The document may use any of the historical shapes; an `email` field is
/// required when the profile does not exist yet.
pub async fn save_me(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(doc): Json<Value>,
) -> Result<Json<Profile>> {
    let email = match doc.get("email") {
        None | Some(Value::Null) => "",
        Some(Value::String(email)) => email.as_str(),
        Some(_) => return Err(ApiError::BadRequest("email must be a string".to_string())),
    };

    let profile = state.service.save_profile_document(&user_id, email, &doc).await?;
    Ok(Json(profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Profile>> {
    Ok(Json(state.service.get_profile(&id).await?))
}

/// Close the caller's account.
pub async fn close_account(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<StatusCode> {
    state.service.close_account(&user_id).await?;
    info!(user_id = %user_id, "Account closed via API");
    Ok(StatusCode::NO_CONTENT)
}

/// Store the URL of an already uploaded profile photo.
pub async fn set_photo(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<PhotoRequest>,
) -> Result<Json<Profile>> {
    Ok(Json(state.service.set_photo_url(&user_id, &req.photo_url).await?))
}

pub async fn search(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>> {
    Ok(Json(state.service.search(&query.q).await?))
}
