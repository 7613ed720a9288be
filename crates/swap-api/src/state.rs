//! Application state shared across handlers.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use database::Database;
use swap_core::{validation, SkillSwap};

use crate::error::ApiError;

/// Header carrying the identity-provider user id of the caller.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// SkillSwap operations over the database.
    pub service: SkillSwap<Database>,
}

impl AppState {
    /// Create new application state.
    pub fn new(service: SkillSwap<Database>) -> Self {
        Self { service }
    }
}

/// The user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        validation::validate_user_id(value).map_err(|_| ApiError::Unauthorized)?;
        Ok(CurrentUser(value.to_string()))
    }
}
