//! Error types for the SkillSwap API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use swap_core::SwapError;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A service operation failed.
    #[error(transparent)]
    Swap(#[from] SwapError),

    /// The request carried no acting user.
    #[error("missing or invalid x-user-id header")]
    Unauthorized,

    /// The request body or query is not acceptable.
    #[error("{0}")]
    BadRequest(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Swap(err) => match err {
                SwapError::NotFound { .. } => StatusCode::NOT_FOUND,
                SwapError::InsufficientCredits { .. } => StatusCode::CONFLICT,
                SwapError::Forbidden(_) => StatusCode::FORBIDDEN,
                SwapError::Invalid(_) | SwapError::Validation(_) | SwapError::Profile(_) => {
                    StatusCode::BAD_REQUEST
                }
                SwapError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let body = serde_json::json!({
            "error": self.to_string()
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use swap_core::{ProfileError, ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::Swap(SwapError::not_found("User", "u1")), StatusCode::NOT_FOUND),
            (
                ApiError::Swap(SwapError::InsufficientCredits {
                    user_id: "u1".to_string(),
                    balance: 1,
                    requested: 5,
                }),
                StatusCode::CONFLICT,
            ),
            (ApiError::Swap(SwapError::Forbidden("no".to_string())), StatusCode::FORBIDDEN),
            (ApiError::Swap(SwapError::Invalid("no".to_string())), StatusCode::BAD_REQUEST),
            (
                ApiError::Swap(SwapError::Validation(ValidationError::Empty("bio".to_string()))),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Swap(SwapError::Profile(ProfileError::NotAnObject)), StatusCode::BAD_REQUEST),
            (ApiError::Swap(SwapError::Store("disk".to_string())), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED),
            (ApiError::BadRequest("bad".to_string()), StatusCode::BAD_REQUEST),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{err}");
        }
    }

    #[test]
    fn test_response_has_status() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
