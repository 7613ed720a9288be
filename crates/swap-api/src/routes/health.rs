//! Liveness endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// Report whether the server and its database respond.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    let database_up = match state.service.store().ping().await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!("Database health check failed: {}", err);
            false
        }
    };

    let (status, code) = if database_up {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let body = Health {
        status,
        database: if database_up { "up" } else { "down" },
        version: env!("CARGO_PKG_VERSION"),
    };
    (code, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::state_with;

    #[tokio::test]
    async fn test_health_reports_database() {
        let state = state_with(&[]).await;
        let (code, Json(body)) = health(State(state.clone())).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.database, "up");

        state.service.store().close().await;
        let (code, Json(body)) = health(State(state)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "degraded");
    }
}
