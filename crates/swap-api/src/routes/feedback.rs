//! Ratings and abuse reports.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use swap_core::{Feedback, Report, ReportTarget};

use crate::error::Result;
use crate::state::{AppState, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    pub rating: i64,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub target: ReportTarget,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackSummary {
    pub average: Option<f64>,
    pub feedback: Vec<Feedback>,
}

/// Feedback a user received, with the mean rating.
pub async fn list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<FeedbackSummary>> {
    let feedback = state.service.feedback_for(&id).await?;
    let average = state.service.rating_of(&id).await?;
    Ok(Json(FeedbackSummary { average, feedback }))
}

pub async fn give(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<Feedback>)> {
    let feedback = state
        .service
        .give_feedback(&user_id, &id, req.rating, &req.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

pub async fn report(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<ReportRequest>,
) -> Result<(StatusCode, Json<Report>)> {
    let report = state
        .service
        .submit_report(&user_id, req.target, &req.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}
