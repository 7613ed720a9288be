//! Feedback and report storage.

use sqlx::SqlitePool;
use swap_core::{Feedback, Report};

use crate::models::{convert_all, FeedbackRow, ReportRow};
use crate::Result;

/// Insert a feedback entry.
pub async fn insert_feedback(pool: &SqlitePool, feedback: &Feedback) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO feedback (id, from_user_id, to_user_id, rating, comment, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&feedback.id)
    .bind(&feedback.from_user_id)
    .bind(&feedback.to_user_id)
    .bind(feedback.rating)
    .bind(&feedback.comment)
    .bind(feedback.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Feedback a user received, newest first.
pub async fn list_feedback_for(pool: &SqlitePool, user_id: &str) -> Result<Vec<Feedback>> {
    let rows = sqlx::query_as::<_, FeedbackRow>(
        r#"
        SELECT id, from_user_id, to_user_id, rating, comment, created_at
        FROM feedback
        WHERE to_user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Feedback::from).collect())
}

/// Insert a report.
pub async fn insert_report(pool: &SqlitePool, report: &Report) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO reports (id, target_kind, target_id, reporter_id, reason, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&report.id)
    .bind(report.target.kind())
    .bind(report.target.id())
    .bind(&report.reporter_id)
    .bind(&report.reason)
    .bind(report.status.as_str())
    .bind(report.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Reports still waiting for review, oldest first.
pub async fn list_open_reports(pool: &SqlitePool) -> Result<Vec<Report>> {
    let rows = sqlx::query_as::<_, ReportRow>(
        r#"
        SELECT id, target_kind, target_id, reporter_id, reason, status, created_at
        FROM reports
        WHERE status = 'open'
        ORDER BY created_at, rowid
        "#,
    )
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}
