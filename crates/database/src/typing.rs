//! Typing indicator storage.

use sqlx::SqlitePool;
use swap_core::TypingStatus;

use crate::models::TypingRow;
use crate::Result;

/// Insert or refresh a typing status.
pub async fn upsert_typing(pool: &SqlitePool, status: &TypingStatus) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO typing_status (group_id, user_id, user_name, updated_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(group_id, user_id) DO UPDATE SET
            user_name = excluded.user_name,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&status.group_id)
    .bind(&status.user_id)
    .bind(&status.user_name)
    .bind(status.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Remove a typing status. Returns false if there was none.
pub async fn delete_typing(pool: &SqlitePool, group_id: &str, user_id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM typing_status
        WHERE group_id = ? AND user_id = ?
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Typing statuses of a group, ordered by user.
pub async fn list_typing(pool: &SqlitePool, group_id: &str) -> Result<Vec<TypingStatus>> {
    let rows = sqlx::query_as::<_, TypingRow>(
        r#"
        SELECT group_id, user_id, user_name, updated_at
        FROM typing_status
        WHERE group_id = ?
        ORDER BY user_id
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(TypingStatus::from).collect())
}
