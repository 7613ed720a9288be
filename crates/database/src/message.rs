//! Direct message storage.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::SqlitePool;
use swap_core::{Message, SessionRequest, SessionStatus};

use crate::error::DatabaseError;
use crate::models::MessageRow;
use crate::Result;

/// Insert a direct message.
pub async fn insert_message(pool: &SqlitePool, message: &Message) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO messages (id, sender_id, receiver_id, text, created_at, session)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&message.id)
    .bind(&message.sender_id)
    .bind(&message.receiver_id)
    .bind(&message.text)
    .bind(message.created_at)
    .bind(message.session.as_ref().map(Json))
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a message by ID.
pub async fn get_message(pool: &SqlitePool, id: &str) -> Result<Option<Message>> {
    let row = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, sender_id, receiver_id, text, created_at, session
        FROM messages
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Message::from))
}

/// Replace the session payload of a message.
pub async fn update_session(
    pool: &SqlitePool,
    message_id: &str,
    expected: SessionStatus,
    session: &SessionRequest,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE messages
        SET session = ?
        WHERE id = ? AND json_extract(session, '$.status') = ?
        "#,
    )
    .bind(Json(session))
    .bind(message_id)
    .bind(expected.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        return Ok(true);
    }

    match get_message(pool, message_id).await? {
        Some(_) => Ok(false),
        None => Err(DatabaseError::not_found("Message", message_id)),
    }
}

/// Messages between two users, oldest first.
pub async fn list_conversation(pool: &SqlitePool, a: &str, b: &str) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, sender_id, receiver_id, text, created_at, session
        FROM messages
        WHERE (sender_id = ? AND receiver_id = ?)
           OR (sender_id = ? AND receiver_id = ?)
        ORDER BY created_at, rowid
        "#,
    )
    .bind(a)
    .bind(b)
    .bind(b)
    .bind(a)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}

/// Every message a user sent or received, oldest first.
pub async fn list_messages_for(pool: &SqlitePool, user_id: &str) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, sender_id, receiver_id, text, created_at, session
        FROM messages
        WHERE sender_id = ? OR receiver_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}

/// Session-request messages created at or after `since`.
pub async fn list_session_messages_since(pool: &SqlitePool, since: DateTime<Utc>) -> Result<Vec<Message>> {
    let rows = sqlx::query_as::<_, MessageRow>(
        r#"
        SELECT id, sender_id, receiver_id, text, created_at, session
        FROM messages
        WHERE session IS NOT NULL AND created_at >= ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(since)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Message::from).collect())
}
