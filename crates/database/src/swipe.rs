//! Swipe and match storage.

use sqlx::types::Json;
use sqlx::SqlitePool;
use swap_core::{Match, Swipe};

use crate::error::DatabaseError;
use crate::models::{convert_all, MatchRow, SwipeRow};
use crate::Result;

/// Write a swipe, replacing any earlier swipe of the same pair.
pub async fn put_swipe(pool: &SqlitePool, swipe: &Swipe) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO swipes (swiper_id, swiped_id, direction, swiper_skills, swiped_skills, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(swiper_id, swiped_id) DO UPDATE SET
            direction = excluded.direction,
            swiper_skills = excluded.swiper_skills,
            swiped_skills = excluded.swiped_skills,
            created_at = excluded.created_at
        "#,
    )
    .bind(&swipe.swiper_id)
    .bind(&swipe.swiped_id)
    .bind(swipe.direction.as_str())
    .bind(Json(&swipe.swiper_skills))
    .bind(Json(&swipe.swiped_skills))
    .bind(swipe.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get the swipe `swiper -> swiped`.
pub async fn get_swipe(pool: &SqlitePool, swiper_id: &str, swiped_id: &str) -> Result<Option<Swipe>> {
    let row = sqlx::query_as::<_, SwipeRow>(
        r#"
        SELECT swiper_id, swiped_id, direction, swiper_skills, swiped_skills, created_at
        FROM swipes
        WHERE swiper_id = ? AND swiped_id = ?
        "#,
    )
    .bind(swiper_id)
    .bind(swiped_id)
    .fetch_optional(pool)
    .await?;

    row.map(Swipe::try_from).transpose()
}

/// All swipes made by a user, oldest first.
pub async fn list_swipes_by(pool: &SqlitePool, swiper_id: &str) -> Result<Vec<Swipe>> {
    let rows = sqlx::query_as::<_, SwipeRow>(
        r#"
        SELECT swiper_id, swiped_id, direction, swiper_skills, swiped_skills, created_at
        FROM swipes
        WHERE swiper_id = ?
        ORDER BY created_at, swiped_id
        "#,
    )
    .bind(swiper_id)
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// Create a match unless it already exists. Returns true if created.
pub async fn insert_match(pool: &SqlitePool, record: &Match) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO matches (id, user_a, user_b, created_at, last_message)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.users[0])
    .bind(&record.users[1])
    .bind(record.created_at)
    .bind(&record.last_message)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Get a match by its pair key.
pub async fn get_match(pool: &SqlitePool, id: &str) -> Result<Option<Match>> {
    let row = sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT id, user_a, user_b, created_at, last_message
        FROM matches
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Match::from))
}

/// Matches that include a user, newest first.
pub async fn list_matches_for(pool: &SqlitePool, user_id: &str) -> Result<Vec<Match>> {
    let rows = sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT id, user_a, user_b, created_at, last_message
        FROM matches
        WHERE user_a = ? OR user_b = ?
        ORDER BY created_at DESC, id
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Match::from).collect())
}

/// Set the latest-message preview of a match.
pub async fn set_last_message(pool: &SqlitePool, id: &str, preview: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE matches
        SET last_message = ?
        WHERE id = ?
        "#,
    )
    .bind(preview)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Match", id));
    }

    Ok(())
}
