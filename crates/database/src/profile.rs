//! Profile storage.

use sqlx::types::Json;
use sqlx::SqlitePool;
use swap_core::Profile;

use crate::models::ProfileRow;
use crate::Result;

const PROFILE_COLUMNS: &str = r#"
    id, email, name, username, skills_offered, skills_needed, availability,
    bio, photo_url, credits, created_at, updated_at
"#;

/// Get a profile by user ID.
pub async fn get_profile(pool: &SqlitePool, id: &str) -> Result<Option<Profile>> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {} FROM profiles WHERE id = ?",
        PROFILE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Profile::from))
}

/// List all profiles ordered by ID.
pub async fn list_profiles(pool: &SqlitePool) -> Result<Vec<Profile>> {
    let rows = sqlx::query_as::<_, ProfileRow>(&format!(
        "SELECT {} FROM profiles ORDER BY id",
        PROFILE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Profile::from).collect())
}

/// Insert a profile or overwrite its editable fields.
///
/// On conflict `credits` and `created_at` keep their stored values.
pub async fn upsert_profile(pool: &SqlitePool, profile: &Profile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO profiles (
            id, email, name, username, skills_offered, skills_needed,
            availability, bio, photo_url, credits, created_at, updated_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            email = excluded.email,
            name = excluded.name,
            username = excluded.username,
            skills_offered = excluded.skills_offered,
            skills_needed = excluded.skills_needed,
            availability = excluded.availability,
            bio = excluded.bio,
            photo_url = excluded.photo_url,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&profile.id)
    .bind(&profile.email)
    .bind(&profile.name)
    .bind(&profile.username)
    .bind(Json(&profile.skills_offered))
    .bind(Json(&profile.skills_needed))
    .bind(Json(&profile.availability))
    .bind(&profile.bio)
    .bind(&profile.photo_url)
    .bind(profile.credits)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete a profile. Returns false if there was none.
pub async fn delete_profile(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM profiles
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
