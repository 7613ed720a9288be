//! Study group, membership, group chat and invitation storage.

use sqlx::SqlitePool;
use swap_core::{Group, GroupMessage, Invitation, InvitationStatus};

use crate::error::DatabaseError;
use crate::models::{convert_all, GroupMessageRow, GroupRow, InvitationRow};
use crate::Result;

/// Insert a group together with its initial members.
pub async fn insert_group(pool: &SqlitePool, group: &Group) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO study_groups (id, name, description, created_by, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&group.id)
    .bind(&group.name)
    .bind(&group.description)
    .bind(&group.created_by)
    .bind(group.created_at)
    .execute(&mut *tx)
    .await?;

    for member in &group.members {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO group_members (group_id, user_id)
            VALUES (?, ?)
            "#,
        )
        .bind(&group.id)
        .bind(member)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Get a group with its members in join order.
pub async fn get_group(pool: &SqlitePool, id: &str) -> Result<Option<Group>> {
    let row = sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, name, description, created_by, created_at
        FROM study_groups
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(with_members(pool, row).await?)),
        None => Ok(None),
    }
}

/// All groups, newest first.
pub async fn list_groups(pool: &SqlitePool) -> Result<Vec<Group>> {
    let rows = sqlx::query_as::<_, GroupRow>(
        r#"
        SELECT id, name, description, created_by, created_at
        FROM study_groups
        ORDER BY created_at DESC, id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut groups = Vec::with_capacity(rows.len());
    for row in rows {
        groups.push(with_members(pool, row).await?);
    }
    Ok(groups)
}

async fn with_members(pool: &SqlitePool, row: GroupRow) -> Result<Group> {
    let members = sqlx::query_scalar::<_, String>(
        r#"
        SELECT user_id
        FROM group_members
        WHERE group_id = ?
        ORDER BY rowid
        "#,
    )
    .bind(&row.id)
    .fetch_all(pool)
    .await?;

    Ok(Group {
        id: row.id,
        name: row.name,
        description: row.description,
        members,
        created_by: row.created_by,
        created_at: row.created_at,
    })
}

async fn group_exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let found = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT 1 FROM study_groups WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(found.is_some())
}

/// Add a member. Returns false if the user already was one.
pub async fn add_member(pool: &SqlitePool, group_id: &str, user_id: &str) -> Result<bool> {
    if !group_exists(pool, group_id).await? {
        return Err(DatabaseError::not_found("Group", group_id));
    }

    let result = sqlx::query(
        r#"
        INSERT OR IGNORE INTO group_members (group_id, user_id)
        VALUES (?, ?)
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a member. Returns false if the user was not one.
pub async fn remove_member(pool: &SqlitePool, group_id: &str, user_id: &str) -> Result<bool> {
    if !group_exists(pool, group_id).await? {
        return Err(DatabaseError::not_found("Group", group_id));
    }

    let result = sqlx::query(
        r#"
        DELETE FROM group_members
        WHERE group_id = ? AND user_id = ?
        "#,
    )
    .bind(group_id)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a group. Members, chat, invitations and typing marks cascade.
pub async fn delete_group(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM study_groups
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Append a group chat entry.
pub async fn insert_group_message(pool: &SqlitePool, message: &GroupMessage) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO group_messages (id, group_id, sender_id, sender_name, text, kind, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&message.id)
    .bind(&message.group_id)
    .bind(&message.sender_id)
    .bind(&message.sender_name)
    .bind(&message.text)
    .bind(message.kind.as_str())
    .bind(message.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// A group's chat, oldest first.
pub async fn list_group_messages(pool: &SqlitePool, group_id: &str) -> Result<Vec<GroupMessage>> {
    let rows = sqlx::query_as::<_, GroupMessageRow>(
        r#"
        SELECT id, group_id, sender_id, sender_name, text, kind, created_at
        FROM group_messages
        WHERE group_id = ?
        ORDER BY created_at, rowid
        "#,
    )
    .bind(group_id)
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// Insert an invitation.
pub async fn insert_invitation(pool: &SqlitePool, invitation: &Invitation) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO invitations (id, group_id, group_name, inviter_id, invitee_id, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&invitation.id)
    .bind(&invitation.group_id)
    .bind(&invitation.group_name)
    .bind(&invitation.inviter_id)
    .bind(&invitation.invitee_id)
    .bind(invitation.status.as_str())
    .bind(invitation.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get an invitation by ID.
pub async fn get_invitation(pool: &SqlitePool, id: &str) -> Result<Option<Invitation>> {
    let row = sqlx::query_as::<_, InvitationRow>(
        r#"
        SELECT id, group_id, group_name, inviter_id, invitee_id, status, created_at
        FROM invitations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(Invitation::try_from).transpose()
}

/// Pending invitations addressed to a user, newest first.
pub async fn list_pending_invitations(pool: &SqlitePool, invitee_id: &str) -> Result<Vec<Invitation>> {
    let rows = sqlx::query_as::<_, InvitationRow>(
        r#"
        SELECT id, group_id, group_name, inviter_id, invitee_id, status, created_at
        FROM invitations
        WHERE invitee_id = ? AND status = ?
        ORDER BY created_at DESC, id
        "#,
    )
    .bind(invitee_id)
    .bind(InvitationStatus::Pending.as_str())
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}

/// Set the status of an invitation.
pub async fn set_invitation_status(pool: &SqlitePool, id: &str, status: InvitationStatus) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE invitations
        SET status = ?
        WHERE id = ?
        "#,
    )
    .bind(status.as_str())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("Invitation", id));
    }

    Ok(())
}

/// Delete an invitation. Returns false if there was none.
pub async fn delete_invitation(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM invitations
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
