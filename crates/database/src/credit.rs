//! Credit balances and the transaction ledger.

use sqlx::SqlitePool;
use swap_core::{CreditTransaction, TransactionKind};

use crate::error::DatabaseError;
use crate::models::{convert_all, TransactionRow};
use crate::Result;

/// Apply a ledger entry in one transaction.
///
/// The recipient is credited first so the transaction holds the write lock
/// before the payer's balance is checked. A credit that would overflow the
/// recipient's balance is refused. Any error rolls everything back.
pub async fn apply_transaction(pool: &SqlitePool, entry: &CreditTransaction) -> Result<()> {
    let mut tx = pool.begin().await?;

    let credited = sqlx::query(
        r#"
        UPDATE profiles
        SET credits = credits + ?
        WHERE id = ? AND credits <= ? - ?
        "#,
    )
    .bind(entry.amount)
    .bind(&entry.to_user_id)
    .bind(i64::MAX)
    .bind(entry.amount)
    .execute(&mut *tx)
    .await?;

    if credited.rows_affected() == 0 {
        let exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM profiles WHERE id = ?
            "#,
        )
        .bind(&entry.to_user_id)
        .fetch_one(&mut *tx)
        .await?;

        return Err(if exists > 0 {
            DatabaseError::BalanceOverflow {
                user_id: entry.to_user_id.clone(),
            }
        } else {
            DatabaseError::not_found("User", &entry.to_user_id)
        });
    }

    if entry.kind == TransactionKind::Spend {
        let debited = sqlx::query(
            r#"
            UPDATE profiles
            SET credits = credits - ?
            WHERE id = ? AND credits >= ?
            "#,
        )
        .bind(entry.amount)
        .bind(&entry.from_user_id)
        .bind(entry.amount)
        .execute(&mut *tx)
        .await?;

        if debited.rows_affected() == 0 {
            let balance = sqlx::query_scalar::<_, i64>(
                r#"
                SELECT credits FROM profiles WHERE id = ?
                "#,
            )
            .bind(&entry.from_user_id)
            .fetch_optional(&mut *tx)
            .await?;

            return Err(match balance {
                Some(balance) => DatabaseError::InsufficientCredits {
                    user_id: entry.from_user_id.clone(),
                    balance,
                    requested: entry.amount,
                },
                None => DatabaseError::not_found("User", &entry.from_user_id),
            });
        }
    }

    sqlx::query(
        r#"
        INSERT INTO credit_transactions (id, from_user_id, to_user_id, amount, kind, reason, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.from_user_id)
    .bind(&entry.to_user_id)
    .bind(entry.amount)
    .bind(entry.kind.as_str())
    .bind(&entry.reason)
    .bind(entry.created_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        "Applied {} of {} from {} to {}",
        entry.kind.as_str(),
        entry.amount,
        entry.from_user_id,
        entry.to_user_id
    );
    Ok(())
}

/// Ledger entries a user is a party to, newest first.
pub async fn list_transactions_for(pool: &SqlitePool, user_id: &str) -> Result<Vec<CreditTransaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        r#"
        SELECT id, from_user_id, to_user_id, amount, kind, reason, created_at
        FROM credit_transactions
        WHERE from_user_id = ? OR to_user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    convert_all(rows)
}
