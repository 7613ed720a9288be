//! Database error types.

use swap_core::SwapError;
use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A debit would take the balance below zero.
    #[error("insufficient credits for {user_id}: balance {balance}, requested {requested}")]
    InsufficientCredits {
        user_id: String,
        balance: i64,
        requested: i64,
    },

    /// A credit would take the balance past the largest storable value.
    #[error("balance of {user_id} would overflow")]
    BalanceOverflow { user_id: String },

    /// A stored column holds a value the domain does not know.
    #[error("invalid {column} in {entity}: {value}")]
    InvalidValue {
        entity: &'static str,
        column: &'static str,
        value: String,
    },
}

impl DatabaseError {
    pub(crate) fn not_found(entity: &'static str, id: &str) -> Self {
        DatabaseError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<DatabaseError> for SwapError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => SwapError::NotFound { entity, id },
            DatabaseError::InsufficientCredits {
                user_id,
                balance,
                requested,
            } => SwapError::InsufficientCredits {
                user_id,
                balance,
                requested,
            },
            DatabaseError::BalanceOverflow { user_id } => {
                SwapError::Invalid(format!("balance of {} would overflow", user_id))
            }
            other => SwapError::Store(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_keep_their_kind() {
        let err: SwapError = DatabaseError::not_found("User", "u1").into();
        assert!(matches!(err, SwapError::NotFound { entity: "User", .. }));

        let err: SwapError = DatabaseError::InsufficientCredits {
            user_id: "u1".to_string(),
            balance: 1,
            requested: 2,
        }
        .into();
        assert!(matches!(err, SwapError::InsufficientCredits { balance: 1, .. }));

        let err: SwapError = DatabaseError::BalanceOverflow {
            user_id: "u1".to_string(),
        }
        .into();
        assert!(matches!(err, SwapError::Invalid(_)));

        let err: SwapError = DatabaseError::Sqlx(sqlx::Error::PoolClosed).into();
        assert!(matches!(err, SwapError::Store(_)));
    }
}
