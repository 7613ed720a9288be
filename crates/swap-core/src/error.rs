//! Error types for SkillSwap operations.

use thiserror::Error;

use crate::profile::ProfileError;
use crate::validation::ValidationError;

/// Errors that can occur in store and service operations.
#[derive(Debug, Error)]
pub enum SwapError {
    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The spender's balance does not cover the transfer.
    #[error("insufficient credits for {user_id}: balance {balance}, requested {requested}")]
    InsufficientCredits {
        user_id: String,
        balance: i64,
        requested: i64,
    },

    /// The caller is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The request is well-formed but not acceptable in the current state.
    #[error("invalid request: {0}")]
    Invalid(String),

    /// A user-entered field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A stored or submitted profile document could not be normalized.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Storage backend failure.
    #[error("store error: {0}")]
    Store(String),
}

impl SwapError {
    /// Shorthand for [`SwapError::NotFound`].
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        SwapError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Result type for SkillSwap operations.
pub type Result<T> = std::result::Result<T, SwapError>;
