//! Credit balance and transfers.
//!
//! The payer of a transfer is always the caller.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use swap_core::{CreditTransaction, CreditTransfer};

use crate::error::Result;
use crate::state::{AppState, CurrentUser};

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    pub to: String,
    pub amount: i64,
    #[serde(default)]
    pub reason: String,
}

impl TransferRequest {
    fn from_caller(self, from: String) -> CreditTransfer {
        CreditTransfer {
            from,
            to: self.to,
            amount: self.amount,
            reason: self.reason,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreditSummary {
    pub balance: i64,
    pub transactions: Vec<CreditTransaction>,
}

/// The caller's balance and ledger, newest entry first.
pub async fn summary(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
) -> Result<Json<CreditSummary>> {
    let balance = state.service.balance(&user_id).await?;
    let transactions = state.service.transactions(&user_id).await?;
    Ok(Json(CreditSummary {
        balance,
        transactions,
    }))
}

/// Pay credits to another user.
pub async fn spend(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<TransferRequest>,
) -> Result<Json<CreditTransaction>> {
    Ok(Json(state.service.spend(req.from_caller(user_id)).await?))
}

/// Credit another user for help the caller received.
pub async fn earn(
    State(state): State<AppState>,
    CurrentUser(user_id): CurrentUser,
    Json(req): Json<TransferRequest>,
) -> Result<Json<CreditTransaction>> {
    Ok(Json(state.service.earn(req.from_caller(user_id)).await?))
}
