//! Credit transfers and the ledger.

use tracing::info;

use super::{new_id, now, SkillSwap};
use crate::credit::{CreditTransaction, CreditTransfer, TransactionKind, MAX_TRANSFER_AMOUNT};
use crate::error::{Result, SwapError};
use crate::store::SwapStore;

impl<S: SwapStore> SkillSwap<S> {
    /// Move credits from one user to another.
    ///
    /// Fails with [`SwapError::InsufficientCredits`] if the payer cannot
    /// cover the amount; nothing is written in that case.
    pub async fn spend(&self, transfer: CreditTransfer) -> Result<CreditTransaction> {
        check_transfer(&transfer)?;
        self.require_profile(&transfer.from).await?;
        self.apply(transfer, TransactionKind::Spend).await
    }

    /// Credit a user on behalf of another, without debiting the payer.
    pub async fn earn(&self, transfer: CreditTransfer) -> Result<CreditTransaction> {
        check_transfer(&transfer)?;
        self.apply(transfer, TransactionKind::Earn).await
    }

    pub async fn balance(&self, user_id: &str) -> Result<i64> {
        Ok(self.require_profile(user_id).await?.credits)
    }

    /// Ledger entries the user is a party to, newest first.
    pub async fn transactions(&self, user_id: &str) -> Result<Vec<CreditTransaction>> {
        self.store.list_transactions_for(user_id).await
    }

    async fn apply(&self, transfer: CreditTransfer, kind: TransactionKind) -> Result<CreditTransaction> {
        self.require_profile(&transfer.to).await?;

        let transaction = CreditTransaction {
            id: new_id(),
            from_user_id: transfer.from,
            to_user_id: transfer.to,
            amount: transfer.amount,
            kind,
            reason: transfer.reason.trim().to_string(),
            created_at: now(),
        };
        self.store.apply_credit_transaction(&transaction).await?;

        info!(
            transaction_id = %transaction.id,
            kind = kind.as_str(),
            from = %transaction.from_user_id,
            to = %transaction.to_user_id,
            amount = transaction.amount,
            "Applied credit transaction"
        );
        Ok(transaction)
    }
}

fn check_transfer(transfer: &CreditTransfer) -> Result<()> {
    if transfer.amount <= 0 {
        return Err(SwapError::Invalid(format!(
            "credit amount must be positive, got {}",
            transfer.amount
        )));
    }
    if transfer.amount > MAX_TRANSFER_AMOUNT {
        return Err(SwapError::Invalid(format!(
            "credit amount {} exceeds the limit of {}",
            transfer.amount, MAX_TRANSFER_AMOUNT
        )));
    }
    if transfer.from == transfer.to {
        return Err(SwapError::Invalid("cannot transfer credits to yourself".to_string()));
    }
    Ok(())
}
