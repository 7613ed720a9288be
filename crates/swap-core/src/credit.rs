//! Credit ledger records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Largest amount a single transfer may move.
pub const MAX_TRANSFER_AMOUNT: i64 = 100_000;

/// Kind of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Credits minted for the recipient. The payer is not debited.
    Earn,
    /// Credits moved from payer to recipient.
    Spend,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Earn => "earn",
            TransactionKind::Spend => "spend",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "earn" => Some(TransactionKind::Earn),
            "spend" => Some(TransactionKind::Spend),
            _ => None,
        }
    }
}

/// A requested credit movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransfer {
    pub from: String,
    pub to: String,
    pub amount: i64,
    #[serde(default)]
    pub reason: String,
}

/// An append-only ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditTransaction {
    pub id: String,
    pub from_user_id: String,
    pub to_user_id: String,
    /// Always positive; direction comes from the parties.
    pub amount: i64,
    pub kind: TransactionKind,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl CreditTransaction {
    /// Effect of this entry on `user_id`'s balance.
    pub fn signed_amount_for(&self, user_id: &str) -> i64 {
        let mut delta = 0;
        if self.to_user_id == user_id {
            delta += self.amount;
        }
        if self.kind == TransactionKind::Spend && self.from_user_id == user_id {
            delta -= self.amount;
        }
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(kind: TransactionKind) -> CreditTransaction {
        CreditTransaction {
            id: "t1".to_string(),
            from_user_id: "amy".to_string(),
            to_user_id: "bob".to_string(),
            amount: 7,
            kind,
            reason: "tutoring".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_signed_amount_for_spend() {
        let spend = entry(TransactionKind::Spend);
        assert_eq!(spend.signed_amount_for("amy"), -7);
        assert_eq!(spend.signed_amount_for("bob"), 7);
        assert_eq!(spend.signed_amount_for("cat"), 0);
    }

    #[test]
    fn test_signed_amount_for_earn_does_not_debit_payer() {
        let earn = entry(TransactionKind::Earn);
        assert_eq!(earn.signed_amount_for("amy"), 0);
        assert_eq!(earn.signed_amount_for("bob"), 7);
    }
}
