// src/transaction.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::order::OrderId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Funds added to an account with no counterparty.
    Deposit,
    /// The payer's half of a transfer, recorded with a negative amount.
    Payment,
    /// The payee's half of a transfer, recorded with a positive amount.
    Income,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Payment => "payment",
            Self::Income => "income",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "deposit" => Some(Self::Deposit),
            "payment" => Some(Self::Payment),
            "income" => Some(Self::Income),
            _ => None,
        }
    }

    /// Entry description recorded at write time.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Deposit => "Account deposit",
            Self::Payment => "Order payment",
            Self::Income => "Order payment received",
        }
    }
}

/// Immutable ledger entry. Created only by the wallet; never updated or
/// deleted. `related_name` is a read-only enrichment filled in on retrieval
/// when the entry has a counterparty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub account: AccountId,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub order_id: Option<OrderId>,
    #[serde(rename = "related_user_id")]
    pub related_account: Option<AccountId>,
    #[serde(rename = "related_user_name")]
    pub related_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        id: i64,
        account: AccountId,
        kind: TransactionKind,
        amount: Decimal,
        order_id: Option<OrderId>,
        related_account: Option<AccountId>,
    ) -> Self {
        Self {
            id,
            account,
            kind,
            amount,
            description: kind.description().to_string(),
            order_id,
            related_account,
            related_name: None,
            created_at: Utc::now(),
        }
    }
}
