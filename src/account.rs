// src/account.rs
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type AccountId = i64;

/// A user's balance record. Owned by the external user store; the wallet
/// mutates `balance` only inside its own atomic operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub balance: Decimal,
}

impl Account {
    pub fn new(id: AccountId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            balance: Decimal::ZERO,
        }
    }
}
