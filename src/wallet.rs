// src/wallet.rs
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Arc;

use crate::account::AccountId;
use crate::error::WalletError;
use crate::order::OrderId;
use crate::transaction::Transaction;
use crate::WalletAdapter;

/// History page size when the caller does not ask for one.
pub const DEFAULT_TRANSACTION_LIMIT: i64 = 50;

/// Cloneable handle over the storage port. Validates inputs and records
/// operation metrics; atomicity lives entirely in the adapter.
#[derive(Clone)]
pub struct WalletContext {
    adapter: Arc<dyn WalletAdapter>,
}

impl WalletContext {
    pub fn new(adapter: Arc<dyn WalletAdapter>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &dyn WalletAdapter {
        self.adapter.as_ref()
    }

    pub async fn get_balance(&self, account: AccountId) -> Result<Decimal, WalletError> {
        self.adapter().get_balance(account).await
    }

    /// Most recent entries first. An unknown account yields an empty page,
    /// never an error. There is no enforced upper bound on `limit`.
    pub async fn list_transactions(
        &self,
        account: AccountId,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, WalletError> {
        let limit = limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT).max(0);
        self.adapter().list_transactions(account, limit).await
    }

    pub async fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
    ) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }

        let result = self.adapter().deposit(account, amount).await;
        Self::record_write("deposit", amount, &result);
        result
    }

    /// Move `amount` from `payer` to `payee` and mark the referenced order
    /// completed. Repeating the call with identical arguments moves the
    /// funds again; nothing is deduplicated.
    pub async fn pay(
        &self,
        payer: AccountId,
        payee: AccountId,
        order: Option<OrderId>,
        amount: Decimal,
    ) -> Result<Decimal, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount);
        }

        // The adapter checks sufficient funds inside its own lock; a check
        // here would race with concurrent payments.
        let result = self.adapter().pay(payer, payee, order, amount).await;
        Self::record_write("payment", amount, &result);
        result
    }

    fn record_write(kind: &'static str, amount: Decimal, result: &Result<Decimal, WalletError>) {
        histogram!("wallet.transaction.amount", "kind" => kind)
            .record(amount.to_f64().unwrap_or(0.0));
        counter!("wallet.transactions.total",
            "kind" => kind,
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);

        if let Err(err) = result {
            tracing::warn!(kind, %err, "wallet write rejected");
        }
    }
}
