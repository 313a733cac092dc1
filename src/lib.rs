// src/lib.rs
//! Wallet and payment ledger for a freelance marketplace backend.
//!
//! Four operations over a transactional storage port: balance read,
//! transaction history, deposit, and client-to-freelancer payment.
//! Every write is one atomic unit against the backing store; concurrency
//! safety comes entirely from the store's locking, never from in-process
//! state.

pub mod account;
pub mod adapters;
pub mod config;
pub mod error;
pub mod handler;
pub mod order;
pub mod transaction;
pub mod wallet;

pub use account::{Account, AccountId};
pub use config::Config;
pub use error::WalletError;
pub use order::{Order, OrderId, OrderStatus, OrderStore};
pub use transaction::{Transaction, TransactionKind};
pub use wallet::{DEFAULT_TRANSACTION_LIMIT, WalletContext};

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Storage port for the wallet.
///
/// Amounts reaching the write operations have already been validated
/// strictly positive by [`WalletContext`].
#[async_trait]
pub trait WalletAdapter: OrderStore + Send + Sync {
    /// Apply a deposit atomically.
    /// Implementors MUST:
    /// 1. BEGIN a storage transaction
    /// 2. Increment the account balance
    /// 3. Append the matching `deposit` entry
    /// 4. COMMIT on success, ROLLBACK on any error
    async fn deposit(&self, account: AccountId, amount: Decimal) -> Result<Decimal, WalletError>;

    /// Execute a payment atomically and return the payer's new balance.
    /// Implementors MUST:
    /// 1. BEGIN a storage transaction
    /// 2. Lock the payer's balance against concurrent mutation
    /// 3. Verify balance >= amount, returning InsufficientFunds if not
    /// 4. Debit the payer, credit the payee, append the payment/income
    ///    pair, and mark the referenced order completed when one is given
    /// 5. COMMIT on success, ROLLBACK on any error
    async fn pay(
        &self,
        payer: AccountId,
        payee: AccountId,
        order: Option<OrderId>,
        amount: Decimal,
    ) -> Result<Decimal, WalletError>;

    // READ OPERATIONS
    async fn get_balance(&self, account: AccountId) -> Result<Decimal, WalletError>;
    async fn list_transactions(
        &self,
        account: AccountId,
        limit: i64,
    ) -> Result<Vec<Transaction>, WalletError>;
}

/// Initialize the wallet with an adapter
pub struct WalletSystem {
    adapter: Arc<dyn WalletAdapter>,
}

impl WalletSystem {
    pub fn new(adapter: Box<dyn WalletAdapter>) -> Self {
        Self {
            adapter: adapter.into(),
        }
    }

    /// Get adapter reference
    pub fn adapter(&self) -> &dyn WalletAdapter {
        self.adapter.as_ref()
    }

    /// Get adapter Arc (for creating contexts)
    pub fn adapter_arc(&self) -> Arc<dyn WalletAdapter> {
        Arc::clone(&self.adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_kind_text_roundtrip() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Payment,
            TransactionKind::Income,
        ] {
            assert_eq!(TransactionKind::from_str(kind.as_str()), Some(kind));
        }
        assert_eq!(TransactionKind::from_str("refund"), None);
    }

    #[test]
    fn test_order_status_text_roundtrip() {
        for status in [
            OrderStatus::Active,
            OrderStatus::InProgress,
            OrderStatus::Completed,
        ] {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(OrderStatus::from_str("cancelled"), None);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(WalletError::InvalidAmount.status(), 400);
        assert_eq!(WalletError::InsufficientFunds.status(), 400);
        assert_eq!(WalletError::AccountNotFound(7).status(), 404);
        assert_eq!(WalletError::OrderNotFound(7).status(), 404);
        assert_eq!(WalletError::Unauthorized.status(), 401);
        assert_eq!(WalletError::Storage("boom".to_string()).status(), 500);
    }
}
