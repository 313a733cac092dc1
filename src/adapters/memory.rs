// src/adapters/memory.rs
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::WalletAdapter;
use crate::account::{Account, AccountId};
use crate::error::WalletError;
use crate::order::{Order, OrderId, OrderStatus, OrderStore};
use crate::transaction::{Transaction, TransactionKind};

#[derive(Default)]
struct MemoryStore {
    accounts: HashMap<AccountId, Account>,
    entries: Vec<Transaction>,
    orders: HashMap<OrderId, Order>,
    next_entry_id: i64,
}

impl MemoryStore {
    fn push_entry(
        &mut self,
        account: AccountId,
        kind: TransactionKind,
        amount: Decimal,
        order: Option<OrderId>,
        related: Option<AccountId>,
    ) {
        self.next_entry_id += 1;
        self.entries.push(Transaction::new(
            self.next_entry_id,
            account,
            kind,
            amount,
            order,
            related,
        ));
    }
}

/// In-memory adapter with the same observable semantics as Postgres.
/// The single mutex held across each write is the transaction boundary:
/// either every mutation of an operation lands or none does, and the
/// sufficient-funds check runs under the same lock as the debit.
pub struct MemoryAdapter {
    store: Mutex<MemoryStore>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self {
            store: Mutex::new(MemoryStore::default()),
        }
    }

    /// Seed an account at zero balance. Account rows are owned by the
    /// external user store in production; tests create them here.
    pub fn insert_account(&self, id: AccountId, name: &str) {
        let mut store = self.store.lock().unwrap();
        store.accounts.insert(id, Account::new(id, name));
    }

    pub fn insert_order(&self, id: OrderId, status: OrderStatus) {
        let mut store = self.store.lock().unwrap();
        store.orders.insert(id, Order { id, status });
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletAdapter for MemoryAdapter {
    async fn deposit(&self, account: AccountId, amount: Decimal) -> Result<Decimal, WalletError> {
        let mut store = self.store.lock().unwrap();

        let balance = match store.accounts.get_mut(&account) {
            Some(acct) => {
                acct.balance += amount;
                acct.balance
            }
            None => return Err(WalletError::AccountNotFound(account)),
        };

        store.push_entry(account, TransactionKind::Deposit, amount, None, None);
        Ok(balance)
    }

    async fn pay(
        &self,
        payer: AccountId,
        payee: AccountId,
        order: Option<OrderId>,
        amount: Decimal,
    ) -> Result<Decimal, WalletError> {
        let mut store = self.store.lock().unwrap();

        // Checked under the store lock, like the payer row lock in Postgres.
        // A missing payer reads as insufficient funds, not as a 404.
        let payer_balance = match store.accounts.get(&payer) {
            Some(acct) if acct.balance >= amount => acct.balance,
            _ => return Err(WalletError::InsufficientFunds),
        };

        // Postgres surfaces a missing payee as a foreign-key violation on
        // the income entry; fail the same way before mutating anything.
        if !store.accounts.contains_key(&payee) {
            return Err(WalletError::Storage(format!(
                "account {} does not exist",
                payee
            )));
        }

        let new_balance = payer_balance - amount;
        if let Some(acct) = store.accounts.get_mut(&payer) {
            acct.balance = new_balance;
        }
        if let Some(acct) = store.accounts.get_mut(&payee) {
            acct.balance += amount;
        }

        store.push_entry(payer, TransactionKind::Payment, -amount, order, Some(payee));
        store.push_entry(payee, TransactionKind::Income, amount, order, Some(payer));

        if let Some(order_id) = order {
            // No status precondition: any referenced order is marked completed.
            if let Some(order) = store.orders.get_mut(&order_id) {
                order.status = OrderStatus::Completed;
            }
        }

        Ok(new_balance)
    }

    async fn get_balance(&self, account: AccountId) -> Result<Decimal, WalletError> {
        let store = self.store.lock().unwrap();
        store
            .accounts
            .get(&account)
            .map(|acct| acct.balance)
            .ok_or(WalletError::AccountNotFound(account))
    }

    async fn list_transactions(
        &self,
        account: AccountId,
        limit: i64,
    ) -> Result<Vec<Transaction>, WalletError> {
        let store = self.store.lock().unwrap();

        let mut entries: Vec<Transaction> = store
            .entries
            .iter()
            .filter(|entry| entry.account == account)
            .cloned()
            .map(|mut entry| {
                entry.related_name = entry
                    .related_account
                    .and_then(|id| store.accounts.get(&id))
                    .map(|acct| acct.name.clone());
                entry
            })
            .collect();

        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(entries)
    }
}

#[async_trait]
impl OrderStore for MemoryAdapter {
    async fn get_order(&self, order: OrderId) -> Result<Order, WalletError> {
        let store = self.store.lock().unwrap();
        store
            .orders
            .get(&order)
            .cloned()
            .ok_or(WalletError::OrderNotFound(order))
    }

    async fn set_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), WalletError> {
        let mut store = self.store.lock().unwrap();
        if let Some(order) = store.orders.get_mut(&order) {
            order.status = status;
        }
        Ok(())
    }
}
