use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use crate::WalletAdapter;
use crate::account::AccountId;
use crate::config::Config;
use crate::error::WalletError;
use crate::order::{Order, OrderId, OrderStatus, OrderStore};
use crate::transaction::{Transaction, TransactionKind};

pub struct PostgresAdapter {
    pool: PgPool,
}

impl PostgresAdapter {
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &Config) -> Result<Self, WalletError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        Ok(Self::from_pool(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the wallet tables for standalone use. Deployments that already
    /// carry the marketplace schema skip this.
    pub async fn init_schema(&self) -> Result<(), WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGINT PRIMARY KEY,
                username TEXT UNIQUE,
                name TEXT NOT NULL,
                email TEXT,
                balance NUMERIC(14, 2) NOT NULL DEFAULT 0 CHECK (balance >= 0)
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id BIGSERIAL PRIMARY KEY,
                status TEXT NOT NULL DEFAULT 'active'
                    CHECK (status IN ('active', 'in_progress', 'completed')),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS transactions (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL REFERENCES users(id),
                type TEXT NOT NULL CHECK (type IN ('deposit', 'payment', 'income')),
                amount NUMERIC(14, 2) NOT NULL,
                description TEXT NOT NULL,
                order_id BIGINT,
                related_user_id BIGINT REFERENCES users(id),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_transactions_user_created
            ON transactions(user_id, created_at DESC)
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        Ok(())
    }

    async fn record_entry_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        account: AccountId,
        kind: TransactionKind,
        amount: Decimal,
        order: Option<OrderId>,
        related: Option<AccountId>,
    ) -> Result<(), WalletError> {
        sqlx::query(
            r#"
            INSERT INTO transactions (user_id, type, amount, description, order_id, related_user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account)
        .bind(kind.as_str())
        .bind(amount)
        .bind(kind.description())
        .bind(order)
        .bind(related)
        .execute(&mut **tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        Ok(())
    }

    fn row_to_transaction(row: &PgRow) -> Result<Transaction, WalletError> {
        let kind_raw: String = row
            .try_get("type")
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        let kind = TransactionKind::from_str(&kind_raw)
            .ok_or_else(|| WalletError::Storage(format!("unknown transaction type: {}", kind_raw)))?;

        Ok(Transaction {
            id: row
                .try_get("id")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            account: row
                .try_get("user_id")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            kind,
            amount: row
                .try_get("amount")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            description: row
                .try_get("description")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            order_id: row
                .try_get("order_id")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            related_account: row
                .try_get("related_user_id")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            related_name: row
                .try_get("related_user_name")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            created_at: row
                .try_get("created_at")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
        })
    }
}

#[async_trait::async_trait]
impl WalletAdapter for PostgresAdapter {
    async fn deposit(&self, account: AccountId, amount: Decimal) -> Result<Decimal, WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance = balance + $1
            WHERE id = $2
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(account)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        let Some(balance) = balance else {
            tx.rollback().await.ok();
            return Err(WalletError::AccountNotFound(account));
        };

        self.record_entry_tx(&mut tx, account, TransactionKind::Deposit, amount, None, None)
            .await?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        Ok(balance)
    }

    async fn pay(
        &self,
        payer: AccountId,
        payee: AccountId,
        order: Option<OrderId>,
        amount: Decimal,
    ) -> Result<Decimal, WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT balance FROM users WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(payer)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        // Checked while holding the row lock: the real overdraw guard.
        // A missing payer reads as insufficient funds, not as a 404.
        match balance {
            Some(balance) if balance >= amount => {}
            _ => {
                tx.rollback().await.ok();
                return Err(WalletError::InsufficientFunds);
            }
        }

        let new_balance: Decimal = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance = balance - $1
            WHERE id = $2
            RETURNING balance
            "#,
        )
        .bind(amount)
        .bind(payer)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        // A missing payee leaves this a no-op; the income entry below then
        // fails its foreign key and rolls the whole payment back.
        sqlx::query(
            r#"
            UPDATE users
            SET balance = balance + $1
            WHERE id = $2
            "#,
        )
        .bind(amount)
        .bind(payee)
        .execute(&mut *tx)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        self.record_entry_tx(
            &mut tx,
            payer,
            TransactionKind::Payment,
            -amount,
            order,
            Some(payee),
        )
        .await?;

        self.record_entry_tx(
            &mut tx,
            payee,
            TransactionKind::Income,
            amount,
            order,
            Some(payer),
        )
        .await?;

        if let Some(order_id) = order {
            // No status precondition: any referenced order is marked completed.
            sqlx::query("UPDATE orders SET status = 'completed' WHERE id = $1")
                .bind(order_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| WalletError::Storage(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        Ok(new_balance)
    }

    async fn get_balance(&self, account: AccountId) -> Result<Decimal, WalletError> {
        sqlx::query_scalar("SELECT balance FROM users WHERE id = $1")
            .bind(account)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?
            .ok_or(WalletError::AccountNotFound(account))
    }

    async fn list_transactions(
        &self,
        account: AccountId,
        limit: i64,
    ) -> Result<Vec<Transaction>, WalletError> {
        let rows = sqlx::query(
            r#"
            SELECT
                t.id,
                t.user_id,
                t.type,
                t.amount,
                t.description,
                t.order_id,
                t.related_user_id,
                u.name AS related_user_name,
                t.created_at
            FROM transactions t
            LEFT JOIN users u ON t.related_user_id = u.id
            WHERE t.user_id = $1
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT $2
            "#,
        )
        .bind(account)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| WalletError::Storage(e.to_string()))?;

        rows.iter().map(Self::row_to_transaction).collect()
    }
}

#[async_trait::async_trait]
impl OrderStore for PostgresAdapter {
    async fn get_order(&self, order: OrderId) -> Result<Order, WalletError> {
        let row = sqlx::query("SELECT id, status FROM orders WHERE id = $1")
            .bind(order)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?
            .ok_or(WalletError::OrderNotFound(order))?;

        let status_raw: String = row
            .try_get("status")
            .map_err(|e| WalletError::Storage(e.to_string()))?;
        let status = OrderStatus::from_str(&status_raw)
            .ok_or_else(|| WalletError::Storage(format!("unknown order status: {}", status_raw)))?;

        Ok(Order {
            id: row
                .try_get("id")
                .map_err(|e| WalletError::Storage(e.to_string()))?,
            status,
        })
    }

    async fn set_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), WalletError> {
        sqlx::query("UPDATE orders SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(order)
            .execute(&self.pool)
            .await
            .map_err(|e| WalletError::Storage(e.to_string()))?;

        Ok(())
    }
}
