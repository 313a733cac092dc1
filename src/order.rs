use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

pub type OrderId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Active,
    InProgress,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "in_progress" => Some(Self::InProgress),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// The slice of an order the wallet cares about. The order lifecycle is
/// owned elsewhere; a successful payment only flips `status` to completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
}

/// Order-status boundary with the order store.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn get_order(&self, order: OrderId) -> Result<Order, WalletError>;

    /// Updates touching a missing order are a no-op, matching the
    /// unconditional completion semantics of `pay`.
    async fn set_order_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<(), WalletError>;
}
