// src/error.rs
use std::fmt;

use crate::account::AccountId;
use crate::order::OrderId;

#[derive(Debug)]
pub enum WalletError {
    InvalidAmount,
    InsufficientFunds,
    AccountNotFound(AccountId),
    OrderNotFound(OrderId),
    Unauthorized,
    Config(String),
    Storage(String),
}

impl WalletError {
    /// Status code the error maps to at the request boundary.
    pub fn status(&self) -> u16 {
        match self {
            Self::InvalidAmount => 400,
            Self::InsufficientFunds => 400,
            Self::AccountNotFound(_) => 404,
            Self::OrderNotFound(_) => 404,
            Self::Unauthorized => 401,
            Self::Config(_) => 500,
            Self::Storage(_) => 500,
        }
    }
}

impl fmt::Display for WalletError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount => write!(f, "Amount must be positive"),
            Self::InsufficientFunds => write!(f, "Insufficient balance"),
            Self::AccountNotFound(id) => write!(f, "Account not found: {}", id),
            Self::OrderNotFound(id) => write!(f, "Order not found: {}", id),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Config(msg) => write!(f, "{}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for WalletError {}
