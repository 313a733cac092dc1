use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::account::AccountId;
use crate::error::WalletError;
use crate::order::OrderId;
use crate::wallet::WalletContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Pre-routed wallet request. The surrounding framework has already parsed
/// the JSON body and resolved the caller-identity header into `caller`.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub caller: Option<AccountId>,
    pub query: HashMap<String, String>,
    pub body: Value,
}

impl Request {
    pub fn get(caller: Option<AccountId>, action: &str) -> Self {
        Self {
            method: Method::Get,
            caller,
            query: HashMap::from([("action".to_string(), action.to_string())]),
            body: Value::Null,
        }
    }

    pub fn post(caller: Option<AccountId>, body: Value) -> Self {
        Self {
            method: Method::Post,
            caller,
            query: HashMap::new(),
            body,
        }
    }

    pub fn with_param(mut self, key: &str, value: impl ToString) -> Self {
        self.query.insert(key.to_string(), value.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }),
        }
    }
}

impl From<WalletError> for Response {
    fn from(err: WalletError) -> Self {
        Self::error(err.status(), &err.to_string())
    }
}

#[derive(Deserialize)]
struct DepositBody {
    #[serde(default)]
    amount: Decimal,
}

#[derive(Deserialize)]
struct PaymentBody {
    #[serde(default)]
    amount: Decimal,
    payee_id: AccountId,
    #[serde(default)]
    order_id: Option<OrderId>,
}

/// Dispatch one wallet request. Reads select the operation with the
/// `action` query parameter (`balance` when absent); writes carry it in the
/// body. Anything else is a 405.
pub async fn handle(ctx: &WalletContext, req: Request) -> Response {
    let Some(caller) = req.caller else {
        return WalletError::Unauthorized.into();
    };

    match req.method {
        Method::Get => {
            let action = req
                .query
                .get("action")
                .map(String::as_str)
                .unwrap_or("balance");
            tracing::debug!(caller, action, "wallet read");

            match action {
                "balance" => match ctx.get_balance(caller).await {
                    Ok(balance) => Response::ok(json!({ "balance": balance })),
                    Err(err) => err.into(),
                },
                "transactions" => {
                    let limit = match req.query.get("limit") {
                        Some(raw) => match raw.parse::<i64>() {
                            Ok(limit) => Some(limit),
                            Err(_) => return Response::error(400, "Invalid limit"),
                        },
                        None => None,
                    };

                    match ctx.list_transactions(caller, limit).await {
                        Ok(transactions) => {
                            Response::ok(json!({ "transactions": transactions }))
                        }
                        Err(err) => err.into(),
                    }
                }
                _ => Response::error(405, "Method not allowed"),
            }
        }
        Method::Post => {
            let action = req.body.get("action").and_then(Value::as_str);
            tracing::debug!(caller, action, "wallet write");

            match action {
                Some("deposit") => {
                    let body: DepositBody = match serde_json::from_value(req.body.clone()) {
                        Ok(body) => body,
                        Err(_) => return Response::error(400, "Invalid request body"),
                    };

                    match ctx.deposit(caller, body.amount).await {
                        Ok(balance) => Response::ok(json!({ "success": true, "balance": balance })),
                        Err(err) => err.into(),
                    }
                }
                Some("payment") => {
                    let body: PaymentBody = match serde_json::from_value(req.body.clone()) {
                        Ok(body) => body,
                        Err(_) => return Response::error(400, "Invalid request body"),
                    };

                    match ctx.pay(caller, body.payee_id, body.order_id, body.amount).await {
                        Ok(balance) => Response::ok(json!({ "success": true, "balance": balance })),
                        Err(err) => err.into(),
                    }
                }
                _ => Response::error(405, "Method not allowed"),
            }
        }
    }
}
