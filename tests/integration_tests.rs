// tests/integration_tests.rs
use obol::{
    AccountId, OrderStatus, OrderStore, TransactionKind, WalletContext, WalletError, WalletSystem,
    adapters::MemoryAdapter,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

const CLIENT: AccountId = 1;
const FREELANCER: AccountId = 2;
const ORDER: i64 = 7;

fn setup() -> (Arc<WalletSystem>, WalletContext) {
    let adapter = Box::new(MemoryAdapter::new());
    adapter.insert_account(CLIENT, "Anna Client");
    adapter.insert_account(FREELANCER, "Boris Freelancer");
    adapter.insert_order(ORDER, OrderStatus::InProgress);

    let system = Arc::new(WalletSystem::new(adapter));
    let ctx = WalletContext::new(system.adapter_arc());
    (system, ctx)
}

/// Audit property: an account's balance always equals the sum of the
/// signed amounts of its entries.
async fn assert_audit_invariant(ctx: &WalletContext, account: AccountId) {
    let balance = ctx.get_balance(account).await.unwrap();
    let entries = ctx
        .list_transactions(account, Some(i64::MAX))
        .await
        .unwrap();
    let replayed: Decimal = entries.iter().map(|entry| entry.amount).sum();
    assert_eq!(balance, replayed, "balance diverged from entry history");
}

#[tokio::test]
async fn test_deposit_creates_balance_and_entry() {
    let (_system, ctx) = setup();

    let balance = ctx.deposit(CLIENT, dec!(100)).await.unwrap();
    assert_eq!(balance, dec!(100));
    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(100));

    let entries = ctx.list_transactions(CLIENT, None).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, TransactionKind::Deposit);
    assert_eq!(entries[0].amount, dec!(100));
    assert_eq!(entries[0].description, "Account deposit");
    assert_eq!(entries[0].order_id, None);
    assert_eq!(entries[0].related_account, None);
}

#[tokio::test]
async fn test_deposit_rejects_non_positive_amounts() {
    let (_system, ctx) = setup();

    for amount in [dec!(0), dec!(-5)] {
        let result = ctx.deposit(CLIENT, amount).await;
        assert!(matches!(result, Err(WalletError::InvalidAmount)));
    }

    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(0));
    assert!(ctx.list_transactions(CLIENT, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deposit_unknown_account() {
    let (_system, ctx) = setup();

    let result = ctx.deposit(99, dec!(10)).await;
    assert!(matches!(result, Err(WalletError::AccountNotFound(99))));
}

#[tokio::test]
async fn test_payment_moves_funds_and_completes_order() {
    let (system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(100)).await.unwrap();

    let balance = ctx
        .pay(CLIENT, FREELANCER, Some(ORDER), dec!(40))
        .await
        .unwrap();

    assert_eq!(balance, dec!(60));
    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(60));
    assert_eq!(ctx.get_balance(FREELANCER).await.unwrap(), dec!(40));

    let payer_entries = ctx.list_transactions(CLIENT, None).await.unwrap();
    assert_eq!(payer_entries[0].kind, TransactionKind::Payment);
    assert_eq!(payer_entries[0].amount, dec!(-40));
    assert_eq!(payer_entries[0].order_id, Some(ORDER));
    assert_eq!(payer_entries[0].related_account, Some(FREELANCER));

    let payee_entries = ctx.list_transactions(FREELANCER, None).await.unwrap();
    assert_eq!(payee_entries.len(), 1);
    assert_eq!(payee_entries[0].kind, TransactionKind::Income);
    assert_eq!(payee_entries[0].amount, dec!(40));
    assert_eq!(payee_entries[0].order_id, Some(ORDER));
    assert_eq!(payee_entries[0].related_account, Some(CLIENT));

    // The payment/income pair nets to zero.
    assert_eq!(payer_entries[0].amount + payee_entries[0].amount, dec!(0));

    let order = system.adapter().get_order(ORDER).await.unwrap();
    assert_eq!(order.status, OrderStatus::Completed);
}

#[tokio::test]
async fn test_payment_insufficient_funds_leaves_no_trace() {
    let (system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(30)).await.unwrap();

    let result = ctx.pay(CLIENT, FREELANCER, Some(ORDER), dec!(1000)).await;
    assert!(matches!(result, Err(WalletError::InsufficientFunds)));

    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(30));
    assert_eq!(ctx.get_balance(FREELANCER).await.unwrap(), dec!(0));
    assert_eq!(ctx.list_transactions(CLIENT, None).await.unwrap().len(), 1);
    assert!(ctx
        .list_transactions(FREELANCER, None)
        .await
        .unwrap()
        .is_empty());

    let order = system.adapter().get_order(ORDER).await.unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
}

#[tokio::test]
async fn test_payment_rejects_non_positive_amounts() {
    let (_system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(100)).await.unwrap();

    for amount in [dec!(0), dec!(-40)] {
        let result = ctx.pay(CLIENT, FREELANCER, None, amount).await;
        assert!(matches!(result, Err(WalletError::InvalidAmount)));
    }

    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(100));
}

#[tokio::test]
async fn test_payment_without_order_touches_no_order() {
    let (system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(100)).await.unwrap();

    ctx.pay(CLIENT, FREELANCER, None, dec!(25)).await.unwrap();

    let entries = ctx.list_transactions(CLIENT, None).await.unwrap();
    assert_eq!(entries[0].order_id, None);

    let order = system.adapter().get_order(ORDER).await.unwrap();
    assert_eq!(order.status, OrderStatus::InProgress);
}

#[tokio::test]
async fn test_payment_to_missing_payee_rolls_back() {
    let (_system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(100)).await.unwrap();

    let result = ctx.pay(CLIENT, 99, Some(ORDER), dec!(40)).await;
    assert!(matches!(result, Err(WalletError::Storage(_))));

    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(100));
    assert_eq!(ctx.list_transactions(CLIENT, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_repeated_payment_is_not_deduplicated() {
    let (_system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(100)).await.unwrap();

    ctx.pay(CLIENT, FREELANCER, Some(ORDER), dec!(40))
        .await
        .unwrap();
    ctx.pay(CLIENT, FREELANCER, Some(ORDER), dec!(40))
        .await
        .unwrap();

    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(20));
    assert_eq!(ctx.get_balance(FREELANCER).await.unwrap(), dec!(80));

    let payments = ctx
        .list_transactions(CLIENT, None)
        .await
        .unwrap()
        .into_iter()
        .filter(|entry| entry.kind == TransactionKind::Payment)
        .count();
    assert_eq!(payments, 2);
}

#[tokio::test]
async fn test_audit_invariant_after_mixed_history() {
    let (_system, ctx) = setup();

    ctx.deposit(CLIENT, dec!(100)).await.unwrap();
    ctx.deposit(CLIENT, dec!(50.25)).await.unwrap();
    ctx.deposit(FREELANCER, dec!(5)).await.unwrap();
    ctx.pay(CLIENT, FREELANCER, Some(ORDER), dec!(60))
        .await
        .unwrap();
    ctx.pay(FREELANCER, CLIENT, None, dec!(10)).await.unwrap();

    assert_audit_invariant(&ctx, CLIENT).await;
    assert_audit_invariant(&ctx, FREELANCER).await;
}

#[tokio::test]
async fn test_concurrent_payments_never_overdraw() {
    let (_system, ctx) = setup();
    ctx.deposit(CLIENT, dec!(60)).await.unwrap();

    // Both tasks share the same underlying Arc<dyn WalletAdapter>.
    let ctx1 = ctx.clone();
    let ctx2 = ctx.clone();

    let handle1 =
        tokio::spawn(async move { ctx1.pay(CLIENT, FREELANCER, None, dec!(60)).await });
    let handle2 =
        tokio::spawn(async move { ctx2.pay(CLIENT, FREELANCER, None, dec!(60)).await });

    let (result1, result2) = tokio::join!(handle1, handle2);
    let result1 = result1.unwrap();
    let result2 = result2.unwrap();

    // Under true concurrency either task may win; assert exactly one of each.
    let outcomes = [&result1, &result2];
    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    let failed = outcomes
        .iter()
        .filter(|r| matches!(r, Err(WalletError::InsufficientFunds)))
        .count();

    assert_eq!(succeeded, 1, "exactly one payment should succeed");
    assert_eq!(failed, 1, "exactly one payment should hit InsufficientFunds");

    assert_eq!(ctx.get_balance(CLIENT).await.unwrap(), dec!(0));
    assert_eq!(ctx.get_balance(FREELANCER).await.unwrap(), dec!(60));
}

#[tokio::test]
async fn test_transactions_listing_order_limit_and_enrichment() {
    let (_system, ctx) = setup();

    ctx.deposit(CLIENT, dec!(10)).await.unwrap();
    ctx.deposit(CLIENT, dec!(20)).await.unwrap();
    ctx.deposit(CLIENT, dec!(30)).await.unwrap();
    ctx.pay(CLIENT, FREELANCER, Some(ORDER), dec!(15))
        .await
        .unwrap();

    let entries = ctx.list_transactions(CLIENT, None).await.unwrap();
    assert_eq!(entries.len(), 4);

    // Most recent first.
    assert_eq!(entries[0].kind, TransactionKind::Payment);
    assert_eq!(entries[0].related_name.as_deref(), Some("Boris Freelancer"));
    assert_eq!(entries[3].amount, dec!(10));

    let page = ctx.list_transactions(CLIENT, Some(2)).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].kind, TransactionKind::Payment);

    let income = ctx.list_transactions(FREELANCER, None).await.unwrap();
    assert_eq!(income[0].related_name.as_deref(), Some("Anna Client"));
}

#[tokio::test]
async fn test_list_transactions_unknown_account_is_empty() {
    let (_system, ctx) = setup();

    let entries = ctx.list_transactions(99, None).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_get_balance_unknown_account() {
    let (_system, ctx) = setup();

    let result = ctx.get_balance(99).await;
    assert!(matches!(result, Err(WalletError::AccountNotFound(99))));
}

#[tokio::test]
async fn test_set_order_status_on_missing_order_is_noop() {
    let (system, ctx) = setup();

    system
        .adapter()
        .set_order_status(999, OrderStatus::Completed)
        .await
        .unwrap();

    let result = system.adapter().get_order(999).await;
    assert!(matches!(result, Err(WalletError::OrderNotFound(999))));

    // And a payment referencing a vanished order still lands.
    ctx.deposit(CLIENT, dec!(50)).await.unwrap();
    ctx.pay(CLIENT, FREELANCER, Some(999), dec!(50))
        .await
        .unwrap();
    assert_eq!(ctx.get_balance(FREELANCER).await.unwrap(), dec!(50));
}
