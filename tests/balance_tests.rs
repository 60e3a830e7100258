use balance_tracker::core::{
    account_balance, total_balance, Account, Currency, Period, Projection, Recurrence, Revenue,
    Subscription,
};
use balance_tracker::rates::{CurrencyConverter, StaticRates};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn account_without_items_equals_converted_base() {
    let source = StaticRates::new()
        .with_rate(Currency::Eur, 48.0)
        .with_rate(Currency::Usd, 40.0);
    let converter = CurrencyConverter::new(source);
    let account = Account::new("savings", 100.0, Currency::Eur).unwrap();

    let projection = Projection::build(&converter, &[], &[], date(2030, 1, 1)).await;
    let balance = account_balance(&converter, &account, &projection).await;
    // 100 EUR -> 4800 UAH -> 120 USD
    assert!((balance - 120.0).abs() < 1e-9);
}

#[tokio::test]
async fn subscriptions_and_revenue_fold_into_the_balance() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let account = Account::new("checking", 1000.0, Currency::Usd).unwrap();
    let sub = Subscription::new(
        "rent",
        100.0,
        Currency::Usd,
        Period::Monthly,
        date(2024, 1, 15),
        Some(account.id.clone()),
    )
    .unwrap();
    let rev = Revenue::new(
        "bonus",
        500.0,
        Currency::Usd,
        Recurrence::Once,
        Some(date(2024, 2, 1)),
        Some(account.id.clone()),
    )
    .unwrap();

    let projection = Projection::build(&converter, &[sub], &[rev], date(2024, 3, 1)).await;
    let balance = account_balance(&converter, &account, &projection).await;
    // Base 1000 - two charges (Jan 15, Feb 15) + one 500 bonus.
    assert!((balance - 1300.0).abs() < 1e-9);
}

#[tokio::test]
async fn total_balance_sums_all_accounts() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let a = Account::new("checking", 250.0, Currency::Usd).unwrap();
    let b = Account::new("credit card", -50.0, Currency::Usd).unwrap();

    let projection = Projection::build(&converter, &[], &[], date(2024, 1, 1)).await;
    let total = total_balance(&converter, &[a, b], &projection).await;
    assert!((total - 200.0).abs() < 1e-9);
}

#[tokio::test]
async fn orphaned_items_do_not_affect_any_balance() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let account = Account::new("checking", 100.0, Currency::Usd).unwrap();
    // References an account that was deleted.
    let orphan = Subscription::new(
        "ghost",
        10.0,
        Currency::Usd,
        Period::Monthly,
        date(2024, 1, 1),
        Some("deleted-account".into()),
    )
    .unwrap();

    let projection =
        Projection::build(&converter, &[orphan], &[], date(2024, 6, 1)).await;
    // The expansion still carries the orphan's transactions...
    assert!(!projection.transactions().is_empty());
    // ...but no account picks them up.
    let balance = account_balance(&converter, &account, &projection).await;
    assert_eq!(balance, 100.0);
    let total = total_balance(&converter, std::slice::from_ref(&account), &projection).await;
    assert_eq!(total, 100.0);
}

#[tokio::test]
async fn balance_is_idempotent_for_a_fixed_snapshot() {
    let converter = CurrencyConverter::new(
        StaticRates::new()
            .with_rate(Currency::Eur, 47.31)
            .with_rate(Currency::Usd, 41.07),
    );
    let account = Account::new("savings", 123.45, Currency::Eur).unwrap();
    let sub = Subscription::new(
        "vpn",
        9.99,
        Currency::Eur,
        Period::Monthly,
        date(2023, 7, 31),
        Some(account.id.clone()),
    )
    .unwrap();

    let projection = Projection::build(&converter, &[sub], &[], date(2024, 2, 29)).await;
    let first = account_balance(&converter, &account, &projection).await;
    let second = account_balance(&converter, &account, &projection).await;
    assert_eq!(first.to_bits(), second.to_bits());
}
