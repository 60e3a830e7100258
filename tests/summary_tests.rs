use balance_tracker::core::{
    monthly_expense_total, monthly_income_total, Currency, Period, Recurrence, Revenue,
    Subscription,
};
use balance_tracker::rates::{CurrencyConverter, StaticRates};
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn sub(amount: f64, currency: Currency, period: Period) -> Subscription {
    Subscription::new("sub", amount, currency, period, date(2024, 1, 1), None).unwrap()
}

fn rev(amount: f64, currency: Currency, recurrence: Recurrence) -> Revenue {
    Revenue::new("rev", amount, currency, recurrence, Some(date(2024, 1, 1)), None).unwrap()
}

#[tokio::test]
async fn yearly_expenses_are_amortized_over_twelve_months() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let total =
        monthly_expense_total(&converter, &[sub(1200.0, Currency::Usd, Period::Yearly)]).await;
    assert!((total - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn monthly_expenses_pass_through_unchanged() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let total =
        monthly_expense_total(&converter, &[sub(100.0, Currency::Usd, Period::Monthly)]).await;
    assert!((total - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn expense_total_mixes_periods_and_currencies() {
    let source = StaticRates::new()
        .with_rate(Currency::Eur, 48.0)
        .with_rate(Currency::Usd, 40.0);
    let converter = CurrencyConverter::new(source);
    let subs = vec![
        sub(10.0, Currency::Usd, Period::Monthly),
        sub(120.0, Currency::Eur, Period::Yearly), // 144 USD / 12 = 12
    ];
    let total = monthly_expense_total(&converter, &subs).await;
    assert!((total - 22.0).abs() < 1e-9);
}

#[tokio::test]
async fn once_income_counts_whole_never_divided() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let revenues = vec![
        rev(500.0, Currency::Usd, Recurrence::Once),
        rev(1200.0, Currency::Usd, Recurrence::Yearly),
        rev(50.0, Currency::Usd, Recurrence::Monthly),
    ];
    let total = monthly_income_total(&converter, &revenues).await;
    // 500 + 100 + 50: the one-time item is never amortized.
    assert!((total - 650.0).abs() < 1e-9);
}

#[tokio::test]
async fn items_without_account_link_still_count() {
    let converter = CurrencyConverter::new(StaticRates::new());
    let unlinked = sub(30.0, Currency::Usd, Period::Monthly);
    assert!(unlinked.account_id.is_none());
    let total = monthly_expense_total(&converter, &[unlinked]).await;
    assert!((total - 30.0).abs() < 1e-9);
}
