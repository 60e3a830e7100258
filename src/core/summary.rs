use futures::future::join_all;

use crate::rates::{CurrencyConverter, RateSource};

use super::{Period, Recurrence, Revenue, Subscription};

/// Monthly-normalized USD total of all subscriptions: yearly items
/// contribute a twelfth of their amount, monthly items contribute unchanged.
/// Items without an account link still count.
pub async fn monthly_expense_total<S: RateSource>(
    converter: &CurrencyConverter<S>,
    subscriptions: &[Subscription],
) -> f64 {
    let conversions = join_all(
        subscriptions
            .iter()
            .map(|s| converter.to_usd(s.amount, s.currency)),
    )
    .await;
    subscriptions
        .iter()
        .zip(conversions)
        .map(|(sub, conv)| match sub.period {
            Period::Yearly => conv.amount / 12.0,
            Period::Monthly => conv.amount,
        })
        .sum()
}

/// Monthly-normalized USD total of all revenue sources. One-time items
/// contribute their full converted amount; they are counted once, not
/// amortized over a year.
pub async fn monthly_income_total<S: RateSource>(
    converter: &CurrencyConverter<S>,
    revenues: &[Revenue],
) -> f64 {
    let conversions = join_all(
        revenues
            .iter()
            .map(|r| converter.to_usd(r.amount, r.currency)),
    )
    .await;
    revenues
        .iter()
        .zip(conversions)
        .map(|(rev, conv)| match rev.recurrence {
            Recurrence::Yearly => conv.amount / 12.0,
            Recurrence::Monthly | Recurrence::Once => conv.amount,
        })
        .sum()
}
