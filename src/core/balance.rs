use crate::rates::{CurrencyConverter, RateSource};

use super::{Account, Projection};

/// Point-in-time USD balance of one account: the converted base amount plus
/// all of the account's transactions in `projection`.
///
/// Recomputing with the same inputs and a stable converter snapshot yields
/// an identical result.
pub async fn account_balance<S: RateSource>(
    converter: &CurrencyConverter<S>,
    account: &Account,
    projection: &Projection,
) -> f64 {
    let base = converter.to_usd(account.amount, account.currency).await;
    base.amount
        + projection
            .for_account(&account.id)
            .map(|t| t.amount_usd)
            .sum::<f64>()
}

/// Sum of [`account_balance`] over all accounts.
pub async fn total_balance<S: RateSource>(
    converter: &CurrencyConverter<S>,
    accounts: &[Account],
    projection: &Projection,
) -> f64 {
    let mut total = 0.0;
    for account in accounts {
        total += account_balance(converter, account, projection).await;
    }
    total
}
