use chrono::NaiveDate;
use futures::future::join_all;
use tracing::debug;

use crate::rates::{CurrencyConverter, RateSource};

use super::{occurrences, Revenue, Subscription, Transaction, TransactionKind};

/// Expands all recurring items into dated, USD-normalized transactions up to
/// and including `target`, sorted ascending by date.
///
/// Items without an account reference (and revenues without an anchor) are
/// skipped; that is defined behavior, not an error. Each item's amount is
/// converted once and reused across its occurrences; conversions for
/// independent items are issued concurrently.
pub async fn generate<S: RateSource>(
    converter: &CurrencyConverter<S>,
    subscriptions: &[Subscription],
    revenues: &[Revenue],
    target: NaiveDate,
) -> Vec<Transaction> {
    let subs: Vec<(&Subscription, &str)> = subscriptions
        .iter()
        .filter_map(|s| s.account_id.as_deref().map(|a| (s, a)))
        .collect();
    let revs: Vec<(&Revenue, &str, NaiveDate)> = revenues
        .iter()
        .filter_map(|r| match (r.account_id.as_deref(), r.anchor) {
            (Some(a), Some(anchor)) => Some((r, a, anchor)),
            _ => None,
        })
        .collect();

    let sub_usd = join_all(
        subs.iter()
            .map(|(s, _)| converter.to_usd(s.amount, s.currency)),
    );
    let rev_usd = join_all(
        revs.iter()
            .map(|(r, _, _)| converter.to_usd(r.amount, r.currency)),
    );
    let (sub_usd, rev_usd) = futures::join!(sub_usd, rev_usd);

    let mut out = Vec::new();
    for ((sub, account_id), conv) in subs.iter().zip(sub_usd) {
        for date in occurrences(sub.anchor, sub.period.into(), target) {
            out.push(Transaction {
                id: format!("sub-{}-{}", sub.id, date),
                kind: TransactionKind::Expense,
                source_id: sub.id.clone(),
                account_id: (*account_id).to_string(),
                amount_usd: -conv.amount,
                date,
                description: format!("{} subscription", sub.name),
            });
        }
    }
    for ((rev, account_id, anchor), conv) in revs.iter().zip(rev_usd) {
        for date in occurrences(*anchor, rev.recurrence, target) {
            out.push(Transaction {
                id: format!("rev-{}-{}", rev.id, date),
                kind: TransactionKind::Income,
                source_id: rev.id.clone(),
                account_id: (*account_id).to_string(),
                amount_usd: conv.amount,
                date,
                description: format!("{} income", rev.name),
            });
        }
    }

    // Stable sort: same-date transactions keep their generation order.
    out.sort_by_key(|t| t.date);
    debug!(count = out.len(), target = %target, "generated transactions");
    out
}

/// One full transaction expansion for a single target date.
///
/// Balance queries for many accounts at the same date share this expansion
/// instead of re-deriving it per account.
#[derive(Debug, Clone)]
pub struct Projection {
    target: NaiveDate,
    transactions: Vec<Transaction>,
}

impl Projection {
    /// Expands `subscriptions` and `revenues` up to `target`.
    pub async fn build<S: RateSource>(
        converter: &CurrencyConverter<S>,
        subscriptions: &[Subscription],
        revenues: &[Revenue],
        target: NaiveDate,
    ) -> Self {
        Self {
            target,
            transactions: generate(converter, subscriptions, revenues, target).await,
        }
    }

    /// The date this expansion was built for.
    pub fn target(&self) -> NaiveDate {
        self.target
    }

    /// All transactions, ascending by date.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Transactions affecting one account.
    pub fn for_account<'a>(
        &'a self,
        account_id: &'a str,
    ) -> impl Iterator<Item = &'a Transaction> + 'a {
        self.transactions
            .iter()
            .filter(move |t| t.account_id == account_id)
    }

    /// Transactions dated within `start..=end`.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .collect()
    }
}
