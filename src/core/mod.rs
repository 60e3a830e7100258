//! Core domain types and the balance projection engine.

mod balance;
mod projection;
mod recurrence;
mod summary;

pub use balance::{account_balance, total_balance};
pub use projection::{generate, Projection};
pub use recurrence::{occurrences, Occurrences};
pub use summary::{monthly_expense_total, monthly_income_total};

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currencies the tracker accepts. All computed balances are normalized to
/// [`Currency::Usd`], the reference currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "UAH")]
    Uah,
}

impl Currency {
    /// Three-letter uppercase code, as used by the rate service.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Uah => "UAH",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "UAH" => Ok(Currency::Uah),
            other => Err(ItemError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Billing cadence for subscriptions. Subscriptions always repeat; there is
/// no one-time variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Monthly,
    Yearly,
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Monthly => f.write_str("monthly"),
            Period::Yearly => f.write_str("yearly"),
        }
    }
}

impl FromStr for Period {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(Period::Monthly),
            "yearly" => Ok(Period::Yearly),
            other => Err(ItemError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Recurrence of a revenue source: periodic or a single occurrence at the
/// anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    Monthly,
    Yearly,
    Once,
}

impl From<Period> for Recurrence {
    fn from(period: Period) -> Self {
        match period {
            Period::Monthly => Recurrence::Monthly,
            Period::Yearly => Recurrence::Yearly,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recurrence::Monthly => f.write_str("monthly"),
            Recurrence::Yearly => f.write_str("yearly"),
            Recurrence::Once => f.write_str("once"),
        }
    }
}

impl FromStr for Recurrence {
    type Err = ItemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monthly" => Ok(Recurrence::Monthly),
            "yearly" => Ok(Recurrence::Yearly),
            "once" => Ok(Recurrence::Once),
            other => Err(ItemError::UnknownPeriod(other.to_string())),
        }
    }
}

/// Errors that can occur when creating a domain item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemError {
    /// The display name is empty.
    EmptyName,
    /// The amount of a recurring item is zero or negative.
    NonPositiveAmount,
    /// The currency code is not one of the supported set.
    UnknownCurrency(String),
    /// The period string is not recognized.
    UnknownPeriod(String),
}

impl fmt::Display for ItemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemError::EmptyName => write!(f, "name must not be empty"),
            ItemError::NonPositiveAmount => write!(f, "amount must be positive"),
            ItemError::UnknownCurrency(c) => write!(f, "unknown currency: {c}"),
            ItemError::UnknownPeriod(p) => write!(f, "unknown period: {p}"),
        }
    }
}

impl std::error::Error for ItemError {}

/// A finance account holding a base amount in some currency.
///
/// The balance shown for a date is derived, never stored: the base amount is
/// the only persisted financial fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Base amount. May be negative for debt accounts.
    pub amount: f64,
    /// Currency the base amount is denominated in.
    pub currency: Currency,
}

impl Account {
    /// Creates an account after validating the name.
    pub fn new(name: impl Into<String>, amount: f64, currency: Currency) -> Result<Self, ItemError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            amount,
            currency,
        })
    }
}

/// A recurring subscription charged against an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    /// Positive magnitude; the sign is applied when transactions are derived.
    pub amount: f64,
    pub currency: Currency,
    pub period: Period,
    /// Date of the first occurrence, fixing the day-of-month pattern.
    pub anchor: NaiveDate,
    /// Weak reference to the owning account. Without it the subscription
    /// still counts toward aggregate totals but never produces transactions.
    pub account_id: Option<String>,
}

impl Subscription {
    /// Creates a subscription after validating name and amount.
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        currency: Currency,
        period: Period,
        anchor: NaiveDate,
        account_id: Option<String>,
    ) -> Result<Self, ItemError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }
        if amount <= 0.0 {
            return Err(ItemError::NonPositiveAmount);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            amount,
            currency,
            period,
            anchor,
            account_id,
        })
    }
}

/// A recurring or one-time revenue source credited to an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revenue {
    pub id: String,
    pub name: String,
    /// Positive magnitude.
    pub amount: f64,
    pub currency: Currency,
    pub recurrence: Recurrence,
    /// Date of the first (or only) occurrence. Optional; without it the
    /// revenue never produces transactions.
    pub anchor: Option<NaiveDate>,
    /// Weak reference to the owning account.
    pub account_id: Option<String>,
}

impl Revenue {
    /// Creates a revenue source after validating name and amount.
    pub fn new(
        name: impl Into<String>,
        amount: f64,
        currency: Currency,
        recurrence: Recurrence,
        anchor: Option<NaiveDate>,
        account_id: Option<String>,
    ) -> Result<Self, ItemError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ItemError::EmptyName);
        }
        if amount <= 0.0 {
            return Err(ItemError::NonPositiveAmount);
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            amount,
            currency,
            recurrence,
            anchor,
            account_id,
        })
    }
}

/// Kind of a derived transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

/// One dated cash-flow event derived from a recurring item.
///
/// Transactions are regenerated on every query and never persisted; given
/// the same items, target date and exchange rates the output is identical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Deterministic composite of source id and occurrence date.
    pub id: String,
    pub kind: TransactionKind,
    /// Id of the subscription or revenue that produced this transaction.
    pub source_id: String,
    /// Id of the account the amount applies to.
    pub account_id: String,
    /// Signed amount in USD: negative for expenses, positive for income.
    pub amount_usd: f64,
    /// Occurrence date.
    pub date: NaiveDate,
    /// Human-readable description.
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_round_trips_through_code() {
        for c in [Currency::Usd, Currency::Eur, Currency::Uah] {
            assert_eq!(c.code().parse::<Currency>().unwrap(), c);
        }
    }

    #[test]
    fn currency_parse_is_case_insensitive() {
        assert_eq!("eur".parse::<Currency>().unwrap(), Currency::Eur);
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let err = "GBP".parse::<Currency>().unwrap_err();
        assert_eq!(err, ItemError::UnknownCurrency("GBP".into()));
    }

    #[test]
    fn subscription_requires_positive_amount() {
        let err = Subscription::new(
            "netflix",
            0.0,
            Currency::Usd,
            Period::Monthly,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            None,
        )
        .unwrap_err();
        assert_eq!(err, ItemError::NonPositiveAmount);
    }

    #[test]
    fn account_base_amount_may_be_negative() {
        let acc = Account::new("credit card", -250.0, Currency::Usd).unwrap();
        assert_eq!(acc.amount, -250.0);
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Account::new("   ", 10.0, Currency::Usd).unwrap_err();
        assert_eq!(err, ItemError::EmptyName);
    }
}
