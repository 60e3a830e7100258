//! Currency conversion against the USD reference currency.
//!
//! Rates come from a pluggable [`RateSource`]; the converter caches them per
//! (currency, calendar day) and degrades to fixed fallback rates when the
//! source is unavailable, so a balance query never fails outright.

pub mod nbu;

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::Currency;

pub use nbu::NbuClient;

/// How long a fetched rate stays fresh.
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Fixed rates used when the rate source cannot be reached: multiplied with
/// the source amount to obtain USD.
fn fallback_rate(currency: Currency) -> f64 {
    match currency {
        Currency::Usd => 1.0,
        Currency::Eur => 1.18,
        Currency::Uah => 1.0 / 40.0,
    }
}

/// Errors that can occur when looking up an exchange rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// The rate service could not be reached or answered with an error.
    Unavailable(String),
    /// The service answered but carried no data for the currency.
    NotFound,
    /// The response body could not be understood.
    InvalidResponse(String),
}

impl std::fmt::Display for RateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateError::Unavailable(e) => write!(f, "rate service unavailable: {e}"),
            RateError::NotFound => write!(f, "no rate data for currency"),
            RateError::InvalidResponse(e) => write!(f, "invalid rate response: {e}"),
        }
    }
}

impl std::error::Error for RateError {}

/// One quote as published by the rate service: UAH per unit of `cc`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RateQuote {
    pub cc: String,
    pub rate: f64,
    pub exchangedate: String,
}

/// Pluggable source of daily exchange rate quotes.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches the quote for `currency` on the current calendar day.
    async fn quote(&self, currency: Currency) -> Result<RateQuote, RateError>;
}

/// Fixed in-memory rate table, for offline use and tests.
#[derive(Debug, Clone)]
pub struct StaticRates {
    rates: HashMap<Currency, f64>,
}

impl StaticRates {
    /// Creates a table with approximate NBU quotes (UAH per unit).
    pub fn new() -> Self {
        let mut rates = HashMap::new();
        rates.insert(Currency::Usd, 40.0);
        rates.insert(Currency::Eur, 47.2);
        rates.insert(Currency::Uah, 1.0);
        Self { rates }
    }

    /// Overrides the quote for one currency.
    pub fn with_rate(mut self, currency: Currency, rate: f64) -> Self {
        self.rates.insert(currency, rate);
        self
    }
}

impl Default for StaticRates {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateSource for StaticRates {
    async fn quote(&self, currency: Currency) -> Result<RateQuote, RateError> {
        let rate = *self.rates.get(&currency).ok_or(RateError::NotFound)?;
        Ok(RateQuote {
            cc: currency.code().to_string(),
            rate,
            exchangedate: quote_day().format("%d.%m.%Y").to_string(),
        })
    }
}

/// Result of one conversion. `degraded` marks amounts computed from fallback
/// rates after a lookup failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub amount: f64,
    pub degraded: bool,
}

struct CachedRate {
    rate: f64,
    fetched: Instant,
}

/// Converts amounts to USD, caching rates per (currency, calendar day).
///
/// The cache is safe for concurrent reads; concurrent misses for the same
/// key converge on a single fetch through the fetch guard.
pub struct CurrencyConverter<S> {
    source: S,
    cache: RwLock<HashMap<(Currency, NaiveDate), CachedRate>>,
    fetch_guard: tokio::sync::Mutex<()>,
}

impl<S: RateSource> CurrencyConverter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
            fetch_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Multiplicative rate from `currency` to USD, derived from the source's
    /// UAH cross rates.
    pub async fn rate_to_usd(&self, currency: Currency) -> Result<f64, RateError> {
        match currency {
            Currency::Usd => Ok(1.0),
            // UAH is the quote base: divide by how many UAH one USD costs.
            Currency::Uah => Ok(1.0 / self.rate(Currency::Usd).await?),
            other => {
                let to_uah = self.rate(other).await?;
                let usd_to_uah = self.rate(Currency::Usd).await?;
                Ok(to_uah / usd_to_uah)
            }
        }
    }

    /// Converts `amount` to USD. Never fails: on lookup failure the fixed
    /// fallback table applies and the result is flagged as degraded.
    pub async fn to_usd(&self, amount: f64, currency: Currency) -> Conversion {
        if currency == Currency::Usd {
            return Conversion {
                amount,
                degraded: false,
            };
        }
        match self.rate_to_usd(currency).await {
            Ok(rate) => Conversion {
                amount: amount * rate,
                degraded: false,
            },
            Err(err) => {
                warn!(currency = %currency, error = %err, "rate lookup failed, using fallback rate");
                Conversion {
                    amount: amount * fallback_rate(currency),
                    degraded: true,
                }
            }
        }
    }

    /// Cached UAH-per-unit quote for `currency` on the current quote day.
    async fn rate(&self, currency: Currency) -> Result<f64, RateError> {
        let key = (currency, quote_day());
        if let Some(rate) = self.cached_fresh(&key) {
            return Ok(rate);
        }

        let _fetch = self.fetch_guard.lock().await;
        // Another task may have fetched while this one waited for the guard.
        if let Some(rate) = self.cached_fresh(&key) {
            return Ok(rate);
        }

        match self.source.quote(currency).await {
            Ok(quote) => {
                debug!(currency = %currency, rate = quote.rate, "fetched exchange rate");
                if let Ok(mut cache) = self.cache.write() {
                    cache.insert(
                        key,
                        CachedRate {
                            rate: quote.rate,
                            fetched: Instant::now(),
                        },
                    );
                }
                Ok(quote.rate)
            }
            Err(err) => {
                // Prefer an expired quote over no quote at all.
                if let Some(stale) = self.cached_any(&key) {
                    warn!(currency = %currency, error = %err, "rate refresh failed, reusing stale quote");
                    return Ok(stale);
                }
                Err(err)
            }
        }
    }

    fn cached_fresh(&self, key: &(Currency, NaiveDate)) -> Option<f64> {
        let cache = self.cache.read().ok()?;
        let entry = cache.get(key)?;
        (entry.fetched.elapsed() < CACHE_TTL).then_some(entry.rate)
    }

    fn cached_any(&self, key: &(Currency, NaiveDate)) -> Option<f64> {
        let cache = self.cache.read().ok()?;
        cache.get(key).map(|entry| entry.rate)
    }
}

/// Calendar day the rate service publishes quotes for. The service follows
/// the Kyiv calendar; a fixed UTC+2 offset stands in for the full timezone
/// rules, which only diverges within an hour of midnight during DST.
pub(crate) fn quote_day() -> NaiveDate {
    match FixedOffset::east_opt(2 * 3600) {
        Some(offset) => Utc::now().with_timezone(&offset).date_naive(),
        None => Utc::now().date_naive(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn usd_is_identity() {
        let converter = CurrencyConverter::new(StaticRates::new());
        let conv = converter.to_usd(123.45, Currency::Usd).await;
        assert_eq!(conv.amount, 123.45);
        assert!(!conv.degraded);
    }

    #[tokio::test]
    async fn uah_divides_by_usd_cross_rate() {
        let source = StaticRates::new().with_rate(Currency::Usd, 40.0);
        let converter = CurrencyConverter::new(source);
        let conv = converter.to_usd(80.0, Currency::Uah).await;
        assert!((conv.amount - 2.0).abs() < 1e-9);
        assert!(!conv.degraded);
    }

    #[tokio::test]
    async fn eur_converts_through_uah() {
        let source = StaticRates::new()
            .with_rate(Currency::Eur, 48.0)
            .with_rate(Currency::Usd, 40.0);
        let converter = CurrencyConverter::new(source);
        let conv = converter.to_usd(10.0, Currency::Eur).await;
        // 10 EUR -> 480 UAH -> 12 USD
        assert!((conv.amount - 12.0).abs() < 1e-9);
    }

    struct FailingSource;

    #[async_trait]
    impl RateSource for FailingSource {
        async fn quote(&self, _currency: Currency) -> Result<RateQuote, RateError> {
            Err(RateError::Unavailable("offline".into()))
        }
    }

    #[tokio::test]
    async fn fallback_rates_apply_when_source_fails() {
        let converter = CurrencyConverter::new(FailingSource);
        let eur = converter.to_usd(100.0, Currency::Eur).await;
        assert!((eur.amount - 118.0).abs() < 1e-9);
        assert!(eur.degraded);

        let uah = converter.to_usd(400.0, Currency::Uah).await;
        assert!((uah.amount - 10.0).abs() < 1e-9);
        assert!(uah.degraded);
    }
}
