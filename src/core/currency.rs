//! Currency exchange rate abstractions

use crate::core::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Name of the cache region holding historical rates.
pub const HISTORICAL_EXCHANGE_CACHE: &str = "historicalExchangeCache";

/// Cache key for a historical rate. A currency and date always map to the same rate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoricalKey {
    pub currency: String,
    pub date: NaiveDate,
}

impl HistoricalKey {
    pub fn new(currency: &str, date: NaiveDate) -> Self {
        Self {
            currency: currency.to_string(),
            date,
        }
    }
}

impl Display for HistoricalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.currency, self.date.format("%Y-%m-%d"))
    }
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Current rate for `currency`. Never cached.
    async fn live(&self, currency: &str) -> Result<Decimal>;

    /// Rate for `currency` on `date`.
    async fn historical(&self, currency: &str, date: NaiveDate) -> Result<Decimal>;
}
