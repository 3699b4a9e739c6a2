//! Client for the apilayer (currencylayer) exchange rate API.
//!
//! Live rates are always fetched upstream. Historical rates never change for a
//! given currency and date, so they are served from the injected cache once
//! fetched.

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::config::ApilayerConfig;
use crate::core::currency::{ExchangeRateProvider, HistoricalKey};
use crate::core::error::{RateError, Result};
use crate::store::HistoricalCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Live,
    Historical,
}

impl Endpoint {
    fn path(self) -> &'static str {
        match self {
            Endpoint::Live => "live",
            Endpoint::Historical => "historical",
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApilayerResponse {
    success: Option<bool>,
    error: Option<ApilayerError>,
    quotes: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ApilayerError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    info: String,
}

fn normalize_currency(currency: &str) -> Result<String> {
    let currency = currency.trim();
    if currency.is_empty() {
        return Err(RateError::InvalidInput(
            "currency code must not be empty".to_string(),
        ));
    }
    Ok(currency.to_ascii_uppercase())
}

fn decimal_from_number(
    endpoint: &'static str,
    pair: &str,
    number: &serde_json::Number,
) -> Result<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| {
            RateError::parse(endpoint, format!("quote {pair} ({text}) is not a decimal: {e}"))
        })
}

/// Extracts the single quoted rate from a response body.
///
/// Requests are made for exactly one currency, so `quotes` must hold exactly
/// one entry; anything else is rejected rather than picking an arbitrary one.
fn extract_rate(endpoint: Endpoint, body: &str) -> Result<Decimal> {
    let name = endpoint.path();
    let data: ApilayerResponse = serde_json::from_str(body)
        .map_err(|e| RateError::parse(name, format!("invalid JSON: {e}")))?;

    if data.success == Some(false) || data.error.is_some() {
        let error = data.error.unwrap_or_default();
        return Err(RateError::Provider {
            code: error.code,
            info: error.info,
        });
    }

    let quotes = match data.quotes {
        Some(serde_json::Value::Object(quotes)) => quotes,
        Some(_) => return Err(RateError::parse(name, "quotes is not an object")),
        None => return Err(RateError::parse(name, "missing quotes field")),
    };

    if quotes.len() > 1 {
        return Err(RateError::parse(
            name,
            format!("expected a single quote, got {}", quotes.len()),
        ));
    }

    let (pair, value) = quotes
        .into_iter()
        .next()
        .ok_or_else(|| RateError::parse(name, "quotes is empty"))?;

    match value {
        serde_json::Value::Number(number) => decimal_from_number(name, &pair, &number),
        other => Err(RateError::parse(
            name,
            format!("quote {pair} is not a number: {other}"),
        )),
    }
}

pub struct ApilayerClient {
    base_url: String,
    key: String,
    http: reqwest::Client,
    cache: HistoricalCache,
}

impl ApilayerClient {
    pub fn new(config: &ApilayerConfig, cache: HistoricalCache) -> Result<Self> {
        if config.key.trim().is_empty() {
            return Err(RateError::Configuration(
                "apilayer.key is missing".to_string(),
            ));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url).map_err(|e| {
            RateError::Configuration(format!("invalid apilayer.base_url {base_url}: {e}"))
        })?;

        let mut builder =
            reqwest::Client::builder().user_agent(concat!("fxlayer/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| RateError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(ApilayerClient {
            base_url,
            key: config.key.clone(),
            http,
            cache,
        })
    }

    async fn request_rate(&self, endpoint: Endpoint, params: &[(&str, &str)]) -> Result<Decimal> {
        let name = endpoint.path();
        let query = std::iter::once(("access_key", self.key.as_str())).chain(params.iter().copied());
        let url = Url::parse_with_params(&format!("{}/{}", self.base_url, name), query)
            .map_err(|e| RateError::Configuration(format!("invalid request URL: {e}")))?;

        // The URL carries the access key, log the parameters only
        debug!(endpoint = name, ?params, "Requesting exchange rate");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| RateError::Transport {
                endpoint: name,
                source: source.without_url(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status {
                endpoint: name,
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| RateError::Transport {
                endpoint: name,
                source: source.without_url(),
            })?;

        let rate = extract_rate(endpoint, &body)?;
        debug!(endpoint = name, %rate, "Received exchange rate");
        Ok(rate)
    }
}

#[async_trait]
impl ExchangeRateProvider for ApilayerClient {
    #[instrument(name = "ApilayerLive", skip_all, fields(currency = %currency))]
    async fn live(&self, currency: &str) -> Result<Decimal> {
        let currency = normalize_currency(currency)?;
        self.request_rate(Endpoint::Live, &[("currencies", currency.as_str())])
            .await
    }

    #[instrument(name = "ApilayerHistorical", skip_all, fields(currency = %currency, date = %date))]
    async fn historical(&self, currency: &str, date: NaiveDate) -> Result<Decimal> {
        let currency = normalize_currency(currency)?;
        let key = HistoricalKey::new(&currency, date);
        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let date = date.format("%Y-%m-%d").to_string();
        let rate = self
            .request_rate(
                Endpoint::Historical,
                &[("currencies", currency.as_str()), ("date", date.as_str())],
            )
            .await?;

        self.cache.put(key, rate).await;
        Ok(rate)
    }
}
