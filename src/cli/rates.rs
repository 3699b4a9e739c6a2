use super::ui;
use crate::core::{ExchangeRateProvider, RateError};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::Table;
use futures::future::join_all;
use rust_decimal::Decimal;

/// Fetches and prints the live rate for `currency`.
pub async fn run_live(provider: &dyn ExchangeRateProvider, currency: &str) -> Result<()> {
    let rate = provider
        .live(currency)
        .await
        .with_context(|| format!("Failed to fetch live rate for {currency}"))?;

    println!(
        "{} {}",
        ui::style_text(&currency.to_ascii_uppercase(), ui::StyleType::Title),
        ui::style_text(&rate.normalize().to_string(), ui::StyleType::Value)
    );
    Ok(())
}

/// Fetches the historical rate of `currency` for every date concurrently and prints a table.
///
/// A failed date is shown in the table; the command only fails when no date succeeded.
pub async fn run_historical(
    provider: &dyn ExchangeRateProvider,
    currency: &str,
    dates: &[NaiveDate],
) -> Result<()> {
    if dates.is_empty() {
        anyhow::bail!("At least one date is required");
    }

    let pb = ui::new_progress_bar(dates.len() as u64);
    let lookups = dates.iter().map(|date| {
        let pb = pb.clone();
        async move {
            let result = provider.historical(currency, *date).await;
            pb.inc(1);
            (*date, result)
        }
    });
    let results = join_all(lookups).await;
    pb.finish_and_clear();

    println!(
        "\nHistorical rates: {}",
        ui::style_text(&currency.to_ascii_uppercase(), ui::StyleType::Title)
    );
    println!("{}", historical_table(&results));

    if let Some(error) = all_failed(&results) {
        return Err(anyhow::anyhow!("{error}"))
            .with_context(|| format!("Failed to fetch historical rates for {currency}"));
    }
    Ok(())
}

fn historical_table(results: &[(NaiveDate, Result<Decimal, RateError>)]) -> Table {
    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Date"), ui::header_cell("Rate")]);
    for (date, result) in results {
        let rate = match result {
            Ok(rate) => ui::rate_cell(*rate),
            Err(e) => ui::error_cell(&e.to_string()),
        };
        table.add_row(vec![comfy_table::Cell::new(date.format("%Y-%m-%d")), rate]);
    }
    table
}

/// Returns the first error when every lookup failed.
fn all_failed(results: &[(NaiveDate, Result<Decimal, RateError>)]) -> Option<&RateError> {
    if results.iter().any(|(_, r)| r.is_ok()) {
        return None;
    }
    results.iter().find_map(|(_, r)| r.as_ref().err())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockProvider {
        call_count: AtomicUsize,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                call_count: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ExchangeRateProvider for MockProvider {
        async fn live(&self, currency: &str) -> crate::core::error::Result<Decimal> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            match currency {
                "EUR" => Ok(dec!(0.91)),
                _ => Err(RateError::Provider {
                    code: 202,
                    info: "invalid currency".to_string(),
                }),
            }
        }

        async fn historical(
            &self,
            _currency: &str,
            date: NaiveDate,
        ) -> crate::core::error::Result<Decimal> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            if date.format("%Y").to_string() == "1990" {
                Err(RateError::Provider {
                    code: 302,
                    info: "invalid date".to_string(),
                })
            } else {
                Ok(dec!(0.8850))
            }
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_run_live() {
        let provider = MockProvider::new();
        assert!(run_live(&provider, "EUR").await.is_ok());

        let err = run_live(&provider, "XXX").await.unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch live rate for XXX");
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_historical_partial_failure_succeeds() {
        let provider = MockProvider::new();
        let dates = [date(2020, 1, 1), date(1990, 1, 1)];

        assert!(run_historical(&provider, "EUR", &dates).await.is_ok());
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_run_historical_all_failed() {
        let provider = MockProvider::new();
        let dates = [date(1990, 1, 1), date(1990, 1, 2)];

        let err = run_historical(&provider, "EUR", &dates).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to fetch historical rates for EUR"
        );
        assert_eq!(err.root_cause().to_string(), "Provider error 302: invalid date");
    }

    #[tokio::test]
    async fn test_run_historical_requires_dates() {
        let provider = MockProvider::new();
        assert!(run_historical(&provider, "EUR", &[]).await.is_err());
        assert_eq!(provider.call_count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_historical_table() {
        let results = vec![
            (date(2020, 1, 1), Ok(dec!(0.8850))),
            (
                date(1990, 1, 1),
                Err(RateError::Provider {
                    code: 302,
                    info: "invalid date".to_string(),
                }),
            ),
        ];
        let rendered = historical_table(&results).to_string();

        assert!(rendered.contains("2020-01-01"));
        assert!(rendered.contains("0.885"));
        assert!(rendered.contains("1990-01-01"));
        assert!(rendered.contains("N/A"));
    }
}
