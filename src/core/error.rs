//! Error types for exchange rate lookups

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("Request error: {source} for {endpoint}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for {endpoint}")]
    Status {
        endpoint: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Provider error {code}: {info}")]
    Provider { code: i64, info: String },

    #[error("Failed to parse {endpoint} response: {reason}")]
    Parse {
        endpoint: &'static str,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl RateError {
    pub(crate) fn parse(endpoint: &'static str, reason: impl Into<String>) -> Self {
        RateError::Parse {
            endpoint,
            reason: reason.into(),
        }
    }

    /// True for failures reaching the provider: network errors and non-success statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, RateError::Transport { .. } | RateError::Status { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, RateError::Parse { .. })
    }
}

pub type Result<T, E = RateError> = std::result::Result<T, E>;
