//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, which serves as a unified interface
//! for fetching daily bar data from any market data vendor (e.g., Yahoo Finance, Alpaca).
//!
//! Each concrete provider implementation should implement [`DataProvider`] to handle
//! vendor-specific API logic and validation. Swapping providers must not change what
//! the [`HistoricalFetcher`](crate::fetcher::HistoricalFetcher) hands downstream.
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers.
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data_ingestor::models::{
//!     bar::BarSeries,
//!     request_params::BarsRequestParams,
//! };
//! use market_data_ingestor::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     fn name(&self) -> &'static str {
//!         "mine"
//!     }
//!
//!     async fn fetch_bars(
//!         &self,
//!         params: BarsRequestParams,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(params.symbol, vec![]))
//!     }
//! }
//! ```
//!

pub mod alpaca_rest;
pub mod yahoo_chart;

use std::{fmt, str::FromStr};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_utils::env::MissingEnvVarError;
use snafu::{Backtrace, Snafu};

use crate::models::{bar::BarSeries, request_params::BarsRequestParams};

/// Trait for fetching daily bar data from a market data provider.
///
/// Implement this trait for each concrete data vendor.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Short identifier used in logs (e.g. `"yahoo"`).
    fn name(&self) -> &'static str;

    /// Fetches daily bars for the symbol and date range in `params`.
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - The bars the vendor returned, possibly empty and in vendor order.
    /// * `Err(ProviderError)` - If the request fails.
    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError>;
}

/// Errors that can occur during the creation of a provider instance
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// missed environment variable.
    #[snafu(display("Missing environment variable: {source}"))]
    MissingEnvVar {
        source: MissingEnvVarError,
        backtrace: Backtrace,
    },

    /// failed to init reqwest client
    #[snafu(display("Failed to build HTTP client: {source}"))]
    ClientBuild {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// API key contains invalid characters.
    #[snafu(display("Invalid API key format: {source}"))]
    InvalidApiKey {
        source: reqwest::header::InvalidHeaderValue,
        backtrace: Backtrace,
    },
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// An error during an API request (e.g., network failure, timeout).
    #[snafu(display("API request failed: {source}"))]
    Reqwest {
        source: reqwest::Error,
        backtrace: Backtrace,
    },

    /// The provider's API answered with an error (e.g., unknown ticker, rate limit).
    #[snafu(display("API error (HTTP {status}): {message}"))]
    Api {
        status: u16,
        message: String,
        backtrace: Backtrace,
    },

    /// The request parameters were invalid for this specific provider.
    #[snafu(display("Invalid parameters for provider: {message}"))]
    Validation {
        message: String,
        backtrace: Backtrace,
    },

    /// The response arrived but its payload did not have the expected shape.
    #[snafu(display("Malformed provider response: {message}"))]
    Decode {
        message: String,
        backtrace: Backtrace,
    },

    /// An internal error occurred while processing data within the provider.
    #[snafu(display("Internal provider error: {message}"))]
    Internal {
        message: String,
        backtrace: Backtrace,
    },

    /// An error during provider configuration or initialization.
    #[snafu(display("Provider initialization error: {source}"))]
    Init {
        #[snafu(backtrace)]
        source: ProviderInitError,
    },
}

impl ProviderError {
    /// Whether repeating the same request may succeed.
    ///
    /// Transport failures, throttling (HTTP 429) and server-side errors (HTTP 5xx)
    /// are transient; everything else fails the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Reqwest { source, .. } => match source.status() {
                Some(status) => status.as_u16() == 429 || status.is_server_error(),
                None => source.is_timeout() || source.is_connect() || source.is_request(),
            },
            ProviderError::Api { status, .. } => *status == 429 || (500..600).contains(status),
            _ => false,
        }
    }
}

/// Which upstream to use (serde snake_case).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Yahoo Finance chart API. Needs no credentials.
    #[default]
    Yahoo,
    /// Alpaca market data REST API.
    Alpaca,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Yahoo => f.write_str("yahoo"),
            ProviderKind::Alpaca => f.write_str("alpaca"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "yahoo" | "yfinance" => Ok(ProviderKind::Yahoo),
            "alpaca" => Ok(ProviderKind::Alpaca),
            other => Err(format!("unknown provider: {other}")),
        }
    }
}

/// Build and return a boxed data provider corresponding to the supplied kind.
pub fn build_provider(kind: ProviderKind) -> Result<Box<dyn DataProvider>, ProviderInitError> {
    match kind {
        ProviderKind::Yahoo => Ok(Box::new(yahoo_chart::provider::YahooChartProvider::new()?)),
        ProviderKind::Alpaca => Ok(Box::new(alpaca_rest::provider::AlpacaProvider::new()?)),
    }
}
