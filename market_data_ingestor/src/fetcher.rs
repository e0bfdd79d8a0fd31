//! Historical data fetcher: one symbol's trailing window of daily bars.
//!
//! [`HistoricalFetcher`] wraps a [`DataProvider`] with the policies the batch
//! runner relies on:
//! - a shared rate limit between requests,
//! - bounded retries with exponential backoff for transient provider errors,
//! - normalization into a strictly ascending, duplicate-free series,
//! - a single [`FetchError::DataUnavailable`] for anything that leaves the
//!   symbol without bars.
//!
//! Fetching has no side effects besides the network call; persistence belongs
//! to the caller.

use std::{num::NonZeroU32, time::Duration};

use chrono::NaiveDate;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use tracing::{debug, info, warn};

use crate::{
    errors::FetchError,
    models::{
        bar::BarSeries,
        request_params::{BarsRequestParams, DEFAULT_WINDOW_DAYS},
    },
    normalize::normalize_bars,
    providers::DataProvider,
};

/// Tuning knobs for [`HistoricalFetcher`].
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    /// Length of the trailing window in calendar days.
    pub window_days: u32,
    /// Extra attempts after the first one for retryable errors.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for every further attempt.
    pub base_delay: Duration,
    /// Sustained request rate towards the provider.
    pub requests_per_second: NonZeroU32,
}

impl Default for FetcherOptions {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            requests_per_second: nonzero!(1u32),
        }
    }
}

pub struct HistoricalFetcher {
    provider: Box<dyn DataProvider>,
    options: FetcherOptions,
    limiter: DefaultDirectRateLimiter,
}

impl HistoricalFetcher {
    pub fn new(provider: Box<dyn DataProvider>, options: FetcherOptions) -> Self {
        let limiter = RateLimiter::direct(Quota::per_second(options.requests_per_second));
        Self {
            provider,
            options,
            limiter,
        }
    }

    pub fn options(&self) -> &FetcherOptions {
        &self.options
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Fetches the trailing window of daily bars for `symbol`, ending with `today`.
    ///
    /// The returned series is strictly increasing by date with no duplicates.
    pub async fn fetch(&self, symbol: &str, today: NaiveDate) -> Result<BarSeries, FetchError> {
        let params = BarsRequestParams::trailing(symbol, self.options.window_days, today);
        let mut attempt: u32 = 0;

        loop {
            self.limiter.until_ready().await;
            debug!(
                provider = self.provider.name(),
                symbol,
                start = %params.start,
                end = %params.end,
                attempt,
                "fetching daily bars"
            );

            match self.provider.fetch_bars(params.clone()).await {
                Ok(series) => {
                    let received = series.bars.len();
                    let bars = normalize_bars(series.bars);
                    if bars.is_empty() {
                        warn!(symbol, received, "provider returned no usable bars");
                        return Err(FetchError::DataUnavailable {
                            symbol: symbol.to_string(),
                            reason: "provider returned no bars".to_string(),
                            source: None,
                        });
                    }
                    info!(
                        symbol,
                        bars = bars.len(),
                        dropped = received - bars.len(),
                        "fetched daily bars"
                    );
                    return Ok(BarSeries::new(symbol, bars));
                }
                Err(err) if err.is_retryable() && attempt < self.options.max_retries => {
                    let delay = self.backoff(attempt);
                    warn!(symbol, attempt, ?delay, error = %err, "retryable provider error");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(symbol, attempt, error = %err, "giving up on symbol");
                    return Err(FetchError::DataUnavailable {
                        symbol: symbol.to_string(),
                        reason: err.to_string(),
                        source: Some(err),
                    });
                }
            }
        }
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.options
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}
