use std::{
    num::NonZeroU32,
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::NaiveDate;
use market_data_ingestor::{
    FetchError, FetcherOptions, HistoricalFetcher,
    models::{
        bar::{Bar, BarSeries},
        request_params::BarsRequestParams,
    },
    providers::{ApiSnafu, DataProvider, ProviderError},
};

/// Fails with the given HTTP status a fixed number of times, then answers with `bars`.
struct FlakyProvider {
    failures: u32,
    status: u16,
    calls: Arc<AtomicU32>,
    bars: Vec<Bar>,
}

#[async_trait]
impl DataProvider for FlakyProvider {
    fn name(&self) -> &'static str {
        "flaky"
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return ApiSnafu {
                status: self.status,
                message: "upstream unavailable",
            }
            .fail();
        }
        Ok(BarSeries::new(params.symbol, self.bars.clone()))
    }
}

fn bar(date: &str, close: f64) -> Bar {
    Bar {
        date: date.parse().unwrap(),
        open: close,
        high: close + 1.0,
        low: close - 1.0,
        close,
        adj_close: close,
        volume: 10_000,
    }
}

fn fast_options() -> FetcherOptions {
    FetcherOptions {
        max_retries: 3,
        base_delay: Duration::from_millis(1),
        requests_per_second: NonZeroU32::new(1000).unwrap(),
        ..FetcherOptions::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
}

#[tokio::test]
async fn retries_transient_errors_then_succeeds() {
    let calls = Arc::new(AtomicU32::new(0));
    let provider = FlakyProvider {
        failures: 2,
        status: 503,
        calls: calls.clone(),
        bars: vec![bar("2025-01-08", 10.0), bar("2025-01-09", 11.0)],
    };
    let fetcher = HistoricalFetcher::new(Box::new(provider), fast_options());

    let series = fetcher.fetch("aapl", today()).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(series.symbol, "aapl");
    assert_eq!(series.bars.len(), 2);
}

#[tokio::test]
async fn gives_up_after_max_retries() {
    let calls = Arc::new(AtomicU32::new(0));
    let provider = FlakyProvider {
        failures: u32::MAX,
        status: 429,
        calls: calls.clone(),
        bars: vec![],
    };
    let fetcher = HistoricalFetcher::new(Box::new(provider), fast_options());

    let err = fetcher.fetch("TSLA", today()).await.unwrap_err();

    // one initial attempt plus three retries
    assert_eq!(calls.load(Ordering::SeqCst), 4);
    assert!(matches!(err, FetchError::DataUnavailable { source: Some(_), .. }));
}

#[tokio::test]
async fn unknown_ticker_is_not_retried() {
    let calls = Arc::new(AtomicU32::new(0));
    let provider = FlakyProvider {
        failures: u32::MAX,
        status: 404,
        calls: calls.clone(),
        bars: vec![],
    };
    let fetcher = HistoricalFetcher::new(Box::new(provider), fast_options());

    let err = fetcher.fetch("BADSYM", today()).await.unwrap_err();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(err.symbol(), "BADSYM");
    assert!(err.to_string().contains("BADSYM"));
}

#[tokio::test]
async fn output_is_sorted_deduplicated_and_rounded() {
    let provider = FlakyProvider {
        failures: 0,
        status: 200,
        calls: Arc::new(AtomicU32::new(0)),
        bars: vec![
            bar("2025-01-09", 11.123456),
            bar("2025-01-07", 9.0),
            bar("2025-01-08", 10.0),
            bar("2025-01-08", 10.5),
        ],
    };
    let fetcher = HistoricalFetcher::new(Box::new(provider), fast_options());

    let series = fetcher.fetch("NVDA", today()).await.unwrap();

    let dates: Vec<String> = series.bars.iter().map(|b| b.date.to_string()).collect();
    assert_eq!(dates, ["2025-01-07", "2025-01-08", "2025-01-09"]);
    assert_eq!(series.bars[1].close, 10.5);
    assert_eq!(series.bars[2].close, 11.1235);
}
