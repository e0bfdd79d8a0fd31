#![allow(dead_code)]

use std::{collections::HashMap, num::NonZeroU32, path::PathBuf, time::Duration};

use async_trait::async_trait;
use chrono::{Datelike, Days, NaiveDate, Weekday};
use diesel::QueryableByName;
use diesel::prelude::*;
use diesel::sql_types::{Integer, Text};
use market_data_ingestor::{
    FetcherOptions, HistoricalFetcher,
    models::bar::{Bar, BarSeries},
    models::request_params::BarsRequestParams,
    providers::{ApiSnafu, DataProvider, ProviderError},
};
use stock_pipeline::db::{connection, migrate};
use tempfile::TempDir;

#[derive(QueryableByName)]
struct JournalMode {
    #[diesel(sql_type = Text)]
    journal_mode: String,
}
#[derive(QueryableByName)]
struct ForeignKeys {
    #[diesel(sql_type = Integer)]
    foreign_keys: i32,
}
#[derive(QueryableByName)]
struct BusyTimeout {
    #[diesel(sql_type = Integer, column_name = "timeout")]
    busy_timeout: i32,
}
#[derive(QueryableByName)]
struct FkViolation {
    #[diesel(sql_type = Text)]
    table: String,
}

pub struct TestDb {
    _dir: TempDir,    // keep alive for the life of the test
    pub path: String, // <tmpdir>/test.db
}

pub fn setup_db() -> (TestDb, SqliteConnection) {
    let dir = TempDir::new().expect("tempdir");
    let mut p = PathBuf::from(dir.path());
    p.push("test.db");
    let path = p.to_string_lossy().to_string();

    migrate::run_sqlite(&path).expect("migrations");

    let conn = connection::connect_sqlite(&path).expect("connect");
    (TestDb { _dir: dir, path }, conn)
}

pub fn assert_sqlite_pragmas(conn: &mut SqliteConnection) {
    use diesel::sql_query;

    let jm: JournalMode = sql_query("PRAGMA journal_mode;").get_result(conn).unwrap();
    assert_eq!(jm.journal_mode.to_lowercase(), "wal"); // WAL is persistent per DB file

    let fk: ForeignKeys = sql_query("PRAGMA foreign_keys;").get_result(conn).unwrap();
    assert_eq!(fk.foreign_keys, 1);

    let bt: BusyTimeout = sql_query("PRAGMA busy_timeout;").get_result(conn).unwrap();
    assert_eq!(bt.busy_timeout, 5000);
}

pub fn fk_check_empty(conn: &mut SqliteConnection) {
    let violations: Vec<FkViolation> = diesel::sql_query("PRAGMA foreign_key_check;")
        .load(conn)
        .unwrap();
    assert!(
        violations.is_empty(),
        "foreign key violations in: {:?}",
        violations.iter().map(|v| v.table.as_str()).collect::<Vec<_>>()
    );
}

/// `n` consecutive weekdays starting at `start` (or the next weekday after it).
pub fn weekdays(start: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut day = start;
    while out.len() < n {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(day);
        }
        day = day + Days::new(1);
    }
    out
}

/// Deterministic, wiggly daily bars with two-decimal prices.
pub fn sample_bars(start: NaiveDate, n: usize, base: f64) -> Vec<Bar> {
    weekdays(start, n)
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let close = base + ((i * 37 % 17) as f64 - 8.0) * 0.25 + i as f64 * 0.1;
            let close = (close * 100.0).round() / 100.0;
            Bar {
                date,
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                adj_close: close,
                volume: 1_000_000 + i as i64,
            }
        })
        .collect()
}

/// Serves canned bars per ticker, honouring the requested window. Unknown
/// tickers get a 404.
#[derive(Default)]
pub struct ScriptedProvider {
    pub series: HashMap<String, Vec<Bar>>,
}

impl ScriptedProvider {
    pub fn with(mut self, ticker: &str, bars: Vec<Bar>) -> Self {
        self.series.insert(ticker.to_string(), bars);
        self
    }
}

#[async_trait]
impl DataProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_bars(&self, params: BarsRequestParams) -> Result<BarSeries, ProviderError> {
        let Some(bars) = self.series.get(&params.symbol) else {
            return ApiSnafu {
                status: 404u16,
                message: format!("No data found, symbol may be delisted: {}", params.symbol),
            }
            .fail();
        };
        let bars = bars
            .iter()
            .filter(|b| b.date >= params.start && b.date < params.end)
            .cloned()
            .collect();
        Ok(BarSeries::new(params.symbol, bars))
    }
}

pub fn fetcher(provider: ScriptedProvider) -> HistoricalFetcher {
    HistoricalFetcher::new(
        Box::new(provider),
        FetcherOptions {
            max_retries: 1,
            base_delay: Duration::from_millis(1),
            requests_per_second: NonZeroU32::new(1000).unwrap(),
            ..FetcherOptions::default()
        },
    )
}
