//! Price storage behind the [`PriceStore`] trait.
//!
//! The pipeline receives a store handle explicitly; [`SqliteStore`] persists
//! through diesel and [`MemoryStore`] keeps everything in ordered maps for tests.
//! Both enforce one row per (symbol, date) and overwrite every price and
//! indicator column on re-ingestion.

mod memory;
mod sqlite;

use chrono::NaiveDate;
use indicator_engine::IndicatorRow;
use market_data_ingestor::models::{asset::Symbol, bar::Bar};
use serde::Serialize;
use thiserror::Error;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// A bar with its indicator fields, the unit every store persists.
pub type PriceRow = IndicatorRow<Bar>;

/// A registered symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRecord {
    pub id: i32,
    pub ticker: String,
    pub name: String,
}

/// How many rows an upsert created versus overwrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown symbol {0}")]
    UnknownSymbol(String),

    /// A constraint violation that survived the read-modify-upsert retry.
    #[error("persistence conflict for {symbol} on {date}: {message}")]
    PersistenceConflict {
        symbol: String,
        date: NaiveDate,
        message: String,
    },

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("migration error: {0}")]
    Migration(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage surface used by the pipeline and the read-only CLI commands.
///
/// Tickers are matched after [`normalize_ticker`](market_data_ingestor::models::asset::normalize_ticker).
pub trait PriceStore {
    /// Inserts the symbol if it is new. Existing symbols are never modified.
    fn register_symbol(&mut self, symbol: &Symbol) -> StoreResult<SymbolRecord>;

    fn find_symbol(&mut self, ticker: &str) -> StoreResult<Option<SymbolRecord>>;

    /// All registered symbols in registration order.
    fn list_symbols(&mut self) -> StoreResult<Vec<SymbolRecord>>;

    /// Stored bars for `ticker`, ascending by date.
    fn load_bars(&mut self, ticker: &str) -> StoreResult<Vec<Bar>>;

    /// Inserts or overwrites every row keyed by (symbol, date).
    fn upsert_rows(&mut self, ticker: &str, rows: &[PriceRow]) -> StoreResult<UpsertReport>;

    /// Rows with `start <= date <= end`, ascending by date.
    fn bars_in_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<PriceRow>>;

    /// The newest `limit` rows, newest first.
    fn latest_rows(&mut self, ticker: &str, limit: usize) -> StoreResult<Vec<PriceRow>>;

    fn count_rows(&mut self, ticker: &str) -> StoreResult<usize>;
}
