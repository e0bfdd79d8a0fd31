//! Sequential batch ingestion.
//!
//! For each symbol: register, fetch the trailing window, merge with stored
//! history, compute indicators over the merged series, upsert every row.
//! A failure only ever skips the symbol it happened on.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use indicator_engine::{IndicatorEngine, SeriesError};
use market_data_ingestor::{
    FetchError, HistoricalFetcher,
    models::{asset::Symbol, bar::Bar},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::store::{PriceStore, StoreError};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Series(#[from] SeriesError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What one successful symbol run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SymbolReport {
    /// Bars delivered by the fetcher after normalization.
    pub fetched: usize,
    pub inserted: usize,
    pub updated: usize,
}

#[derive(Debug)]
pub struct SymbolOutcome {
    pub symbol: String,
    pub result: Result<SymbolReport, IngestError>,
}

/// Per-symbol outcomes, in the order the symbols were processed.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<SymbolOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> Vec<(&str, &SymbolReport)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|r| (o.symbol.as_str(), r)))
            .collect()
    }

    pub fn failed(&self) -> Vec<(&str, &IngestError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.symbol.as_str(), e)))
            .collect()
    }

    pub fn outcome(&self, symbol: &str) -> Option<&SymbolOutcome> {
        self.outcomes.iter().find(|o| o.symbol == symbol)
    }

    /// True when symbols were attempted and none of them made it.
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(|o| o.result.is_err())
    }
}

/// Stored history overlaid with freshly fetched bars; fetched values win on
/// the same date. The result is ascending with unique dates.
pub fn merge_series(stored: Vec<Bar>, fetched: Vec<Bar>) -> Vec<Bar> {
    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    for bar in stored.into_iter().chain(fetched) {
        by_date.insert(bar.date, bar);
    }
    by_date.into_values().collect()
}

pub struct Pipeline<'a, S: PriceStore> {
    fetcher: &'a HistoricalFetcher,
    engine: &'a IndicatorEngine,
    store: &'a mut S,
}

impl<'a, S: PriceStore> Pipeline<'a, S> {
    pub fn new(fetcher: &'a HistoricalFetcher, engine: &'a IndicatorEngine, store: &'a mut S) -> Self {
        Self {
            fetcher,
            engine,
            store,
        }
    }

    /// Processes `symbols` one after another. Never aborts early.
    pub async fn run(&mut self, symbols: &[Symbol], today: NaiveDate) -> BatchReport {
        let mut report = BatchReport::default();

        for symbol in symbols {
            info!(symbol = %symbol.ticker, %today, "ingesting symbol");
            let result = self.ingest_symbol(symbol, today).await;
            match &result {
                Ok(r) => info!(
                    symbol = %symbol.ticker,
                    fetched = r.fetched,
                    inserted = r.inserted,
                    updated = r.updated,
                    "symbol done"
                ),
                Err(IngestError::Store(e)) => {
                    error!(symbol = %symbol.ticker, error = %e, "persisting symbol failed")
                }
                Err(e) => warn!(symbol = %symbol.ticker, error = %e, "skipping symbol"),
            }
            report.outcomes.push(SymbolOutcome {
                symbol: symbol.ticker.clone(),
                result,
            });
        }

        info!(
            succeeded = report.succeeded().len(),
            failed = report.failed().len(),
            "batch finished"
        );
        report
    }

    async fn ingest_symbol(
        &mut self,
        symbol: &Symbol,
        today: NaiveDate,
    ) -> Result<SymbolReport, IngestError> {
        self.store.register_symbol(symbol)?;

        let fetched = self.fetcher.fetch(&symbol.ticker, today).await?;
        let fetched_count = fetched.bars.len();

        let stored = self.store.load_bars(&symbol.ticker)?;
        let merged = merge_series(stored, fetched.bars);

        // nothing is written unless the whole series validates
        let rows = self.engine.compute(&symbol.ticker, &merged)?;
        let upserted = self.store.upsert_rows(&symbol.ticker, &rows)?;

        Ok(SymbolReport {
            fetched: fetched_count,
            inserted: upserted.inserted,
            updated: upserted.updated,
        })
    }
}
