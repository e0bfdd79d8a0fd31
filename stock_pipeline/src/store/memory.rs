use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use market_data_ingestor::models::{
    asset::{Symbol, normalize_ticker},
    bar::Bar,
};

use super::{PriceRow, PriceStore, StoreError, StoreResult, SymbolRecord, UpsertReport};

/// In-process [`PriceStore`] with the same upsert semantics as [`super::SqliteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    symbols: BTreeMap<String, SymbolRecord>,
    rows: BTreeMap<i32, BTreeMap<NaiveDate, PriceRow>>,
    next_id: i32,
    rejected: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every upsert for `ticker` fail with a persistence conflict.
    pub fn reject_upserts_for(&mut self, ticker: &str) {
        self.rejected.insert(normalize_ticker(ticker));
    }

    fn symbol_id(&self, ticker: &str) -> StoreResult<i32> {
        let ticker = normalize_ticker(ticker);
        self.symbols
            .get(&ticker)
            .map(|s| s.id)
            .ok_or(StoreError::UnknownSymbol(ticker))
    }

    fn rows_for(&self, ticker: &str) -> StoreResult<Option<&BTreeMap<NaiveDate, PriceRow>>> {
        let id = self.symbol_id(ticker)?;
        Ok(self.rows.get(&id))
    }
}

impl PriceStore for MemoryStore {
    fn register_symbol(&mut self, symbol: &Symbol) -> StoreResult<SymbolRecord> {
        let ticker = normalize_ticker(&symbol.ticker);
        if let Some(existing) = self.symbols.get(&ticker) {
            return Ok(existing.clone());
        }
        self.next_id += 1;
        let record = SymbolRecord {
            id: self.next_id,
            ticker: ticker.clone(),
            name: symbol.name.clone(),
        };
        self.symbols.insert(ticker, record.clone());
        Ok(record)
    }

    fn find_symbol(&mut self, ticker: &str) -> StoreResult<Option<SymbolRecord>> {
        Ok(self.symbols.get(&normalize_ticker(ticker)).cloned())
    }

    fn list_symbols(&mut self) -> StoreResult<Vec<SymbolRecord>> {
        let mut all: Vec<SymbolRecord> = self.symbols.values().cloned().collect();
        all.sort_by_key(|s| s.id);
        Ok(all)
    }

    fn load_bars(&mut self, ticker: &str) -> StoreResult<Vec<Bar>> {
        Ok(self
            .rows_for(ticker)?
            .map(|rows| rows.values().map(|r| r.bar.clone()).collect())
            .unwrap_or_default())
    }

    fn upsert_rows(&mut self, ticker: &str, rows: &[PriceRow]) -> StoreResult<UpsertReport> {
        let id = self.symbol_id(ticker)?;
        let ticker = normalize_ticker(ticker);
        if self.rejected.contains(&ticker) {
            if let Some(first) = rows.first() {
                return Err(StoreError::PersistenceConflict {
                    symbol: ticker,
                    date: first.bar.date,
                    message: "upserts rejected for this symbol".to_string(),
                });
            }
        }

        let stored = self.rows.entry(id).or_default();
        let mut report = UpsertReport::default();
        for row in rows {
            match stored.insert(row.bar.date, row.clone()) {
                Some(_) => report.updated += 1,
                None => report.inserted += 1,
            }
        }
        Ok(report)
    }

    fn bars_in_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<PriceRow>> {
        if end < start {
            return Ok(vec![]);
        }
        Ok(self
            .rows_for(ticker)?
            .map(|rows| rows.range(start..=end).map(|(_, r)| r.clone()).collect())
            .unwrap_or_default())
    }

    fn latest_rows(&mut self, ticker: &str, limit: usize) -> StoreResult<Vec<PriceRow>> {
        Ok(self
            .rows_for(ticker)?
            .map(|rows| rows.values().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn count_rows(&mut self, ticker: &str) -> StoreResult<usize> {
        Ok(self.rows_for(ticker)?.map_or(0, BTreeMap::len))
    }
}
