use std::collections::HashSet;

use chrono::NaiveDate;
use diesel::{
    SqliteConnection,
    prelude::*,
    result::{DatabaseErrorKind, Error as DieselError},
};
use market_data_ingestor::models::{
    asset::{Symbol, normalize_ticker},
    bar::Bar,
};
use tracing::{debug, warn};

use super::{PriceRow, PriceStore, StoreError, StoreResult, SymbolRecord, UpsertReport};
use crate::{
    db::{connection::connect_sqlite, migrate::run_sqlite},
    models::{NewStock, PriceRecord, StockRecord, StoredPrice},
    schema::{stock_prices as sp, stocks},
};

/// [`PriceStore`] backed by a single diesel SQLite connection.
pub struct SqliteStore {
    conn: SqliteConnection,
}

impl SqliteStore {
    /// Migrates the database at `url` and opens a tuned connection to it.
    pub fn open(url: &str) -> StoreResult<Self> {
        run_sqlite(url).map_err(|e| StoreError::Migration(e.to_string()))?;
        let conn = connect_sqlite(url).map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: SqliteConnection) -> Self {
        Self { conn }
    }

    pub fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    fn require_symbol(&mut self, ticker: &str) -> StoreResult<StockRecord> {
        let ticker = normalize_ticker(ticker);
        let found = stocks::table
            .filter(stocks::symbol.eq(&ticker))
            .select(StockRecord::as_select())
            .first(&mut self.conn)
            .optional()?;
        found.ok_or(StoreError::UnknownSymbol(ticker))
    }
}

impl From<StockRecord> for SymbolRecord {
    fn from(r: StockRecord) -> Self {
        SymbolRecord {
            id: r.stock_id,
            ticker: r.symbol,
            name: r.company_name,
        }
    }
}

fn is_constraint_violation(kind: &DatabaseErrorKind) -> bool {
    matches!(
        kind,
        DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation
    )
}

/// INSERT .. ON CONFLICT (stock_id, price_date) DO UPDATE, falling back once to
/// select-then-update/insert when the statement trips a constraint.
fn upsert_one(conn: &mut SqliteConnection, symbol: &str, record: &PriceRecord) -> StoreResult<()> {
    let attempt = diesel::insert_into(sp::table)
        .values(record)
        .on_conflict((sp::stock_id, sp::price_date))
        .do_update()
        .set(record)
        .execute(conn);

    match attempt {
        Ok(_) => Ok(()),
        Err(DieselError::DatabaseError(kind, info)) if is_constraint_violation(&kind) => {
            warn!(
                symbol,
                date = %record.price_date,
                error = info.message(),
                "upsert conflict, retrying as read-modify-upsert"
            );
            read_modify_upsert(conn, record).map_err(|e| StoreError::PersistenceConflict {
                symbol: symbol.to_string(),
                date: record.price_date,
                message: e.to_string(),
            })
        }
        Err(e) => Err(e.into()),
    }
}

fn read_modify_upsert(conn: &mut SqliteConnection, record: &PriceRecord) -> QueryResult<()> {
    let existing: Option<i32> = sp::table
        .filter(sp::stock_id.eq(record.stock_id))
        .filter(sp::price_date.eq(record.price_date))
        .select(sp::price_id)
        .first(conn)
        .optional()?;

    match existing {
        Some(id) => diesel::update(sp::table.find(id)).set(record).execute(conn)?,
        None => diesel::insert_into(sp::table).values(record).execute(conn)?,
    };
    Ok(())
}

impl PriceStore for SqliteStore {
    fn register_symbol(&mut self, symbol: &Symbol) -> StoreResult<SymbolRecord> {
        let ticker = normalize_ticker(&symbol.ticker);
        let inserted = diesel::insert_into(stocks::table)
            .values(NewStock {
                symbol: &ticker,
                company_name: &symbol.name,
            })
            .on_conflict(stocks::symbol)
            .do_nothing()
            .execute(&mut self.conn)?;
        if inserted > 0 {
            debug!(symbol = %ticker, "registered symbol");
        }
        self.require_symbol(&ticker).map(SymbolRecord::from)
    }

    fn find_symbol(&mut self, ticker: &str) -> StoreResult<Option<SymbolRecord>> {
        Ok(stocks::table
            .filter(stocks::symbol.eq(normalize_ticker(ticker)))
            .select(StockRecord::as_select())
            .first(&mut self.conn)
            .optional()?
            .map(SymbolRecord::from))
    }

    fn list_symbols(&mut self) -> StoreResult<Vec<SymbolRecord>> {
        let rows = stocks::table
            .order(stocks::stock_id.asc())
            .select(StockRecord::as_select())
            .load(&mut self.conn)?;
        Ok(rows.into_iter().map(SymbolRecord::from).collect())
    }

    fn load_bars(&mut self, ticker: &str) -> StoreResult<Vec<Bar>> {
        let stock = self.require_symbol(ticker)?;
        let rows = sp::table
            .filter(sp::stock_id.eq(stock.stock_id))
            .order(sp::price_date.asc())
            .select(StoredPrice::as_select())
            .load(&mut self.conn)?;
        Ok(rows.iter().map(StoredPrice::bar).collect())
    }

    fn upsert_rows(&mut self, ticker: &str, rows: &[PriceRow]) -> StoreResult<UpsertReport> {
        let stock = self.require_symbol(ticker)?;
        let symbol = stock.symbol.as_str();

        self.conn.immediate_transaction(|conn| {
            let mut seen: HashSet<NaiveDate> = sp::table
                .filter(sp::stock_id.eq(stock.stock_id))
                .select(sp::price_date)
                .load::<NaiveDate>(conn)?
                .into_iter()
                .collect();

            let mut report = UpsertReport::default();
            for row in rows {
                let record = PriceRecord::from_row(stock.stock_id, row);
                upsert_one(conn, symbol, &record)?;
                if seen.insert(record.price_date) {
                    report.inserted += 1;
                } else {
                    report.updated += 1;
                }
            }
            debug!(symbol, inserted = report.inserted, updated = report.updated, "upserted rows");
            Ok(report)
        })
    }

    fn bars_in_range(
        &mut self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<PriceRow>> {
        let stock = self.require_symbol(ticker)?;
        let rows = sp::table
            .filter(sp::stock_id.eq(stock.stock_id))
            .filter(sp::price_date.ge(start))
            .filter(sp::price_date.le(end))
            .order(sp::price_date.asc())
            .select(StoredPrice::as_select())
            .load(&mut self.conn)?;
        Ok(rows.into_iter().map(StoredPrice::into_row).collect())
    }

    fn latest_rows(&mut self, ticker: &str, limit: usize) -> StoreResult<Vec<PriceRow>> {
        let stock = self.require_symbol(ticker)?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = sp::table
            .filter(sp::stock_id.eq(stock.stock_id))
            .order(sp::price_date.desc())
            .limit(limit)
            .select(StoredPrice::as_select())
            .load(&mut self.conn)?;
        Ok(rows.into_iter().map(StoredPrice::into_row).collect())
    }

    fn count_rows(&mut self, ticker: &str) -> StoreResult<usize> {
        let stock = self.require_symbol(ticker)?;
        let n: i64 = sp::table
            .filter(sp::stock_id.eq(stock.stock_id))
            .count()
            .get_result(&mut self.conn)?;
        Ok(n as usize)
    }
}
