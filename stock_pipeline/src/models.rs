//! Diesel row types for the `stocks` and `stock_prices` tables.
//!
//! These map one-to-one onto [`crate::schema`]; conversion to and from the
//! domain types ([`Bar`], [`IndicatorSet`]) happens here so the store code
//! only deals with whole rows.

use chrono::NaiveDate;
use diesel::prelude::*;
use indicator_engine::{IndicatorRow, IndicatorSet};
use market_data_ingestor::models::bar::Bar;

use crate::schema::{stock_prices, stocks};

/// A registered symbol as stored in [`crate::schema::stocks`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Identifiable)]
#[diesel(table_name = stocks)]
#[diesel(primary_key(stock_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockRecord {
    pub stock_id: i32,
    pub symbol: String,
    pub company_name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = stocks)]
pub struct NewStock<'a> {
    pub symbol: &'a str,
    pub company_name: &'a str,
}

/// Full write form of a price row. `None` indicators overwrite stored values
/// with NULL on upsert.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = stock_prices)]
#[diesel(treat_none_as_null = true)]
pub struct PriceRecord {
    pub stock_id: i32,
    pub price_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

impl PriceRecord {
    pub fn from_row(stock_id: i32, row: &IndicatorRow<Bar>) -> Self {
        let bar = &row.bar;
        let ind = &row.indicators;
        Self {
            stock_id,
            price_date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            adj_close: bar.adj_close,
            volume: bar.volume,
            sma_20: ind.sma_short,
            sma_50: ind.sma_long,
            ema_12: ind.ema_fast,
            ema_26: ind.ema_slow,
            rsi_14: ind.rsi,
            macd: ind.macd,
            macd_signal: ind.macd_signal,
            bollinger_upper: ind.bollinger_upper,
            bollinger_lower: ind.bollinger_lower,
        }
    }
}

/// Read form of a price row, without the bookkeeping timestamps.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = stock_prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StoredPrice {
    pub price_id: i32,
    pub stock_id: i32,
    pub price_date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub adj_close: f64,
    pub volume: i64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub ema_12: Option<f64>,
    pub ema_26: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

impl StoredPrice {
    pub fn bar(&self) -> Bar {
        Bar {
            date: self.price_date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            adj_close: self.adj_close,
            volume: self.volume,
        }
    }

    pub fn into_row(self) -> IndicatorRow<Bar> {
        IndicatorRow {
            bar: self.bar(),
            indicators: IndicatorSet {
                sma_short: self.sma_20,
                sma_long: self.sma_50,
                ema_fast: self.ema_12,
                ema_slow: self.ema_26,
                rsi: self.rsi_14,
                macd: self.macd,
                macd_signal: self.macd_signal,
                bollinger_upper: self.bollinger_upper,
                bollinger_lower: self.bollinger_lower,
            },
        }
    }
}
