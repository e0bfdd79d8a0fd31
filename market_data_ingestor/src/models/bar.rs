//! Canonical in-memory representation of a daily bar (OHLCV).
//!
//! This struct is used as the standard output for all [`DataProvider`](crate::providers::DataProvider)
//! implementations, regardless of where the data came from.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of fractional digits kept for prices.
pub const PRICE_SCALE: i32 = 4;

/// A single trading day for one symbol.
///
/// This struct is vendor-agnostic and is used throughout the data ingestion pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Trading day, in the exchange's local calendar.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the session.
    pub high: f64,

    /// Lowest price during the session.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Close adjusted for splits and dividends.
    pub adj_close: f64,

    /// Shares traded during the session.
    pub volume: i64,
}

impl Bar {
    /// True when every price field is a finite number and volume is non-negative.
    pub fn is_well_formed(&self) -> bool {
        [self.open, self.high, self.low, self.close, self.adj_close]
            .iter()
            .all(|v| v.is_finite())
            && self.volume >= 0
    }

    /// Returns the bar with every price rounded to [`PRICE_SCALE`] digits.
    pub fn rounded(self) -> Self {
        Self {
            open: round_price(self.open),
            high: round_price(self.high),
            low: round_price(self.low),
            close: round_price(self.close),
            adj_close: round_price(self.adj_close),
            ..self
        }
    }
}

/// Rounds a price to [`PRICE_SCALE`] fractional digits.
pub fn round_price(value: f64) -> f64 {
    let factor = 10f64.powi(PRICE_SCALE);
    (value * factor).round() / factor
}

/// Represents the complete daily history fetched for a single symbol.
///
/// This struct groups a vector of [`Bar`]s with their symbol, making the data
/// set self-describing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The collection of daily bars.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            adj_close: close,
            volume: 100,
        }
    }

    #[test]
    fn prices_round_to_four_digits() {
        let b = bar(187.123_456_7).rounded();
        assert_eq!(b.close, 187.1235);
        assert_eq!(b.adj_close, 187.1235);
    }

    #[test]
    fn nan_prices_are_not_well_formed() {
        assert!(bar(10.0).is_well_formed());
        assert!(!bar(f64::NAN).is_well_formed());

        let mut negative_volume = bar(10.0);
        negative_volume.volume = -1;
        assert!(!negative_volume.is_well_formed());
    }
}
