//! Technical indicators over one symbol's ascending daily closes.
//!
//! The math lives in small pure functions ([`sma`], [`ema`], [`rsi`], [`macd`],
//! [`bollinger`]) that take `&[f64]` and return a `Vec<Option<f64>>` aligned
//! with the input, `None` wherever the trailing window is not yet full.
//! [`engine::IndicatorEngine`] validates a bar series and attaches the full
//! [`engine::IndicatorSet`] to every bar.

pub mod bollinger;
pub mod ema;
pub mod engine;
pub mod errors;
pub mod macd;
pub mod rsi;
pub mod series;
pub mod sma;

pub use bollinger::{BollingerBands, bollinger};
pub use ema::ema;
pub use engine::{IndicatorConfig, IndicatorEngine, IndicatorRow, IndicatorSet};
pub use errors::{SeriesDefect, SeriesError};
pub use macd::{MacdSeries, macd};
pub use rsi::rsi;
pub use series::{PricePoint, validate_series};
pub use sma::sma;
