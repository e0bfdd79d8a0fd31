//! Synthetic prediction and sentiment provider.
//!
//! There is no trained model behind these numbers. [`SyntheticModel`] draws
//! them from fixed, plausible distributions around the latest stored close.
//! Callers only see the [`PricePredictor`] and [`SentimentAnalyzer`] traits, so
//! a real model replaces this by providing another implementation.

use chrono::{DateTime, Days, NaiveDate, Utc};
use market_data_ingestor::models::asset::normalize_ticker;
use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::store::{PriceStore, StoreError};

#[derive(Debug, Error)]
pub enum SyntheticError {
    #[error("{what} unavailable for {symbol}")]
    Unavailable { what: &'static str, symbol: String },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The most recent stored close for a symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatestClose {
    pub date: NaiveDate,
    pub close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub symbol: String,
    pub current_price: f64,
    pub predicted_price: f64,
    pub price_change: f64,
    pub price_change_percent: f64,
    pub model_confidence: f64,
    pub direction: Direction,
    pub prediction_date: NaiveDate,
    pub confidence_interval: ConfidenceInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    pub symbol: String,
    pub label: SentimentLabel,
    /// Raw score mapped from `[-1, 1]` to `[0, 1]`.
    pub score: f64,
    pub positive_count: u32,
    pub negative_count: u32,
    pub neutral_count: u32,
    pub article_count: u32,
    pub last_updated: DateTime<Utc>,
}

pub trait PricePredictor {
    fn predict(&mut self, symbol: &str, latest: &LatestClose, today: NaiveDate) -> Prediction;
}

pub trait SentimentAnalyzer {
    fn analyze(&mut self, symbol: &str, now: DateTime<Utc>) -> Sentiment;
}

/// Random-number backed stand-in for both models. Seed `R` for reproducible output.
#[derive(Debug, Clone)]
pub struct SyntheticModel<R: Rng> {
    rng: R,
}

impl<R: Rng> SyntheticModel<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl<R: Rng> PricePredictor for SyntheticModel<R> {
    fn predict(&mut self, symbol: &str, latest: &LatestClose, today: NaiveDate) -> Prediction {
        let current = latest.close;
        let volatility = (current * 0.02).abs();

        let predicted = if volatility > 0.0 {
            current + self.rng.random_range(-volatility..volatility * 1.5)
        } else {
            current
        };
        let change = predicted - current;
        let change_percent = if current != 0.0 { change / current * 100.0 } else { 0.0 };

        let direction = if change > 0.0 {
            Direction::Up
        } else if change < 0.0 {
            Direction::Down
        } else {
            Direction::Neutral
        };

        let confidence = self.rng.random_range(0.65..0.85);
        let spread = change.abs() * 1.5;

        Prediction {
            symbol: normalize_ticker(symbol),
            current_price: round2(current),
            predicted_price: round2(predicted),
            price_change: round2(change),
            price_change_percent: round2(change_percent),
            model_confidence: round2(confidence),
            direction,
            prediction_date: today.checked_add_days(Days::new(1)).unwrap_or(today),
            confidence_interval: ConfidenceInterval {
                lower: round2(predicted - spread),
                upper: round2(predicted + spread),
            },
        }
    }
}

impl<R: Rng> SentimentAnalyzer for SyntheticModel<R> {
    fn analyze(&mut self, symbol: &str, now: DateTime<Utc>) -> Sentiment {
        let total: u32 = self.rng.random_range(50..=200);
        let positive_ratio: f64 = self.rng.random_range(0.3..0.7);
        let negative_ratio: f64 = self.rng.random_range(0.1..0.4);

        let positive = (f64::from(total) * positive_ratio) as u32;
        // the two ratios can sum past 1
        let negative = ((f64::from(total) * negative_ratio) as u32).min(total - positive);
        let neutral = total - positive - negative;

        let raw = (f64::from(positive) - f64::from(negative)) / f64::from(total);
        let label = if raw > 0.2 {
            SentimentLabel::Positive
        } else if raw < -0.2 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        };

        Sentiment {
            symbol: normalize_ticker(symbol),
            label,
            score: round2((raw + 1.0) / 2.0),
            positive_count: positive,
            negative_count: negative,
            neutral_count: neutral,
            article_count: total,
            last_updated: now,
        }
    }
}

/// Latest stored close, or `None` if the symbol has no rows yet.
pub fn latest_close<S: PriceStore>(store: &mut S, ticker: &str) -> Result<Option<LatestClose>, StoreError> {
    Ok(store
        .latest_rows(ticker, 1)?
        .into_iter()
        .next()
        .map(|row| LatestClose {
            date: row.bar.date,
            close: row.bar.close,
        }))
}

/// Looks up the latest close and runs `predictor` on it.
pub fn predict_for<S: PriceStore, P: PricePredictor>(
    store: &mut S,
    predictor: &mut P,
    ticker: &str,
    today: NaiveDate,
) -> Result<Prediction, SyntheticError> {
    let unavailable = || SyntheticError::Unavailable {
        what: "prediction",
        symbol: normalize_ticker(ticker),
    };
    if store.find_symbol(ticker)?.is_none() {
        return Err(unavailable());
    }
    let latest = latest_close(store, ticker)?.ok_or_else(unavailable)?;
    Ok(predictor.predict(ticker, &latest, today))
}

/// True when `ticker` is registered and has at least one stored row.
///
/// Symbols whose first fetch failed stay registered with zero rows.
pub fn has_history<S: PriceStore>(store: &mut S, ticker: &str) -> Result<bool, StoreError> {
    if store.find_symbol(ticker)?.is_none() {
        return Ok(false);
    }
    Ok(store.count_rows(ticker)? > 0)
}

/// Runs `analyzer` for a symbol with stored history.
pub fn sentiment_for<S: PriceStore, A: SentimentAnalyzer>(
    store: &mut S,
    analyzer: &mut A,
    ticker: &str,
    now: DateTime<Utc>,
) -> Result<Sentiment, SyntheticError> {
    if !has_history(store, ticker)? {
        return Err(SyntheticError::Unavailable {
            what: "sentiment",
            symbol: normalize_ticker(ticker),
        });
    }
    Ok(analyzer.analyze(ticker, now))
}
