use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    bollinger::bollinger,
    ema::ema,
    errors::SeriesError,
    macd::macd,
    rsi::rsi,
    series::{PricePoint, validate_series},
    sma::sma,
};

/// Window lengths for every indicator the engine produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub sma_short: usize,
    pub sma_long: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    pub rsi_period: usize,
    pub macd_signal: usize,
    pub bollinger_window: usize,
    pub bollinger_k: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            sma_short: 20,
            sma_long: 50,
            ema_fast: 12,
            ema_slow: 26,
            rsi_period: 14,
            macd_signal: 9,
            bollinger_window: 20,
            bollinger_k: 2.0,
        }
    }
}

/// Indicator values attached to one bar. `None` where the window isn't full yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

/// A bar together with the indicators computed at its date.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorRow<B> {
    pub bar: B,
    pub indicators: IndicatorSet,
}

#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Validates one symbol's series and attaches indicators to every bar.
    ///
    /// Values at bar `i` depend only on bars `0..=i`, so appending a day never
    /// changes earlier rows.
    pub fn compute<B: PricePoint + Clone>(
        &self,
        symbol: &str,
        series: &[B],
    ) -> Result<Vec<IndicatorRow<B>>, SeriesError> {
        validate_series(symbol, series)?;

        let cfg = &self.config;
        let closes: Vec<f64> = series.iter().map(PricePoint::close).collect();

        let sma_short = sma(&closes, cfg.sma_short);
        let sma_long = sma(&closes, cfg.sma_long);
        let ema_fast = ema(&closes, cfg.ema_fast);
        let ema_slow = ema(&closes, cfg.ema_slow);
        let rsi = rsi(&closes, cfg.rsi_period);
        let macd = macd(&closes, cfg.ema_fast, cfg.ema_slow, cfg.macd_signal);
        let bands = bollinger(&closes, cfg.bollinger_window, cfg.bollinger_k);

        debug!(symbol, bars = series.len(), "computed indicators");

        Ok(series
            .iter()
            .enumerate()
            .map(|(i, bar)| IndicatorRow {
                bar: bar.clone(),
                indicators: IndicatorSet {
                    sma_short: sma_short[i],
                    sma_long: sma_long[i],
                    ema_fast: ema_fast[i],
                    ema_slow: ema_slow[i],
                    rsi: rsi[i],
                    macd: macd.line[i],
                    macd_signal: macd.signal[i],
                    bollinger_upper: bands.upper[i],
                    bollinger_lower: bands.lower[i],
                },
            })
            .collect())
    }
}
