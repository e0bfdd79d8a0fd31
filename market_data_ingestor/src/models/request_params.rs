use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::providers::alpaca_rest::AlpacaBarsParams;

/// Default length of the trailing history window, in calendar days (about two years).
pub const DEFAULT_WINDOW_DAYS: u32 = 730;

/// Universal parameters for requesting daily bars from any market data provider.
///
/// This struct is vendor-agnostic. It is the standard input for all
/// [`DataProvider`](crate::providers::DataProvider) implementations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BarsRequestParams {
    /// Symbol to request (e.g., `"AAPL"`).
    pub symbol: String,

    /// First calendar day of the requested range (inclusive).
    pub start: NaiveDate,

    /// End of the requested range (exclusive).
    ///
    /// Providers should return bars strictly before this day.
    pub end: NaiveDate,

    /// Optional, provider-specific parameters.
    #[serde(default)]
    pub provider_specific: ProviderParams,
}

/// A trailing range of calendar days ending with a given "today".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchWindow {
    pub window_days: u32,
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
        }
    }
}

impl FetchWindow {
    pub fn new(window_days: u32) -> Self {
        Self { window_days }
    }

    /// `[today - window_days, today + 1)`.
    pub fn range(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.window_days)))
            .unwrap_or(NaiveDate::MIN);
        let end = today.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX);
        (start, end)
    }
}

impl BarsRequestParams {
    /// Builds a request covering the `window_days` calendar days that end with `today`
    /// (inclusive).
    pub fn trailing(symbol: impl Into<String>, window_days: u32, today: NaiveDate) -> Self {
        let (start, end) = FetchWindow::new(window_days).range(today);
        Self {
            symbol: symbol.into(),
            start,
            end,
            provider_specific: ProviderParams::None,
        }
    }

    /// Checks the parts of the request every provider relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("symbol must not be empty".to_string());
        }
        if self.start >= self.end {
            return Err(format!(
                "start ({}) must be before end ({})",
                self.start, self.end
            ));
        }
        Ok(())
    }
}

/// An enum to hold provider-specific request parameters.
///
/// This allows callers to specify detailed, per-request options for a
/// particular provider without cluttering the universal `BarsRequestParams`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub enum ProviderParams {
    #[default]
    None,
    Alpaca(AlpacaBarsParams),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_window_includes_today() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let params = BarsRequestParams::trailing("AAPL", DEFAULT_WINDOW_DAYS, today);
        assert_eq!(params.start, NaiveDate::from_ymd_opt(2024, 10, 19).unwrap());
        assert_eq!(params.end, NaiveDate::from_ymd_opt(2026, 10, 20).unwrap());
        assert!(params.validate().is_ok());
    }

    #[test]
    fn default_window_is_two_years() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let (start, end) = FetchWindow::default().range(today);
        assert_eq!((end - start).num_days(), 731);
    }

    #[test]
    fn empty_range_is_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let mut params = BarsRequestParams::trailing("AAPL", 10, today);
        params.end = params.start;
        assert!(params.validate().is_err());

        let blank = BarsRequestParams::trailing("  ", 10, today);
        assert!(blank.validate().is_err());
    }
}
