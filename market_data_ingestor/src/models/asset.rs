//! Tracked ticker symbols.

use serde::{Deserialize, Serialize};

/// A tracked ticker with its display name.
///
/// Tickers are stored trimmed and upper-cased so `"aapl "` and `"AAPL"` name
/// the same symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub ticker: String,
    pub name: String,
}

impl Symbol {
    pub fn new(ticker: impl AsRef<str>, name: impl Into<String>) -> Self {
        Self {
            ticker: normalize_ticker(ticker.as_ref()),
            name: name.into(),
        }
    }
}

/// Canonical form of a ticker: trimmed, upper case.
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}
