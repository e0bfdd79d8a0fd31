use thiserror::Error;

use crate::providers::ProviderError;

/// Errors surfaced by the [`HistoricalFetcher`](crate::fetcher::HistoricalFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The provider returned no usable bars for the symbol, or kept failing
    /// after retries. Callers skip the symbol and carry on with the batch.
    #[error("no data available for {symbol}: {reason}")]
    DataUnavailable {
        symbol: String,
        reason: String,
        #[source]
        source: Option<ProviderError>,
    },
}

impl FetchError {
    pub fn symbol(&self) -> &str {
        match self {
            FetchError::DataUnavailable { symbol, .. } => symbol,
        }
    }
}
