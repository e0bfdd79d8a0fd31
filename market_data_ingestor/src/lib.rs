//! Historical market data ingestion.
//!
//! - [`models`]: vendor-agnostic bars, series, symbols and request parameters
//! - [`providers`]: the [`providers::DataProvider`] trait plus Yahoo and Alpaca implementations
//! - [`fetcher`]: [`fetcher::HistoricalFetcher`], the retrying, rate-limited entry point
//! - [`normalize`]: cleanup applied to every provider payload

pub mod errors;
pub mod fetcher;
pub mod models;
pub mod normalize;
pub mod providers;

pub use errors::FetchError;
pub use fetcher::{FetcherOptions, HistoricalFetcher};
