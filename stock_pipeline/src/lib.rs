//! Daily price ingestion into SQLite with technical indicators.
//!
//! - [`pipeline`]: per-symbol fetch, merge, compute, upsert
//! - [`store`]: the [`store::PriceStore`] trait with SQLite and in-memory backends
//! - [`db`]: connections and embedded migrations
//! - [`synthetic`]: stand-in prediction and sentiment output
//! - [`config`]: `pipeline.toml` plus environment overrides

pub mod config;
pub mod db;
pub mod models;
pub mod pipeline;
pub mod schema;
pub mod store;
pub mod synthetic;
