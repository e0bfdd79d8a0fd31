//! Yahoo Finance chart API (`/v8/finance/chart`), the keyless default source.

pub mod provider;
pub mod response;
