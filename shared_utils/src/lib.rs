//! Small helpers shared by the pipeline crates: environment lookups and
//! layered configuration resolution.

pub mod config;
pub mod env;
