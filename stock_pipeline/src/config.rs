//! Pipeline configuration (`pipeline.toml`).
//!
//! ```toml
//! database_url = "stock_ml.db"
//! provider = "yahoo"
//! window_days = 730
//! max_retries = 3
//! base_delay_ms = 1000
//! requests_per_second = 1
//!
//! [symbols]
//! AAPL = "Apple Inc."
//! MSFT = "Microsoft Corporation"
//! ```
//!
//! Every key is optional. `DATABASE_URL` overrides `database_url` and
//! `PIPELINE_WINDOW_DAYS` overrides `window_days`.

use std::{fs, num::NonZeroU32, path::Path, time::Duration};

use indexmap::IndexMap;
use market_data_ingestor::{
    FetcherOptions,
    models::{asset::Symbol, request_params::DEFAULT_WINDOW_DAYS},
    providers::ProviderKind,
};
use serde::Deserialize;
use shared_utils::config::{self as env_config, resolve_database_url};
use thiserror::Error;

pub const WINDOW_DAYS_VAR: &str = "PIPELINE_WINDOW_DAYS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Env(#[from] env_config::ConfigError),
    #[error("window_days must be positive")]
    EmptyWindow,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub database_url: Option<String>,
    pub provider: ProviderKind,
    pub window_days: u32,
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub requests_per_second: NonZeroU32,
    /// Ticker to company name, processed in file order.
    pub symbols: IndexMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let fetcher = FetcherOptions::default();
        Self {
            database_url: None,
            provider: ProviderKind::default(),
            window_days: DEFAULT_WINDOW_DAYS,
            max_retries: fetcher.max_retries,
            base_delay_ms: fetcher.base_delay.as_millis() as u64,
            requests_per_second: fetcher.requests_per_second,
            symbols: default_symbols(),
        }
    }
}

pub fn default_symbols() -> IndexMap<String, String> {
    [
        ("AAPL", "Apple Inc."),
        ("TSLA", "Tesla Inc."),
        ("AMZN", "Amazon.com Inc."),
        ("NVDA", "NVIDIA Corporation"),
        ("GOOGL", "Alphabet Inc."),
        ("MSFT", "Microsoft Corporation"),
    ]
    .into_iter()
    .map(|(t, n)| (t.to_string(), n.to_string()))
    .collect()
}

impl PipelineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads `path` when given, otherwise starts from defaults, then applies
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => {
                let raw = fs::read_to_string(p).map_err(|source| ConfigError::Read {
                    path: p.display().to_string(),
                    source,
                })?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.database_url = Some(resolve_database_url(self.database_url.as_deref()));
        if let Some(days) = env_config::parse_env_override::<u32>(WINDOW_DAYS_VAR)? {
            self.window_days = days;
        }
        if self.window_days == 0 {
            return Err(ConfigError::EmptyWindow);
        }
        Ok(())
    }

    /// The database to use, falling back to the environment and the built-in default.
    pub fn database_url(&self) -> String {
        resolve_database_url(self.database_url.as_deref())
    }

    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions {
            window_days: self.window_days,
            max_retries: self.max_retries,
            base_delay: Duration::from_millis(self.base_delay_ms),
            requests_per_second: self.requests_per_second,
        }
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.symbols
            .iter()
            .map(|(ticker, name)| Symbol::new(ticker, name.clone()))
            .collect()
    }
}
