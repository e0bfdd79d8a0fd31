use std::str::FromStr;

use thiserror::Error;

use crate::env::optional_env_var;

/// Environment variable that takes precedence over any configured database location.
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Database used when neither the environment nor a config file names one.
pub const DEFAULT_DATABASE_URL: &str = "stock_ml.db";

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable is set but its value cannot be parsed.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar { name: String, value: String },
}

/// Resolves the database location.
///
/// Priority: `DATABASE_URL` > value from the config file > [`DEFAULT_DATABASE_URL`].
pub fn resolve_database_url(configured: Option<&str>) -> String {
    optional_env_var(DATABASE_URL_VAR)
        .or_else(|| configured.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string())
}

/// Parses an optional override from the environment.
///
/// Returns `Ok(None)` when the variable is unset, and an error when it is set
/// to something that does not parse as `T`.
pub fn parse_env_override<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match optional_env_var(name) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvVar {
                name: name.to_string(),
                value: raw,
            }),
    }
}
