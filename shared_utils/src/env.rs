use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, MissingEnvVarError> {
    std::env::var(name).map_err(|_| MissingEnvVarError(name.to_string()))
}

/// Reads an optional environment variable. Unset and blank values both map to `None`.
pub fn optional_env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn missing_var_reports_its_name() {
        unsafe { std::env::remove_var("SHARED_UTILS_TEST_MISSING") };
        let err = get_env_var("SHARED_UTILS_TEST_MISSING").unwrap_err();
        assert_eq!(err.0, "SHARED_UTILS_TEST_MISSING");
    }

    #[test]
    #[serial]
    fn blank_optional_var_is_none() {
        unsafe { std::env::set_var("SHARED_UTILS_TEST_BLANK", "   ") };
        assert_eq!(optional_env_var("SHARED_UTILS_TEST_BLANK"), None);
        unsafe { std::env::remove_var("SHARED_UTILS_TEST_BLANK") };
    }
}
