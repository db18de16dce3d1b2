//! Environment variable expansion for configuration strings.
//!
//! Supports `${VAR}` (errors when unset) and `${VAR:-default}`.

use crate::ConfigError;

/// Expand environment variable references in a configuration value.
///
/// `field` names the configuration field for error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    let context = |var: &str| -> Result<Option<String>, String> {
        if let Some((name, default)) = var.split_once(":-") {
            return Ok(Some(
                std::env::var(name).unwrap_or_else(|_| default.to_owned()),
            ));
        }
        match std::env::var(var) {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(format!("${{{var}}} not set")),
        }
    };

    shellexpand::env_with_context(value, context)
        .map(std::borrow::Cow::into_owned)
        .map_err(|err| ConfigError::EnvVar {
            field: field.to_owned(),
            message: err.cause,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_passes_through() {
        assert_eq!(expand_env("plain", "f").unwrap(), "plain");
    }

    #[test]
    fn test_braced_var_expands() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("SSI_EXPAND_TEST", "value");
        }
        assert_eq!(expand_env("${SSI_EXPAND_TEST}", "f").unwrap(), "value");
        unsafe {
            std::env::remove_var("SSI_EXPAND_TEST");
        }
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SSI_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${SSI_EXPAND_UNSET:-fallback}", "f").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_missing_var_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("SSI_EXPAND_MISSING");
        }
        let err = expand_env("${SSI_EXPAND_MISSING}", "locals.title").unwrap_err();
        let ConfigError::EnvVar { field, message } = err else {
            panic!("expected EnvVar error, got {err:?}");
        };
        assert_eq!(field, "locals.title");
        assert!(message.contains("SSI_EXPAND_MISSING"));
    }
}
