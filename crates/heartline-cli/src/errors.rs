//! CLI error types for structured error handling.
//!
//! This module provides typed errors that map to specific exit codes,
//! enabling consistent error handling across the CLI.

use std::fmt;

use heartline_core::HeartlineError;

/// CLI-specific errors with associated exit codes.
#[derive(Debug)]
pub enum CliError {
    /// Resource not found (config, data directory)
    NotFound { message: String, hint: String },

    /// Invalid user input
    InvalidInput(String),

    /// A submission is already in flight
    Busy(String),

    /// Config file unreadable or inconsistent
    Config {
        message: String,
        hint: Option<String>,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::NotFound { message, hint } => {
                write!(f, "{}\n{}", message, hint)
            }
            CliError::Config { message, hint } => {
                if let Some(h) = hint {
                    write!(f, "{}\n{}", message, h)
                } else {
                    write!(f, "{}", message)
                }
            }
            CliError::InvalidInput(message) | CliError::Busy(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for CliError {}

impl From<HeartlineError> for CliError {
    fn from(err: HeartlineError) -> Self {
        match err {
            HeartlineError::InvalidInput(message) => CliError::InvalidInput(message),
            HeartlineError::Busy(message) => CliError::Busy(message),
            other => CliError::Config {
                message: other.to_string(),
                hint: None,
            },
        }
    }
}

impl CliError {
    /// Create a NotFound error with message and hint.
    pub fn not_found(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::NotFound {
            message: message.into(),
            hint: hint.into(),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        CliError::InvalidInput(message.into())
    }

    /// Create a Config error with message and hint.
    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        CliError::Config {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Message without the hint line.
    pub fn message(&self) -> &str {
        match self {
            CliError::NotFound { message, .. }
            | CliError::Config { message, .. }
            | CliError::InvalidInput(message)
            | CliError::Busy(message) => message,
        }
    }

    /// Hint line, if any.
    pub fn hint(&self) -> Option<&str> {
        match self {
            CliError::NotFound { hint, .. } => Some(hint),
            CliError::Config { hint, .. } => hint.as_deref(),
            CliError::InvalidInput(_) | CliError::Busy(_) => None,
        }
    }

    /// Get the exit code for this error.
    pub fn exit_code(&self) -> i32 {
        use super::constants::exit_codes;
        match self {
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::InvalidInput(_) => exit_codes::INVALID_INPUT,
            CliError::Busy(_) => exit_codes::BUSY,
            CliError::Config { .. } => exit_codes::CONFIG,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::not_found("x", "y").exit_code(), 3);
        assert_eq!(CliError::invalid_input("x").exit_code(), 4);
        assert_eq!(CliError::config_with_hint("x", "y").exit_code(), 6);
    }

    #[test]
    fn test_core_errors_map_to_cli_errors() {
        let err: CliError = HeartlineError::InvalidInput("Please enter both names".into()).into();
        assert!(matches!(err, CliError::InvalidInput(_)));

        let err: CliError = HeartlineError::Busy("in flight".into()).into();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_display_includes_hint() {
        let err = CliError::not_found("No config", "Hint: Run `heartline init`.");
        assert_eq!(err.to_string(), "No config\nHint: Run `heartline init`.");
        assert_eq!(err.message(), "No config");
        assert_eq!(err.hint(), Some("Hint: Run `heartline init`."));
    }
}
