//! Error handling for the Stencil CLI.
//!
//! Provides structured errors with:
//! - User-friendly messages
//! - Actionable suggestions
//! - Exit code mapping

use std::error::Error;

use owo_colors::OwoColorize;
use thiserror::Error;

use stencil_core::error::StencilError;

use stencil_core::error::ErrorCategory as CoreCategory;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input that clap could not catch.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// A configuration file could not be read, parsed, or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error propagated from `stencil-core`.
    #[error(transparent)]
    Core(#[from] StencilError),

    /// An I/O operation failed.
    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Operation cancelled by user.
    #[error("Operation cancelled")]
    Cancelled,

    /// Feature not available (e.g., interactive mode without feature flag).
    #[error("Feature not available: {feature}")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::IoError {
            message: err.to_string(),
            source: err,
        }
    }
}

impl CliError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
            source: None,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidInput { message } => vec![
                format!("Check your input: {message}"),
                "Use --help for usage information".into(),
            ],

            Self::ConfigError { .. } => vec![
                "Check your config file (stencil config path)".into(),
                "Run 'stencil init --force' to write a fresh default config".into(),
            ],

            Self::Core(core_err) => core_err.suggestions(),

            Self::IoError { message, .. } => vec![
                format!("I/O operation failed: {message}"),
                "Check file permissions".into(),
            ],

            Self::Cancelled => vec!["No changes were made".into()],

            Self::FeatureNotAvailable { feature } => vec![
                format!("The '{feature}' feature is not available in this build"),
                format!("Rebuild with the feature enabled: cargo install stencil-cli --features {feature}"),
            ],
        }
    }

    /// Get the error category for styling and exit codes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidInput { .. } | Self::Cancelled => ErrorCategory::UserError,
            Self::ConfigError { .. } | Self::FeatureNotAvailable { .. } => {
                ErrorCategory::Configuration
            }
            Self::Core(core) => match core.category() {
                CoreCategory::Validation => ErrorCategory::UserError,
                CoreCategory::NotFound => ErrorCategory::NotFound,
                CoreCategory::Internal => ErrorCategory::Internal,
            },
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    /// Exit code to pass to the OS.
    ///
    /// | Category      | Code |
    /// |---------------|------|
    /// | User error    |  2   |
    /// | Not found     |  3   |
    /// | Configuration |  4   |
    /// | Internal      |  1   |
    pub fn exit_code(&self) -> u8 {
        match self.category() {
            ErrorCategory::UserError => 2,
            ErrorCategory::NotFound => 3,
            ErrorCategory::Configuration => 4,
            ErrorCategory::Internal => 1,
        }
    }

    /// Format the error for a terminal, with colors and suggestions.
    pub fn format_colored(&self, verbose: bool) -> String {
        self.render(verbose, true)
    }

    /// Same layout as [`Self::format_colored`] without ANSI codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        self.render(verbose, false)
    }

    fn render(&self, verbose: bool, color: bool) -> String {
        let paint = |text: String, style: fn(&str) -> String| {
            if color { style(&text) } else { text }
        };
        let mut out = String::new();

        out.push_str(&paint(
            format!("\nError: {self}\n"),
            |t| t.red().bold().to_string(),
        ));

        if verbose {
            let mut source = self.source();
            while let Some(err) = source {
                out.push_str(&paint(format!("  Caused by: {err}\n"), |t| {
                    t.dimmed().to_string()
                }));
                source = err.source();
            }
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out.push_str(&paint("\nSuggestions:\n".into(), |t| {
                t.yellow().bold().to_string()
            }));
            for suggestion in &suggestions {
                out.push_str(&format!("  {suggestion}\n"));
            }
        }

        if !verbose {
            out.push_str(&paint(
                "\nUse -v / --verbose for more details.\n".into(),
                |t| t.dimmed().to_string(),
            ));
        }

        out
    }

    /// Machine-readable form for `--output-format json`.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.to_string(),
            "category": format!("{:?}", self.category()),
            "exit_code": self.exit_code(),
            "suggestions": self.suggestions(),
        })
    }

    /// Log the error using tracing.
    pub fn log(&self) {
        // Display already carries the kind prefix.
        let category = self.category();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, "{self}")
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(?category, "{self}")
            }
        }

        if let Some(source) = self.source() {
            tracing::debug!("Caused by: {}", source);
        }
    }
}

/// Error categories for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

// ── IntoCli trait ─────────────────────────────────────────────────────────────

/// Attach a context message when converting a foreign error into [`CliError`].
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|e| CliError::IoError {
            message: f().into(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{io, path::PathBuf};

    use stencil_core::{application::ApplicationError, domain::DomainError};

    use super::*;

    fn unknown_template() -> CliError {
        StencilError::from(DomainError::UnknownTemplate {
            name: "nope".into(),
            available: "hello-world, intermediate-api, production-ready".into(),
        })
        .into()
    }

    fn conflict() -> CliError {
        StencilError::from(ApplicationError::DestinationConflict {
            path: PathBuf::from("/tmp/demo"),
            reason: "directory already contains files".into(),
        })
        .into()
    }

    // ── exit codes ────────────────────────────────────────────────────────

    #[test]
    fn unknown_template_exits_not_found() {
        let err = unknown_template();
        assert_eq!(err.exit_code(), 3);
        let hints = err.suggestions();
        assert_eq!(hints.iter().filter(|s| s.contains("stencil list")).count(), 1);
    }

    #[test]
    fn config_error_message_has_one_prefix() {
        let msg = CliError::config("unknown key 'x'").to_string();
        assert_eq!(msg, "Configuration error: unknown key 'x'");
        let plain = CliError::config("unknown key 'x'").format_plain(false);
        assert_eq!(plain.matches("Configuration error").count(), 1);
    }

    #[test]
    fn destination_conflict_is_a_user_error() {
        assert_eq!(conflict().exit_code(), 2);
    }

    #[test]
    fn invalid_project_name_is_a_user_error() {
        let err: CliError = StencilError::from(DomainError::InvalidProjectName {
            name: "".into(),
            reason: "name cannot be empty".into(),
        })
        .into();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn write_failure_is_internal() {
        let err: CliError = StencilError::from(ApplicationError::WriteFailure {
            path: PathBuf::from("/tmp/demo/main.py"),
            reason: "permission denied".into(),
        })
        .into();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn exit_code_configuration() {
        assert_eq!(CliError::config("bad toml").exit_code(), 4);
    }

    #[test]
    fn cancelled_is_a_user_error() {
        assert_eq!(CliError::Cancelled.exit_code(), 2);
    }

    // ── format ────────────────────────────────────────────────────────────

    #[test]
    fn format_plain_contains_error_header() {
        let s = conflict().format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains("/tmp/demo"));
    }

    #[test]
    fn format_plain_verbose_omits_hint() {
        let s = CliError::Cancelled.format_plain(true);
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn json_form_carries_exit_code() {
        let json = unknown_template().to_json();
        assert_eq!(json["exit_code"], 3);
        assert!(json["error"].as_str().unwrap().contains("nope"));
    }

    // ── IntoCli ───────────────────────────────────────────────────────────

    #[test]
    fn into_cli_io_error() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli: CliResult<()> = result.with_cli_context(|| "reading config");
        assert!(matches!(cli, Err(CliError::IoError { .. })));
    }
}
