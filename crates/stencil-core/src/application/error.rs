//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Destination exists and is not an empty directory.
    #[error("Destination {path} is not empty: {reason}")]
    DestinationConflict { path: PathBuf, reason: String },

    /// A filesystem write failed; nothing was left behind.
    #[error("Failed to write {path}: {reason}")]
    WriteFailure { path: PathBuf, reason: String },

    /// The store has no descriptor for a tier that parsed successfully.
    #[error("Template '{tier}' is not available in the template store")]
    TemplateUnavailable { tier: String },

    /// Store access failed (lock poisoned).
    #[error("Template store error")]
    StoreLockError,

    /// Rollback failed (best-effort cleanup failed).
    #[error("Rollback failed for {path}: {reason}")]
    RollbackFailed { path: PathBuf, reason: String },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DestinationConflict { path, .. } => vec![
                format!("Existing content at: {}", path.display()),
                "Choose a different project name or --path".into(),
                "Or empty the directory and run again".into(),
            ],
            Self::WriteFailure { path, .. } => vec![
                format!("Failed to write: {}", path.display()),
                "Check that you have write permissions".into(),
                "Check available disk space".into(),
                "No partial output was left behind".into(),
            ],
            Self::RollbackFailed { path, .. } => vec![
                format!("Leftover files may remain at: {}", path.display()),
                "Remove them manually before retrying".into(),
            ],
            Self::TemplateUnavailable { .. } => vec![
                "The template store is missing a built-in tier".into(),
                "Drop --templates-dir to use the built-in templates".into(),
            ],
            Self::StoreLockError => vec!["Check the error details above".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DestinationConflict { .. } => ErrorCategory::Validation,
            Self::TemplateUnavailable { .. } => ErrorCategory::NotFound,
            Self::WriteFailure { .. }
            | Self::RollbackFailed { .. }
            | Self::StoreLockError => ErrorCategory::Internal,
        }
    }
}
