//! Unified error handling for Stencil Core.
//!
//! Wraps domain and application errors in one type with user-actionable
//! suggestions and a display category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Stencil Core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StencilError {
    /// Errors from the domain layer (business rule violations).
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error(transparent)]
    Application(#[from] ApplicationError),

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl StencilError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Internal { .. } => vec!["This appears to be a bug in Stencil".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Internal => ErrorCategory::Internal,
            },
            Self::Application(e) => e.category(),
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    pub fn is_unknown_template(&self) -> bool {
        matches!(self, Self::Domain(DomainError::UnknownTemplate { .. }))
    }

    pub fn is_destination_conflict(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::DestinationConflict { .. })
        )
    }

    pub fn is_write_failure(&self) -> bool {
        matches!(self, Self::Application(ApplicationError::WriteFailure { .. }))
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}

/// Convenient result type alias.
pub type StencilResult<T> = Result<T, StencilError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn domain_errors_keep_their_message() {
        let err: StencilError = DomainError::UnknownTemplate {
            name: "x".into(),
            available: "hello-world".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Unknown template 'x' (available: hello-world)");
        assert!(err.is_unknown_template());
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn conflict_is_a_validation_error() {
        let err: StencilError = ApplicationError::DestinationConflict {
            path: PathBuf::from("/tmp/demo"),
            reason: "contains 1 entry".into(),
        }
        .into();
        assert!(err.is_destination_conflict());
        assert_eq!(err.category(), ErrorCategory::Validation);
    }

    #[test]
    fn write_failure_is_internal() {
        let err: StencilError = ApplicationError::WriteFailure {
            path: PathBuf::from("/tmp/demo/main.py"),
            reason: "disk full".into(),
        }
        .into();
        assert!(err.is_write_failure());
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.to_string().contains("disk full"));
    }
}
