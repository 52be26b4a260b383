use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Not Found
    // ========================================================================
    #[error("Unknown template '{name}' (available: {available})")]
    UnknownTemplate { name: String, available: String },

    // ========================================================================
    // Validation
    // ========================================================================
    #[error("Invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Template '{template_id}' has no content")]
    EmptyTemplate { template_id: String },

    #[error("Duplicate path in template: {path}")]
    DuplicatePath { path: String },

    #[error("Absolute paths not allowed: {path}")]
    AbsolutePathNotAllowed { path: String },

    #[error("Path escapes the project root: {path}")]
    PathTraversal { path: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::UnknownTemplate { available, .. } => vec![
                format!("Available templates: {available}"),
                "Try: stencil list".into(),
            ],
            Self::InvalidProjectName { reason, .. } => vec![
                format!("Project name rejected: {reason}"),
                "Pass a display name with --title, e.g. --title \"My API\"".into(),
            ],
            Self::EmptyTemplate { template_id } => vec![
                format!("Template '{template_id}' is corrupted"),
                "Check the template directory or drop --templates-dir".into(),
            ],
            Self::InvalidTemplate(_)
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathTraversal { .. } => vec![
                "The template definition is invalid".into(),
                "Fix its template.toml or remove the custom templates directory".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::UnknownTemplate { .. } => ErrorCategory::NotFound,
            Self::InvalidProjectName { .. } => ErrorCategory::Validation,
            Self::InvalidTemplate(_)
            | Self::DuplicatePath { .. }
            | Self::AbsolutePathNotAllowed { .. }
            | Self::PathTraversal { .. } => ErrorCategory::Validation,
            Self::EmptyTemplate { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
