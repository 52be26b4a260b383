use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::domain::{error::DomainError, value_objects::TemplateTier};

/// One invocation of the materializer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializationRequest {
    pub tier: TemplateTier,
    pub destination: PathBuf,
    pub project_name: Option<String>,
}

impl MaterializationRequest {
    pub fn new(
        tier: TemplateTier,
        destination: impl Into<PathBuf>,
        project_name: Option<String>,
    ) -> Self {
        Self {
            tier,
            destination: destination.into(),
            project_name,
        }
    }

    /// Build a request from a user-supplied template name.
    ///
    /// # Errors
    ///
    /// `UnknownTemplate` if `template_name` is not one of the tiers.
    pub fn parse(
        template_name: &str,
        destination: impl Into<PathBuf>,
        project_name: Option<&str>,
    ) -> Result<Self, DomainError> {
        let tier = template_name.parse::<TemplateTier>()?;
        Ok(Self::new(tier, destination, project_name.map(str::to_string)))
    }

    /// The name substituted into placeholders.
    ///
    /// Falls back to the destination's last path component when no name
    /// was supplied.
    pub fn resolved_project_name(&self) -> Result<String, DomainError> {
        let name = match &self.project_name {
            Some(name) => name.clone(),
            None => default_name(&self.destination).ok_or_else(|| {
                DomainError::InvalidProjectName {
                    name: self.destination.display().to_string(),
                    reason: "no project name given and the destination has no final component"
                        .into(),
                }
            })?,
        };
        validate_project_name(&name)?;
        Ok(name)
    }
}

fn default_name(destination: &Path) -> Option<String> {
    destination
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

/// Reject names that would produce broken output.
pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
    let reject = |reason: &str| {
        Err(DomainError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.trim().is_empty() {
        return reject("name cannot be empty");
    }
    if name.chars().any(char::is_control) {
        return reject("name cannot contain control characters");
    }
    Ok(())
}

/// Outcome of a successful materialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaterializationResult {
    pub tier: TemplateTier,
    pub destination: PathBuf,
    pub project_name: String,
    /// Files written, relative to `destination`, forward-slash separated.
    pub files: Vec<String>,
}

impl MaterializationResult {
    pub fn file_count(&self) -> usize {
        self.files.len()
    }
}
