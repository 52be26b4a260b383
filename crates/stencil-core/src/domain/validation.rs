use crate::domain::{
    entities::{ProjectStructure, TemplateDescriptor, materialization},
    error::DomainError,
};

/// Centralized domain validation.
///
/// All validation logic lives here, not scattered across entities.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_template(template: &TemplateDescriptor) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_project_structure(structure: &ProjectStructure) -> Result<(), DomainError> {
        structure.validate()
    }

    pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
        materialization::validate_project_name(name)
    }
}
