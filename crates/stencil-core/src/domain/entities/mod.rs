pub mod common;
pub mod materialization;
pub mod project_structure;
pub mod template;

pub use crate::domain::DomainError;
pub use materialization::{MaterializationRequest, MaterializationResult};
pub use project_structure::ProjectStructure;
pub use template::TemplateDescriptor;
