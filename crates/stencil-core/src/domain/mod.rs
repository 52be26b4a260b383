//! Core domain layer for Stencil.
//!
//! Pure logic only: template tiers, descriptors, placeholder rendering and
//! the materialization request/result types. All I/O goes through the ports
//! defined in the application layer.
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Immutable descriptors**: templates are built once and only read

pub mod entities;
pub mod error;
pub mod value_objects;

mod validation;

pub use entities::{
    common::{Permissions, RelativePath},
    materialization::{MaterializationRequest, MaterializationResult, validate_project_name},
    project_structure::{DirectoryToCreate, FileToWrite, FsEntry, ProjectStructure},
    template::{
        DirectorySpec, FileSpec, RenderContext, TemplateBuilder, TemplateContent,
        TemplateDescriptor, TemplateMetadata, TemplateNode, TemplateSource, TemplateTree,
    },
};

pub use error::{DomainError, ErrorCategory};
pub use validation::DomainValidator;
pub use value_objects::TemplateTier;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn rel(path: &str) -> RelativePath {
        RelativePath::try_new(path).unwrap()
    }

    // ========================================================================
    // Tier Tests
    // ========================================================================

    #[test]
    fn tier_parses_canonical_names() {
        for tier in TemplateTier::ALL {
            assert_eq!(TemplateTier::from_str(tier.as_str()).unwrap(), tier);
        }
    }

    #[test]
    fn tier_parsing_ignores_case_and_padding() {
        assert_eq!(
            TemplateTier::from_str("  Hello-World ").unwrap(),
            TemplateTier::HelloWorld
        );
    }

    #[test]
    fn tier_rejects_near_misses() {
        for bad in ["hello_world", "helloworld", "production", "", "nonexistent-tier"] {
            assert!(
                matches!(
                    TemplateTier::from_str(bad),
                    Err(DomainError::UnknownTemplate { .. })
                ),
                "accepted: {bad}"
            );
        }
    }

    #[test]
    fn tier_serializes_as_kebab_case() {
        let json = serde_json::to_string(&TemplateTier::ProductionReady).unwrap();
        assert_eq!(json, "\"production-ready\"");
    }

    #[test]
    fn unknown_template_is_not_found() {
        let err = TemplateTier::from_str("nope").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert!(err.suggestions().iter().any(|s| s.contains("intermediate-api")));
    }

    // ========================================================================
    // Project Structure Tests
    // ========================================================================

    #[test]
    fn project_structure_builds_correctly() {
        let structure = ProjectStructure::new("/tmp/test")
            .with_directory(rel("app"), Permissions::read_write())
            .with_file(rel("app/main.py"), "app = None".into(), Permissions::read_write());

        assert_eq!(structure.entry_count(), 2);
        assert_eq!(structure.file_count(), 1);
        assert_eq!(structure.directories().count(), 1);
        assert!(structure.validate().is_ok());
    }

    #[test]
    fn project_structure_validates_duplicates() {
        let structure = ProjectStructure::new("/tmp/test")
            .with_file(rel("main.py"), "".into(), Permissions::read_write())
            .with_file(rel("main.py"), "".into(), Permissions::read_write());

        assert!(structure.validate().is_err());
    }

    #[test]
    fn project_structure_validates_empty() {
        let structure = ProjectStructure::new("/tmp/test");
        assert!(structure.validate().is_err());
    }

    // ========================================================================
    // Render Context Tests
    // ========================================================================

    #[test]
    fn render_context_standard_variables() {
        let ctx = RenderContext::new("my awesome project");

        assert_eq!(ctx.get("PROJECT_NAME"), Some("my awesome project"));
        assert_eq!(ctx.get("PROJECT_NAME_SNAKE"), Some("my_awesome_project"));
        assert_eq!(ctx.get("PROJECT_NAME_KEBAB"), Some("my-awesome-project"));
        assert_eq!(ctx.get("PROJECT_NAME_PASCAL"), Some("MyAwesomeProject"));
    }

    #[test]
    fn render_context_renders_title_field() {
        let ctx = RenderContext::new("Demo");
        let template = "app = FastAPI(title=\"{{PROJECT_NAME}}\", version=\"1.0.0\")";

        assert_eq!(
            ctx.render(template),
            "app = FastAPI(title=\"Demo\", version=\"1.0.0\")"
        );
    }

    #[test]
    fn validator_delegates_project_name_rules() {
        assert!(DomainValidator::validate_project_name("Demo").is_ok());
        assert!(DomainValidator::validate_project_name("").is_err());
    }
}
