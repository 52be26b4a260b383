//! Placeholder substitution renderer.

use std::path::Path;

use stencil_core::{
    application::ports::TemplateRenderer,
    domain::{DomainValidator as validator, ProjectStructure, RenderContext, TemplateDescriptor, TemplateNode},
    error::StencilResult,
};
use tracing::{instrument, trace};

/// Renders every node of a template with [`RenderContext::render`].
///
/// Literal files are copied verbatim; parameterized files get a single
/// substitution pass. Paths are never rewritten.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleRenderer;

impl SimpleRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for SimpleRenderer {
    #[instrument(skip_all, fields(template = %template.id()))]
    fn render(
        &self,
        template: &TemplateDescriptor,
        context: &RenderContext,
        output_root: &Path,
    ) -> StencilResult<ProjectStructure> {
        validator::validate_template(template)?;

        let mut structure = ProjectStructure::new(output_root);

        for node in &template.tree.nodes {
            match node {
                TemplateNode::File(spec) => {
                    trace!(path = %spec.path, "Rendering file");
                    let content = spec.content.render(context);
                    structure.add_file(spec.path.clone(), content, spec.permissions);
                }
                TemplateNode::Directory(spec) => {
                    structure.add_directory(spec.path.clone(), spec.permissions);
                }
            }
        }

        validator::validate_project_structure(&structure)?;

        Ok(structure)
    }
}
