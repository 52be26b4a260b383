//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `stencil-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{ProjectStructure, RenderContext, TemplateDescriptor, TemplateTier};
use crate::error::StencilResult;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stencil_adapters::filesystem::LocalFilesystem` (production)
/// - `stencil_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Write operations report failures as `ApplicationError::WriteFailure`
/// carrying the underlying cause.
#[cfg_attr(test, mockall::automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StencilResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> StencilResult<()>;

    /// Set file permissions.
    fn set_permissions(&self, path: &Path, executable: bool) -> StencilResult<()>;

    /// Check if path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// `true` when `path` itself is a symbolic link.
    fn is_symlink(&self, path: &Path) -> bool;

    /// `true` when `path` is a directory with no entries.
    fn is_empty_dir(&self, path: &Path) -> StencilResult<bool>;

    /// Move `from` to `to` in one step.
    fn rename(&self, from: &Path, to: &Path) -> StencilResult<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> StencilResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> StencilResult<()>;
}

/// Port for template storage and retrieval.
///
/// Implemented by:
/// - `stencil_adapters::template_store::InMemoryStore` (built-in templates,
///   optionally overridden from a local directory)
pub trait TemplateStore: Send + Sync {
    /// Get the descriptor for a tier.
    fn get(&self, tier: TemplateTier) -> StencilResult<TemplateDescriptor>;

    /// List all available templates, in tier order.
    fn list(&self) -> StencilResult<Vec<TemplateDescriptor>>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `stencil_adapters::renderer::SimpleRenderer` (placeholder substitution)
pub trait TemplateRenderer: Send + Sync {
    /// Render a template into a project structure.
    ///
    /// # Arguments
    ///
    /// * `template` - The template to render
    /// * `context` - Variable substitution context
    /// * `output_root` - Root directory for output paths
    fn render(
        &self,
        template: &TemplateDescriptor,
        context: &RenderContext,
        output_root: &Path,
    ) -> StencilResult<ProjectStructure>;
}
