//! Materialize Service - main application orchestrator.
//!
//! This service coordinates the whole materialization workflow:
//! 1. Parse the template name and resolve the project name
//! 2. Check the destination for conflicts
//! 3. Render the template with the project's render context
//! 4. Stage the tree beside the destination, then rename it into place
//!
//! Either every file of the template lands in the destination or nothing
//! does.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateRenderer, TemplateStore},
    },
    domain::{
        DomainValidator as validator, FsEntry, MaterializationRequest, MaterializationResult,
        ProjectStructure, RenderContext, TemplateDescriptor, TemplateTier,
    },
    error::StencilResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub tier: TemplateTier,
    pub name: String,
    pub version: String,
    pub description: String,
    pub file_count: usize,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub next_steps: Vec<String>,
}

impl From<&TemplateDescriptor> for TemplateInfo {
    fn from(t: &TemplateDescriptor) -> Self {
        Self {
            tier: t.tier,
            name: t.metadata.name.clone(),
            version: t.metadata.version.clone(),
            description: t.metadata.description.clone(),
            file_count: t.file_count(),
            tags: t.metadata.tags.clone(),
            next_steps: t.metadata.next_steps.clone(),
        }
    }
}

/// Main materialization service.
pub struct MaterializeService {
    store: Box<dyn TemplateStore>,
    renderer: Box<dyn TemplateRenderer>,
    filesystem: Box<dyn Filesystem>,
}

impl MaterializeService {
    /// Create a new service with the given adapters.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use stencil_core::application::MaterializeService;
    ///
    /// let service = MaterializeService::new(
    ///     store,      // impl TemplateStore
    ///     renderer,   // impl TemplateRenderer
    ///     filesystem, // impl Filesystem
    /// );
    /// ```
    pub fn new(
        store: Box<dyn TemplateStore>,
        renderer: Box<dyn TemplateRenderer>,
        filesystem: Box<dyn Filesystem>,
    ) -> Self {
        Self {
            store,
            renderer,
            filesystem,
        }
    }

    /// Write a template tier into `destination`.
    ///
    /// `project_name` defaults to the destination's final path component.
    ///
    /// # Errors
    ///
    /// - `UnknownTemplate` if `template_name` is not a tier (nothing written)
    /// - `InvalidProjectName` if the resolved name is rejected
    /// - `DestinationConflict` if `destination` is a file or a non-empty
    ///   directory (nothing touched)
    /// - `WriteFailure` if any write fails (staged output removed)
    #[instrument(
        skip_all,
        fields(
            template = %template_name,
            destination = %destination.as_ref().display()
        )
    )]
    pub fn materialize(
        &self,
        template_name: &str,
        destination: impl AsRef<Path>,
        project_name: Option<&str>,
    ) -> StencilResult<MaterializationResult> {
        let request =
            MaterializationRequest::parse(template_name, destination.as_ref(), project_name)?;
        self.execute(&request)
    }

    /// Run an already-parsed request.
    #[instrument(
        skip_all,
        fields(tier = %request.tier, destination = %request.destination.display())
    )]
    pub fn execute(&self, request: &MaterializationRequest) -> StencilResult<MaterializationResult> {
        let project_name = request.resolved_project_name()?;
        let replace_empty_dir = self.check_destination(&request.destination)?;

        let template = self.store.get(request.tier)?;
        info!(template = %template.id(), files = template.file_count(), "Template resolved");

        let staging = staging_path(&request.destination);
        let structure = self.render(&template, &project_name, &staging)?;

        self.commit(&structure, &request.destination, replace_empty_dir)?;

        let files = structure
            .files()
            .map(|f| f.path.to_slash_string())
            .collect::<Vec<_>>();
        info!(
            files = files.len(),
            destination = %request.destination.display(),
            "Materialization completed"
        );

        Ok(MaterializationResult {
            tier: request.tier,
            destination: request.destination.clone(),
            project_name,
            files,
        })
    }

    /// Render the structure a request would write, touching nothing.
    pub fn plan(&self, request: &MaterializationRequest) -> StencilResult<ProjectStructure> {
        let project_name = request.resolved_project_name()?;
        let template = self.store.get(request.tier)?;
        self.render(&template, &project_name, &request.destination)
    }

    /// List all available templates, in tier order.
    pub fn list_templates(&self) -> StencilResult<Vec<TemplateInfo>> {
        let templates = self.store.list()?;
        Ok(templates.iter().map(TemplateInfo::from).collect())
    }

    /// Metadata for one tier.
    pub fn template_info(&self, tier: TemplateTier) -> StencilResult<TemplateInfo> {
        Ok(TemplateInfo::from(&self.store.get(tier)?))
    }

    // -------------------------------------------------------------------------
    // Internal Helpers
    // -------------------------------------------------------------------------

    fn render(
        &self,
        template: &TemplateDescriptor,
        project_name: &str,
        root: &Path,
    ) -> StencilResult<ProjectStructure> {
        let context = RenderContext::new(project_name);
        let structure = self.renderer.render(template, &context, root)?;
        validator::validate_project_structure(&structure)?;
        Ok(structure)
    }

    /// Returns `true` when the destination is an existing empty directory
    /// that must be swapped out on commit.
    fn check_destination(&self, destination: &Path) -> StencilResult<bool> {
        if !self.filesystem.exists(destination) {
            return Ok(false);
        }

        if self.filesystem.is_symlink(destination) {
            return Err(ApplicationError::DestinationConflict {
                path: destination.to_path_buf(),
                reason: "a symbolic link already exists at this path".into(),
            }
            .into());
        }

        if !self.filesystem.is_dir(destination) {
            return Err(ApplicationError::DestinationConflict {
                path: destination.to_path_buf(),
                reason: "a file already exists at this path".into(),
            }
            .into());
        }

        if self.filesystem.is_empty_dir(destination)? {
            debug!(path = %destination.display(), "Destination is an empty directory");
            Ok(true)
        } else {
            Err(ApplicationError::DestinationConflict {
                path: destination.to_path_buf(),
                reason: "directory already contains files".into(),
            }
            .into())
        }
    }

    /// Stage everything, then move it into place.
    fn commit(
        &self,
        structure: &ProjectStructure,
        destination: &Path,
        replace_empty_dir: bool,
    ) -> StencilResult<()> {
        let staging = structure.root();

        let created = self.missing_ancestors(destination);
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = self.filesystem.create_dir_all(parent) {
                self.rollback(staging, &created);
                return Err(e);
            }
        }

        if let Err(e) = self.write_all(structure) {
            warn!(error = %e, "Write failed, rolling back staged files");
            self.rollback(staging, &created);
            return Err(e);
        }

        if replace_empty_dir {
            if let Err(e) = self.filesystem.remove_dir(destination) {
                self.rollback(staging, &created);
                return Err(e);
            }
        }

        if let Err(e) = self.filesystem.rename(staging, destination) {
            warn!(error = %e, "Final rename failed, rolling back staged files");
            self.rollback(staging, &created);
            if replace_empty_dir {
                if let Err(restore) = self.filesystem.create_dir_all(destination) {
                    warn!(
                        error = %restore,
                        path = %destination.display(),
                        "Could not restore the emptied destination directory"
                    );
                }
            }
            return Err(e);
        }

        Ok(())
    }

    /// Ancestors of `destination` that do not exist yet, deepest first.
    ///
    /// Stops at the filesystem root, which is never created or removed.
    fn missing_ancestors(&self, destination: &Path) -> Vec<PathBuf> {
        destination
            .ancestors()
            .skip(1)
            .take_while(|dir| {
                !dir.as_os_str().is_empty()
                    && dir.parent().is_some()
                    && !self.filesystem.exists(dir)
            })
            .map(Path::to_path_buf)
            .collect()
    }

    fn write_all(&self, structure: &ProjectStructure) -> StencilResult<()> {
        let root = structure.root();
        self.filesystem.create_dir_all(root)?;

        for entry in structure.entries() {
            match entry {
                FsEntry::Directory(dir) => {
                    self.filesystem.create_dir_all(&root.join(dir.path.as_path()))?;
                }
                FsEntry::File(file) => {
                    let path = root.join(file.path.as_path());

                    if let Some(parent) = path.parent() {
                        self.filesystem.create_dir_all(parent)?;
                    }

                    debug!(path = %file.path, bytes = file.size(), "Writing file");
                    self.filesystem.write_file(&path, &file.content)?;

                    if file.permissions.executable_flag() {
                        self.filesystem.set_permissions(&path, true)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Best-effort rollback on failure.
    ///
    /// Removes the staging tree, then the parent directories this run
    /// created, deepest first. A parent that is no longer empty stays.
    fn rollback(&self, staging: &Path, created_parents: &[PathBuf]) {
        if self.filesystem.exists(staging) {
            if let Err(e) = self.filesystem.remove_dir_all(staging) {
                let failure = ApplicationError::RollbackFailed {
                    path: staging.to_path_buf(),
                    reason: e.to_string(),
                };
                warn!(error = %failure, "Rollback failed");
                return;
            }
            info!(path = %staging.display(), "Rollback successful");
        }

        for dir in created_parents {
            if !self.filesystem.exists(dir) {
                continue;
            }
            if let Err(e) = self.filesystem.remove_dir(dir) {
                warn!(error = %e, path = %dir.display(), "Left created parent directory in place");
                break;
            }
            debug!(path = %dir.display(), "Removed created parent directory");
        }
    }
}

/// Hidden sibling of `destination` used to stage writes.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    let staged = format!(".{name}.stencil-staging-{}", Uuid::new_v4().simple());

    match destination.parent() {
        Some(parent) => parent.join(staged),
        None => PathBuf::from(staged),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{
        application::ports::output::MockFilesystem,
        domain::{FileSpec, RelativePath, TemplateContent, TemplateMetadata},
        error::StencilError,
    };

    struct FixedStore(Vec<TemplateDescriptor>);

    impl TemplateStore for FixedStore {
        fn get(&self, tier: TemplateTier) -> StencilResult<TemplateDescriptor> {
            self.0
                .iter()
                .find(|t| t.tier == tier)
                .cloned()
                .ok_or_else(|| {
                    ApplicationError::TemplateUnavailable {
                        tier: tier.to_string(),
                    }
                    .into()
                })
        }

        fn list(&self) -> StencilResult<Vec<TemplateDescriptor>> {
            Ok(self.0.clone())
        }
    }

    struct PlainRenderer;

    impl TemplateRenderer for PlainRenderer {
        fn render(
            &self,
            template: &TemplateDescriptor,
            context: &RenderContext,
            output_root: &Path,
        ) -> StencilResult<ProjectStructure> {
            let mut structure = ProjectStructure::new(output_root);
            for file in template.tree.files() {
                structure.add_file(
                    file.path.clone(),
                    file.content.render(context),
                    file.permissions,
                );
            }
            Ok(structure)
        }
    }

    fn hello_world() -> TemplateDescriptor {
        TemplateDescriptor::builder(TemplateTier::HelloWorld)
            .metadata(TemplateMetadata::new("Hello World").version("1.0.0"))
            .add_node(
                FileSpec::new(
                    RelativePath::try_new("main.py").unwrap(),
                    TemplateContent::detect("app = FastAPI(title=\"{{PROJECT_NAME}}\")\n"),
                )
                .into(),
            )
            .add_node(
                FileSpec::new(
                    RelativePath::try_new("requirements.txt").unwrap(),
                    TemplateContent::detect("fastapi[standard]\n"),
                )
                .into(),
            )
            .build()
            .unwrap()
    }

    fn service(fs: MockFilesystem) -> MaterializeService {
        MaterializeService::new(
            Box::new(FixedStore(vec![hello_world()])),
            Box::new(PlainRenderer),
            Box::new(fs),
        )
    }

    /// A mock that accepts every write and records written paths.
    fn recording_fs(written: Arc<Mutex<Vec<(PathBuf, String)>>>) -> MockFilesystem {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(move |path, content| {
            written
                .lock()
                .unwrap()
                .push((path.to_path_buf(), content.to_string()));
            Ok(())
        });
        fs.expect_rename().times(1).returning(|_, _| Ok(()));
        fs
    }

    #[test]
    fn materialize_writes_every_file_with_title() {
        let written = Arc::new(Mutex::new(Vec::new()));
        let service = service(recording_fs(written.clone()));

        let result = service
            .materialize("hello-world", "/tmp/demo", Some("Demo"))
            .unwrap();

        assert_eq!(result.tier, TemplateTier::HelloWorld);
        assert_eq!(result.project_name, "Demo");
        assert_eq!(result.files, vec!["main.py", "requirements.txt"]);

        let written = written.lock().unwrap();
        let main = written
            .iter()
            .find(|(p, _)| p.ends_with("main.py"))
            .unwrap();
        assert!(main.1.contains("title=\"Demo\""));
        // Writes go to the staging sibling, never straight into the destination.
        assert!(written.iter().all(|(p, _)| !p.starts_with("/tmp/demo/")));
        assert!(written.iter().all(|(p, _)| p.starts_with("/tmp")));
    }

    #[test]
    fn unknown_template_touches_nothing() {
        // No expectations: any filesystem call panics.
        let service = service(MockFilesystem::new());

        let err = service
            .materialize("nonexistent-tier", "/tmp/demo2", Some("X"))
            .unwrap_err();

        assert!(err.is_unknown_template());
    }

    #[test]
    fn invalid_project_name_is_rejected_before_io() {
        let service = service(MockFilesystem::new());

        let err = service
            .materialize("hello-world", "/tmp/demo", Some("   "))
            .unwrap_err();

        assert!(matches!(
            err,
            StencilError::Domain(crate::domain::DomainError::InvalidProjectName { .. })
        ));
    }

    #[test]
    fn non_empty_destination_is_a_conflict() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_symlink().returning(|_| false);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_is_empty_dir().returning(|_| Ok(false));
        fs.expect_write_file().never();
        fs.expect_create_dir_all().never();

        let err = service(fs)
            .materialize("hello-world", "/tmp/demo", Some("Y"))
            .unwrap_err();

        assert!(err.is_destination_conflict());
    }

    #[test]
    fn file_at_destination_is_a_conflict() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_symlink().returning(|_| false);
        fs.expect_is_dir().returning(|_| false);
        fs.expect_write_file().never();

        let err = service(fs)
            .materialize("hello-world", "/tmp/demo", None)
            .unwrap_err();

        assert!(err.is_destination_conflict());
    }

    #[test]
    fn symlink_at_destination_is_a_conflict() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| true);
        fs.expect_is_symlink().returning(|_| true);
        fs.expect_is_dir().never();
        fs.expect_remove_dir().never();
        fs.expect_write_file().never();

        let err = service(fs)
            .materialize("hello-world", "/tmp/link", Some("Demo"))
            .unwrap_err();

        assert!(err.is_destination_conflict());
        assert!(err.to_string().contains("symbolic link"));
    }

    #[test]
    fn empty_destination_directory_is_replaced() {
        let mut fs = MockFilesystem::new();
        let dest = PathBuf::from("/tmp/demo");
        let known = dest.clone();
        fs.expect_exists().returning(move |p| p == known);
        fs.expect_is_symlink().returning(|_| false);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_is_empty_dir().returning(|_| Ok(true));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|_, _| Ok(()));
        let removed = dest.clone();
        fs.expect_remove_dir()
            .withf(move |p| p == removed)
            .times(1)
            .returning(|_| Ok(()));
        let target = dest.clone();
        fs.expect_rename()
            .withf(move |_, to| to == target)
            .times(1)
            .returning(|_, _| Ok(()));

        let result = service(fs).materialize("hello-world", &dest, None).unwrap();

        assert_eq!(result.project_name, "demo");
        assert_eq!(result.file_count(), 2);
    }

    #[test]
    fn write_failure_rolls_back_staging() {
        let mut fs = MockFilesystem::new();
        let staged = Arc::new(Mutex::new(HashSet::new()));

        let created = staged.clone();
        fs.expect_create_dir_all().returning(move |p| {
            created.lock().unwrap().insert(p.to_path_buf());
            Ok(())
        });
        let known = staged.clone();
        fs.expect_exists()
            .returning(move |p| known.lock().unwrap().contains(p));
        fs.expect_write_file().returning(|path, _| {
            if path.ends_with("requirements.txt") {
                Err(ApplicationError::WriteFailure {
                    path: path.to_path_buf(),
                    reason: "No space left on device".into(),
                }
                .into())
            } else {
                Ok(())
            }
        });
        fs.expect_remove_dir_all()
            .withf(|p| {
                p.file_name()
                    .is_some_and(|n| n.to_string_lossy().starts_with(".demo.stencil-staging-"))
            })
            .times(1)
            .returning(|_| Ok(()));
        // "/tmp" did not exist before the run, so it goes too.
        fs.expect_remove_dir()
            .withf(|p| p == Path::new("/tmp"))
            .times(1)
            .returning(|_| Ok(()));
        fs.expect_rename().never();

        let err = service(fs)
            .materialize("hello-world", "/tmp/demo", Some("Demo"))
            .unwrap_err();

        assert!(err.is_write_failure());
        assert!(err.to_string().contains("No space left on device"));
    }

    #[test]
    fn failed_rename_rolls_back_staging() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists()
            .returning(|p| p.to_string_lossy().contains("stencil-staging"));
        fs.expect_create_dir_all().returning(|_| Ok(()));
        fs.expect_write_file().returning(|_, _| Ok(()));
        fs.expect_rename().returning(|from, _| {
            Err(ApplicationError::WriteFailure {
                path: from.to_path_buf(),
                reason: "cross-device link".into(),
            }
            .into())
        });
        fs.expect_remove_dir_all()
            .times(1)
            .returning(|_| Ok(()));

        let err = service(fs)
            .materialize("hello-world", "/tmp/demo", Some("Demo"))
            .unwrap_err();

        assert!(err.is_write_failure());
    }

    #[test]
    fn failed_restore_keeps_the_rename_error() {
        let mut fs = MockFilesystem::new();
        let dest = PathBuf::from("/tmp/demo");
        let known = dest.clone();
        fs.expect_exists()
            .returning(move |p| p == known || p.to_string_lossy().contains("stencil-staging"));
        fs.expect_is_symlink().returning(|_| false);
        fs.expect_is_dir().returning(|_| true);
        fs.expect_is_empty_dir().returning(|_| Ok(true));
        let target = dest.clone();
        fs.expect_create_dir_all().returning(move |p| {
            if p == target {
                Err(ApplicationError::WriteFailure {
                    path: p.to_path_buf(),
                    reason: "read-only file system".into(),
                }
                .into())
            } else {
                Ok(())
            }
        });
        fs.expect_write_file().returning(|_, _| Ok(()));
        fs.expect_remove_dir().times(1).returning(|_| Ok(()));
        fs.expect_rename().returning(|from, _| {
            Err(ApplicationError::WriteFailure {
                path: from.to_path_buf(),
                reason: "cross-device link".into(),
            }
            .into())
        });
        fs.expect_remove_dir_all().times(1).returning(|_| Ok(()));

        let err = service(fs)
            .materialize("hello-world", &dest, Some("Demo"))
            .unwrap_err();

        assert!(err.to_string().contains("cross-device link"));
    }

    #[test]
    fn plan_lists_the_same_files_without_io() {
        let service = service(MockFilesystem::new());
        let request =
            MaterializationRequest::parse("hello-world", "/tmp/demo", Some("Demo")).unwrap();

        let plan = service.plan(&request).unwrap();

        let paths: Vec<_> = plan.files().map(|f| f.path.to_slash_string()).collect();
        assert_eq!(paths, vec!["main.py", "requirements.txt"]);
        assert_eq!(plan.root(), Path::new("/tmp/demo"));
    }

    #[test]
    fn list_templates_reports_metadata() {
        let service = service(MockFilesystem::new());

        let templates = service.list_templates().unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].tier, TemplateTier::HelloWorld);
        assert_eq!(templates[0].version, "1.0.0");
        assert_eq!(templates[0].file_count, 2);
    }

    #[test]
    fn missing_tier_in_store_is_reported() {
        let mut fs = MockFilesystem::new();
        fs.expect_exists().returning(|_| false);

        let err = service(fs)
            .materialize("production-ready", "/tmp/demo", Some("Demo"))
            .unwrap_err();

        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::TemplateUnavailable { .. })
        ));
    }

    #[test]
    fn staging_path_is_a_hidden_sibling() {
        let staging = staging_path(Path::new("/tmp/out/demo"));

        assert_eq!(staging.parent(), Some(Path::new("/tmp/out")));
        let name = staging.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".demo.stencil-staging-"));
    }
}
