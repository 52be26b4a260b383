//! `template.toml` manifests and the filesystem template loader.
//!
//! A template directory holds one subdirectory per tier:
//!
//! ```text
//! templates/
//! ├── hello-world/
//! │   ├── template.toml        ← manifest (required)
//! │   ├── main.py
//! │   └── requirements.txt
//! └── production-ready/
//!     ├── template.toml
//!     └── app/
//!         └── main.py
//! ```
//!
//! # `template.toml` format
//!
//! ```toml
//! [template]
//! tier    = "hello-world"        # must match the directory name
//! version = "1.0.0"
//!
//! [metadata]
//! name        = "Hello World"
//! description = "Basic FastAPI starter"      # optional
//! tags        = ["fastapi", "starter"]       # optional
//! next_steps  = ["pip install -r requirements.txt"]  # optional
//!
//! # Optional per-file overrides. Files not listed here are auto-detected:
//! # content containing {{ }} is parameterized, everything else literal.
//! [[files]]
//! path       = "run.sh"
//! type       = "literal"        # literal | parameterized
//! executable = true
//!
//! # Directories created even when they hold no files.
//! [[directories]]
//! path = "static"
//! ```
//!
//! The manifest itself is never part of the rendered project.
//!
//! The same manifest handling backs both the built-in templates (embedded
//! with `include_dir`, see [`crate::builtin_templates`]) and user template
//! directories read with [`FilesystemTemplateLoader`].

use std::{
    collections::{HashMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use stencil_core::domain::{
    DirectorySpec, DomainError, FileSpec, RelativePath, TemplateContent, TemplateDescriptor,
    TemplateMetadata, TemplateNode, TemplateSource, TemplateTier, TemplateTree,
};

/// File name of the manifest inside each tier directory.
pub const MANIFEST_FILE: &str = "template.toml";

// ── Manifest types ────────────────────────────────────────────────────────────

/// Deserialised representation of a `template.toml` file.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TemplateManifest {
    pub template: TemplateSection,
    pub metadata: MetadataSection,
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub directories: Vec<DirectoryEntry>,
}

/// `[template]` section: which tier this is.
#[derive(Debug, Deserialize, Clone)]
pub struct TemplateSection {
    pub tier: TemplateTier,
    pub version: String,
}

/// `[metadata]` section: human-facing information.
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataSection {
    /// Display name shown in `stencil list`.
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Commands printed after a successful `stencil new`.
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// One entry under `[[files]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct FileEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub file_type: Option<FileType>,
    #[serde(default)]
    pub executable: bool,
}

/// How a file's content is treated when rendering.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Copied verbatim.
    Literal,
    /// `{{VARIABLE}}` placeholders are substituted.
    Parameterized,
}

/// One entry under `[[directories]]`.
#[derive(Debug, Deserialize, Clone)]
pub struct DirectoryEntry {
    pub path: String,
}

impl TemplateManifest {
    /// Parse manifest text; `origin` only labels error messages.
    pub fn parse(raw: &str, origin: &str) -> Result<Self, DomainError> {
        toml::from_str(raw)
            .map_err(|e| DomainError::InvalidTemplate(format!("failed to parse '{origin}': {e}")))
    }

    /// Build a validated descriptor from this manifest and the tier's files.
    ///
    /// `files` yields `(relative path, content)` pairs in any order; the
    /// resulting tree is sorted by path.
    pub fn into_descriptor<I>(self, files: I) -> Result<TemplateDescriptor, DomainError>
    where
        I: IntoIterator<Item = (String, TemplateSource)>,
    {
        let overrides: HashMap<String, &FileEntry> = self
            .files
            .iter()
            .map(|f| (normalize_path(&f.path), f))
            .collect();

        let mut tree = TemplateTree::new();
        let mut seen: HashSet<String> = HashSet::new();

        for entry in &self.directories {
            let path = normalize_path(&entry.path);
            if seen.insert(path.clone()) {
                tree.push(DirectorySpec::new(RelativePath::try_new(path)?).into());
            }
        }

        for (raw_path, source) in files {
            let path = normalize_path(&raw_path);
            if path == MANIFEST_FILE {
                continue;
            }
            if !seen.insert(path.clone()) {
                return Err(DomainError::DuplicatePath { path });
            }

            let entry = overrides.get(&path).copied();
            let content = match entry.and_then(|e| e.file_type) {
                Some(FileType::Literal) => TemplateContent::Literal(source),
                Some(FileType::Parameterized) => TemplateContent::Parameterized(source),
                None => TemplateContent::detect(source),
            };

            let mut spec = FileSpec::new(RelativePath::try_new(path)?, content);
            if entry.is_some_and(|e| e.executable) {
                spec = spec.executable();
            }
            tree.push(TemplateNode::File(spec));
        }

        if let Some(missing) = overrides.keys().find(|p| !seen.contains(*p)) {
            return Err(DomainError::InvalidTemplate(format!(
                "manifest for '{}' lists '{missing}' but no such file exists",
                self.template.tier
            )));
        }

        tree.sort();

        let metadata = TemplateMetadata::new(self.metadata.name)
            .description(self.metadata.description.unwrap_or_default())
            .version(self.template.version)
            .tags(self.metadata.tags)
            .next_steps(self.metadata.next_steps);

        TemplateDescriptor::builder(self.template.tier)
            .metadata(metadata)
            .tree(tree)
            .build()
    }
}

// ── Loader ────────────────────────────────────────────────────────────────────

/// Loads tier descriptors from a directory of `template.toml` manifests.
///
/// Each immediate subdirectory named after a tier and holding a valid
/// manifest yields one descriptor. Anything else emits a `WARN` and is
/// skipped.
///
/// ```no_run
/// use stencil_adapters::template_loader::FilesystemTemplateLoader;
///
/// let loader = FilesystemTemplateLoader::new("./my-templates");
/// let templates = loader.load_all()?;
/// println!("Loaded {} templates", templates.len());
/// # Ok::<(), stencil_core::domain::DomainError>(())
/// ```
pub struct FilesystemTemplateLoader {
    templates_dir: PathBuf,
}

impl FilesystemTemplateLoader {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }

    /// Load every valid tier found under the templates directory.
    ///
    /// # Errors
    ///
    /// [`DomainError::InvalidTemplate`] if the directory is missing or
    /// unreadable. Broken tier directories are skipped, not fatal.
    #[instrument(skip(self), fields(dir = %self.templates_dir.display()))]
    pub fn load_all(&self) -> Result<Vec<TemplateDescriptor>, DomainError> {
        if !self.templates_dir.is_dir() {
            return Err(DomainError::InvalidTemplate(format!(
                "templates directory not found: {}",
                self.templates_dir.display()
            )));
        }

        let read_dir = fs::read_dir(&self.templates_dir).map_err(|e| {
            DomainError::InvalidTemplate(format!(
                "failed to read templates directory '{}': {e}",
                self.templates_dir.display()
            ))
        })?;

        let mut templates = Vec::new();

        for entry in read_dir {
            let entry = entry.map_err(|e| {
                DomainError::InvalidTemplate(format!("failed to read directory entry: {e}"))
            })?;

            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            match self.load_template_from_dir(&path) {
                Ok(template) => {
                    debug!(template = %template.id(), "loaded template");
                    templates.push(template);
                }
                Err(e) => {
                    warn!(
                        dir = %path.display(),
                        error = %e,
                        "skipping template directory"
                    );
                }
            }
        }

        templates.sort_by_key(|t| t.tier);
        debug!(count = templates.len(), "finished loading templates");
        Ok(templates)
    }

    /// Load one tier directory.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn load_template_from_dir(&self, dir: &Path) -> Result<TemplateDescriptor, DomainError> {
        let dir_name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let dir_tier = dir_name.parse::<TemplateTier>()?;

        let manifest_path = dir.join(MANIFEST_FILE);
        let raw = fs::read_to_string(&manifest_path).map_err(|e| {
            DomainError::InvalidTemplate(format!(
                "failed to read '{}': {e}",
                manifest_path.display()
            ))
        })?;
        let manifest = TemplateManifest::parse(&raw, &manifest_path.display().to_string())?;

        if manifest.template.tier != dir_tier {
            return Err(DomainError::InvalidTemplate(format!(
                "'{}' declares tier '{}'",
                manifest_path.display(),
                manifest.template.tier
            )));
        }

        let mut files = Vec::new();
        for walk_entry in WalkDir::new(dir).min_depth(1) {
            let walk_entry = walk_entry
                .map_err(|e| DomainError::InvalidTemplate(format!("directory walk error: {e}")))?;

            // Directories are implied by the files inside them.
            if !walk_entry.file_type().is_file() {
                continue;
            }

            let abs_path = walk_entry.path();
            let rel = abs_path.strip_prefix(dir).map_err(|_| {
                DomainError::InvalidTemplate(format!(
                    "failed to relativise '{}' against '{}'",
                    abs_path.display(),
                    dir.display()
                ))
            })?;
            let content = fs::read_to_string(abs_path).map_err(|e| {
                DomainError::InvalidTemplate(format!(
                    "failed to read file '{}': {e}",
                    abs_path.display()
                ))
            })?;

            files.push((rel.to_string_lossy().into_owned(), TemplateSource::from(content)));
        }

        manifest.into_descriptor(files)
    }
}

/// Forward slashes, no leading `./`.
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    path.trim_start_matches("./").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HELLO_MANIFEST: &str = r#"
[template]
tier = "hello-world"
version = "1.0.0"

[metadata]
name = "Hello World"
description = "Basic FastAPI starter"
tags = ["fastapi"]
next_steps = ["pip install -r requirements.txt"]
"#;

    fn write_tier(root: &Path, tier: &str, manifest: &str, files: &[(&str, &str)]) {
        let dir = root.join(tier);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        for (path, content) in files {
            let full = dir.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
    }

    #[test]
    fn load_all_returns_error_for_missing_dir() {
        let loader = FilesystemTemplateLoader::new("/definitely/not/here");
        assert!(matches!(
            loader.load_all(),
            Err(DomainError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn loads_metadata_and_files() {
        let root = TempDir::new().unwrap();
        write_tier(
            root.path(),
            "hello-world",
            HELLO_MANIFEST,
            &[
                ("main.py", "app = FastAPI(title=\"{{PROJECT_NAME}}\")\n"),
                ("requirements.txt", "fastapi[standard]\n"),
            ],
        );

        let templates = FilesystemTemplateLoader::new(root.path()).load_all().unwrap();

        assert_eq!(templates.len(), 1);
        let t = &templates[0];
        assert_eq!(t.tier, TemplateTier::HelloWorld);
        assert_eq!(t.id(), "hello-world@1.0.0");
        assert_eq!(t.metadata.next_steps, vec!["pip install -r requirements.txt"]);
        let paths: Vec<_> = t.file_paths().iter().map(|p| p.to_slash_string()).collect();
        assert_eq!(paths, vec!["main.py", "requirements.txt"]);
    }

    #[test]
    fn auto_detects_content_kind() {
        let root = TempDir::new().unwrap();
        write_tier(
            root.path(),
            "hello-world",
            HELLO_MANIFEST,
            &[("main.py", "{{PROJECT_NAME}}"), ("plain.txt", "no markers")],
        );

        let t = FilesystemTemplateLoader::new(root.path())
            .load_template_from_dir(&root.path().join("hello-world"))
            .unwrap();

        let kinds: Vec<_> = t
            .tree
            .files()
            .map(|f| matches!(f.content, TemplateContent::Parameterized(_)))
            .collect();
        assert_eq!(kinds, vec![true, false]);
    }

    #[test]
    fn manifest_override_forces_literal_and_executable() {
        let manifest = format!(
            "{HELLO_MANIFEST}\n[[files]]\npath = \"run.sh\"\ntype = \"literal\"\nexecutable = true\n"
        );
        let root = TempDir::new().unwrap();
        write_tier(
            root.path(),
            "hello-world",
            &manifest,
            &[("run.sh", "echo {{PROJECT_NAME}}")],
        );

        let t = FilesystemTemplateLoader::new(root.path())
            .load_template_from_dir(&root.path().join("hello-world"))
            .unwrap();

        let file = t.tree.files().next().unwrap();
        assert!(matches!(file.content, TemplateContent::Literal(_)));
        assert!(file.permissions.executable_flag());
    }

    #[test]
    fn override_for_missing_file_is_an_error() {
        let manifest = format!("{HELLO_MANIFEST}\n[[files]]\npath = \"ghost.py\"\n");
        let root = TempDir::new().unwrap();
        write_tier(root.path(), "hello-world", &manifest, &[("main.py", "x")]);

        let err = FilesystemTemplateLoader::new(root.path())
            .load_template_from_dir(&root.path().join("hello-world"))
            .unwrap_err();

        assert!(err.to_string().contains("ghost.py"));
    }

    #[test]
    fn skips_unknown_and_broken_directories() {
        let root = TempDir::new().unwrap();
        write_tier(root.path(), "hello-world", HELLO_MANIFEST, &[("main.py", "x")]);
        write_tier(root.path(), "not-a-tier", HELLO_MANIFEST, &[("main.py", "x")]);
        write_tier(root.path(), "intermediate-api", "not = [valid", &[("main.py", "x")]);
        fs::write(root.path().join("README.md"), "loose file").unwrap();

        let templates = FilesystemTemplateLoader::new(root.path()).load_all().unwrap();

        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].tier, TemplateTier::HelloWorld);
    }

    #[test]
    fn tier_mismatch_is_rejected() {
        let root = TempDir::new().unwrap();
        write_tier(root.path(), "production-ready", HELLO_MANIFEST, &[("main.py", "x")]);

        let result = FilesystemTemplateLoader::new(root.path())
            .load_template_from_dir(&root.path().join("production-ready"));

        assert!(result.is_err());
    }

    #[test]
    fn empty_tier_is_rejected() {
        let root = TempDir::new().unwrap();
        write_tier(root.path(), "hello-world", HELLO_MANIFEST, &[]);

        let result = FilesystemTemplateLoader::new(root.path())
            .load_template_from_dir(&root.path().join("hello-world"));

        assert!(matches!(result, Err(DomainError::EmptyTemplate { .. })));
    }

    #[test]
    fn nested_files_use_forward_slashes() {
        let root = TempDir::new().unwrap();
        write_tier(
            root.path(),
            "hello-world",
            HELLO_MANIFEST,
            &[("app/routers/users.py", "router = None"), ("main.py", "x")],
        );

        let t = FilesystemTemplateLoader::new(root.path())
            .load_template_from_dir(&root.path().join("hello-world"))
            .unwrap();

        let paths: Vec<_> = t.file_paths().iter().map(|p| p.to_slash_string()).collect();
        assert_eq!(paths, vec!["app/routers/users.py", "main.py"]);
    }

    #[test]
    fn manifest_directories_become_nodes() {
        let manifest = format!("{HELLO_MANIFEST}\n[[directories]]\npath = \"static\"\n");
        let t = TemplateManifest::parse(&manifest, "inline")
            .unwrap()
            .into_descriptor(vec![("main.py".to_string(), TemplateSource::Static("x"))])
            .unwrap();

        assert_eq!(t.tree.len(), 2);
        assert_eq!(t.file_count(), 1);
    }
}
