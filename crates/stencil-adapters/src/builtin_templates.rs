//! Templates that ship inside the `stencil` binary.
//!
//! Every tier lives under `templates/<tier>/` in this crate and is embedded
//! at compile time with `include_dir`, so materialization never depends on
//! files next to the executable. Each tier directory carries the same
//! `template.toml` manifest a user template directory would (see
//! [`crate::template_loader`]).

use include_dir::{Dir, DirEntry, include_dir};
use tracing::{debug, instrument};

use stencil_core::domain::{DomainError, TemplateDescriptor, TemplateSource, TemplateTier};

use crate::template_loader::{MANIFEST_FILE, TemplateManifest};

static BUILTIN: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/templates");

/// Load every built-in tier, in tier order.
///
/// # Errors
///
/// Any missing or malformed tier is an error: the embedded set is fixed at
/// build time, so a failure here is a packaging bug.
#[instrument]
pub fn all_templates() -> Result<Vec<TemplateDescriptor>, DomainError> {
    TemplateTier::ALL.into_iter().map(builtin).collect()
}

/// Load one built-in tier.
pub fn builtin(tier: TemplateTier) -> Result<TemplateDescriptor, DomainError> {
    let dir = BUILTIN.get_dir(tier.as_str()).ok_or_else(|| {
        DomainError::InvalidTemplate(format!("built-in template '{tier}' is not embedded"))
    })?;

    let manifest_path = format!("{}/{MANIFEST_FILE}", tier.as_str());
    let raw = BUILTIN
        .get_file(&manifest_path)
        .and_then(|f| f.contents_utf8())
        .ok_or_else(|| {
            DomainError::InvalidTemplate(format!("built-in template '{tier}' has no manifest"))
        })?;
    let manifest = TemplateManifest::parse(raw, &manifest_path)?;

    if manifest.template.tier != tier {
        return Err(DomainError::InvalidTemplate(format!(
            "'{manifest_path}' declares tier '{}'",
            manifest.template.tier
        )));
    }

    let mut files = Vec::new();
    collect_files(dir, tier.as_str(), &mut files)?;
    debug!(tier = %tier, files = files.len(), "Embedded template collected");

    manifest.into_descriptor(files)
}

/// Gather `(path relative to the tier root, content)` for every file.
fn collect_files(
    dir: &'static Dir<'static>,
    tier_root: &str,
    out: &mut Vec<(String, TemplateSource)>,
) -> Result<(), DomainError> {
    for entry in dir.entries() {
        match entry {
            DirEntry::Dir(sub) => collect_files(sub, tier_root, out)?,
            DirEntry::File(file) => {
                let full = file.path().to_string_lossy().replace('\\', "/");
                let rel = full
                    .strip_prefix(tier_root)
                    .map(|p| p.trim_start_matches('/'))
                    .unwrap_or(&full)
                    .to_string();
                let content = file.contents_utf8().ok_or_else(|| {
                    DomainError::InvalidTemplate(format!("built-in file '{full}' is not UTF-8"))
                })?;
                out.push((rel, TemplateSource::Static(content)));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use stencil_core::domain::{RenderContext, TemplateContent};

    use super::*;

    fn paths(tier: TemplateTier) -> BTreeSet<String> {
        builtin(tier)
            .unwrap()
            .file_paths()
            .iter()
            .map(|p| p.to_slash_string())
            .collect()
    }

    #[test]
    fn every_tier_is_embedded_and_valid() {
        let templates = all_templates().unwrap();
        let tiers: Vec<_> = templates.iter().map(|t| t.tier).collect();
        assert_eq!(tiers, TemplateTier::ALL.to_vec());
        for t in &templates {
            assert!(t.file_count() > 0, "{} is empty", t.tier);
            assert!(!t.metadata.next_steps.is_empty(), "{} has no next steps", t.tier);
        }
    }

    #[test]
    fn manifest_is_not_a_project_file() {
        for tier in TemplateTier::ALL {
            assert!(!paths(tier).contains(MANIFEST_FILE));
        }
    }

    #[test]
    fn hello_world_file_set() {
        let expected: BTreeSet<String> = ["README.md", "main.py", "requirements.txt"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(paths(TemplateTier::HelloWorld), expected);
    }

    #[test]
    fn intermediate_api_has_package_layout() {
        let files = paths(TemplateTier::IntermediateApi);
        for expected in [
            "main.py",
            "app/__init__.py",
            "app/database.py",
            "app/models/user.py",
            "app/schemas/user.py",
            "app/crud/user.py",
            "app/routers/users.py",
            "requirements.txt",
            "README.md",
        ] {
            assert!(files.contains(expected), "missing {expected}");
        }
    }

    #[test]
    fn production_ready_extends_intermediate() {
        let intermediate = paths(TemplateTier::IntermediateApi);
        let production = paths(TemplateTier::ProductionReady);
        assert!(intermediate.is_subset(&production));
        for expected in [
            "app/core/config.py",
            "app/core/security.py",
            "app/services/auth.py",
            "app/routers/auth.py",
            "tests/conftest.py",
            "tests/test_auth.py",
            "tests/test_users.py",
            ".env.example",
            ".gitignore",
            "Dockerfile",
        ] {
            assert!(production.contains(expected), "missing {expected}");
        }
    }

    fn rendered(tier: TemplateTier, path: &str) -> String {
        let template = builtin(tier).unwrap();
        let file = template
            .tree
            .files()
            .find(|f| f.path.to_slash_string() == path)
            .unwrap();
        assert!(matches!(file.content, TemplateContent::Parameterized(_)));
        file.content.render(&RenderContext::new("Demo"))
    }

    #[test]
    fn app_title_uses_project_name() {
        for tier in [TemplateTier::HelloWorld, TemplateTier::IntermediateApi] {
            assert!(rendered(tier, "main.py").contains("title=\"Demo\""), "{tier}");
        }
        // production-ready reads its title from settings
        assert!(
            rendered(TemplateTier::ProductionReady, "app/core/config.py")
                .contains("PROJECT_NAME: str = \"Demo\"")
        );
    }

    #[test]
    fn no_placeholder_survives_rendering() {
        let ctx = RenderContext::new("Demo");
        for template in all_templates().unwrap() {
            for file in template.tree.files() {
                let out = file.content.render(&ctx);
                assert!(
                    !out.contains("{{PROJECT_NAME"),
                    "{}: {} kept a placeholder",
                    template.tier,
                    file.path
                );
            }
        }
    }
}
