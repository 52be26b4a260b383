//! Command handlers, one module per subcommand.

use std::path::Path;

use tracing::debug;

use stencil_adapters::InMemoryStore;

use crate::{config::AppConfig, error::CliResult};

pub mod completions;
pub mod config;
pub mod init;
pub mod list;
pub mod new;

/// Built-in templates, replaced tier by tier from the `--templates-dir`
/// flag or the `templates.local_path` config key.
pub(crate) fn template_store(flag: Option<&Path>, config: &AppConfig) -> CliResult<InMemoryStore> {
    let overrides = flag.or(config.templates.local_path.as_deref());
    let store = match overrides {
        Some(dir) => {
            debug!(dir = %dir.display(), "Loading template overrides");
            InMemoryStore::with_overrides(dir)?
        }
        None => InMemoryStore::with_builtin()?,
    };
    Ok(store)
}
