//! In-memory template store with built-in templates.

use std::{
    collections::BTreeMap,
    path::Path,
    sync::{Arc, RwLock},
};

use tracing::info;

use stencil_core::{
    application::{ApplicationError, ports::TemplateStore},
    domain::{DomainValidator as validator, TemplateDescriptor, TemplateTier},
    error::StencilResult,
};

use crate::{builtin_templates, template_loader::FilesystemTemplateLoader};

/// Thread-safe in-memory template store, one descriptor per tier.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<BTreeMap<TemplateTier, TemplateDescriptor>>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with the built-in templates loaded.
    pub fn with_builtin() -> StencilResult<Self> {
        let store = Self::new();
        for template in builtin_templates::all_templates()? {
            store.insert(template)?;
        }
        Ok(store)
    }

    /// Built-in templates, with any tiers found in `dir` replacing them.
    pub fn with_overrides(dir: impl AsRef<Path>) -> StencilResult<Self> {
        let store = Self::with_builtin()?;
        let overrides = FilesystemTemplateLoader::new(dir.as_ref()).load_all()?;
        for template in overrides {
            info!(template = %template.id(), dir = %dir.as_ref().display(), "Using local template");
            store.insert(template)?;
        }
        Ok(store)
    }

    /// Insert or replace the descriptor for its tier.
    pub fn insert(&self, template: TemplateDescriptor) -> StencilResult<()> {
        validator::validate_template(&template)?;

        let mut inner = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        inner.insert(template.tier, template);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|inner| inner.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateStore for InMemoryStore {
    fn get(&self, tier: TemplateTier) -> StencilResult<TemplateDescriptor> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        inner.get(&tier).cloned().ok_or_else(|| {
            ApplicationError::TemplateUnavailable {
                tier: tier.to_string(),
            }
            .into()
        })
    }

    fn list(&self) -> StencilResult<Vec<TemplateDescriptor>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;

        // BTreeMap iteration follows tier order.
        Ok(inner.values().cloned().collect())
    }
}
