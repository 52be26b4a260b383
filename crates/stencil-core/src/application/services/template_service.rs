//! Template Service - read-only template queries.
//!
//! Separated from MaterializeService for single responsibility.

use crate::{
    application::ports::TemplateStore,
    domain::{TemplateDescriptor, TemplateTier},
    error::StencilResult,
};

/// Service for template lookups.
pub struct TemplateService {
    store: Box<dyn TemplateStore>,
}

impl TemplateService {
    pub fn new(store: Box<dyn TemplateStore>) -> Self {
        Self { store }
    }

    /// Get the descriptor for a tier.
    pub fn get(&self, tier: TemplateTier) -> StencilResult<TemplateDescriptor> {
        self.store.get(tier)
    }

    /// Resolve a user-supplied template name, then fetch it.
    pub fn resolve(&self, name: &str) -> StencilResult<TemplateDescriptor> {
        let tier = name.parse::<TemplateTier>()?;
        self.store.get(tier)
    }

    /// List all templates.
    pub fn list(&self) -> StencilResult<Vec<TemplateDescriptor>> {
        self.store.list()
    }
}
