//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "materialize a template" or "list templates".

pub mod materialize_service;
pub mod template_service;

pub use materialize_service::{MaterializeService, TemplateInfo};
pub use template_service::TemplateService;
