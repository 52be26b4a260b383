//! Value objects for the Stencil domain.
//!
//! The tier set is closed: adding a tier means adding a variant here and a
//! template directory in `stencil-adapters`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// A predefined FastAPI project scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TemplateTier {
    /// Single-file starter with one endpoint.
    HelloWorld,
    /// Routers, schemas, CRUD and a SQLAlchemy database.
    IntermediateApi,
    /// Authentication, settings, tests and deployment files.
    ProductionReady,
}

impl TemplateTier {
    /// Every tier, in display order.
    pub const ALL: [TemplateTier; 3] = [
        TemplateTier::HelloWorld,
        TemplateTier::IntermediateApi,
        TemplateTier::ProductionReady,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HelloWorld => "hello-world",
            Self::IntermediateApi => "intermediate-api",
            Self::ProductionReady => "production-ready",
        }
    }

    /// One-line summary shown by `stencil list`.
    pub const fn summary(self) -> &'static str {
        match self {
            Self::HelloWorld => "Basic FastAPI starter",
            Self::IntermediateApi => "API with database integration",
            Self::ProductionReady => "Full-featured production app",
        }
    }

    /// Canonical names of all tiers.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|t| t.as_str()).collect()
    }
}

impl fmt::Display for TemplateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::UnknownTemplate {
                name: s.to_string(),
                available: Self::names().join(", "),
            })
    }
}
