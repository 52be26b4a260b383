//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `STENCIL_<SECTION>__<KEY>`, e.g.
//!    `STENCIL_DEFAULTS__TEMPLATE=production-ready`
//! 3. Config file: `--config FILE`, or else `.stencil.toml` in the current
//!    directory layered over the global file
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use stencil_core::domain::TemplateTier;

use crate::{
    cli::OutputFormat,
    error::{CliError, CliResult, IntoCli},
};

/// File name of the per-directory config.
pub const LOCAL_CONFIG_FILE: &str = ".stencil.toml";

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "STENCIL";

/// Every key accepted by `stencil config get/set`.
pub const KEYS: [&str; 5] = [
    "defaults.template",
    "defaults.output_dir",
    "output.no_color",
    "output.format",
    "templates.local_path",
];

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default values for new projects.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Template settings.
    pub templates: TemplateConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Tier used when `stencil new` gets no TEMPLATE.
    pub template: Option<String>,
    /// Parent directory used when `stencil new` gets no `--path`.
    pub output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Directory of `<tier>/template.toml` overrides.
    pub local_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from file(s) and environment over the defaults.
    ///
    /// An explicit `config_file` must exist unless `may_be_absent` is set,
    /// which commands that create the file use. The implicit global and
    /// local files are always optional.
    pub fn load(config_file: Option<&PathBuf>, may_be_absent: bool) -> anyhow::Result<Self> {
        let mut builder = Config::builder();

        match config_file {
            Some(path) => {
                builder = builder.add_source(toml_file(path).required(!may_be_absent));
            }
            None => {
                builder = builder
                    .add_source(toml_file(&Self::config_path()).required(false))
                    .add_source(toml_file(Path::new(LOCAL_CONFIG_FILE)).required(false));
            }
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("failed to read configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("configuration has invalid values")?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Read a single file without environment overrides, for editing.
    ///
    /// A missing file yields the defaults.
    pub fn load_file(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read config '{}'", path.display()))?;
        toml::from_str(&raw).map_err(|e| CliError::ConfigError {
            message: format!("Failed to parse '{}': {e}", path.display()),
            source: Some(Box::new(e)),
        })
    }

    /// Write as pretty TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let toml = self.to_toml()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_cli_context(|| {
                format!("Failed to create config directory '{}'", parent.display())
            })?;
        }
        std::fs::write(path, toml)
            .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))
    }

    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Value of a dotted key; unset optional values read as an empty string.
    pub fn get(&self, key: &str) -> CliResult<String> {
        let display = |p: &Option<PathBuf>| {
            p.as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()
        };
        match key {
            "defaults.template" => Ok(self.defaults.template.clone().unwrap_or_default()),
            "defaults.output_dir" => Ok(display(&self.defaults.output_dir)),
            "output.no_color" => Ok(self.output.no_color.to_string()),
            "output.format" => Ok(self.output.format.clone()),
            "templates.local_path" => Ok(display(&self.templates.local_path)),
            _ => Err(unknown_key(key)),
        }
    }

    /// Set a dotted key. An empty value clears optional keys.
    pub fn set(&mut self, key: &str, value: &str) -> CliResult<()> {
        let value = value.trim();
        let optional_path = |v: &str| (!v.is_empty()).then(|| PathBuf::from(v));

        match key {
            "defaults.template" => {
                self.defaults.template = if value.is_empty() {
                    None
                } else {
                    let tier: TemplateTier = value.parse().map_err(|_| CliError::InvalidInput {
                        message: format!(
                            "'{value}' is not a template; expected one of: {}",
                            TemplateTier::names().join(", ")
                        ),
                    })?;
                    Some(tier.as_str().to_string())
                };
            }
            "defaults.output_dir" => self.defaults.output_dir = optional_path(value),
            "output.no_color" => {
                self.output.no_color = value.parse().map_err(|_| CliError::InvalidInput {
                    message: format!("'{value}' is not a boolean; use true or false"),
                })?;
            }
            "output.format" => {
                let normalized = value.to_ascii_lowercase();
                if !matches!(normalized.as_str(), "auto" | "human" | "plain" | "json") {
                    return Err(CliError::InvalidInput {
                        message: format!("'{value}' is not one of auto, human, plain, json"),
                    });
                }
                self.output.format = normalized;
            }
            "templates.local_path" => self.templates.local_path = optional_path(value),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// The configured output format.
    pub fn output_format(&self) -> OutputFormat {
        OutputFormat::from_config(&self.output.format)
    }

    /// Path to the global configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.stencil.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "stencil", "stencil")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_FILE))
    }

    /// The file `config set` edits and `config path` prints.
    pub fn active_path(explicit: Option<&PathBuf>) -> PathBuf {
        if let Some(path) = explicit {
            return path.clone();
        }
        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            local
        } else {
            Self::config_path()
        }
    }
}

fn toml_file(path: &Path) -> File<config::FileSourceFile, FileFormat> {
    File::from(path).format(FileFormat::Toml)
}

fn unknown_key(key: &str) -> CliError {
    CliError::config(format!(
        "Unknown config key '{key}'. Known keys: {}",
        KEYS.join(", ")
    ))
}
