//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stencil",
    bin_name = "stencil",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{26a1} FastAPI projects from three template tiers",
    long_about = "Stencil materializes a FastAPI project from one of three \
                  built-in templates (hello-world, intermediate-api, \
                  production-ready). Every file lands, or none do.",
    after_help = "EXAMPLES:\n\
        \x20 stencil new demo\n\
        \x20 stencil new shop-api intermediate-api --title \"Shop API\"\n\
        \x20 stencil list --format json\n\
        \x20 stencil completions bash > /usr/share/bash-completion/completions/stencil",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project from a template.
    #[command(
        visible_alias = "n",
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 stencil new demo                           # hello-world in ./demo\n\
            \x20 stencil new api intermediate-api --path ~/src\n\
            \x20 stencil new svc production-ready --title \"Billing Service\" --dry-run"
    )]
    New(NewArgs),

    /// List available templates.
    #[command(
        visible_alias = "ls",
        about = "List available templates",
        after_help = "EXAMPLES:\n\
            \x20 stencil list\n\
            \x20 stencil list --format csv\n\
            \x20 stencil list --templates-dir ./my-templates"
    )]
    List(ListArgs),

    /// Initialise a Stencil configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 stencil init           # default location\n\
            \x20 stencil init --global  # global config\n\
            \x20 stencil init --local   # .stencil.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stencil completions bash > ~/.local/share/bash-completion/completions/stencil\n\
            \x20 stencil completions zsh  > ~/.zfunc/_stencil\n\
            \x20 stencil completions fish > ~/.config/fish/completions/stencil.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the Stencil configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 stencil config get defaults.template\n\
            \x20 stencil config set defaults.template production-ready\n\
            \x20 stencil config list"
    )]
    Config(ConfigCommands),
}

impl Commands {
    /// `true` for commands that create or point at the config file, so an
    /// explicit `--config` path need not exist yet.
    pub fn writes_config(&self) -> bool {
        matches!(
            self,
            Self::Init(_) | Self::Config(ConfigCommands::Set { .. } | ConfigCommands::Path)
        )
    }
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `stencil new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Directory name of the new project, created under `--path`.
    #[arg(value_name = "NAME", help = "Project directory name")]
    pub name: String,

    /// Template tier. Parsed by the core so unknown names get the full
    /// list of tiers in the error.
    #[arg(
        value_name = "TEMPLATE",
        help = "Template tier: hello-world, intermediate-api, production-ready"
    )]
    pub template: Option<String>,

    /// Parent directory for the project.
    #[arg(
        short = 'p',
        long = "path",
        value_name = "DIR",
        help = "Parent directory (default: current directory)"
    )]
    pub path: Option<PathBuf>,

    /// Name substituted into the generated files.
    #[arg(
        short = 't',
        long = "title",
        value_name = "TEXT",
        help = "Project name used inside the files (default: NAME)"
    )]
    pub title: Option<String>,

    /// Skip the confirmation prompt.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Skip confirmation and create immediately"
    )]
    pub yes: bool,

    /// Preview what would be created without writing any files.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    /// Directory holding `<tier>/template.toml` overrides.
    #[arg(
        long = "templates-dir",
        value_name = "DIR",
        help = "Load template overrides from this directory"
    )]
    pub templates_dir: Option<PathBuf>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,

    /// Directory holding `<tier>/template.toml` overrides.
    #[arg(
        long = "templates-dir",
        value_name = "DIR",
        help = "Load template overrides from this directory"
    )]
    pub templates_dir: Option<PathBuf>,
}

/// Output format for the `list` command.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
    /// CSV rows.
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `stencil init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to the global config location.
    #[arg(
        long = "global",
        conflicts_with = "local",
        help = "Create global configuration"
    )]
    pub global: bool,

    /// Write to `.stencil.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stencil completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `stencil config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.template`.
        key: String,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
