//! Implementation of the `stencil new` command.
//!
//! Responsibility: turn CLI arguments into a `MaterializationRequest`, run
//! the materialize service, and display results. No business logic lives
//! here.

use std::{
    io::IsTerminal as _,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, info, instrument};

use stencil_adapters::{LocalFilesystem, SimpleRenderer};
use stencil_core::{
    application::MaterializeService,
    domain::{MaterializationRequest, MaterializationResult, ProjectStructure, TemplateTier},
    error::StencilError,
};

use crate::{
    cli::{NewArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Tier used when neither the argument nor the config names one.
pub const DEFAULT_TEMPLATE: TemplateTier = TemplateTier::HelloWorld;

/// Execute the `stencil new` command.
///
/// 1. Resolve destination, tier and project name from flags and config
/// 2. Confirm with the user when attached to a terminal
/// 3. Plan only (`--dry-run`) or materialize
/// 4. Print the written files count and next steps
#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(args: NewArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    validate_dir_name(&args.name)?;

    let destination = resolve_parent(args.path.as_deref(), &config).join(&args.name);
    let template = args
        .template
        .as_deref()
        .or(config.defaults.template.as_deref())
        .unwrap_or(DEFAULT_TEMPLATE.as_str());
    let title = args.title.as_deref().unwrap_or(&args.name);

    let request = MaterializationRequest::parse(template, &destination, Some(title))
        .map_err(StencilError::from)?;
    debug!(tier = %request.tier, destination = %destination.display(), "Request resolved");

    let store = super::template_store(args.templates_dir.as_deref(), &config)?;
    let service = MaterializeService::new(
        Box::new(store),
        Box::new(SimpleRenderer::new()),
        Box::new(LocalFilesystem::new()),
    );

    if args.dry_run {
        let plan = service.plan(&request)?;
        return show_plan(&request, &plan, &output);
    }

    if needs_confirmation(&args, &output) {
        show_configuration(&request, title, &output)?;
        if !confirm()? {
            return Err(CliError::Cancelled);
        }
    }

    let spinner = output.spinner(&format!("Creating '{title}'..."));
    let outcome = service.execute(&request);
    spinner.finish_and_clear();
    let result = outcome?;

    info!(files = result.file_count(), "Project created");

    let next_steps = service.template_info(result.tier)?.next_steps;
    show_result(&result, &next_steps, &output)
}

// ── Resolution ────────────────────────────────────────────────────────────────

/// `--path`, else the configured output directory, else the CWD.
fn resolve_parent(flag: Option<&Path>, config: &AppConfig) -> PathBuf {
    flag.or(config.defaults.output_dir.as_deref())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// NAME is a single directory name; the parent comes from `--path`.
fn validate_dir_name(name: &str) -> CliResult<()> {
    let invalid = |reason: &str| CliError::InvalidInput {
        message: format!("project directory '{name}' {reason}"),
    };

    if name.trim().is_empty() {
        return Err(invalid("cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("must name a new directory"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(invalid("cannot contain path separators; use --path for the parent"));
    }
    Ok(())
}

fn needs_confirmation(args: &NewArgs, output: &OutputManager) -> bool {
    !args.yes
        && !output.is_quiet()
        && output.format() == OutputFormat::Human
        && std::io::stdin().is_terminal()
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_configuration(
    request: &MaterializationRequest,
    title: &str,
    out: &OutputManager,
) -> CliResult<()> {
    out.header("Configuration")?;
    out.print(&format!("  Template:  {}", request.tier))?;
    out.print(&format!("  Project:   {title}"))?;
    out.print(&format!("  Location:  {}", request.destination.display()))?;
    out.print("")?;
    Ok(())
}

#[derive(Serialize)]
struct PlanReport<'a> {
    dry_run: bool,
    tier: TemplateTier,
    destination: &'a Path,
    files: Vec<String>,
}

fn show_plan(
    request: &MaterializationRequest,
    plan: &ProjectStructure,
    out: &OutputManager,
) -> CliResult<()> {
    let files: Vec<String> = plan.files().map(|f| f.path.to_slash_string()).collect();

    if out.format() == OutputFormat::Json {
        out.json(&PlanReport {
            dry_run: true,
            tier: request.tier,
            destination: &request.destination,
            files,
        })?;
        return Ok(());
    }

    out.info(&format!(
        "Dry run: would write {} files from {} to {}",
        files.len(),
        request.tier,
        request.destination.display(),
    ))?;
    for file in &files {
        out.print(&format!("  {file}"))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct CreatedReport<'a> {
    #[serde(flatten)]
    result: &'a MaterializationResult,
    next_steps: &'a [String],
}

fn show_result(
    result: &MaterializationResult,
    next_steps: &[String],
    out: &OutputManager,
) -> CliResult<()> {
    if out.format() == OutputFormat::Json {
        out.json(&CreatedReport { result, next_steps })?;
        return Ok(());
    }

    out.success(&format!(
        "Created '{}' from {} ({} files) at {}",
        result.project_name,
        result.tier,
        result.file_count(),
        result.destination.display(),
    ))?;

    out.print("")?;
    out.print("Next steps:")?;
    out.print(&format!("  cd {}", result.destination.display()))?;
    for step in next_steps {
        out.print(&format!("  {step}"))?;
    }
    Ok(())
}

#[cfg(feature = "interactive")]
fn confirm() -> CliResult<bool> {
    dialoguer::Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()
        .map_err(|e| CliError::IoError {
            message: "failed to read confirmation input".into(),
            source: std::io::Error::other(e),
        })
}

#[cfg(not(feature = "interactive"))]
fn confirm() -> CliResult<bool> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
