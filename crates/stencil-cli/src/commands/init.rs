//! `stencil init`: create a default configuration file.

use std::path::PathBuf;

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::{AppConfig, LOCAL_CONFIG_FILE},
    error::{CliResult, IntoCli},
    output::OutputManager,
};

/// Create a default Stencil configuration file.
pub fn execute(args: InitArgs, global: GlobalArgs, output: OutputManager) -> CliResult<()> {
    let config_path = target_path(&args, &global);
    output.info(&format!("Initialising configuration at {}", config_path.display()))?;

    // Bail early if the file already exists and --force was not given.
    if config_path.exists() && !args.force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            config_path.display(),
        ))?;
        return Ok(());
    }

    let body = AppConfig::default().to_toml()?;
    let contents = format!(
        "# Stencil configuration, written by `stencil init` on {}\n\
         # Keys: defaults.template, defaults.output_dir, output.no_color,\n\
         #       output.format, templates.local_path\n\n{body}",
        chrono::Local::now().format("%Y-%m-%d %H:%M"),
    );

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }

    std::fs::write(&config_path, contents)
        .with_cli_context(|| format!("Failed to write config to '{}'", config_path.display()))?;

    output.success(&format!(
        "Configuration created at {}",
        config_path.display(),
    ))?;

    Ok(())
}

/// `--local` → CWD, `--global` → platform dir, else `--config` or the
/// platform dir.
fn target_path(args: &InitArgs, global: &GlobalArgs) -> PathBuf {
    if args.local {
        PathBuf::from(LOCAL_CONFIG_FILE)
    } else if args.global {
        AppConfig::config_path()
    } else {
        global.config.clone().unwrap_or_else(AppConfig::config_path)
    }
}
