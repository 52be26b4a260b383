//! `stencil config`: read and write configuration values.

use std::collections::BTreeMap;

use crate::{
    cli::{ConfigCommands, GlobalArgs, OutputFormat},
    config::{AppConfig, KEYS},
    error::CliResult,
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
///
/// `get` and `list` show the effective values (file + environment);
/// `set` edits the active file only.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let json = output.format() == OutputFormat::Json;

    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            if json {
                output.json(&BTreeMap::from([(key, value)]))?;
            } else {
                output.print(&value)?;
            }
        }

        ConfigCommands::Set { key, value } => {
            let path = AppConfig::active_path(global.config.as_ref());
            let mut file_config = AppConfig::load_file(&path)?;
            file_config.set(&key, &value)?;
            file_config.save(&path)?;
            tracing::info!(key = %key, path = %path.display(), "Config updated");
            output.success(&format!(
                "{key} = {:?} ({})",
                file_config.get(&key)?,
                path.display()
            ))?;
        }

        ConfigCommands::List => {
            if json {
                let values: BTreeMap<&str, String> = KEYS
                    .iter()
                    .map(|key| config.get(key).map(|v| (*key, v)))
                    .collect::<CliResult<_>>()?;
                output.json(&values)?;
            } else {
                output.header("Current Configuration:")?;
                output.print(&config.to_toml()?)?;
            }
        }

        ConfigCommands::Path => {
            output.print(&AppConfig::active_path(global.config.as_ref()).display().to_string())?;
        }
    }

    Ok(())
}
