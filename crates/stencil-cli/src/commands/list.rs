//! Implementation of the `stencil list` command.

use stencil_core::application::{TemplateInfo, TemplateService};

use crate::{
    cli::{ListArgs, ListFormat},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let store = super::template_store(args.templates_dir.as_deref(), &config)?;
    let service = TemplateService::new(Box::new(store));
    let templates: Vec<TemplateInfo> = service.list()?.iter().map(TemplateInfo::from).collect();

    match args.format {
        ListFormat::Table => {
            output.header("Available Templates:")?;
            for line in table_rows(&templates) {
                output.print(&line)?;
            }
        }
        // JSON must stay parseable in pipes, so it skips quiet handling.
        ListFormat::Json => output.json(&templates)?,
        ListFormat::List => {
            for t in &templates {
                output.print(t.tier.as_str())?;
            }
        }
        ListFormat::Csv => {
            output.print("tier,version,files,description")?;
            for t in &templates {
                output.print(&csv_row(t))?;
            }
        }
    }

    Ok(())
}

fn table_rows(templates: &[TemplateInfo]) -> Vec<String> {
    let width = templates
        .iter()
        .map(|t| t.tier.as_str().len())
        .max()
        .unwrap_or(0);
    templates
        .iter()
        .map(|t| {
            format!(
                "  {:<width$}  {:<8}  {:>3} files  {}",
                t.tier.as_str(),
                t.version,
                t.file_count,
                t.description,
            )
        })
        .collect()
}

fn csv_row(t: &TemplateInfo) -> String {
    format!(
        "{},{},{},{}",
        t.tier,
        t.version,
        t.file_count,
        csv_field(&t.description)
    )
}

/// Quote a field when it holds a comma, quote, or newline.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
