//! The import run: configuration, source, dispatch strategy, report

use crate::cli::args::Cli;
use crate::cli::report::Reporter;
use crate::cli::template::generate_template;
use crate::core::config::Config;
use crate::core::dispatch::{DryRunExecutor, ProcessExecutor};
use crate::core::error::ImportError;
use crate::core::pipeline::{Importer, RunSummary};
use crate::core::source::Source;

/// Resolve configuration from all layers, command-line flags last
pub fn resolve_config(cli: &Cli) -> Result<Config, ImportError> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(tool) = &cli.tool {
        config.tool = tool.clone();
    }
    if let Some(delimiter) = cli.delimiter {
        config.delimiter = Some(delimiter);
    }
    Ok(config)
}

pub fn run(cli: &Cli) -> Result<Option<RunSummary>, ImportError> {
    if cli.template {
        generate_template()?;
        return Ok(None);
    }

    let file = cli.file.as_deref().ok_or(ImportError::MissingInput)?;
    let config = resolve_config(cli)?;

    let source = Source::open(file, config.delimiter_for(file))?;
    tracing::info!(
        path = %file.display(),
        tool = %config.tool,
        dry_run = cli.dry_run,
        "importing issues"
    );

    let mut reporter = Reporter::new(std::io::stdout().lock());
    let records = source.records();
    let summary = if cli.dry_run {
        Importer::new(&config, DryRunExecutor).run(records, &mut reporter)?
    } else {
        Importer::new(&config, ProcessExecutor).run(records, &mut reporter)?
    };

    Ok(Some(summary))
}
