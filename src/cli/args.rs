//! CLI argument definitions using clap derive

use clap::Parser;
use std::path::PathBuf;

use crate::core::config::parse_delimiter;

#[derive(Parser, Debug)]
#[command(name = "issue-importer")]
#[command(author, version, about = "Create issues in bulk from a CSV file")]
#[command(long_about = "Reads a delimited file with 'title' and 'body' columns and creates one issue per row \
through the issue CLI (gh issue create by default). Rows with an empty title are skipped.")]
pub struct Cli {
    /// CSV file to import (must have 'title' and 'body' columns)
    pub file: Option<PathBuf>,

    /// Print the commands that would run instead of running them
    #[arg(long)]
    pub dry_run: bool,

    /// Print a CSV template and exit
    #[arg(long)]
    pub template: bool,

    /// Field delimiter (default: tab for .tsv files, comma otherwise)
    #[arg(long, short = 'd', value_parser = parse_delimiter_arg)]
    pub delimiter: Option<u8>,

    /// Issue tool program (default: gh)
    #[arg(long, value_name = "PROGRAM")]
    pub tool: Option<String>,

    /// Configuration file (YAML) layered over the global config
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
}

fn parse_delimiter_arg(s: &str) -> Result<u8, String> {
    parse_delimiter(s).map_err(|e| e.to_string())
}
