//! Fatal error taxonomy for an import run
//!
//! Every variant aborts the run. Per-record tool failures are not errors at
//! this level; they travel as [`Outcome::Failed`](crate::core::Outcome).

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::config::ConfigError;
use crate::core::dispatch::DispatchError;

/// Exit code for usage errors (missing input, unreadable file, bad config)
pub const EXIT_USAGE: i32 = 1;
/// Exit code when the input header lacks a required column
pub const EXIT_SCHEMA: i32 = 2;
/// Exit code when the issue tool cannot be started at all
pub const EXIT_LAUNCH: i32 = 3;

#[derive(Debug, Error, Diagnostic)]
pub enum ImportError {
    #[error("No input file given")]
    #[diagnostic(
        code(issue_importer::usage),
        help("Usage: issue-importer <csv_file> [--dry-run]")
    )]
    MissingInput,

    #[error("Cannot open {}", path.display())]
    #[diagnostic(code(issue_importer::usage::open))]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse {} at line {line}", path.display())]
    #[diagnostic(
        code(issue_importer::usage::parse),
        help("The input must be delimited text with a header row. Use --delimiter for non-comma files.")
    )]
    Parse {
        path: PathBuf,
        line: u64,
        #[source]
        source: csv::Error,
    },

    #[error("Required column(s) missing: {}", quoted(missing))]
    #[diagnostic(code(issue_importer::schema))]
    MissingColumns {
        missing: Vec<String>,
        found: Vec<String>,
        #[help]
        help: String,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Failed to write output")]
    #[diagnostic(code(issue_importer::io))]
    Output(#[from] std::io::Error),
}

impl ImportError {
    /// Schema error listing the absent columns and the header that was found
    pub fn missing_columns(missing: Vec<String>, found: Vec<String>) -> Self {
        let help = format!("Found columns: [{}]", quoted(&found));
        ImportError::MissingColumns {
            missing,
            found,
            help,
        }
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ImportError::MissingColumns { .. } => EXIT_SCHEMA,
            ImportError::Dispatch(DispatchError::Launch { .. }) => EXIT_LAUNCH,
            _ => EXIT_USAGE,
        }
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n))
        .collect::<Vec<_>>()
        .join(", ")
}
