//! Issue tool invocation
//!
//! Shells out to the issue CLI (`gh issue create` by default). All record
//! text is passed via std::process::Command args, never through a shell.

use miette::Diagnostic;
use std::process::{Command, Stdio};
use thiserror::Error;

use crate::core::config::Config;
use crate::core::record::Record;

/// Errors that stop the whole run while dispatching
#[derive(Debug, Error, Diagnostic)]
pub enum DispatchError {
    #[error("Cannot start issue tool '{program}'")]
    #[diagnostic(
        code(issue_importer::launch),
        help("Install the tool or point --tool / ISSUE_IMPORTER_TOOL at it. For GitHub see https://cli.github.com")
    )]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// A fully built tool call: program plus discrete arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Build the create-issue call for a record
    pub fn for_record(config: &Config, record: &Record) -> Self {
        let mut args = config.tool_args.clone();
        args.extend([
            "--title".to_string(),
            record.title.clone(),
            "--body".to_string(),
            record.body.clone(),
        ]);
        Self {
            program: config.tool.clone(),
            args,
        }
    }

    /// Format the call for display, quoting arguments a shell would split
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of one tool call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    /// Exit status; -1 when the child was killed by a signal
    pub exit_status: i32,
    pub stdout: String,
    pub stderr: String,
    /// Command line shown instead of running it (dry-run only)
    pub preview: Option<String>,
}

impl InvocationResult {
    pub fn success(&self) -> bool {
        self.exit_status == 0
    }
}

/// Strategy for carrying out an [`Invocation`]
pub trait Executor {
    /// Run (or simulate) the call and capture its result
    ///
    /// A non-zero exit is a normal result; `Err` is reserved for failing to
    /// start the program at all.
    fn execute(&mut self, invocation: &Invocation) -> Result<InvocationResult, DispatchError>;
}

/// Runs the tool as a blocking child process
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl Executor for ProcessExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<InvocationResult, DispatchError> {
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| DispatchError::Launch {
                program: invocation.program.clone(),
                source,
            })?;

        let exit_status = output.status.code().unwrap_or_else(|| {
            tracing::warn!(program = %invocation.program, "issue tool terminated by signal");
            -1
        });

        Ok(InvocationResult {
            exit_status,
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            preview: None,
        })
    }
}

/// Never starts a process; reports success and the would-be command line
#[derive(Debug, Default)]
pub struct DryRunExecutor;

impl Executor for DryRunExecutor {
    fn execute(&mut self, invocation: &Invocation) -> Result<InvocationResult, DispatchError> {
        Ok(InvocationResult {
            preview: Some(invocation.command_line()),
            ..InvocationResult::default()
        })
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
