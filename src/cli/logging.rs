//! Diagnostic logging on stderr
//!
//! Stdout carries only the run report, so all tracing output goes to stderr.
//! `RUST_LOG` overrides the level picked from the command-line flags.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter directive for the given verbosity flags
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A subscriber may already be set (e.g. when embedded); keep the first one
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
