//! CLI module - argument parsing, run orchestration, and output

pub mod args;
pub mod import;
pub mod logging;
pub mod report;
pub mod template;

pub use args::Cli;
