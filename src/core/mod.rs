//! Core module - input, validation, dispatch, and the import loop

pub mod config;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod record;
pub mod source;

pub use config::{Config, ConfigError, EnvOverrides};
pub use dispatch::{
    DispatchError, DryRunExecutor, Executor, Invocation, InvocationResult, ProcessExecutor,
};
pub use error::ImportError;
pub use pipeline::{Importer, Outcome, Report, RunSummary};
pub use record::Record;
pub use source::{RawRecord, Source};
