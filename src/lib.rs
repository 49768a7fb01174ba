//! Issue Importer
//!
//! Creates tracker issues in bulk from a delimited file by invoking the
//! issue CLI once per row.

pub mod cli;
pub mod core;
