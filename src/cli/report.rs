//! Line-per-record run output

use console::style;
use std::io::Write;

use crate::core::pipeline::{Outcome, Report, RunSummary};

/// Writes one line per dispatched record and a closing summary
pub struct Reporter<W: Write> {
    out: W,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Report for Reporter<W> {
    fn outcome(&mut self, outcome: &Outcome) -> std::io::Result<()> {
        match outcome {
            Outcome::Skipped { .. } => {}
            Outcome::Succeeded { record, result } => {
                if let Some(preview) = &result.preview {
                    writeln!(self.out, "DRY RUN: {}", preview)?;
                }
                let created = if result.stdout.is_empty() {
                    &record.title
                } else {
                    &result.stdout
                };
                writeln!(self.out, "{} Created: {}", style("✓").green(), created)?;
            }
            Outcome::Failed { record, result } => {
                if let Some(preview) = &result.preview {
                    writeln!(self.out, "DRY RUN: {}", preview)?;
                }
                let reason = if result.stderr.is_empty() {
                    &result.stdout
                } else {
                    &result.stderr
                };
                writeln!(
                    self.out,
                    "{} Failed '{}': {}",
                    style("✗").red(),
                    record.title,
                    reason
                )?;
            }
        }
        self.out.flush()
    }

    fn finish(&mut self, summary: &RunSummary) -> std::io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Done. Processed {} rows.", summary.processed)?;
        self.out.flush()
    }
}
