//! Record-by-record import loop

use std::io::Read;

use crate::core::config::Config;
use crate::core::dispatch::{Executor, Invocation, InvocationResult};
use crate::core::error::ImportError;
use crate::core::record::{self, Record};
use crate::core::source::{RawRecord, Records};

/// Terminal state of one input row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Empty title; never dispatched
    Skipped { line: u64 },
    /// Tool exited with status 0
    Succeeded {
        record: Record,
        result: InvocationResult,
    },
    /// Tool ran and exited non-zero
    Failed {
        record: Record,
        result: InvocationResult,
    },
}

impl Outcome {
    fn from_dispatch(record: Record, result: InvocationResult) -> Self {
        if result.success() {
            Outcome::Succeeded { record, result }
        } else {
            Outcome::Failed { record, result }
        }
    }

    /// Whether the row reached the tool (real or simulated)
    pub fn dispatched(&self) -> bool {
        !matches!(self, Outcome::Skipped { .. })
    }
}

/// Aggregate counts for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub rows_seen: usize,
    /// Rows dispatched, whatever their result
    pub processed: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: &Outcome) {
        self.rows_seen += 1;
        if outcome.dispatched() {
            self.processed += 1;
        }
        match outcome {
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Succeeded { .. } => self.succeeded += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Receives outcomes as they happen and the summary at the end
pub trait Report {
    fn outcome(&mut self, outcome: &Outcome) -> std::io::Result<()>;

    fn finish(&mut self, summary: &RunSummary) -> std::io::Result<()>;
}

/// Drives rows through validation and dispatch, one at a time
pub struct Importer<'a, E: Executor> {
    config: &'a Config,
    executor: E,
}

impl<'a, E: Executor> Importer<'a, E> {
    pub fn new(config: &'a Config, executor: E) -> Self {
        Self { config, executor }
    }

    /// Validate and dispatch a single row
    pub fn process(&mut self, raw: &RawRecord) -> Result<Outcome, ImportError> {
        let Some(record) = record::validate(raw) else {
            tracing::debug!(line = raw.line, "skipping row with empty title");
            return Ok(Outcome::Skipped { line: raw.line });
        };

        let invocation = Invocation::for_record(self.config, &record);
        tracing::debug!(
            line = record.line,
            program = %invocation.program,
            "dispatching"
        );
        let result = self.executor.execute(&invocation)?;
        tracing::debug!(
            line = record.line,
            exit_status = result.exit_status,
            "issue tool finished"
        );

        Ok(Outcome::from_dispatch(record, result))
    }

    /// Consume every row, reporting each outcome before the next row starts
    ///
    /// Fatal errors (unparsable row, tool cannot start) stop the run; rows
    /// already reported stay reported.
    pub fn run<R: Read>(
        &mut self,
        records: Records<R>,
        report: &mut impl Report,
    ) -> Result<RunSummary, ImportError> {
        let mut summary = RunSummary::default();

        for raw in records {
            let outcome = self.process(&raw?)?;
            summary.record(&outcome);
            report.outcome(&outcome)?;
        }

        tracing::info!(
            rows = summary.rows_seen,
            processed = summary.processed,
            succeeded = summary.succeeded,
            failed = summary.failed,
            skipped = summary.skipped,
            "import finished"
        );
        report.finish(&summary)?;

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dispatch::{DispatchError, DryRunExecutor};
    use crate::core::source::Source;
    use std::path::Path;

    /// Scripted executor: replays exit statuses and remembers what it was given
    #[derive(Default)]
    struct FakeExecutor {
        statuses: Vec<i32>,
        calls: Vec<Invocation>,
        fail_launch_at: Option<usize>,
    }

    impl Executor for FakeExecutor {
        fn execute(&mut self, invocation: &Invocation) -> Result<InvocationResult, DispatchError> {
            if self.fail_launch_at == Some(self.calls.len()) {
                return Err(DispatchError::Launch {
                    program: invocation.program.clone(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            let status = self.statuses.get(self.calls.len()).copied().unwrap_or(0);
            self.calls.push(invocation.clone());
            Ok(InvocationResult {
                exit_status: status,
                stdout: if status == 0 {
                    "https://example.test/issues/1".to_string()
                } else {
                    String::new()
                },
                stderr: if status == 0 {
                    String::new()
                } else {
                    "boom".to_string()
                },
                preview: None,
            })
        }
    }

    #[derive(Default)]
    struct Collect {
        outcomes: Vec<Outcome>,
        finished: Option<RunSummary>,
    }

    impl Report for Collect {
        fn outcome(&mut self, outcome: &Outcome) -> std::io::Result<()> {
            self.outcomes.push(outcome.clone());
            Ok(())
        }

        fn finish(&mut self, summary: &RunSummary) -> std::io::Result<()> {
            self.finished = Some(*summary);
            Ok(())
        }
    }

    fn records(input: &str) -> Records<&[u8]> {
        Source::from_reader(Path::new("input.csv"), input.as_bytes(), b',')
            .unwrap()
            .records()
    }

    const THREE_ROWS: &str = "title,body\nBug A,desc\n,x\n  Bug C  ,\n";

    #[test]
    fn test_skipped_rows_are_not_dispatched() {
        let config = Config::default();
        let mut importer = Importer::new(&config, FakeExecutor::default());
        let mut report = Collect::default();

        let summary = importer.run(records(THREE_ROWS), &mut report).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.rows_seen, 3);
        assert_eq!(summary.skipped, 1);
        assert_eq!(report.finished, Some(summary));

        let calls = &importer.executor.calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args[3], "Bug A");
        assert_eq!(calls[1].args[3], "Bug C");
        assert_eq!(calls[1].args[5], "");

        assert_eq!(report.outcomes[1], Outcome::Skipped { line: 3 });
        assert!(!report.outcomes[1].dispatched());
    }

    #[test]
    fn test_failures_are_counted_and_do_not_stop_the_run() {
        let config = Config::default();
        let executor = FakeExecutor {
            statuses: vec![1, 0, 2],
            ..FakeExecutor::default()
        };
        let mut importer = Importer::new(&config, executor);
        let mut report = Collect::default();

        let summary = importer
            .run(records("title,body\nA,\nB,\nC,\n"), &mut report)
            .unwrap();

        assert_eq!(summary.processed, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert!(matches!(report.outcomes[0], Outcome::Failed { .. }));
        assert!(matches!(report.outcomes[1], Outcome::Succeeded { .. }));
        assert!(matches!(report.outcomes[2], Outcome::Failed { .. }));
    }

    #[test]
    fn test_launch_error_aborts_remaining_rows() {
        let config = Config::default();
        let executor = FakeExecutor {
            fail_launch_at: Some(1),
            ..FakeExecutor::default()
        };
        let mut importer = Importer::new(&config, executor);
        let mut report = Collect::default();

        let err = importer
            .run(records("title,body\nA,\nB,\nC,\n"), &mut report)
            .unwrap_err();

        assert_eq!(err.exit_code(), crate::core::error::EXIT_LAUNCH);
        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.finished, None);
        assert_eq!(importer.executor.calls.len(), 1);
    }

    #[test]
    fn test_dry_run_uses_identical_arguments() {
        let config = Config::default();
        let raw = RawRecord::from_pairs(
            2,
            &[("title", " Bug A "), ("body", "it's broken")],
        );

        let mut real = Importer::new(&config, FakeExecutor::default());
        real.process(&raw).unwrap();
        let real_invocation = real.executor.calls[0].clone();

        let mut dry = Importer::new(&config, DryRunExecutor);
        let outcome = dry.process(&raw).unwrap();

        match outcome {
            Outcome::Succeeded { record, result } => {
                assert_eq!(record.title, "Bug A");
                assert_eq!(result.preview, Some(real_invocation.command_line()));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_summary_counts_only_dispatched_rows_as_processed() {
        let record = Record {
            line: 2,
            title: "A".to_string(),
            body: String::new(),
        };
        let failed = InvocationResult {
            exit_status: 1,
            ..InvocationResult::default()
        };
        let outcomes = [
            Outcome::Skipped { line: 2 },
            Outcome::from_dispatch(record.clone(), InvocationResult::default()),
            Outcome::from_dispatch(record, failed),
            Outcome::Skipped { line: 5 },
        ];

        let mut summary = RunSummary::default();
        for outcome in &outcomes {
            summary.record(outcome);
        }

        assert_eq!(
            summary,
            RunSummary {
                rows_seen: 4,
                processed: 2,
                succeeded: 1,
                failed: 1,
                skipped: 2,
            }
        );
        assert_eq!(
            outcomes.iter().filter(|o| o.dispatched()).count(),
            summary.processed
        );
    }

    #[test]
    fn test_empty_batch() {
        let config = Config::default();
        let mut importer = Importer::new(&config, FakeExecutor::default());
        let mut report = Collect::default();

        let summary = importer.run(records("title,body\n"), &mut report).unwrap();
        assert_eq!(summary, RunSummary::default());
        assert_eq!(report.finished, Some(RunSummary::default()));
    }
}
