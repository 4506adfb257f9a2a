//! Line-delimited JSON output.

use std::io::Write;

use serde::Serialize;
use stagehand_core::{Case, CaseOutcome, CaseStatus};

use super::{ReportError, Reporter};
use crate::runner::RunSummary;

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    RunStart {
        cases: usize,
    },
    FixtureStart {
        fixture: &'a str,
        cases: usize,
    },
    Case {
        #[serde(flatten)]
        case: &'a Case,
        status: CaseStatus,
        outcome: CaseOutcome,
    },
    RunComplete {
        passed: usize,
        failed: usize,
        exit_code: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        duration_secs: Option<f64>,
    },
}

/// Writes one JSON object per line for each reporter event.
pub struct JsonReporter<W: Write> {
    out: W,
    timing: bool,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, timing: true }
    }

    /// Include the run duration in the final event.
    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, event: &Event<'_>) -> Result<(), ReportError> {
        serde_json::to_writer(&mut self.out, event)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn on_run_start(&mut self, case_count: usize) -> Result<(), ReportError> {
        self.emit(&Event::RunStart { cases: case_count })
    }

    fn on_fixture_start(&mut self, fixture: &str, case_count: usize) -> Result<(), ReportError> {
        self.emit(&Event::FixtureStart {
            fixture,
            cases: case_count,
        })
    }

    fn on_case_complete(&mut self, case: &Case) -> Result<(), ReportError> {
        self.emit(&Event::Case {
            case,
            status: case.status(),
            outcome: case.outcome(),
        })
    }

    fn on_run_complete(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        let duration_secs = self.timing.then(|| summary.duration.as_secs_f64());
        self.emit(&Event::RunComplete {
            passed: summary.passed,
            failed: summary.failed,
            exit_code: summary.exit_code(),
            duration_secs,
        })?;
        self.out.flush()?;
        Ok(())
    }
}
