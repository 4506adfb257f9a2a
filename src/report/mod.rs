//! Reporting finished cases.
//!
//! A [`Reporter`] is fed by the [`Runner`](crate::runner::Runner) as the run progresses.
//! Two implementations ship with the crate:
//!
//! - [`ConsoleReporter`]: pytest-like progress marks, a failures section and a summary line
//! - [`JsonReporter`]: one JSON object per event, for tooling

mod console;
mod json;

pub use console::ConsoleReporter;
pub use json::JsonReporter;

use miette::Diagnostic;
use stagehand_core::Case;
use thiserror::Error;

use crate::runner::RunSummary;

/// Errors writing a report. Test failures are never reported through this type.
#[derive(Debug, Error, Diagnostic)]
pub enum ReportError {
    #[error("failed to write report output")]
    #[diagnostic(code(stagehand::report::io), help("check that the output stream is still open"))]
    Io(#[from] std::io::Error),

    #[error("failed to encode report event as JSON")]
    #[diagnostic(code(stagehand::report::json))]
    Json(#[from] serde_json::Error),
}

/// Callbacks for the phases of a run.
pub trait Reporter {
    /// Called once, after selection, with the number of cases about to run.
    fn on_run_start(&mut self, _case_count: usize) -> Result<(), ReportError> {
        Ok(())
    }

    /// Called before a fixture's cases run.
    fn on_fixture_start(&mut self, _fixture: &str, _case_count: usize) -> Result<(), ReportError> {
        Ok(())
    }

    /// Called for every case once its fixture has finished.
    fn on_case_complete(&mut self, case: &Case) -> Result<(), ReportError>;

    fn on_run_complete(&mut self, summary: &RunSummary) -> Result<(), ReportError>;
}
