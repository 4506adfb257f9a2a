#![forbid(unsafe_code)]
//! Staged test execution.
//!
//! stagehand runs the cases of a test fixture through a three-level pipeline: class
//! scope around everything, instance scope around the cases sharing one instance, and
//! method scope around each invocation. Each level can be wrapped in any number of
//! set-up/tear-down pairs, and instances are created per case or once per fixture.
//!
//! Every failure is captured, tagged with the phase it happened in and appended to the
//! affected cases. Nothing a fixture does escapes the pipeline.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module
//!   enforces `#![deny(clippy::unwrap_used)]`.
//! - **User code**: Panics from test bodies, hooks, factories and release hooks are caught and
//!   recorded as failures.
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod convention;
pub mod pipeline;
pub mod report;
pub mod runner;
pub mod samples;

pub use config::RunConfig;
pub use convention::Convention;
pub use pipeline::{Factory, Fixture, FixtureStage, Lifecycle, Release};
pub use report::{ConsoleReporter, JsonReporter, ReportError, Reporter};
pub use runner::{FixtureSuite, RunSummary, Runner, Suite};
