//! Command implementations
//!
//! All functions return `CliResult<T>` instead of calling `process::exit`.

use std::io::{self, Write};

use stagehand_core::Scope;
use stagehand_core::markers::{self, MARKERS};

use super::{CliError, CliResult, ExitCode, FormatArg};
use crate::config::RunConfig;
use crate::pipeline::Lifecycle;
use crate::report::{ConsoleReporter, JsonReporter};
use crate::runner::{RunSummary, Runner};
use crate::samples::{self, Style};

/// Options for `stagehand samples`, resolved from the command line.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    pub style: Style,
    pub lifecycle: Option<Lifecycle>,
    pub verbose: bool,
    pub stop_on_fail: bool,
    pub filter: Option<String>,
    pub format: FormatArg,
    pub color: bool,
}

impl SampleOptions {
    fn config(&self) -> RunConfig {
        let mut config = RunConfig::new()
            .with_stop_on_first_failure(self.stop_on_fail)
            .with_verbose(self.verbose);
        if let Some(filter) = &self.filter {
            config = config.with_filter(filter.as_str());
        }
        if let Some(lifecycle) = self.lifecycle {
            config = config.with_lifecycle(lifecycle);
        }
        config
    }
}

/// Run the sample fixtures and report them in the requested format.
pub fn run_samples(options: &SampleOptions) -> CliResult<ExitCode> {
    let config = options.config();
    let suites = samples::suites(options.style, &config);
    let mut runner = Runner::new(config);
    for suite in suites {
        runner.add_suite(suite);
    }
    tracing::debug!(suites = runner.suite_count(), style = ?options.style, "running samples");

    let summary = match options.format {
        FormatArg::Console => {
            let mut reporter = ConsoleReporter::stdout()
                .with_verbose(runner.config().verbose)
                .with_color(options.color);
            runner.run(&mut reporter)?
        }
        FormatArg::Json => {
            let mut reporter = JsonReporter::new(io::stdout());
            runner.run(&mut reporter)?
        }
    };

    let code = exit_code_for(&summary);
    if code == ExitCode::NO_CASES {
        eprintln!("No cases collected");
    }
    Ok(code)
}

fn exit_code_for(summary: &RunSummary) -> ExitCode {
    match summary.exit_code() {
        0 => ExitCode::SUCCESS,
        2 => ExitCode::NO_CASES,
        code => ExitCode(code),
    }
}

/// Print the marker registry.
pub fn list_markers() -> CliResult<ExitCode> {
    let mut out = io::stdout().lock();
    write_markers(&mut out).map_err(|e| CliError::failure(format!("Error writing marker list: {e}")))?;
    Ok(ExitCode::SUCCESS)
}

fn write_markers(out: &mut impl Write) -> io::Result<()> {
    for info in MARKERS {
        let aliases = if info.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", info.aliases.join(", "))
        };
        writeln!(
            out,
            "{:<18} {:<8} {}{}",
            markers::as_str(info.id),
            info.scope.map_or("case", Scope::as_str),
            info.description,
            aliases
        )?;
    }
    Ok(())
}
