//! Human-readable console output.

use std::io::Write;

use stagehand_core::{Case, FailureList};

use super::{ReportError, Reporter};
use crate::runner::RunSummary;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const BOLD_RED: &str = "\x1b[1;31m";
const BOLD_GREEN: &str = "\x1b[1;32m";
const RESET: &str = "\x1b[0m";

/// pytest-style reporter writing to any [`Write`].
pub struct ConsoleReporter<W: Write> {
    out: W,
    verbose: bool,
    color: bool,
    timing: bool,
    line_open: bool,
    failures: Vec<(String, FailureList)>,
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    /// Colour and timing on, one mark per case.
    pub fn new(out: W) -> Self {
        Self {
            out,
            verbose: false,
            color: true,
            timing: true,
            line_open: false,
            failures: Vec::new(),
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn with_timing(mut self, timing: bool) -> Self {
        self.timing = timing;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: &str, text: &str) -> String {
        if self.color {
            format!("{style}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn close_line(&mut self) -> Result<(), ReportError> {
        if self.line_open {
            writeln!(self.out)?;
            self.line_open = false;
        }
        Ok(())
    }

    fn banner(&self, style: &str, text: &str) -> String {
        self.paint(style, &format!("=================== {text} ==================="))
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn on_run_start(&mut self, case_count: usize) -> Result<(), ReportError> {
        let banner = self.banner(BOLD, "stagehand session starts");
        writeln!(self.out, "{banner}")?;
        writeln!(self.out, "collected {case_count} case(s)")?;
        writeln!(self.out)?;
        Ok(())
    }

    fn on_fixture_start(&mut self, fixture: &str, _case_count: usize) -> Result<(), ReportError> {
        self.close_line()?;
        if self.verbose {
            writeln!(self.out, "{fixture}")?;
        } else {
            write!(self.out, "{fixture} ")?;
            self.line_open = true;
        }
        Ok(())
    }

    fn on_case_complete(&mut self, case: &Case) -> Result<(), ReportError> {
        let passed = case.passed();
        if self.verbose {
            let status = if passed {
                self.paint(GREEN, "PASSED")
            } else {
                let label = format!("FAILED ({})", case.outcome().as_str());
                self.paint(RED, &label)
            };
            writeln!(self.out, "  {} {status}", case.method_name())?;
        } else {
            let mark = if passed { self.paint(GREEN, ".") } else { self.paint(RED, "F") };
            write!(self.out, "{mark}")?;
        }
        if !passed {
            self.failures.push((case.qualified_name(), case.failures().clone()));
        }
        Ok(())
    }

    fn on_run_complete(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.close_line()?;

        if !self.failures.is_empty() {
            let banner = self.banner(BOLD_RED, "FAILURES");
            writeln!(self.out)?;
            writeln!(self.out, "{banner}")?;
            for (name, failures) in &self.failures {
                let header = self.paint(BOLD, &format!("___________ {name} ___________"));
                writeln!(self.out, "{header}")?;
                for failure in failures {
                    writeln!(self.out, "    {failure}")?;
                }
            }
        }

        let mut parts = Vec::new();
        if summary.passed > 0 {
            parts.push(format!("{} passed", summary.passed));
        }
        if summary.failed > 0 {
            parts.push(format!("{} failed", summary.failed));
        }
        let mut line = if parts.is_empty() {
            "no cases ran".to_string()
        } else {
            parts.join(", ")
        };
        if self.timing {
            line.push_str(&format!(" in {:.2}s", summary.duration.as_secs_f64()));
        }

        let style = if summary.has_failures() { BOLD_RED } else { BOLD_GREEN };
        let banner = self.banner(style, &line);
        writeln!(self.out)?;
        writeln!(self.out, "{banner}")?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FixtureReport;
    use stagehand_core::Failure;

    fn plain(verbose: bool) -> ConsoleReporter<Vec<u8>> {
        ConsoleReporter::new(Vec::new())
            .with_verbose(verbose)
            .with_color(false)
            .with_timing(false)
    }

    fn failed_case() -> Case {
        let mut case = Case::new("Stack", "pop");
        case.fail(Failure::invocation("stack was empty").in_method("pop"));
        case
    }

    fn summary(cases: Vec<Case>) -> RunSummary {
        let report = FixtureReport {
            fixture: "Stack".into(),
            cases,
        };
        RunSummary {
            passed: report.passed(),
            failed: report.failed(),
            fixtures: vec![report],
            ..RunSummary::default()
        }
    }

    fn render(mut reporter: ConsoleReporter<Vec<u8>>, cases: Vec<Case>) -> String {
        reporter.on_run_start(cases.len()).unwrap();
        reporter.on_fixture_start("Stack", cases.len()).unwrap();
        for case in &cases {
            reporter.on_case_complete(case).unwrap();
        }
        reporter.on_run_complete(&summary(cases)).unwrap();
        String::from_utf8(reporter.into_inner()).unwrap()
    }

    #[test]
    fn test_compact_marks_and_failure_section() {
        let output = render(plain(false), vec![Case::new("Stack", "push"), failed_case()]);
        assert!(output.contains("collected 2 case(s)"));
        assert!(output.contains("Stack .F\n"));
        assert!(output.contains("___________ Stack::pop ___________"));
        assert!(output.contains("    invocation failed in `pop`: stack was empty"));
        assert!(output.ends_with("=================== 1 passed, 1 failed ===================\n"));
    }

    #[test]
    fn test_verbose_names_each_case() {
        let output = render(plain(true), vec![Case::new("Stack", "push"), failed_case()]);
        assert!(output.contains("Stack\n  push PASSED\n  pop FAILED (failed)\n"));
    }

    #[test]
    fn test_colour_codes_only_when_enabled() {
        let colored = render(ConsoleReporter::new(Vec::new()).with_timing(false), vec![Case::new("Stack", "push")]);
        assert!(colored.contains(GREEN));
        let plain = render(plain(false), vec![Case::new("Stack", "push")]);
        assert!(!plain.contains('\x1b'));
    }

    #[test]
    fn test_empty_run() {
        let mut reporter = plain(false);
        reporter.on_run_start(0).unwrap();
        reporter.on_run_complete(&RunSummary::default()).unwrap();
        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.contains("no cases ran"));
    }
}
