//! Running several fixtures and summarising the outcome.

use std::time::{Duration, Instant};

use serde::Serialize;
use stagehand_core::{Case, MethodFilter};

use crate::config::RunConfig;
use crate::convention::Convention;
use crate::pipeline::{Factory, Fixture, FixtureStage};
use crate::report::{ReportError, Reporter};

/// A runnable unit: one fixture with its pipeline, type-erased.
pub trait Suite {
    fn name(&self) -> &str;

    /// Build the cases this suite would run under `config`, in declaration order.
    fn select(&self, config: &RunConfig) -> Vec<Case>;

    /// Run previously selected cases through the pipeline.
    fn execute(&self, cases: &mut [Case]);
}

/// A [`Fixture`] paired with the stage and case filter that run it.
pub struct FixtureSuite<T> {
    fixture: Fixture<T>,
    stage: FixtureStage<T>,
    cases: MethodFilter,
}

impl<T> FixtureSuite<T> {
    pub fn new(fixture: Fixture<T>, stage: FixtureStage<T>, cases: MethodFilter) -> Self {
        Self { fixture, stage, cases }
    }

    /// Run `fixture` the way `convention` describes.
    pub fn from_convention(fixture: Fixture<T>, convention: &Convention, factory: Factory<T>) -> Self {
        let stage = convention.stage(factory);
        Self::new(fixture, stage, convention.case_filter().clone())
    }

    pub fn fixture(&self) -> &Fixture<T> {
        &self.fixture
    }
}

impl<T> Suite for FixtureSuite<T> {
    fn name(&self) -> &str {
        self.fixture.name()
    }

    fn select(&self, config: &RunConfig) -> Vec<Case> {
        let mut cases = self.fixture.select_cases(&self.cases);
        cases.retain(|case| config.selects(case.method_name()));
        cases
    }

    fn execute(&self, cases: &mut [Case]) {
        self.stage.execute(&self.fixture, cases);
    }
}

/// Finished cases of one fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureReport {
    pub fixture: String,
    pub cases: Vec<Case>,
}

impl FixtureReport {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub fixtures: Vec<FixtureReport>,
    pub passed: usize,
    pub failed: usize,
    pub duration: Duration,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Every finished case, fixture by fixture.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        self.fixtures.iter().flat_map(|f| f.cases.iter())
    }

    /// Process exit code: 0 all passed, 1 any failure, 2 nothing ran.
    pub fn exit_code(&self) -> i32 {
        if self.total() == 0 {
            2
        } else if self.has_failures() {
            1
        } else {
            0
        }
    }
}

/// Runs suites in registration order.
pub struct Runner {
    config: RunConfig,
    suites: Vec<Box<dyn Suite>>,
}

impl Runner {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            suites: Vec::new(),
        }
    }

    pub fn with_suite(mut self, suite: impl Suite + 'static) -> Self {
        self.suites.push(Box::new(suite));
        self
    }

    pub fn add_suite(&mut self, suite: Box<dyn Suite>) {
        self.suites.push(suite);
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    /// Run every suite, feeding `reporter` as cases finish.
    ///
    /// Test failures are data in the summary; only reporter I/O errors are returned.
    #[tracing::instrument(skip_all, fields(suites = self.suites.len()))]
    pub fn run(&self, reporter: &mut dyn Reporter) -> Result<RunSummary, ReportError> {
        let start = Instant::now();
        let selected: Vec<(&dyn Suite, Vec<Case>)> = self
            .suites
            .iter()
            .map(|suite| (suite.as_ref(), suite.select(&self.config)))
            .collect();

        let total = selected.iter().map(|(_, cases)| cases.len()).sum();
        reporter.on_run_start(total)?;

        let mut summary = RunSummary::default();
        for (suite, mut cases) in selected {
            if cases.is_empty() {
                tracing::debug!(fixture = suite.name(), "no cases selected");
                continue;
            }

            reporter.on_fixture_start(suite.name(), cases.len())?;
            suite.execute(&mut cases);
            for case in &cases {
                reporter.on_case_complete(case)?;
            }

            let report = FixtureReport {
                fixture: suite.name().to_string(),
                cases,
            };
            summary.passed += report.passed();
            summary.failed += report.failed();
            let stop = self.config.stop_on_first_failure && report.failed() > 0;
            summary.fixtures.push(report);

            if stop {
                tracing::info!(fixture = suite.name(), "stopping after first failing fixture");
                break;
            }
        }

        summary.duration = start.elapsed();
        reporter.on_run_complete(&summary)?;
        Ok(summary)
    }
}
