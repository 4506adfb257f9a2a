//! One method-invocation attempt and its failure record.

use serde::Serialize;

use crate::failure::{Failure, FailureKind, FailureList, Scope};

/// Pass/fail status of a case. There is no partial success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
}

/// Terminal state a case ended in, derived from the first failure it recorded.
///
/// The pipeline short-circuits on set-up and instantiation failures, so the earliest
/// failure tells how far the case got. Failures after a successful method set-up
/// (invocation, any tear-down, release) all land in [`CaseOutcome::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    Passed,
    ClassSetUpFailed,
    InstantiationFailed,
    InstanceSetUpFailed,
    MethodSetUpFailed,
    Failed,
}

impl CaseOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseOutcome::Passed => "passed",
            CaseOutcome::ClassSetUpFailed => "class set-up failed",
            CaseOutcome::InstantiationFailed => "instantiation failed",
            CaseOutcome::InstanceSetUpFailed => "instance set-up failed",
            CaseOutcome::MethodSetUpFailed => "method set-up failed",
            CaseOutcome::Failed => "failed",
        }
    }
}

/// A test method selected for execution against an instance of its fixture.
///
/// The case owns the single [`FailureList`] that every stage running on its behalf
/// appends to. Its final state is read by reporters once the fixture has finished.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Case {
    fixture: String,
    method: String,
    failures: FailureList,
}

impl Case {
    pub fn new(fixture: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            fixture: fixture.into(),
            method: method.into(),
            failures: FailureList::new(),
        }
    }

    pub fn fixture_name(&self) -> &str {
        &self.fixture
    }

    pub fn method_name(&self) -> &str {
        &self.method
    }

    /// `Fixture::method` style display name.
    pub fn qualified_name(&self) -> String {
        format!("{}::{}", self.fixture, self.method)
    }

    pub fn failures(&self) -> &FailureList {
        &self.failures
    }

    /// Mutable access to the failure sink, for stages recording on this case's behalf.
    pub fn failures_mut(&mut self) -> &mut FailureList {
        &mut self.failures
    }

    pub fn fail(&mut self, failure: Failure) {
        self.failures.push(failure);
    }

    /// Append a copy of a list that reaches several cases at once.
    pub fn record(&mut self, failures: &FailureList) {
        self.failures.append(failures);
    }

    pub fn status(&self) -> CaseStatus {
        if self.failures.any() {
            CaseStatus::Failed
        } else {
            CaseStatus::Passed
        }
    }

    pub fn passed(&self) -> bool {
        self.status() == CaseStatus::Passed
    }

    pub fn outcome(&self) -> CaseOutcome {
        let Some(first) = self.failures.first() else {
            return CaseOutcome::Passed;
        };
        match first.kind() {
            FailureKind::SetUp(Scope::Class) => CaseOutcome::ClassSetUpFailed,
            FailureKind::Instantiation => CaseOutcome::InstantiationFailed,
            FailureKind::SetUp(Scope::Instance) => CaseOutcome::InstanceSetUpFailed,
            FailureKind::SetUp(Scope::Method) => CaseOutcome::MethodSetUpFailed,
            FailureKind::Invocation | FailureKind::TearDown(_) | FailureKind::Release => CaseOutcome::Failed,
        }
    }
}
