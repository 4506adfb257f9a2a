//! Instantiation strategies: how many fixture instances back a fixture's cases.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use stagehand_core::{Case, Failure, FailureKind, FailureList};

use super::fixture::{BoxError, Fixture};
use super::guard::InstanceGuard;
use super::invoke::guarded;
use super::stage::InstanceStage;

/// Instance lifecycle for one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Lifecycle {
    /// A fresh instance for every case; cases cannot observe each other's state.
    #[default]
    PerCase,
    /// One instance shared by all cases of the fixture, in case order.
    PerFixture,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::PerCase => "per-case",
            Lifecycle::PerFixture => "per-fixture",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type FactoryFn<T> = Arc<dyn Fn(&Fixture<T>) -> Result<T, BoxError> + Send + Sync>;

/// Creates fixture instances. Errors and panics become instantiation failures.
pub struct Factory<T>(FactoryFn<T>);

impl<T> Factory<T> {
    pub fn new<F>(create: F) -> Self
    where
        F: Fn(&Fixture<T>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(create))
    }

    fn create(&self, fixture: &Fixture<T>) -> Result<T, Failure> {
        guarded(FailureKind::Instantiation, || (self.0)(fixture))
    }
}

impl<T: Default + 'static> Factory<T> {
    /// Build instances with `T::default()`.
    pub fn default_instance() -> Self {
        Self::new(|_| Ok(T::default()))
    }
}

impl<T> Clone for Factory<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> fmt::Debug for Factory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Factory(..)")
    }
}

/// Terminal action of a fixture stage: create instances per the lifecycle and run the
/// instance stage against each.
pub(crate) struct Instantiation<T> {
    pub(crate) lifecycle: Lifecycle,
    pub(crate) factory: Factory<T>,
    pub(crate) instance_stage: InstanceStage<T>,
}

impl<T> Instantiation<T> {
    pub(crate) fn execute(&self, fixture: &Fixture<T>, cases: &mut [Case]) {
        match self.lifecycle {
            Lifecycle::PerCase => {
                for case in cases.iter_mut() {
                    self.perform_lifecycle(fixture, std::slice::from_mut(case));
                }
            }
            Lifecycle::PerFixture => {
                if !cases.is_empty() {
                    self.perform_lifecycle(fixture, cases);
                }
            }
        }
    }

    /// Create one instance, run `cases` against it, release it.
    ///
    /// Nothing escapes: a factory failure or a panic that got past the inner stages is
    /// recorded as an instantiation failure, and the release hook's failures follow it.
    /// Both reach every case in `cases`.
    fn perform_lifecycle(&self, fixture: &Fixture<T>, cases: &mut [Case]) {
        let mut released = FailureList::new();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let instance = match self.factory.create(fixture) {
                Ok(instance) => instance,
                Err(failure) => return Some(failure),
            };
            let mut guard = InstanceGuard::new(instance, fixture.release_hook(), &mut released);
            self.instance_stage.execute(fixture, guard.instance_mut(), cases);
            None
        }));

        let escaped = match outcome {
            Ok(failure) => failure,
            Err(payload) => Some(Failure::from_panic(FailureKind::Instantiation, payload.as_ref())),
        };

        if let Some(failure) = escaped {
            tracing::warn!(fixture = fixture.name(), %failure, "instance lifecycle failed");
            for case in cases.iter_mut() {
                case.fail(failure.clone());
            }
        }
        if released.any() {
            tracing::warn!(fixture = fixture.name(), failures = released.len(), "instance release failed");
            for case in cases.iter_mut() {
                case.record(&released);
            }
        }
    }
}

impl<T> Clone for Instantiation<T> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle,
            factory: self.factory.clone(),
            instance_stage: self.instance_stage.clone(),
        }
    }
}
