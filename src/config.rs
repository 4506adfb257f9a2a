//! Run configuration.

use crate::pipeline::Lifecycle;

/// Options for one run of the [`Runner`](crate::runner::Runner).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    /// Keep only cases whose method name contains this substring
    pub filter: Option<String>,
    /// Stop after the first fixture that reports a failed case
    pub stop_on_first_failure: bool,
    /// Override the lifecycle every convention-built suite would otherwise use
    pub lifecycle: Option<Lifecycle>,
    /// Report every case by name instead of one mark per case
    pub verbose: bool,
}

impl RunConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the case-name filter
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_stop_on_first_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_failure = stop;
        self
    }

    /// Force a lifecycle for every suite
    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Whether a case with this method name survives the filter.
    pub fn selects(&self, method: &str) -> bool {
        self.filter.as_deref().is_none_or(|needle| method.contains(needle))
    }
}
