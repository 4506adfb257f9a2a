//! Conventions: reusable, marker-based descriptions of a pipeline.
//!
//! A [`Convention`] holds no fixture type. It names which methods are cases and which
//! marker pairs wrap each scope, and turns that into a typed [`FixtureStage`] on
//! demand. The two built-in conventions mirror the classic xUnit family layouts.

use serde::Serialize;
use stagehand_core::markers::{FIXTURE_SET_UP, FIXTURE_TEAR_DOWN, SET_UP, TEAR_DOWN, TEST};
use stagehand_core::{Marker, MethodFilter};

use crate::pipeline::{Factory, FixtureStage, FixtureStageBuilder, InstanceStageBuilder, Lifecycle, MethodStageBuilder};

/// A set-up/tear-down marker pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerPair {
    pub set_up: Marker,
    pub tear_down: Marker,
}

impl MarkerPair {
    pub fn new(set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        Self {
            set_up: set_up.into(),
            tear_down: tear_down.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Convention {
    name: String,
    cases: MethodFilter,
    method_wraps: Vec<MarkerPair>,
    instance_wraps: Vec<MarkerPair>,
    class_wraps: Vec<MarkerPair>,
    lifecycle: Lifecycle,
}

impl Convention {
    /// Empty convention: cases are methods marked `test`, no wraps, per-case lifecycle.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cases: MethodFilter::new().has(TEST),
            method_wraps: Vec::new(),
            instance_wraps: Vec::new(),
            class_wraps: Vec::new(),
            lifecycle: Lifecycle::PerCase,
        }
    }

    /// NUnit layout: one instance per fixture, `set_up`/`tear_down` around each case,
    /// `fixture_set_up`/`fixture_tear_down` associated functions around the fixture.
    pub fn nunit_style() -> Self {
        Self::new("nunit")
            .method_set_up_tear_down(SET_UP, TEAR_DOWN)
            .class_set_up_tear_down(FIXTURE_SET_UP, FIXTURE_TEAR_DOWN)
            .lifecycle(Lifecycle::PerFixture)
    }

    /// xUnit layout: a fresh instance per case with `set_up`/`tear_down` around it;
    /// construction and release do the rest.
    pub fn xunit_style() -> Self {
        Self::new("xunit")
            .instance_set_up_tear_down(SET_UP, TEAR_DOWN)
            .lifecycle(Lifecycle::PerCase)
    }

    pub fn cases(mut self, filter: MethodFilter) -> Self {
        self.cases = filter;
        self
    }

    pub fn method_set_up_tear_down(mut self, set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        self.method_wraps.push(MarkerPair::new(set_up, tear_down));
        self
    }

    pub fn instance_set_up_tear_down(mut self, set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        self.instance_wraps.push(MarkerPair::new(set_up, tear_down));
        self
    }

    pub fn class_set_up_tear_down(mut self, set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        self.class_wraps.push(MarkerPair::new(set_up, tear_down));
        self
    }

    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn case_filter(&self) -> &MethodFilter {
        &self.cases
    }

    pub fn instance_lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Materialise the typed chain for fixtures of type `T`.
    pub fn stage<T>(&self, factory: Factory<T>) -> FixtureStage<T> {
        let method_stage = self
            .method_wraps
            .iter()
            .fold(MethodStageBuilder::new(), |builder, pair| {
                builder.set_up_tear_down(pair.set_up.clone(), pair.tear_down.clone())
            })
            .build();

        let instance_stage = self
            .instance_wraps
            .iter()
            .fold(InstanceStageBuilder::new(method_stage), |builder, pair| {
                builder.set_up_tear_down(pair.set_up.clone(), pair.tear_down.clone())
            })
            .build();

        self.class_wraps
            .iter()
            .fold(FixtureStageBuilder::new(instance_stage, factory), |builder, pair| {
                builder.set_up_tear_down(pair.set_up.clone(), pair.tear_down.clone())
            })
            .lifecycle(self.lifecycle)
            .build()
    }
}
