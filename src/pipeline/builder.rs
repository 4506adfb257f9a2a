//! Builders that assemble stage chains.
//!
//! Each call to a `set_up_tear_down*` method wraps everything added before it, so the
//! last pair added runs outermost:
//!
//! ```rust
//! use stagehand::pipeline::{InstanceHook, MethodStageBuilder};
//! use stagehand_core::markers::{SET_UP, TEAR_DOWN};
//!
//! struct Db;
//!
//! let stage = MethodStageBuilder::<Db>::new()
//!     .set_up_tear_down(SET_UP, TEAR_DOWN)
//!     .set_up(InstanceHook::marked("warm_cache"))
//!     .build();
//! assert_eq!(stage.depth(), 2);
//! ```

use std::sync::Arc;

use stagehand_core::{Marker, Scope};

use super::stage::{ClassHook, FixtureStage, InstanceHook, InstanceStage, MethodStage, Wrap};
use super::strategy::{Factory, Instantiation, Lifecycle};

fn push<H>(wraps: &mut Vec<Wrap<H>>, scope: Scope, set_up: Option<H>, tear_down: Option<H>) {
    wraps.push(Wrap {
        scope,
        set_up,
        tear_down,
    });
}

/// Builds a [`MethodStage`].
pub struct MethodStageBuilder<T> {
    wraps: Vec<Wrap<InstanceHook<T>>>,
}

impl<T> MethodStageBuilder<T> {
    pub fn new() -> Self {
        Self { wraps: Vec::new() }
    }

    /// Invoke methods marked `set_up` before, and methods marked `tear_down` after.
    pub fn set_up_tear_down(self, set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        self.set_up_tear_down_with(InstanceHook::marked(set_up), InstanceHook::marked(tear_down))
    }

    pub fn set_up_tear_down_with(mut self, set_up: InstanceHook<T>, tear_down: InstanceHook<T>) -> Self {
        push(&mut self.wraps, Scope::Method, Some(set_up), Some(tear_down));
        self
    }

    /// Wrap with a set-up only.
    pub fn set_up(mut self, set_up: InstanceHook<T>) -> Self {
        push(&mut self.wraps, Scope::Method, Some(set_up), None);
        self
    }

    /// Wrap with a tear-down only.
    pub fn tear_down(mut self, tear_down: InstanceHook<T>) -> Self {
        push(&mut self.wraps, Scope::Method, None, Some(tear_down));
        self
    }

    pub fn build(self) -> MethodStage<T> {
        MethodStage {
            wraps: Arc::from(self.wraps),
        }
    }
}

impl<T> Default for MethodStageBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds an [`InstanceStage`] around a finished [`MethodStage`].
pub struct InstanceStageBuilder<T> {
    wraps: Vec<Wrap<InstanceHook<T>>>,
    method_stage: MethodStage<T>,
}

impl<T> InstanceStageBuilder<T> {
    pub fn new(method_stage: MethodStage<T>) -> Self {
        Self {
            wraps: Vec::new(),
            method_stage,
        }
    }

    pub fn set_up_tear_down(self, set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        self.set_up_tear_down_with(InstanceHook::marked(set_up), InstanceHook::marked(tear_down))
    }

    pub fn set_up_tear_down_with(mut self, set_up: InstanceHook<T>, tear_down: InstanceHook<T>) -> Self {
        push(&mut self.wraps, Scope::Instance, Some(set_up), Some(tear_down));
        self
    }

    pub fn set_up(mut self, set_up: InstanceHook<T>) -> Self {
        push(&mut self.wraps, Scope::Instance, Some(set_up), None);
        self
    }

    pub fn tear_down(mut self, tear_down: InstanceHook<T>) -> Self {
        push(&mut self.wraps, Scope::Instance, None, Some(tear_down));
        self
    }

    pub fn build(self) -> InstanceStage<T> {
        InstanceStage {
            wraps: Arc::from(self.wraps),
            method_stage: self.method_stage,
        }
    }
}

/// Builds a [`FixtureStage`]: class-scope wraps plus the instantiation strategy.
///
/// The lifecycle defaults to [`Lifecycle::PerCase`].
pub struct FixtureStageBuilder<T> {
    wraps: Vec<Wrap<ClassHook<T>>>,
    lifecycle: Lifecycle,
    factory: Factory<T>,
    instance_stage: InstanceStage<T>,
}

impl<T> FixtureStageBuilder<T> {
    pub fn new(instance_stage: InstanceStage<T>, factory: Factory<T>) -> Self {
        Self {
            wraps: Vec::new(),
            lifecycle: Lifecycle::default(),
            factory,
            instance_stage,
        }
    }

    pub fn create_instance_per_case(self) -> Self {
        self.lifecycle(Lifecycle::PerCase)
    }

    pub fn create_instance_per_fixture(self) -> Self {
        self.lifecycle(Lifecycle::PerFixture)
    }

    pub fn lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Invoke associated functions marked `set_up` before any instance exists, and those
    /// marked `tear_down` after the last instance is released.
    pub fn set_up_tear_down(self, set_up: impl Into<Marker>, tear_down: impl Into<Marker>) -> Self {
        self.set_up_tear_down_with(ClassHook::marked(set_up), ClassHook::marked(tear_down))
    }

    pub fn set_up_tear_down_with(mut self, set_up: ClassHook<T>, tear_down: ClassHook<T>) -> Self {
        push(&mut self.wraps, Scope::Class, Some(set_up), Some(tear_down));
        self
    }

    pub fn set_up(mut self, set_up: ClassHook<T>) -> Self {
        push(&mut self.wraps, Scope::Class, Some(set_up), None);
        self
    }

    pub fn tear_down(mut self, tear_down: ClassHook<T>) -> Self {
        push(&mut self.wraps, Scope::Class, None, Some(tear_down));
        self
    }

    pub fn build(self) -> FixtureStage<T> {
        FixtureStage {
            wraps: Arc::from(self.wraps),
            instantiation: Instantiation {
                lifecycle: self.lifecycle,
                factory: self.factory,
                instance_stage: self.instance_stage,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixture::Fixture;
    use stagehand_core::markers::{FIXTURE_SET_UP, FIXTURE_TEAR_DOWN, SET_UP, TEAR_DOWN, TEST};
    use stagehand_core::{FailureList, MethodFilter};
    use std::sync::{Arc, Mutex};

    type Trace = Arc<Mutex<Vec<String>>>;

    #[derive(Default)]
    struct Recorder {
        trace: Trace,
    }

    fn note(trace: &Trace, entry: &str) {
        if let Ok(mut trace) = trace.lock() {
            trace.push(entry.to_string());
        }
    }

    fn fixture(trace: &Trace) -> Fixture<Recorder> {
        let class_up = Arc::clone(trace);
        let class_down = Arc::clone(trace);
        Fixture::new("Recorder")
            .static_method("open", [FIXTURE_SET_UP], move || {
                note(&class_up, "class-up");
                Ok(())
            })
            .static_method("close", [FIXTURE_TEAR_DOWN], move || {
                note(&class_down, "class-down");
                Ok(())
            })
            .method("set_up", [SET_UP], |r: &mut Recorder| {
                note(&r.trace, "method-up");
                Ok(())
            })
            .method("tear_down", [TEAR_DOWN], |r: &mut Recorder| {
                note(&r.trace, "method-down");
                Ok(())
            })
            .method("first", [TEST], |r: &mut Recorder| {
                note(&r.trace, "first");
                Ok(())
            })
            .method("second", [TEST], |r: &mut Recorder| {
                note(&r.trace, "second");
                Ok(())
            })
    }

    fn stage(trace: &Trace, lifecycle: Lifecycle) -> FixtureStage<Recorder> {
        let instance_trace = Arc::clone(trace);
        let method_stage = MethodStageBuilder::new().set_up_tear_down(SET_UP, TEAR_DOWN).build();
        let instance_stage = InstanceStageBuilder::new(method_stage)
            .set_up(InstanceHook::custom(|_, r: &mut Recorder| {
                note(&r.trace, "instance-up");
                FailureList::new()
            }))
            .build();
        let factory = Factory::new(move |_| {
            Ok(Recorder {
                trace: Arc::clone(&instance_trace),
            })
        });
        FixtureStageBuilder::new(instance_stage, factory)
            .lifecycle(lifecycle)
            .set_up_tear_down(FIXTURE_SET_UP, FIXTURE_TEAR_DOWN)
            .build()
    }

    fn recorded(trace: &Trace) -> Vec<String> {
        trace.lock().map(|t| t.clone()).unwrap_or_default()
    }

    #[test]
    fn test_full_chain_order_per_case() {
        let trace = Trace::default();
        let cases = stage(&trace, Lifecycle::PerCase).run(&fixture(&trace), &MethodFilter::new().has(TEST));

        assert!(cases.iter().all(|c| c.passed()));
        assert_eq!(
            recorded(&trace),
            vec![
                "class-up",
                "instance-up",
                "method-up",
                "first",
                "method-down",
                "instance-up",
                "method-up",
                "second",
                "method-down",
                "class-down",
            ]
        );
    }

    #[test]
    fn test_full_chain_order_per_fixture() {
        let trace = Trace::default();
        let cases = stage(&trace, Lifecycle::PerFixture).run(&fixture(&trace), &MethodFilter::new().has(TEST));

        assert_eq!(cases.len(), 2);
        assert_eq!(
            recorded(&trace),
            vec![
                "class-up",
                "instance-up",
                "method-up",
                "first",
                "method-down",
                "method-up",
                "second",
                "method-down",
                "class-down",
            ]
        );
    }

    #[test]
    fn test_builders_report_depth_and_lifecycle() {
        let method_stage = MethodStageBuilder::<Recorder>::new()
            .set_up(InstanceHook::marked(SET_UP))
            .tear_down(InstanceHook::marked(TEAR_DOWN))
            .build();
        assert_eq!(method_stage.depth(), 2);

        let stage = FixtureStageBuilder::new(
            InstanceStageBuilder::new(method_stage).build(),
            Factory::<Recorder>::default_instance(),
        )
        .create_instance_per_fixture()
        .build();
        assert_eq!(stage.depth(), 0);
        assert_eq!(stage.lifecycle(), Lifecycle::PerFixture);
    }
}
