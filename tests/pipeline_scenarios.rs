//! End-to-end scenarios for the staged pipeline.
//!
//! Each test builds a small fixture whose methods log to a shared trace, runs it through
//! a fully assembled `FixtureStage`, and checks both the trace (what ran) and the cases'
//! failure lists (what was recorded).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use stagehand::pipeline::{
    ClassHook, Factory, Fixture, FixtureStage, FixtureStageBuilder, InstanceHook, InstanceStageBuilder, Lifecycle,
    MethodStageBuilder,
};
use stagehand_core::markers::{FIXTURE_SET_UP, FIXTURE_TEAR_DOWN, SET_UP, TEAR_DOWN, TEST};
use stagehand_core::{Case, CaseOutcome, Failure, FailureKind, FailureList, Marker, MethodFilter, Scope};

// ============================================================================
// Harness
// ============================================================================

type Trace = Arc<Mutex<Vec<String>>>;

fn note(trace: &Trace, entry: impl Into<String>) {
    trace.lock().unwrap().push(entry.into());
}

fn entries(trace: &Trace) -> Vec<String> {
    trace.lock().unwrap().clone()
}

/// Instance type for every scenario: just a handle on the shared trace.
struct Probe {
    trace: Trace,
}

fn factory(trace: &Trace) -> Factory<Probe> {
    let trace = Arc::clone(trace);
    Factory::new(move |_| {
        note(&trace, "create");
        Ok(Probe {
            trace: Arc::clone(&trace),
        })
    })
}

/// Instance method that logs `name` and then fails with `error`, if any.
fn step(name: &'static str, error: Option<&'static str>) -> impl Fn(&mut Probe) -> stagehand::pipeline::MethodResult {
    move |probe: &mut Probe| {
        note(&probe.trace, name);
        match error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

/// Associated function that logs `name` and then fails with `error`, if any.
fn class_step(
    trace: &Trace,
    name: &'static str,
    error: Option<&'static str>,
) -> impl Fn() -> stagehand::pipeline::MethodResult + use<> {
    let trace = Arc::clone(trace);
    move || {
        note(&trace, name);
        match error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }
}

/// Stage with every scope wrapped by the standard markers.
fn full_stage(trace: &Trace, lifecycle: Lifecycle) -> FixtureStage<Probe> {
    let method_stage = MethodStageBuilder::new().set_up_tear_down(SET_UP, TEAR_DOWN).build();
    let instance_stage = InstanceStageBuilder::new(method_stage)
        .set_up_tear_down("instance_set_up", "instance_tear_down")
        .build();
    FixtureStageBuilder::new(instance_stage, factory(trace))
        .lifecycle(lifecycle)
        .set_up_tear_down(FIXTURE_SET_UP, FIXTURE_TEAR_DOWN)
        .build()
}

fn run(stage: &FixtureStage<Probe>, fixture: &Fixture<Probe>) -> Vec<Case> {
    stage.run(fixture, &MethodFilter::new().has(TEST))
}

fn ran(trace: &Trace, name: &str) -> bool {
    entries(trace).iter().any(|entry| entry == name)
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_class_set_up_failure_fails_every_case_and_skips_everything_else() {
    let trace = Trace::default();
    let fixture = Fixture::new("Db")
        .static_method("connect", [FIXTURE_SET_UP], class_step(&trace, "connect", Some("E1")))
        .static_method("disconnect", [FIXTURE_TEAR_DOWN], class_step(&trace, "disconnect", None))
        .method("a", [TEST], step("a", None))
        .method("b", [TEST], step("b", None))
        .method("c", [TEST], step("c", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerCase), &fixture);

    let expected = FailureList::single(Failure::set_up(Scope::Class, "E1").in_method("connect"));
    assert_eq!(cases.len(), 3);
    for case in &cases {
        assert_eq!(case.failures(), &expected);
        assert_eq!(case.outcome(), CaseOutcome::ClassSetUpFailed);
    }
    assert_eq!(entries(&trace), vec!["connect"]);
}

#[test]
fn test_method_tear_down_failure_is_the_only_entry() {
    let trace = Trace::default();
    let fixture = Fixture::new("Files")
        .method("body", [TEST], step("body", None))
        .method("cleanup", [TEAR_DOWN], step("cleanup", Some("E2")));

    let cases = run(&full_stage(&trace, Lifecycle::PerCase), &fixture);

    assert_eq!(cases.len(), 1);
    assert_eq!(
        cases[0].failures(),
        &FailureList::single(Failure::tear_down(Scope::Method, "E2").in_method("cleanup"))
    );
    assert!(!cases[0].passed());
    assert_eq!(cases[0].outcome(), CaseOutcome::Failed);
}

#[test]
fn test_per_case_factory_failure_only_affects_its_case() {
    let trace = Trace::default();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let factory_trace = Arc::clone(&trace);
    let factory = Factory::new(move |_| {
        if counter.fetch_add(1, Ordering::SeqCst) == 1 {
            return Err("E3".into());
        }
        Ok(Probe {
            trace: Arc::clone(&factory_trace),
        })
    });
    let stage = FixtureStageBuilder::new(
        InstanceStageBuilder::new(MethodStageBuilder::new().build()).build(),
        factory,
    )
    .create_instance_per_case()
    .build();
    let fixture = Fixture::new("Flaky")
        .method("first", [TEST], step("first", None))
        .method("second", [TEST], step("second", None));

    let cases = run(&stage, &fixture);

    assert!(cases[0].passed());
    assert_eq!(cases[1].failures(), &FailureList::single(Failure::instantiation("E3")));
    assert_eq!(cases[1].outcome(), CaseOutcome::InstantiationFailed);
    assert_eq!(entries(&trace), vec!["first"]);
}

#[test]
fn test_shared_instance_set_up_failure_fails_all_sharing_cases() {
    let trace = Trace::default();
    let fixture = Fixture::new("Shared")
        .method("instance_set_up", [Marker::new("instance_set_up")], step("instance_set_up", Some("E4")))
        .method("instance_tear_down", [Marker::new("instance_tear_down")], step("instance_tear_down", None))
        .method("set_up", [SET_UP], step("set_up", None))
        .method("x", [TEST], step("x", None))
        .method("y", [TEST], step("y", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    let expected = FailureList::single(Failure::set_up(Scope::Instance, "E4").in_method("instance_set_up"));
    for case in &cases {
        assert_eq!(case.failures(), &expected);
        assert_eq!(case.outcome(), CaseOutcome::InstanceSetUpFailed);
    }
    assert_eq!(entries(&trace), vec!["create", "instance_set_up"]);
}

// ============================================================================
// Decorator properties at each scope
// ============================================================================

#[test]
fn test_tear_down_runs_once_and_adds_to_invocation_failure() {
    let trace = Trace::default();
    let fixture = Fixture::new("Both")
        .method("set_up", [SET_UP], step("set_up", None))
        .method("body", [TEST], step("body", Some("body failed")))
        .method("tear_down", [TEAR_DOWN], step("tear_down", Some("tear-down failed")));

    let cases = run(&full_stage(&trace, Lifecycle::PerCase), &fixture);

    assert_eq!(
        cases[0].failures().as_slice(),
        &[
            Failure::invocation("body failed").in_method("body"),
            Failure::tear_down(Scope::Method, "tear-down failed").in_method("tear_down"),
        ]
    );
    assert_eq!(entries(&trace), vec!["create", "set_up", "body", "tear_down"]);
}

#[test]
fn test_method_set_up_failure_skips_body_and_tear_down_for_that_case_only() {
    let trace = Trace::default();
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let fixture = Fixture::new("Partial")
        .method("set_up", [SET_UP], move |probe: &mut Probe| {
            note(&probe.trace, "set_up");
            if counter.fetch_add(1, Ordering::SeqCst) == 0 { Err("first set-up".into()) } else { Ok(()) }
        })
        .method("tear_down", [TEAR_DOWN], step("tear_down", None))
        .method("one", [TEST], step("one", None))
        .method("two", [TEST], step("two", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    assert_eq!(cases[0].outcome(), CaseOutcome::MethodSetUpFailed);
    assert!(cases[1].passed());
    assert_eq!(entries(&trace), vec!["create", "set_up", "set_up", "two", "tear_down"]);
}

#[test]
fn test_instance_tear_down_failure_reaches_every_sharing_case() {
    let trace = Trace::default();
    let fixture = Fixture::new("Shared")
        .method("instance_tear_down", [Marker::new("instance_tear_down")], step("instance_tear_down", Some("leak")))
        .method("x", [TEST], step("x", Some("x failed")))
        .method("y", [TEST], step("y", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    let leak = Failure::tear_down(Scope::Instance, "leak").in_method("instance_tear_down");
    assert_eq!(
        cases[0].failures().as_slice(),
        &[Failure::invocation("x failed").in_method("x"), leak.clone()]
    );
    assert_eq!(cases[1].failures().as_slice(), &[leak]);
}

#[test]
fn test_class_tear_down_failure_reaches_every_case() {
    let trace = Trace::default();
    let fixture = Fixture::new("Pool")
        .static_method("drain", [FIXTURE_TEAR_DOWN], class_step(&trace, "drain", Some("pool busy")))
        .method("a", [TEST], step("a", None))
        .method("b", [TEST], step("b", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerCase), &fixture);

    for case in &cases {
        assert_eq!(case.failures().messages(), vec!["pool busy"]);
        assert_eq!(case.failures().as_slice()[0].kind(), FailureKind::TearDown(Scope::Class));
    }
    assert_eq!(entries(&trace), vec!["create", "a", "create", "b", "drain"]);
}

#[test]
fn test_nested_wraps_compose_outside_in() {
    let trace = Trace::default();
    let method_stage = MethodStageBuilder::new()
        .set_up_tear_down("inner_up", "inner_down")
        .set_up_tear_down("outer_up", "outer_down")
        .build();
    let stage = FixtureStageBuilder::new(InstanceStageBuilder::new(method_stage).build(), factory(&trace)).build();
    let fixture = Fixture::new("Nested")
        .method("outer_down", [Marker::new("outer_down")], step("outer_down", None))
        .method("inner_down", [Marker::new("inner_down")], step("inner_down", None))
        .method("inner_up", [Marker::new("inner_up")], step("inner_up", None))
        .method("outer_up", [Marker::new("outer_up")], step("outer_up", None))
        .method("body", [TEST], step("body", None));

    let cases = run(&stage, &fixture);

    assert!(cases[0].passed());
    assert_eq!(
        entries(&trace),
        vec!["create", "outer_up", "inner_up", "body", "inner_down", "outer_down"]
    );
}

// ============================================================================
// Instantiation and release
// ============================================================================

fn releasing(fixture: Fixture<Probe>, releases: &Arc<AtomicUsize>, fail_first: bool) -> Fixture<Probe> {
    let releases = Arc::clone(releases);
    fixture.release_with(move |probe: &mut Probe| {
        note(&probe.trace, "release");
        let previous = releases.fetch_add(1, Ordering::SeqCst);
        if fail_first && previous == 0 { Err("handle leaked".into()) } else { Ok(()) }
    })
}

#[test]
fn test_per_case_release_failure_only_affects_its_case() {
    let trace = Trace::default();
    let releases = Arc::new(AtomicUsize::new(0));
    let fixture = releasing(
        Fixture::new("Handles")
            .method("a", [TEST], step("a", None))
            .method("b", [TEST], step("b", None)),
        &releases,
        true,
    );

    let cases = run(&full_stage(&trace, Lifecycle::PerCase), &fixture);

    assert_eq!(cases[0].failures(), &FailureList::single(Failure::release("handle leaked")));
    assert!(cases[1].passed());
    assert_eq!(releases.load(Ordering::SeqCst), 2);
    assert_eq!(entries(&trace), vec!["create", "a", "release", "create", "b", "release"]);
}

#[test]
fn test_release_runs_even_when_instance_set_up_fails() {
    let trace = Trace::default();
    let releases = Arc::new(AtomicUsize::new(0));
    let fixture = releasing(
        Fixture::new("Guarded")
            .method("instance_set_up", [Marker::new("instance_set_up")], step("instance_set_up", Some("boom")))
            .method("a", [TEST], step("a", None)),
        &releases,
        false,
    );

    let cases = run(&full_stage(&trace, Lifecycle::PerCase), &fixture);

    assert_eq!(cases[0].outcome(), CaseOutcome::InstanceSetUpFailed);
    assert_eq!(releases.load(Ordering::SeqCst), 1);
}

#[test]
fn test_per_fixture_creates_and_releases_once() {
    let trace = Trace::default();
    let releases = Arc::new(AtomicUsize::new(0));
    let fixture = releasing(
        Fixture::new("Once")
            .method("a", [TEST], step("a", None))
            .method("b", [TEST], step("b", None))
            .method("c", [TEST], step("c", None)),
        &releases,
        false,
    );

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    assert!(cases.iter().all(Case::passed));
    assert_eq!(entries(&trace), vec!["create", "a", "b", "c", "release"]);
}

#[test]
fn test_per_fixture_factory_failure_reaches_every_case_without_release() {
    let releases = Arc::new(AtomicUsize::new(0));
    let fixture = releasing(
        Fixture::new("NoDb").method("a", [TEST], step("a", None)).method("b", [TEST], step("b", None)),
        &releases,
        false,
    );
    let stage = FixtureStageBuilder::new(
        InstanceStageBuilder::new(MethodStageBuilder::new().build()).build(),
        Factory::new(|_| panic!("no database")),
    )
    .create_instance_per_fixture()
    .build();

    let cases = run(&stage, &fixture);

    for case in &cases {
        assert_eq!(case.failures(), &FailureList::single(Failure::instantiation("panicked: no database")));
    }
    assert_eq!(releases.load(Ordering::SeqCst), 0);
}

// ============================================================================
// Custom hooks and edge cases
// ============================================================================

#[test]
fn test_custom_hooks_receive_fixture_and_instance() {
    let trace = Trace::default();
    let class_trace = Arc::clone(&trace);
    let method_stage = MethodStageBuilder::new()
        .set_up(InstanceHook::custom(|fixture: &Fixture<Probe>, probe: &mut Probe| {
            note(&probe.trace, format!("before {}", fixture.name()));
            FailureList::new()
        }))
        .build();
    let stage = FixtureStageBuilder::new(InstanceStageBuilder::new(method_stage).build(), factory(&trace))
        .tear_down(ClassHook::custom(move |fixture: &Fixture<Probe>| {
            note(&class_trace, format!("after {}", fixture.methods().len()));
            FailureList::new()
        }))
        .build();
    let fixture = Fixture::new("Custom").method("only", [TEST], step("only", None));

    let cases = run(&stage, &fixture);

    assert!(cases[0].passed());
    assert_eq!(entries(&trace), vec!["create", "before Custom", "only", "after 1"]);
}

#[test]
fn test_panicking_custom_hook_is_a_set_up_failure() {
    let trace = Trace::default();
    let stage = FixtureStageBuilder::new(
        InstanceStageBuilder::new(MethodStageBuilder::new().build())
            .set_up(InstanceHook::custom(|_, _: &mut Probe| panic!("hook exploded")))
            .build(),
        factory(&trace),
    )
    .build();
    let fixture = Fixture::new("Explodes").method("never", [TEST], step("never", None));

    let cases = run(&stage, &fixture);

    assert_eq!(
        cases[0].failures(),
        &FailureList::single(Failure::set_up(Scope::Instance, "panicked: hook exploded"))
    );
    assert!(!ran(&trace, "never"));
}

#[test]
fn test_panicking_test_body_is_an_invocation_failure() {
    let trace = Trace::default();
    let fixture = Fixture::new("Panics")
        .method("explodes", [TEST], |_: &mut Probe| panic!("index out of bounds"))
        .method("fine", [TEST], step("fine", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    assert_eq!(
        cases[0].failures(),
        &FailureList::single(Failure::invocation("panicked: index out of bounds").in_method("explodes"))
    );
    assert!(cases[1].passed());
}

#[test]
fn test_unknown_case_method_is_an_invocation_failure() {
    let trace = Trace::default();
    let fixture = Fixture::new("Known").method("real", [TEST], step("real", None));
    let mut cases = vec![Case::new("Known", "ghost")];

    full_stage(&trace, Lifecycle::PerCase).execute(&fixture, &mut cases);

    assert_eq!(cases[0].outcome(), CaseOutcome::Failed);
    assert_eq!(cases[0].failures().as_slice()[0].method(), Some("ghost"));
}

#[test]
fn test_empty_selection_still_runs_class_hooks_only() {
    let trace = Trace::default();
    let fixture = Fixture::new("Empty")
        .static_method("open", [FIXTURE_SET_UP], class_step(&trace, "open", None))
        .static_method("close", [FIXTURE_TEAR_DOWN], class_step(&trace, "close", None));

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    assert!(cases.is_empty());
    assert_eq!(entries(&trace), vec!["open", "close"]);
}

#[test]
fn test_stage_is_reusable_across_fixtures() {
    let trace = Trace::default();
    let stage = full_stage(&trace, Lifecycle::PerCase);
    let first = Fixture::new("First").method("a", [TEST], step("a", None));
    let second = Fixture::new("Second").method("b", [TEST], step("b", Some("nope")));

    let first_cases = run(&stage, &first);
    let second_cases = run(&stage.clone(), &second);

    assert!(first_cases[0].passed());
    assert_eq!(second_cases[0].fixture_name(), "Second");
    assert!(!second_cases[0].passed());
}

#[test]
fn test_redeclared_method_runs_the_latest_body() {
    let trace = Trace::default();
    let fixture = Fixture::new("Dup")
        .method("same", [TEST], step("first body", None))
        .method("same", [TEST], step("second body", Some("second failed")));

    let cases = run(&full_stage(&trace, Lifecycle::PerFixture), &fixture);

    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].failures().messages(), vec!["second failed"]);
    assert!(ran(&trace, "second body"));
    assert!(!ran(&trace, "first body"));
}
