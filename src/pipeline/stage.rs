//! Stage chains and the set-up/tear-down decorator they are built from.
//!
//! Each of the three scopes has one chain type:
//!
//! | Stage               | Terminal action                              | Failure reach            |
//! |---------------------|----------------------------------------------|--------------------------|
//! | [`MethodStage`]     | invoke the case's method on the instance     | the one case             |
//! | [`InstanceStage`]   | run the method stage for every assigned case | every case on the instance |
//! | [`FixtureStage`]    | create instances per the lifecycle           | every case of the fixture |
//!
//! A chain is an immutable list of [`Wrap`]s around its terminal action. The last wrap
//! added by a builder is the outermost, so set-ups run outside-in and tear-downs
//! inside-out. Chains are cheap to clone and can run any number of fixtures of their
//! type.

use std::fmt;
use std::sync::Arc;

use stagehand_core::{Case, Failure, FailureKind, FailureList, Marker, MethodFilter, Scope};

use super::fixture::{Fixture, Method};
use super::invoke::{guarded, invoke, invoke_all, invoke_all_static};
use super::strategy::Instantiation;

// ============================================================================
// Hooks
// ============================================================================

type InstanceHookFn<T> = Arc<dyn Fn(&Fixture<T>, &mut T) -> FailureList + Send + Sync>;
type ClassHookFn<T> = Arc<dyn Fn(&Fixture<T>) -> FailureList + Send + Sync>;

/// A set-up or tear-down action at method or instance scope.
pub enum InstanceHook<T> {
    /// Invoke every method matching the filter, in declaration order.
    InvokeAll(MethodFilter),
    /// A caller-supplied `(fixture, instance) -> failures` action.
    Custom(InstanceHookFn<T>),
}

impl<T> InstanceHook<T> {
    /// Invoke every method that has or inherits `marker`.
    pub fn marked(marker: impl Into<Marker>) -> Self {
        InstanceHook::InvokeAll(MethodFilter::new().has_or_inherits(marker))
    }

    pub fn custom<F>(hook: F) -> Self
    where
        F: Fn(&Fixture<T>, &mut T) -> FailureList + Send + Sync + 'static,
    {
        InstanceHook::Custom(Arc::new(hook))
    }

    fn run(&self, fixture: &Fixture<T>, instance: &mut T, phase: FailureKind) -> FailureList {
        match self {
            InstanceHook::InvokeAll(filter) => invoke_all(filter, fixture, instance, phase),
            InstanceHook::Custom(hook) => guarded(phase, || Ok(hook(fixture, instance))).unwrap_or_else(FailureList::single),
        }
    }
}

impl<T> Clone for InstanceHook<T> {
    fn clone(&self) -> Self {
        match self {
            InstanceHook::InvokeAll(filter) => InstanceHook::InvokeAll(filter.clone()),
            InstanceHook::Custom(hook) => InstanceHook::Custom(Arc::clone(hook)),
        }
    }
}

impl<T> fmt::Debug for InstanceHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceHook::InvokeAll(filter) => f.debug_tuple("InvokeAll").field(filter).finish(),
            InstanceHook::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A set-up or tear-down action at class scope. No instance exists yet.
pub enum ClassHook<T> {
    /// Invoke every associated function matching the filter, in declaration order.
    InvokeAll(MethodFilter),
    /// A caller-supplied `(fixture) -> failures` action.
    Custom(ClassHookFn<T>),
}

impl<T> ClassHook<T> {
    pub fn marked(marker: impl Into<Marker>) -> Self {
        ClassHook::InvokeAll(MethodFilter::new().has_or_inherits(marker))
    }

    pub fn custom<F>(hook: F) -> Self
    where
        F: Fn(&Fixture<T>) -> FailureList + Send + Sync + 'static,
    {
        ClassHook::Custom(Arc::new(hook))
    }

    fn run(&self, fixture: &Fixture<T>, phase: FailureKind) -> FailureList {
        match self {
            ClassHook::InvokeAll(filter) => invoke_all_static(filter, fixture, phase),
            ClassHook::Custom(hook) => guarded(phase, || Ok(hook(fixture))).unwrap_or_else(FailureList::single),
        }
    }
}

impl<T> Clone for ClassHook<T> {
    fn clone(&self) -> Self {
        match self {
            ClassHook::InvokeAll(filter) => ClassHook::InvokeAll(filter.clone()),
            ClassHook::Custom(hook) => ClassHook::Custom(Arc::clone(hook)),
        }
    }
}

impl<T> fmt::Debug for ClassHook<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassHook::InvokeAll(filter) => f.debug_tuple("InvokeAll").field(filter).finish(),
            ClassHook::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// ============================================================================
// The decorator
// ============================================================================

/// One set-up/tear-down pair wrapped around the rest of a chain.
#[derive(Debug, Clone)]
pub(crate) struct Wrap<H> {
    pub(crate) scope: Scope,
    pub(crate) set_up: Option<H>,
    pub(crate) tear_down: Option<H>,
}

/// What a scope offers the decorator: a way to run its hooks and the set of cases its
/// failures must reach.
pub(crate) trait ScopeContext {
    type Hook;

    fn run_hook(&mut self, hook: &Self::Hook, phase: FailureKind) -> FailureList;

    /// Append `failures` to every case within this scope's reach.
    fn record(&mut self, failures: &FailureList);
}

/// Run `body` inside `wraps`, outermost (last) wrap first.
///
/// For each wrap: a set-up that reports failures records them to the scope's reach and
/// skips both the inner chain and the paired tear-down. Otherwise the inner chain runs
/// once, then the tear-down runs and its failures are recorded regardless of what the
/// inner chain produced.
pub(crate) fn execute_wrapped<C, F>(wraps: &[Wrap<C::Hook>], ctx: &mut C, body: &mut F)
where
    C: ScopeContext,
    F: FnMut(&mut C),
{
    let Some((outer, inner)) = wraps.split_last() else {
        body(ctx);
        return;
    };

    if let Some(set_up) = &outer.set_up {
        let failures = ctx.run_hook(set_up, FailureKind::SetUp(outer.scope));
        if failures.any() {
            tracing::debug!(
                scope = %outer.scope,
                failures = failures.len(),
                "set-up failed; skipping body and tear-down"
            );
            ctx.record(&failures);
            return;
        }
    }

    execute_wrapped(inner, ctx, body);

    if let Some(tear_down) = &outer.tear_down {
        let failures = ctx.run_hook(tear_down, FailureKind::TearDown(outer.scope));
        if failures.any() {
            tracing::debug!(scope = %outer.scope, failures = failures.len(), "tear-down failed");
            ctx.record(&failures);
        }
    }
}

// ============================================================================
// Scope contexts
// ============================================================================

struct MethodScope<'a, T> {
    fixture: &'a Fixture<T>,
    instance: &'a mut T,
    failures: &'a mut FailureList,
}

impl<T> ScopeContext for MethodScope<'_, T> {
    type Hook = InstanceHook<T>;

    fn run_hook(&mut self, hook: &InstanceHook<T>, phase: FailureKind) -> FailureList {
        hook.run(self.fixture, self.instance, phase)
    }

    fn record(&mut self, failures: &FailureList) {
        self.failures.append(failures);
    }
}

struct InstanceScope<'a, T> {
    fixture: &'a Fixture<T>,
    instance: &'a mut T,
    cases: &'a mut [Case],
}

impl<T> ScopeContext for InstanceScope<'_, T> {
    type Hook = InstanceHook<T>;

    fn run_hook(&mut self, hook: &InstanceHook<T>, phase: FailureKind) -> FailureList {
        hook.run(self.fixture, self.instance, phase)
    }

    fn record(&mut self, failures: &FailureList) {
        for case in self.cases.iter_mut() {
            case.record(failures);
        }
    }
}

struct ClassScope<'a, T> {
    fixture: &'a Fixture<T>,
    cases: &'a mut [Case],
}

impl<T> ScopeContext for ClassScope<'_, T> {
    type Hook = ClassHook<T>;

    fn run_hook(&mut self, hook: &ClassHook<T>, phase: FailureKind) -> FailureList {
        hook.run(self.fixture, phase)
    }

    fn record(&mut self, failures: &FailureList) {
        for case in self.cases.iter_mut() {
            case.record(failures);
        }
    }
}

// ============================================================================
// Stages
// ============================================================================

/// Method-scope chain: wraps the invocation of one case's method.
pub struct MethodStage<T> {
    pub(crate) wraps: Arc<[Wrap<InstanceHook<T>>]>,
}

impl<T> MethodStage<T> {
    /// The bare stage: invoke the method, nothing around it.
    pub fn invoke_only() -> Self {
        Self { wraps: Arc::from(Vec::new()) }
    }

    /// Number of set-up/tear-down pairs around the invocation.
    pub fn depth(&self) -> usize {
        self.wraps.len()
    }

    /// Run `method` against `instance`, recording every failure into `failures`.
    pub fn execute(&self, fixture: &Fixture<T>, method: &Method<T>, instance: &mut T, failures: &mut FailureList) {
        let mut scope = MethodScope {
            fixture,
            instance,
            failures,
        };
        execute_wrapped(&self.wraps[..], &mut scope, &mut |scope| {
            invoke(method, scope.instance, FailureKind::Invocation, scope.failures);
        });
    }
}

impl<T> Clone for MethodStage<T> {
    fn clone(&self) -> Self {
        Self {
            wraps: Arc::clone(&self.wraps),
        }
    }
}

impl<T> Default for MethodStage<T> {
    fn default() -> Self {
        Self::invoke_only()
    }
}

impl<T> fmt::Debug for MethodStage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodStage").field("wraps", &self.wraps).finish()
    }
}

/// Instance-scope chain: wraps the execution of every case sharing one instance.
pub struct InstanceStage<T> {
    pub(crate) wraps: Arc<[Wrap<InstanceHook<T>>]>,
    pub(crate) method_stage: MethodStage<T>,
}

impl<T> InstanceStage<T> {
    /// The bare stage: run `method_stage` for each case, nothing around it.
    pub fn execute_cases(method_stage: MethodStage<T>) -> Self {
        Self {
            wraps: Arc::from(Vec::new()),
            method_stage,
        }
    }

    pub fn depth(&self) -> usize {
        self.wraps.len()
    }

    /// Run every case in `cases`, in order, against `instance`.
    pub fn execute(&self, fixture: &Fixture<T>, instance: &mut T, cases: &mut [Case]) {
        let mut scope = InstanceScope {
            fixture,
            instance,
            cases,
        };
        execute_wrapped(&self.wraps[..], &mut scope, &mut |scope| self.run_cases(scope));
    }

    fn run_cases(&self, scope: &mut InstanceScope<'_, T>) {
        for case in scope.cases.iter_mut() {
            let Some(method) = scope.fixture.method_named(case.method_name()) else {
                let failure = Failure::invocation(format!("fixture `{}` has no such method", scope.fixture.name()))
                    .in_method(case.method_name());
                case.fail(failure);
                continue;
            };
            self.method_stage
                .execute(scope.fixture, method, scope.instance, case.failures_mut());
        }
    }
}

impl<T> Clone for InstanceStage<T> {
    fn clone(&self) -> Self {
        Self {
            wraps: Arc::clone(&self.wraps),
            method_stage: self.method_stage.clone(),
        }
    }
}

impl<T> fmt::Debug for InstanceStage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceStage")
            .field("wraps", &self.wraps)
            .field("method_stage", &self.method_stage)
            .finish()
    }
}

/// Fixture-scope chain: wraps instantiation and execution of all of a fixture's cases.
pub struct FixtureStage<T> {
    pub(crate) wraps: Arc<[Wrap<ClassHook<T>>]>,
    pub(crate) instantiation: Instantiation<T>,
}

impl<T> FixtureStage<T> {
    pub fn depth(&self) -> usize {
        self.wraps.len()
    }

    pub fn lifecycle(&self) -> super::strategy::Lifecycle {
        self.instantiation.lifecycle
    }

    /// Run `cases` of `fixture` through the whole pipeline.
    ///
    /// Every failure ends up in the cases' failure lists; this never panics on behalf of
    /// user code.
    #[tracing::instrument(skip_all, fields(fixture = fixture.name(), cases = cases.len()))]
    pub fn execute(&self, fixture: &Fixture<T>, cases: &mut [Case]) {
        let mut scope = ClassScope { fixture, cases };
        execute_wrapped(&self.wraps[..], &mut scope, &mut |scope| {
            self.instantiation.execute(scope.fixture, scope.cases);
        });
    }

    /// Select cases with `filter`, run them, and hand them back for reporting.
    pub fn run(&self, fixture: &Fixture<T>, filter: &MethodFilter) -> Vec<Case> {
        let mut cases = fixture.select_cases(filter);
        self.execute(fixture, &mut cases);
        cases
    }
}

impl<T> Clone for FixtureStage<T> {
    fn clone(&self) -> Self {
        Self {
            wraps: Arc::clone(&self.wraps),
            instantiation: self.instantiation.clone(),
        }
    }
}

impl<T> fmt::Debug for FixtureStage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureStage")
            .field("wraps", &self.wraps)
            .field("lifecycle", &self.instantiation.lifecycle)
            .finish_non_exhaustive()
    }
}
