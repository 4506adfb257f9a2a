//! Running user code and turning whatever it does into failures.
//!
//! Every call into user code (test bodies, hook methods, factories, release hooks)
//! goes through [`guarded`]: an `Err` return and a panic are both captured as a
//! [`Failure`] of the caller's phase and never escape.

use std::panic::{self, AssertUnwindSafe};

use stagehand_core::{Failure, FailureKind, FailureList, MethodFilter};

use super::fixture::{Body, BoxError, Fixture, Method};

/// Run `f`, capturing an `Err` or a panic as a failure of `kind`.
pub(crate) fn guarded<R>(kind: FailureKind, f: impl FnOnce() -> Result<R, BoxError>) -> Result<R, Failure> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Failure::new(kind, err.to_string())),
        Err(payload) => Err(Failure::from_panic(kind, payload.as_ref())),
    }
}

/// Invoke one method against an instance, recording any failure into `failures`.
pub(crate) fn invoke<T>(method: &Method<T>, instance: &mut T, kind: FailureKind, failures: &mut FailureList) {
    let result = match &method.body {
        Body::Instance(body) => guarded(kind, || body(instance)),
        Body::Static(body) => guarded(kind, || body()),
    };
    if let Err(failure) = result {
        tracing::trace!(method = method.name(), %failure, "method failed");
        failures.push(failure.in_method(method.name()));
    }
}

/// Invoke every method of `fixture` matching `filter`, in declaration order, and merge
/// their failures. A method failing does not stop the remaining matches from running.
///
/// An empty match set yields an empty list, so an unused marker is a no-op hook.
pub fn invoke_all<T>(filter: &MethodFilter, fixture: &Fixture<T>, instance: &mut T, phase: FailureKind) -> FailureList {
    let mut failures = FailureList::new();
    for method in fixture.matching(filter) {
        invoke(method, instance, phase, &mut failures);
    }
    failures
}

/// Class-scope counterpart of [`invoke_all`]: no instance exists yet, so only
/// associated functions can run. A matching instance method is reported as a failure
/// rather than silently skipped.
pub fn invoke_all_static<T>(filter: &MethodFilter, fixture: &Fixture<T>, phase: FailureKind) -> FailureList {
    let mut failures = FailureList::new();
    for method in fixture.matching(filter) {
        match &method.body {
            Body::Static(body) => {
                if let Err(failure) = guarded(phase, || body()) {
                    failures.push(failure.in_method(method.name()));
                }
            }
            Body::Instance(_) => failures.push(
                Failure::new(phase, "method needs an instance and cannot run at class scope").in_method(method.name()),
            ),
        }
    }
    failures
}
