//! Scope guard that owns a fixture instance and releases it on drop.

use stagehand_core::{FailureKind, FailureList};

use super::fixture::ReleaseHook;
use super::invoke::guarded;

/// Owns one instance for the duration of its lifecycle.
///
/// Dropping the guard runs the fixture's release hook exactly once, on normal exit and
/// while unwinding alike. A release failure (error or panic) is pushed to the borrowed
/// failure list instead of escaping the drop.
pub(crate) struct InstanceGuard<'a, T> {
    instance: T,
    release: Option<ReleaseHook<T>>,
    failures: &'a mut FailureList,
}

impl<'a, T> InstanceGuard<'a, T> {
    pub(crate) fn new(instance: T, release: Option<ReleaseHook<T>>, failures: &'a mut FailureList) -> Self {
        Self {
            instance,
            release,
            failures,
        }
    }

    pub(crate) fn instance_mut(&mut self) -> &mut T {
        &mut self.instance
    }
}

impl<T> Drop for InstanceGuard<'_, T> {
    fn drop(&mut self) {
        let Some(release) = self.release.take() else {
            return;
        };
        let instance = &mut self.instance;
        if let Err(failure) = guarded(FailureKind::Release, || release(instance)) {
            tracing::debug!(%failure, "release failed");
            self.failures.push(failure);
        }
    }
}
