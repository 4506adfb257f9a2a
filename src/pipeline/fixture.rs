//! Fixture types: a method table plus the optional release capability.

use std::fmt;
use std::sync::Arc;

use stagehand_core::{Case, Marker, MethodFilter, MethodMeta, Receiver};

/// Boxed error a test body, factory or release hook may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result of running one method.
pub type MethodResult = Result<(), BoxError>;

pub(crate) type InstanceBody<T> = Arc<dyn Fn(&mut T) -> MethodResult + Send + Sync>;
pub(crate) type StaticBody = Arc<dyn Fn() -> MethodResult + Send + Sync>;
pub(crate) type ReleaseHook<T> = Arc<dyn Fn(&mut T) -> MethodResult + Send + Sync>;

pub(crate) enum Body<T> {
    Instance(InstanceBody<T>),
    Static(StaticBody),
}

impl<T> Clone for Body<T> {
    fn clone(&self) -> Self {
        match self {
            Body::Instance(f) => Body::Instance(Arc::clone(f)),
            Body::Static(f) => Body::Static(Arc::clone(f)),
        }
    }
}

/// One entry of a fixture's method table.
pub struct Method<T> {
    meta: MethodMeta,
    pub(crate) body: Body<T>,
}

impl<T> Method<T> {
    pub fn meta(&self) -> &MethodMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }
}

impl<T> Clone for Method<T> {
    fn clone(&self) -> Self {
        Self {
            meta: self.meta.clone(),
            body: self.body.clone(),
        }
    }
}

impl<T> fmt::Debug for Method<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("meta", &self.meta).finish_non_exhaustive()
    }
}

/// Capability of fixture types that hold resources needing explicit release.
///
/// Register it once with [`Fixture::releasable`]; the lifecycle captures the hook when
/// it creates an instance and runs it exactly once when that instance goes out of
/// scope, whatever happened in between.
pub trait Release {
    fn release(&mut self) -> MethodResult;
}

/// A test type: its name, its ordered method table and, optionally, how to release
/// its instances.
///
/// ```rust
/// use stagehand::Fixture;
/// use stagehand_core::markers::{SET_UP, TEST};
///
/// #[derive(Default)]
/// struct Counter(u32);
///
/// let fixture = Fixture::<Counter>::new("Counter")
///     .method("reset", [SET_UP], |c: &mut Counter| {
///         c.0 = 0;
///         Ok(())
///     })
///     .method("increments", [TEST], |c: &mut Counter| {
///         c.0 += 1;
///         if c.0 == 1 { Ok(()) } else { Err("counter was not reset".into()) }
///     });
///
/// assert_eq!(fixture.methods().len(), 2);
/// ```
pub struct Fixture<T> {
    name: String,
    methods: Vec<Method<T>>,
    release: Option<ReleaseHook<T>>,
}

impl<T> Fixture<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: Vec::new(),
            release: None,
        }
    }

    /// Declare an instance method with the given markers.
    ///
    /// Method names are unique within a fixture: declaring a name again replaces the
    /// earlier entry in place, keeping its position in the table.
    pub fn method<M, F>(mut self, name: impl Into<String>, markers: M, body: F) -> Self
    where
        M: IntoIterator<Item = Marker>,
        F: Fn(&mut T) -> MethodResult + Send + Sync + 'static,
    {
        let meta = MethodMeta::new(name, Receiver::Instance).with_markers(markers);
        self.declare(Method {
            meta,
            body: Body::Instance(Arc::new(body)),
        })
    }

    /// Declare an associated function (no instance) with the given markers.
    pub fn static_method<M, F>(mut self, name: impl Into<String>, markers: M, body: F) -> Self
    where
        M: IntoIterator<Item = Marker>,
        F: Fn() -> MethodResult + Send + Sync + 'static,
    {
        let meta = MethodMeta::new(name, Receiver::Static).with_markers(markers);
        self.declare(Method {
            meta,
            body: Body::Static(Arc::new(body)),
        })
    }

    /// Declare an instance method whose markers come from a shared base declaration.
    pub fn inherited_method<M, F>(mut self, name: impl Into<String>, markers: M, body: F) -> Self
    where
        M: IntoIterator<Item = Marker>,
        F: Fn(&mut T) -> MethodResult + Send + Sync + 'static,
    {
        let meta = MethodMeta::new(name, Receiver::Instance).with_inherited_markers(markers);
        self.declare(Method {
            meta,
            body: Body::Instance(Arc::new(body)),
        })
    }

    fn declare(mut self, method: Method<T>) -> Self {
        match self.methods.iter_mut().find(|m| m.name() == method.name()) {
            Some(existing) => *existing = method,
            None => self.methods.push(method),
        }
        self
    }

    /// Register a release hook for instances of this fixture.
    pub fn release_with<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut T) -> MethodResult + Send + Sync + 'static,
    {
        self.release = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn methods(&self) -> &[Method<T>] {
        &self.methods
    }

    pub fn method_named(&self, name: &str) -> Option<&Method<T>> {
        self.methods.iter().find(|m| m.name() == name)
    }

    /// Methods matching `filter`, in declaration order.
    pub fn matching<'a>(&'a self, filter: &'a MethodFilter) -> impl Iterator<Item = &'a Method<T>> + 'a {
        self.methods.iter().filter(move |m| filter.matches(m.meta()))
    }

    /// Build one case per method matching `filter`, in declaration order.
    pub fn select_cases(&self, filter: &MethodFilter) -> Vec<Case> {
        self.matching(filter).map(|m| Case::new(self.name.as_str(), m.name())).collect()
    }

    pub fn is_releasable(&self) -> bool {
        self.release.is_some()
    }

    pub(crate) fn release_hook(&self) -> Option<ReleaseHook<T>> {
        self.release.clone()
    }
}

impl<T: Release + 'static> Fixture<T> {
    /// Release instances through their [`Release`] implementation.
    pub fn releasable(self) -> Self {
        self.release_with(T::release)
    }
}

impl<T> fmt::Debug for Fixture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fixture")
            .field("name", &self.name)
            .field("methods", &self.methods)
            .field("releasable", &self.release.is_some())
            .finish()
    }
}
