//! Captured failures and the append-only list that aggregates them.
//!
//! Every failure the pipeline observes (a set-up hook returning errors, a test body
//! returning `Err` or panicking, a factory that cannot build an instance, ...) is
//! captured as a [`Failure`] and recorded into one or more [`FailureList`]s. Nothing
//! in the pipeline propagates a failure as a Rust error or a panic past the stage that
//! captured it.

use std::any::Any;
use std::fmt;

use serde::Serialize;

/// The three nested scopes a set-up/tear-down pair can wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// A single method invocation against an instance.
    Method,
    /// Every case sharing one instance.
    Instance,
    /// Every case of a fixture type.
    Class,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Method => "method",
            Scope::Instance => "instance",
            Scope::Class => "class",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the pipeline a failure was captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "scope")]
pub enum FailureKind {
    /// A set-up hook at the given scope reported failures.
    SetUp(Scope),
    /// The test body itself failed.
    Invocation,
    /// A tear-down hook at the given scope reported failures.
    TearDown(Scope),
    /// The instance factory failed, or instance-level execution escaped unexpectedly.
    Instantiation,
    /// The instance's release hook failed.
    Release,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::SetUp(scope) => write!(f, "{scope} set-up"),
            FailureKind::Invocation => f.write_str("invocation"),
            FailureKind::TearDown(scope) => write!(f, "{scope} tear-down"),
            FailureKind::Instantiation => f.write_str("instantiation"),
            FailureKind::Release => f.write_str("release"),
        }
    }
}

/// One captured failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub struct Failure {
    kind: FailureKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    method: Option<String>,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            method: None,
        }
    }

    pub fn set_up(scope: Scope, message: impl Into<String>) -> Self {
        Self::new(FailureKind::SetUp(scope), message)
    }

    pub fn tear_down(scope: Scope, message: impl Into<String>) -> Self {
        Self::new(FailureKind::TearDown(scope), message)
    }

    pub fn invocation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Invocation, message)
    }

    pub fn instantiation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Instantiation, message)
    }

    pub fn release(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Release, message)
    }

    /// Build a failure from a caught panic payload.
    ///
    /// `&str` and `String` payloads keep their text; anything else is reported as an
    /// opaque panic.
    #[cold]
    pub fn from_panic(kind: FailureKind, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panicked: {s}")
        } else {
            "panicked with a non-string payload".to_string()
        };
        Self::new(kind, message)
    }

    /// Attribute the failure to the named method.
    pub fn in_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(f, "{} failed in `{}`: {}", self.kind, method, self.message),
            None => write!(f, "{} failed: {}", self.kind, self.message),
        }
    }
}

/// Ordered, append-only aggregate of captured failures.
///
/// Entries are never removed or rewritten; merging another list appends its entries in
/// order after the existing ones.
#[doc(alias = "ExceptionList")]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FailureList(Vec<Failure>);

impl FailureList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A list holding exactly one failure.
    pub fn single(failure: Failure) -> Self {
        Self(vec![failure])
    }

    pub fn push(&mut self, failure: Failure) {
        self.0.push(failure);
    }

    /// Append a copy of every entry of `other`, preserving order.
    ///
    /// Used when the same list must reach several cases (instance and class scope).
    pub fn append(&mut self, other: &FailureList) {
        self.0.extend(other.0.iter().cloned());
    }

    /// Append every entry of `other`, consuming it.
    pub fn merge(&mut self, other: FailureList) {
        self.0.extend(other.0);
    }

    /// True iff at least one failure was recorded.
    pub fn any(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&Failure> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Failure> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Failure] {
        &self.0
    }

    /// Messages of every entry, in order. Handy for assertions and terse reports.
    pub fn messages(&self) -> Vec<&str> {
        self.0.iter().map(Failure::message).collect()
    }
}

impl From<Failure> for FailureList {
    fn from(failure: Failure) -> Self {
        Self::single(failure)
    }
}

impl FromIterator<Failure> for FailureList {
    fn from_iter<I: IntoIterator<Item = Failure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Failure> for FailureList {
    fn extend<I: IntoIterator<Item = Failure>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl IntoIterator for FailureList {
    type Item = Failure;
    type IntoIter = std::vec::IntoIter<Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FailureList {
    type Item = &'a Failure;
    type IntoIter = std::slice::Iter<'a, Failure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for FailureList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}
