//! Method metadata and declarative method filters.
//!
//! A fixture describes its methods once, as a table of [`MethodMeta`] rows. Conventions
//! then ask for "every method matching filter P, in declaration order"; nothing
//! downstream inspects methods any other way.

use serde::Serialize;

use crate::markers::Marker;

/// How a method is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Receiver {
    /// Needs a fixture instance (`fn(&mut T)`).
    Instance,
    /// Associated function; can run without an instance (class scope).
    Static,
}

/// One row of a fixture's method table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodMeta {
    pub name: String,
    pub receiver: Receiver,
    /// Markers declared directly on the method.
    pub markers: Vec<Marker>,
    /// Markers the method carries from a shared base declaration (trait default,
    /// helper fixture, ...). Only `has_or_inherits` rules see these.
    pub inherited_markers: Vec<Marker>,
}

impl MethodMeta {
    pub fn new(name: impl Into<String>, receiver: Receiver) -> Self {
        Self {
            name: name.into(),
            receiver,
            markers: Vec::new(),
            inherited_markers: Vec::new(),
        }
    }

    pub fn with_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.markers.extend(markers);
        self
    }

    pub fn with_inherited_markers(mut self, markers: impl IntoIterator<Item = Marker>) -> Self {
        self.inherited_markers.extend(markers);
        self
    }

    pub fn has(&self, marker: &Marker) -> bool {
        self.markers.contains(marker)
    }

    pub fn has_or_inherits(&self, marker: &Marker) -> bool {
        self.has(marker) || self.inherited_markers.contains(marker)
    }
}

/// A single predicate over a [`MethodMeta`] row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Has(Marker),
    HasOrInherits(Marker),
    NameStartsWith(String),
    NameEndsWith(String),
    NameContains(String),
    Receiver(Receiver),
    Not(Box<Rule>),
}

impl Rule {
    pub fn matches(&self, method: &MethodMeta) -> bool {
        match self {
            Rule::Has(marker) => method.has(marker),
            Rule::HasOrInherits(marker) => method.has_or_inherits(marker),
            Rule::NameStartsWith(prefix) => method.name.starts_with(prefix.as_str()),
            Rule::NameEndsWith(suffix) => method.name.ends_with(suffix.as_str()),
            Rule::NameContains(needle) => method.name.contains(needle.as_str()),
            Rule::Receiver(receiver) => method.receiver == *receiver,
            Rule::Not(rule) => !rule.matches(method),
        }
    }
}

/// Conjunction of [`Rule`]s. The empty filter matches every method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodFilter {
    rules: Vec<Rule>,
}

impl MethodFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn has(self, marker: impl Into<Marker>) -> Self {
        self.rule(Rule::Has(marker.into()))
    }

    pub fn has_or_inherits(self, marker: impl Into<Marker>) -> Self {
        self.rule(Rule::HasOrInherits(marker.into()))
    }

    pub fn name_starts_with(self, prefix: impl Into<String>) -> Self {
        self.rule(Rule::NameStartsWith(prefix.into()))
    }

    pub fn name_ends_with(self, suffix: impl Into<String>) -> Self {
        self.rule(Rule::NameEndsWith(suffix.into()))
    }

    pub fn name_contains(self, needle: impl Into<String>) -> Self {
        self.rule(Rule::NameContains(needle.into()))
    }

    pub fn receiver(self, receiver: Receiver) -> Self {
        self.rule(Rule::Receiver(receiver))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn matches(&self, method: &MethodMeta) -> bool {
        self.rules.iter().all(|rule| rule.matches(method))
    }

    /// Yield the matching rows of `table`, preserving its order.
    pub fn filter<'a, I>(&'a self, table: I) -> impl Iterator<Item = &'a MethodMeta> + 'a
    where
        I: IntoIterator<Item = &'a MethodMeta>,
        I::IntoIter: 'a,
    {
        table.into_iter().filter(move |method| self.matches(method))
    }
}
