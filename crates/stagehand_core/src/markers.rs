//! Marker vocabulary registry.
//!
//! Markers tag entries of a fixture's method table (`test`, `set_up`, ...). Conventions
//! select methods by marker instead of by reflection, so the spelling of the well-known
//! markers lives here. Any other string is a valid custom marker.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::failure::Scope;

/// Stable identifier for the well-known markers.
///
/// Discriminants index [`MARKERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerId {
    Test,
    SetUp,
    TearDown,
    FixtureSetUp,
    FixtureTearDown,
}

/// Metadata entry for a well-known marker.
#[derive(Debug, Clone, Copy)]
pub struct MarkerInfo {
    pub id: MarkerId,
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
    pub description: &'static str,
    /// Scope the marker conventionally wraps; `None` for case markers.
    pub scope: Option<Scope>,
}

/// Registry of well-known markers, ordered by [`MarkerId`] discriminant.
pub const MARKERS: &[MarkerInfo] = &[
    MarkerInfo {
        id: MarkerId::Test,
        canonical: "test",
        aliases: &["fact"],
        description: "Select the method as a test case.",
        scope: None,
    },
    MarkerInfo {
        id: MarkerId::SetUp,
        canonical: "set_up",
        aliases: &["setup", "before_each"],
        description: "Run before each case (method scope) or each instance (instance scope).",
        scope: Some(Scope::Method),
    },
    MarkerInfo {
        id: MarkerId::TearDown,
        canonical: "tear_down",
        aliases: &["teardown", "after_each"],
        description: "Run after each case (method scope) or each instance (instance scope).",
        scope: Some(Scope::Method),
    },
    MarkerInfo {
        id: MarkerId::FixtureSetUp,
        canonical: "fixture_set_up",
        aliases: &["fixture_setup", "before_all"],
        description: "Run once before every case of the fixture.",
        scope: Some(Scope::Class),
    },
    MarkerInfo {
        id: MarkerId::FixtureTearDown,
        canonical: "fixture_tear_down",
        aliases: &["fixture_teardown", "after_all"],
        description: "Run once after every case of the fixture.",
        scope: Some(Scope::Class),
    },
];

/// Resolve a marker spelling (canonical or alias) to its stable id.
pub fn from_str(name: &str) -> Option<MarkerId> {
    if let Some(info) = MARKERS.iter().find(|m| m.canonical == name) {
        return Some(info.id);
    }
    MARKERS.iter().find(|m| m.aliases.contains(&name)).map(|m| m.id)
}

/// Return the canonical spelling for a marker.
pub fn as_str(id: MarkerId) -> &'static str {
    info_for(id).canonical
}

/// Return the metadata entry for a marker.
pub fn info_for(id: MarkerId) -> &'static MarkerInfo {
    &MARKERS[id as usize]
}

/// A marker attached to a method table entry.
///
/// Well-known aliases are normalised to their canonical spelling on construction, so
/// `Marker::new("setup") == SET_UP`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Marker(Cow<'static, str>);

pub const TEST: Marker = Marker(Cow::Borrowed("test"));
pub const SET_UP: Marker = Marker(Cow::Borrowed("set_up"));
pub const TEAR_DOWN: Marker = Marker(Cow::Borrowed("tear_down"));
pub const FIXTURE_SET_UP: Marker = Marker(Cow::Borrowed("fixture_set_up"));
pub const FIXTURE_TEAR_DOWN: Marker = Marker(Cow::Borrowed("fixture_tear_down"));

impl Marker {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        let name = name.into();
        match from_str(&name) {
            Some(id) => Marker(Cow::Borrowed(as_str(id))),
            None => Marker(name),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The well-known id, if this is not a custom marker.
    pub fn id(&self) -> Option<MarkerId> {
        from_str(&self.0)
    }
}

impl From<MarkerId> for Marker {
    fn from(id: MarkerId) -> Self {
        Marker(Cow::Borrowed(as_str(id)))
    }
}

impl From<&'static str> for Marker {
    fn from(name: &'static str) -> Self {
        Marker::new(name)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
