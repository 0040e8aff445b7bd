#![forbid(unsafe_code)]

//! Breakpoints and the ordered table they live in.
//!
//! # Invariants
//!
//! 1. Table order is definition order and is semantically significant:
//!    classification returns the **first** entry containing the size, not the
//!    tightest one.
//! 2. Labels are unique. Re-inserting a label replaces its bounds in place.
//! 3. Label sets are derived from the table on demand, so they can never
//!    disagree with it.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Viewport dimensions, serialized as `{"WIDTH": .., "HEIGHT": ..}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

impl WindowSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A labelled viewport range. `max_width` may be `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub min_width: f64,
    #[serde(with = "unbounded")]
    pub max_width: f64,
    pub min_height: f64,
}

impl Breakpoint {
    #[must_use]
    pub const fn new(min_width: f64, max_width: f64, min_height: f64) -> Self {
        Self {
            min_width,
            max_width,
            min_height,
        }
    }

    /// `min_width <= width <= max_width` and `height >= min_height`.
    #[must_use]
    pub fn contains(&self, size: WindowSize) -> bool {
        size.width >= self.min_width
            && size.width <= self.max_width
            && size.height >= self.min_height
    }
}

/// `maxWidth` accepts a number, `null`, or `"Infinity"`; infinity serializes
/// back as `"Infinity"` since JSON has no literal for it.
mod unbounded {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() && value.is_sign_positive() {
            serializer.serialize_str("Infinity")
        } else {
            serializer.serialize_f64(*value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match Option::<Raw>::deserialize(deserializer)? {
            None => Ok(f64::INFINITY),
            Some(Raw::Number(n)) => Ok(n),
            Some(Raw::Text(text)) if text.eq_ignore_ascii_case("infinity") => Ok(f64::INFINITY),
            Some(Raw::Text(text)) => Err(D::Error::custom(format!(
                "expected a number, null or \"Infinity\" for maxWidth, got {text:?}"
            ))),
        }
    }
}

/// Ordered `label -> Breakpoint` mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BreakpointTable {
    entries: Vec<(String, Breakpoint)>,
}

impl BreakpointTable {
    /// An empty table. Every classification against it fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in six-tier table.
    #[must_use]
    pub fn standard() -> Self {
        [
            ("ExtraLarge", Breakpoint::new(1920.0, f64::INFINITY, 840.0)),
            ("Large", Breakpoint::new(1280.0, 1920.0, 646.0)),
            ("Medium", Breakpoint::new(960.0, 1280.0, 380.0)),
            ("Small", Breakpoint::new(600.0, 960.0, 0.0)),
            ("ExtraSmall", Breakpoint::new(0.0, 600.0, 0.0)),
            ("Other", Breakpoint::new(600.0, f64::INFINITY, 0.0)),
        ]
        .into_iter()
        .collect()
    }

    /// Builder form of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, label: impl Into<String>, breakpoint: Breakpoint) -> Self {
        self.insert(label, breakpoint);
        self
    }

    /// Append `label`, or replace its bounds in place if already present.
    pub fn insert(&mut self, label: impl Into<String>, breakpoint: Breakpoint) {
        let label = label.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, slot)) => *slot = breakpoint,
            None => self.entries.push((label, breakpoint)),
        }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Breakpoint> {
        self.entries
            .iter()
            .find_map(|(existing, bp)| (existing == label).then_some(bp))
    }

    /// First entry, in table order, whose bounds contain `size`.
    #[must_use]
    pub fn classify(&self, size: WindowSize) -> Option<(&str, &Breakpoint)> {
        self.entries
            .iter()
            .find(|(_, bp)| bp.contains(size))
            .map(|(label, bp)| (label.as_str(), bp))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Breakpoint)> {
        self.entries.iter().map(|(label, bp)| (label.as_str(), bp))
    }

    #[must_use]
    pub fn labels(&self) -> BreakpointLabels {
        BreakpointLabels {
            labels: self.entries.iter().map(|(label, _)| label.clone()).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Breakpoint)> for BreakpointTable {
    fn from_iter<I: IntoIterator<Item = (S, Breakpoint)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (label, bp) in iter {
            table.insert(label, bp);
        }
        table
    }
}

impl Serialize for BreakpointTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (label, bp) in &self.entries {
            map.serialize_entry(label, bp)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BreakpointTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = BreakpointTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of breakpoint labels to {minWidth, maxWidth, minHeight}")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = BreakpointTable::new();
                while let Some((label, bp)) = access.next_entry::<String, Breakpoint>()? {
                    table.insert(label, bp);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// The label set of a table, in table order. Acts as an identity mapping
/// `label -> label`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BreakpointLabels {
    labels: Vec<String>,
}

impl BreakpointLabels {
    /// `Some(label)` if the table defines it.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|existing| *existing == label)
            .map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
