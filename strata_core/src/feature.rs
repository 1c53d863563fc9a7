// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Features and their properties.

use core::fmt;

use alloc::string::String;
use alloc::vec::Vec;

/// Geometry class of a feature.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GeometryType {
    /// No or unrecognised geometry.
    #[default]
    Unknown,
    /// Point or multipoint.
    Points,
    /// Line string or multiline.
    Lines,
    /// Polygon or multipolygon.
    Polygons,
}

impl GeometryType {
    /// Returns the name filters compare `$geometry` against.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Points => "point",
            Self::Lines => "line",
            Self::Polygons => "polygon",
        }
    }
}

impl fmt::Display for GeometryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A property value carried by a feature.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Numeric property.
    Number(f64),
    /// String property.
    String(String),
}

impl PropValue {
    /// Returns the number, if this is [`PropValue::Number`].
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::String(_) => None,
        }
    }

    /// Returns the string, if this is [`PropValue::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<f64> for PropValue {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for PropValue {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl From<String> for PropValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl fmt::Display for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
        }
    }
}

/// Key-sorted property list.
///
/// Features carry a handful of properties, so a sorted vector with binary
/// search beats a map in both size and lookup time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Properties {
    entries: Vec<(String, PropValue)>,
}

impl Properties {
    /// Creates an empty property list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Sets `key` to `value`, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        let value = value.into();
        match self.search(&key) {
            Ok(i) => self.entries[i].1 = value,
            Err(i) => self.entries.insert(i, (key, value)),
        }
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.search(key).ok().map(|i| &self.entries[i].1)
    }

    /// Returns whether `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.search(key).is_ok()
    }

    /// Returns the number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no properties.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates properties in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn search(&self, key: &str) -> Result<usize, usize> {
        self.entries.binary_search_by(|(k, _)| k.as_str().cmp(key))
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Self::new();
        for (k, v) in iter {
            props.insert(k, v);
        }
        props
    }
}

/// A geographic feature as seen by the style engine.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Feature {
    /// Geometry class.
    pub geometry: GeometryType,
    /// Property bag.
    pub properties: Properties,
}

impl Feature {
    /// Creates a feature with no properties.
    #[must_use]
    pub const fn new(geometry: GeometryType) -> Self {
        Self {
            geometry,
            properties: Properties::new(),
        }
    }

    /// Adds a property, builder style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.insert(key, value);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_stay_sorted_and_replace() {
        let props: Properties = [("kind", "road"), ("class", "minor"), ("kind", "path")]
            .into_iter()
            .collect();
        assert_eq!(props.len(), 2);
        let keys: Vec<_> = props.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["class", "kind"]);
        assert_eq!(props.get("kind"), Some(&PropValue::from("path")));
        assert!(!props.contains("name"));
    }

    #[test]
    fn feature_builder() {
        let f = Feature::new(GeometryType::Lines)
            .with("lanes", 2.0)
            .with("name", "Main St");
        assert_eq!(f.properties.get("lanes").and_then(PropValue::as_number), Some(2.0));
        assert_eq!(f.properties.get("name").and_then(PropValue::as_str), Some("Main St"));
        assert_eq!(f.geometry.as_str(), "line");
    }
}
