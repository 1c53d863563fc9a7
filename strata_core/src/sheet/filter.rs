// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer filters.
//!
//! A [`Filter`] decides whether a layer applies to a feature. Property keys
//! starting with `$` name context values instead of feature properties:
//!
//! - `$zoom`: the zoom of the tile being built (a number).
//! - `$geometry`: the feature's geometry class (`"point"`, `"line"`,
//!   `"polygon"`, or `"unknown"`).

use alloc::string::String;
use alloc::vec::Vec;

use crate::feature::{Feature, PropValue};
use crate::param::FunctionId;

/// Keyword for the context zoom.
pub const KEY_ZOOM: &str = "$zoom";
/// Keyword for the feature geometry class.
pub const KEY_GEOMETRY: &str = "$geometry";

/// A predicate over a feature.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Filter {
    /// Accepts everything.
    #[default]
    Always,
    /// Accepts when every operand accepts (and when there are none).
    All(Vec<Self>),
    /// Accepts when at least one operand accepts.
    Any(Vec<Self>),
    /// Accepts when no operand accepts.
    NoneOf(Vec<Self>),
    /// Accepts when `key` is present (`exists`) or absent (`!exists`).
    Existence {
        /// Property or keyword.
        key: String,
        /// Whether the key must be present.
        exists: bool,
    },
    /// Accepts when `key` equals any of `values`.
    Equality {
        /// Property or keyword.
        key: String,
        /// Accepted values.
        values: Vec<PropValue>,
    },
    /// Accepts when `key` is a number in `min..max`.
    Range {
        /// Property or keyword.
        key: String,
        /// Inclusive lower bound.
        min: f64,
        /// Exclusive upper bound.
        max: f64,
    },
    /// Delegates to a scripted predicate.
    Function(FunctionId),
}

/// A looked-up property or keyword value.
enum Lookup<'a> {
    Number(f64),
    Str(&'a str),
}

impl Filter {
    /// Shorthand for an [`Filter::Equality`] with one value.
    #[must_use]
    pub fn equals(key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Self::Equality {
            key: key.into(),
            values: alloc::vec![value.into()],
        }
    }

    /// Shorthand for an [`Filter::Existence`] test.
    #[must_use]
    pub fn has(key: impl Into<String>) -> Self {
        Self::Existence {
            key: key.into(),
            exists: true,
        }
    }

    /// Shorthand for a [`Filter::Range`] on [`KEY_ZOOM`].
    #[must_use]
    pub fn zoom_range(min: f64, max: f64) -> Self {
        Self::Range {
            key: KEY_ZOOM.into(),
            min,
            max,
        }
    }

    /// Evaluates the filter with the built-in semantics.
    ///
    /// `predicate` answers [`Filter::Function`] nodes.
    pub fn eval(
        &self,
        feature: &Feature,
        zoom: f32,
        predicate: &mut dyn FnMut(FunctionId) -> bool,
    ) -> bool {
        match self {
            Self::Always => true,
            Self::All(operands) => operands.iter().all(|f| f.eval(feature, zoom, predicate)),
            Self::Any(operands) => operands.iter().any(|f| f.eval(feature, zoom, predicate)),
            Self::NoneOf(operands) => !operands.iter().any(|f| f.eval(feature, zoom, predicate)),
            Self::Existence { key, exists } => lookup(key, feature, zoom).is_some() == *exists,
            Self::Equality { key, values } => match lookup(key, feature, zoom) {
                Some(found) => values.iter().any(|v| value_eq(&found, v)),
                None => false,
            },
            Self::Range { key, min, max } => match lookup(key, feature, zoom) {
                Some(Lookup::Number(n)) => *min <= n && n < *max,
                _ => false,
            },
            Self::Function(id) => predicate(*id),
        }
    }
}

fn lookup<'a>(key: &str, feature: &'a Feature, zoom: f32) -> Option<Lookup<'a>> {
    match key {
        KEY_ZOOM => Some(Lookup::Number(f64::from(zoom))),
        KEY_GEOMETRY => Some(Lookup::Str(feature.geometry.as_str())),
        _ => feature.properties.get(key).map(|v| match v {
            PropValue::Number(n) => Lookup::Number(*n),
            PropValue::String(s) => Lookup::Str(s),
        }),
    }
}

fn value_eq(found: &Lookup<'_>, expected: &PropValue) -> bool {
    match (found, expected) {
        (Lookup::Number(a), PropValue::Number(b)) => a == b,
        (Lookup::Str(a), PropValue::String(b)) => *a == b.as_str(),
        _ => false,
    }
}
