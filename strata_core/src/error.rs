// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for fallible construction and typed parameter access.
//!
//! Nothing inside the per-feature pipeline returns these: a feature that
//! cannot be styled simply contributes nothing. [`StyleError`] surfaces only
//! at the edges, when a style sheet is assembled or when a builder asks for a
//! parameter as a specific type.

use alloc::string::String;

use crate::param::{StyleParamKey, ValueKind};

/// Errors produced while building style data or reading resolved parameters.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StyleError {
    /// A parameter key name did not match any [`StyleParamKey`].
    #[error("unknown style parameter key `{0}`")]
    UnknownKey(String),
    /// A breakpoint table was empty or mixed value kinds.
    #[error("invalid stops: {0}")]
    InvalidStops(&'static str),
    /// A color string could not be parsed.
    #[error("invalid color `{0}`")]
    InvalidColor(String),
    /// The requested key is not active on the rule.
    #[error("style parameter `{0}` is not set")]
    Missing(StyleParamKey),
    /// The requested key holds a value of a different kind.
    #[error("style parameter `{key}` holds {found}, expected {expected}")]
    TypeMismatch {
        /// The key that was read.
        key: StyleParamKey,
        /// The kind the caller asked for.
        expected: ValueKind,
        /// The kind actually stored.
        found: ValueKind,
    },
}
