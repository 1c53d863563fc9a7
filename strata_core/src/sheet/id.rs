// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Layer, definition, and rule identity types.

use core::fmt;

/// Sentinel value indicating "no layer" or "no definition" in index fields.
pub const INVALID: u32 = u32::MAX;

/// A handle to a layer in a [`StyleSheet`](super::StyleSheet).
///
/// Carries the slot index and the tag of the sheet that issued it, so a
/// handle presented to a different sheet is caught instead of silently
/// addressing an unrelated layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId {
    /// Slot index into the sheet's layer arrays.
    pub(crate) idx: u32,
    /// Tag of the issuing sheet.
    pub(crate) sheet: u32,
}

impl LayerId {
    /// A handle that no sheet accepts.
    pub(crate) const VACANT: Self = Self {
        idx: INVALID,
        sheet: INVALID,
    };

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LayerId({}@sheet{})", self.idx, self.sheet)
    }
}

/// A handle to one rule definition, i.e. one named block of parameters
/// declared in one layer.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DefinitionId {
    pub(crate) idx: u32,
    pub(crate) sheet: u32,
}

impl DefinitionId {
    pub(crate) const VACANT: Self = Self {
        idx: INVALID,
        sheet: INVALID,
    };

    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }
}

impl fmt::Debug for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DefinitionId({}@sheet{})", self.idx, self.sheet)
    }
}

/// Identity of a rule *name* within a sheet.
///
/// Every definition that shares a name shares its `RuleId`, wherever in the
/// layer tree it is declared. Matched definitions with equal ids are merged
/// into one [`DrawRule`](crate::draw_rule::DrawRule).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub(crate) u32);

impl RuleId {
    /// Returns the raw id.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleId({})", self.0)
    }
}

/// Reference to one parameter of one definition.
///
/// Resolved rules hold these instead of borrowing parameters, so they never
/// tie up the sheet's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ParamRef {
    /// The definition holding the parameter.
    pub definition: DefinitionId,
    /// Position of the parameter within the definition.
    pub index: u32,
}

impl ParamRef {
    pub(crate) const VACANT: Self = Self {
        definition: DefinitionId::VACANT,
        index: INVALID,
    };
}
