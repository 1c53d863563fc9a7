// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use super::id::{INVALID, LayerId};
use super::store::StyleSheet;

/// An iterator over the direct sublayers of a layer, in declaration order.
///
/// Created by [`StyleSheet::sublayers`].
#[derive(Debug)]
pub struct Sublayers<'a> {
    sheet: &'a StyleSheet,
    current: u32,
}

impl<'a> Sublayers<'a> {
    pub(crate) fn new(sheet: &'a StyleSheet, first: u32) -> Self {
        Self {
            sheet,
            current: first,
        }
    }
}

impl Iterator for Sublayers<'_> {
    type Item = LayerId;

    fn next(&mut self) -> Option<LayerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        self.current = self.sheet.next_sibling[idx as usize];
        Some(self.sheet.layer_handle(idx))
    }
}
