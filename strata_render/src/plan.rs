// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Batch plan: styled features grouped by rule configuration.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;
use kurbo::Vec2;

use strata_core::builder::BuildMode;
use strata_core::color::Color;
use strata_core::feature::GeometryType;
use strata_core::param::Width;

/// Identifies a batch.
///
/// Rules whose parameters come from the same layers share a
/// [`param_set_hash`](strata_core::draw_rule::DrawRule::param_set_hash), so
/// their features can be drawn together. Outline and main passes never
/// share a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BatchKey {
    /// Hash of the contributing layers.
    pub param_set_hash: u64,
    /// Pass the features were added in.
    pub mode: BuildMode,
}

/// Per-feature attributes resolved at dispatch time.
///
/// Scripted and zoom-dependent values may differ between features of one
/// batch, so they are kept per item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BatchItem {
    /// Source geometry kind.
    pub geometry: GeometryType,
    /// Fill or stroke color.
    pub color: Color,
    /// Stroke width pair.
    pub width: Width,
    /// Screen-space offset.
    pub offset: Vec2,
}

/// Features sharing one [`BatchKey`].
#[derive(Clone, Debug, PartialEq)]
pub struct DrawBatch {
    /// The batch key.
    pub key: BatchKey,
    /// Name of the rule that opened the batch.
    pub rule: String,
    /// Draw order; lower draws first.
    pub order: u32,
    /// Features in dispatch order.
    pub items: Vec<BatchItem>,
}

/// Every batch produced for one tile.
#[derive(Clone, Debug, Default)]
pub struct BatchPlan {
    batches: Vec<DrawBatch>,
    index: HashMap<BatchKey, usize>,
}

impl BatchPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the batches in creation order.
    #[must_use]
    pub fn batches(&self) -> &[DrawBatch] {
        &self.batches
    }

    /// Returns the batch for `key`.
    #[must_use]
    pub fn get(&self, key: &BatchKey) -> Option<&DrawBatch> {
        self.index.get(key).map(|&i| &self.batches[i])
    }

    /// Returns the number of batches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns whether the plan has no batches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Returns the total number of items across batches.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.batches.iter().map(|b| b.items.len()).sum()
    }

    /// Returns the batches in draw order.
    ///
    /// Lower `order` draws first; outlines draw before the main pass at the
    /// same order; remaining ties keep creation order.
    #[must_use]
    pub fn draw_order(&self) -> Vec<&DrawBatch> {
        let mut sorted: Vec<_> = self.batches.iter().collect();
        sorted.sort_by_key(|b| (b.order, b.key.mode != BuildMode::OutlineOnly));
        sorted
    }

    /// Clears the plan for reuse.
    pub fn clear(&mut self) {
        self.batches.clear();
        self.index.clear();
    }

    /// Appends `item` to the batch for `key`, opening it if needed.
    pub(crate) fn push(&mut self, key: BatchKey, rule: &str, order: u32, item: BatchItem) {
        let batches = &mut self.batches;
        let i = *self.index.entry(key).or_insert_with(|| {
            log::trace!("opening batch for rule `{rule}` ({})", key.mode.as_str());
            batches.push(DrawBatch {
                key,
                rule: rule.into(),
                order,
                items: Vec::new(),
            });
            batches.len() - 1
        });
        self.batches[i].items.push(item);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> BatchItem {
        BatchItem {
            geometry: GeometryType::Lines,
            color: Color::BLACK,
            width: Width::constant(1.0),
            offset: Vec2::ZERO,
        }
    }

    fn key(hash: u64, mode: BuildMode) -> BatchKey {
        BatchKey {
            param_set_hash: hash,
            mode,
        }
    }

    #[test]
    fn items_group_by_key() {
        let mut plan = BatchPlan::new();
        plan.push(key(1, BuildMode::Full), "lines", 0, item());
        plan.push(key(1, BuildMode::Full), "lines", 0, item());
        plan.push(key(1, BuildMode::OutlineOnly), "lines", 0, item());
        plan.push(key(2, BuildMode::Full), "points", 0, item());

        assert_eq!(plan.len(), 3);
        assert_eq!(plan.item_count(), 4);
        assert_eq!(plan.get(&key(1, BuildMode::Full)).map(|b| b.items.len()), Some(2));
        assert!(plan.get(&key(3, BuildMode::Full)).is_none());
    }

    #[test]
    fn draw_order_sorts_by_order_then_outline() {
        let mut plan = BatchPlan::new();
        plan.push(key(1, BuildMode::Full), "roads", 5, item());
        plan.push(key(1, BuildMode::OutlineOnly), "roads", 5, item());
        plan.push(key(2, BuildMode::Full), "water", 1, item());

        let order: Vec<_> = plan
            .draw_order()
            .iter()
            .map(|b| (b.rule.as_str(), b.key.mode))
            .collect();
        assert_eq!(
            order,
            [
                ("water", BuildMode::Full),
                ("roads", BuildMode::OutlineOnly),
                ("roads", BuildMode::Full),
            ]
        );
    }

    #[test]
    fn clear_empties_plan() {
        let mut plan = BatchPlan::new();
        plan.push(key(1, BuildMode::Full), "lines", 0, item());
        plan.clear();
        assert!(plan.is_empty());
        assert!(plan.get(&key(1, BuildMode::Full)).is_none());
    }
}
