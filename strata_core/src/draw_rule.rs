// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved rules: one slot per parameter key, filled by cascading every
//! matched definition that shares a rule name.
//!
//! A slot never owns its parameter. It records a [`ParamRef`] into the
//! [`StyleSheet`] plus the contributing layer and its depth, which is all the
//! cascade needs to decide whether a later contributor overrides it.
//!
//! # Override policy
//!
//! An incoming declaration replaces the slot when any of these hold:
//!
//! 1. the slot is empty,
//! 2. the incoming layer is deeper,
//! 3. the depths are equal and the incoming layer name is greater in byte
//!    order.
//!
//! The policy depends only on `(depth, layer name)`, so the result is the same
//! whatever order matched layers are visited in, and merging a layer a second
//! time changes nothing.

use crate::param::{KeySet, STYLE_PARAM_KEY_COUNT, StyleParam, StyleParamKey};
use crate::sheet::{DefinitionId, LayerId, ParamRef, RuleId, StyleSheet};
use crate::trace::{RuleConflictEvent, Tracer};

/// The current occupant of one key of a [`DrawRule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Slot {
    /// The winning declaration.
    pub param: ParamRef,
    /// The layer that declared it.
    pub layer: LayerId,
    /// Depth of that layer.
    pub depth: u32,
}

impl Slot {
    const VACANT: Self = Self {
        param: ParamRef::VACANT,
        layer: LayerId::VACANT,
        depth: 0,
    };
}

/// A rule merged from every matched definition that shares one name.
#[derive(Clone, Debug)]
pub struct DrawRule {
    id: RuleId,
    definition: DefinitionId,
    slots: [Slot; STYLE_PARAM_KEY_COUNT],
    active: KeySet,
    evaluated: KeySet,
}

impl DrawRule {
    /// Seeds a rule from its first contributing definition.
    ///
    /// # Panics
    ///
    /// Panics if `definition` was not issued by `sheet`.
    #[must_use]
    pub fn new(sheet: &StyleSheet, definition: DefinitionId) -> Self {
        let data = sheet.definition(definition);
        let layer = sheet.definition_layer(definition);
        let depth = sheet.depth(layer);

        let mut rule = Self {
            id: data.id(),
            definition,
            slots: [Slot::VACANT; STYLE_PARAM_KEY_COUNT],
            active: KeySet::EMPTY,
            evaluated: KeySet::EMPTY,
        };
        for (i, param) in data.params().iter().enumerate() {
            rule.occupy(param.key, param_ref(definition, i), layer, depth);
        }
        rule
    }

    /// Merges another definition of the same rule into this one.
    ///
    /// # Panics
    ///
    /// Panics if `definition` was not issued by `sheet`.
    pub fn merge(&mut self, sheet: &StyleSheet, definition: DefinitionId) {
        let data = sheet.definition(definition);
        let layer = sheet.definition_layer(definition);
        let depth = sheet.depth(layer);
        let name = sheet.layer_name(layer);

        for (i, param) in data.params().iter().enumerate() {
            let key = param.key;
            if self.incoming_wins(sheet, key, depth, name) {
                self.occupy(key, param_ref(definition, i), layer, depth);
            }
        }
    }

    /// Reports every key where `definition` and the current occupant sit at
    /// the same depth in different layers and declare different values.
    ///
    /// Call before [`merge`](Self::merge); the rule is not modified.
    pub fn report_conflicts(
        &self,
        sheet: &StyleSheet,
        definition: DefinitionId,
        tracer: &mut Tracer<'_>,
    ) {
        let data = sheet.definition(definition);
        let layer = sheet.definition_layer(definition);
        let depth = sheet.depth(layer);
        let name = sheet.layer_name(layer);

        for param in data.params() {
            let key = param.key;
            if !self.active.contains(key) {
                continue;
            }
            let slot = &self.slots[key.index()];
            if slot.depth != depth || slot.layer == layer {
                continue;
            }
            if sheet.param(slot.param).value == param.value {
                continue;
            }
            tracer.rule_conflict(&RuleConflictEvent {
                rule: self.id,
                key,
                current: slot.layer,
                incoming: layer,
                depth,
                incoming_wins: self.incoming_wins(sheet, key, depth, name),
            });
        }
    }

    /// Returns the rule id.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the definition the rule was seeded from.
    #[must_use]
    pub const fn definition(&self) -> DefinitionId {
        self.definition
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name<'s>(&self, sheet: &'s StyleSheet) -> &'s str {
        sheet.definition(self.definition).name()
    }

    /// Returns the keys that currently have an occupant.
    #[must_use]
    pub const fn active(&self) -> KeySet {
        self.active
    }

    /// Returns the keys whose value lives in the evaluation scratch rather
    /// than in the sheet.
    #[must_use]
    pub const fn evaluated(&self) -> KeySet {
        self.evaluated
    }

    /// Returns whether `key` has an occupant.
    #[must_use]
    pub const fn contains(&self, key: StyleParamKey) -> bool {
        self.active.contains(key)
    }

    /// Returns the occupant of `key`.
    #[must_use]
    pub fn slot(&self, key: StyleParamKey) -> Option<&Slot> {
        self.active
            .contains(key)
            .then(|| &self.slots[key.index()])
    }

    /// Returns the declaration occupying `key`.
    #[must_use]
    pub fn param<'s>(&self, sheet: &'s StyleSheet, key: StyleParamKey) -> Option<&'s StyleParam> {
        self.slot(key).map(|slot| sheet.param(slot.param))
    }

    /// Returns the name of the layer that contributed `key`.
    #[must_use]
    pub fn layer_name<'s>(&self, sheet: &'s StyleSheet, key: StyleParamKey) -> Option<&'s str> {
        self.slot(key).map(|slot| sheet.layer_name(slot.layer))
    }

    /// Hash of the contributing layer names of all active keys, in key order.
    ///
    /// Two rules with equal hashes were assembled from the same layers and
    /// can share cached build output. The hash is stable across runs and
    /// platforms.
    #[must_use]
    pub fn param_set_hash(&self, sheet: &StyleSheet) -> u64 {
        self.active.iter().fold(0, |seed, key| {
            hash_combine(seed, fnv1a(sheet.layer_name(self.slots[key.index()].layer)))
        })
    }

    pub(crate) fn deactivate(&mut self, key: StyleParamKey) {
        self.active.remove(key);
        self.evaluated.remove(key);
    }

    pub(crate) fn mark_evaluated(&mut self, key: StyleParamKey) {
        self.evaluated.insert(key);
    }

    pub(crate) fn clear_evaluated(&mut self) {
        self.evaluated = KeySet::EMPTY;
    }

    fn incoming_wins(&self, sheet: &StyleSheet, key: StyleParamKey, depth: u32, name: &str) -> bool {
        if !self.active.contains(key) {
            return true;
        }
        let slot = &self.slots[key.index()];
        depth > slot.depth || (depth == slot.depth && name > sheet.layer_name(slot.layer))
    }

    fn occupy(&mut self, key: StyleParamKey, param: ParamRef, layer: LayerId, depth: u32) {
        self.slots[key.index()] = Slot {
            param,
            layer,
            depth,
        };
        self.active.insert(key);
    }
}

fn param_ref(definition: DefinitionId, index: usize) -> ParamRef {
    #[expect(clippy::cast_possible_truncation, reason = "at most one param per key")]
    let index = index as u32;
    ParamRef { definition, index }
}

/// 64-bit FNV-1a.
fn fnv1a(s: &str) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    s.bytes()
        .fold(OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME))
}

/// Boost-style `hash_combine`.
fn hash_combine(seed: u64, h: u64) -> u64 {
    seed ^ h
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{ParamValue, StyleParamKey as K, Value};
    use crate::sheet::Filter;

    fn width_of(rule: &DrawRule, sheet: &StyleSheet) -> Option<f32> {
        match rule.param(sheet, K::Width)?.value {
            ParamValue::Plain(Value::Width(w)) => Some(w.value),
            _ => None,
        }
    }

    #[test]
    fn seeded_from_first_definition() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let def = sheet.add_rule(
            root,
            "lines",
            [
                StyleParam::plain(K::Width, 2.0_f32),
                StyleParam::plain(K::Order, 1_u32),
            ],
        );
        let rule = DrawRule::new(&sheet, def);
        assert_eq!(rule.name(&sheet), "lines");
        assert_eq!(rule.active().len(), 2);
        assert!(rule.evaluated().is_empty());
        assert_eq!(rule.layer_name(&sheet, K::Width), Some("roads"));
        assert_eq!(rule.slot(K::Order).map(|s| s.depth), Some(0));
        assert_eq!(rule.slot(K::Color), None);
    }

    #[test]
    fn deeper_layer_overrides() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let sub = sheet.add_sublayer(root, "a", Filter::Always);
        let shallow = sheet.add_rule(root, "lines", [StyleParam::plain(K::Width, 2.0_f32)]);
        let deep = sheet.add_rule(sub, "lines", [StyleParam::plain(K::Width, 5.0_f32)]);

        // Either visiting order yields the deeper value.
        let mut rule = DrawRule::new(&sheet, shallow);
        rule.merge(&sheet, deep);
        assert_eq!(width_of(&rule, &sheet), Some(5.0));

        let mut rule = DrawRule::new(&sheet, deep);
        rule.merge(&sheet, shallow);
        assert_eq!(width_of(&rule, &sheet), Some(5.0));
        assert_eq!(rule.layer_name(&sheet, K::Width), Some("a"));
    }

    #[test]
    fn sibling_tie_breaks_by_name() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let a = sheet.add_sublayer(root, "a", Filter::Always);
        let b = sheet.add_sublayer(root, "b", Filter::Always);
        let from_a = sheet.add_rule(a, "lines", [StyleParam::plain(K::Width, 1.0_f32)]);
        let from_b = sheet.add_rule(b, "lines", [StyleParam::plain(K::Width, 3.0_f32)]);

        let mut rule = DrawRule::new(&sheet, from_a);
        rule.merge(&sheet, from_b);
        assert_eq!(width_of(&rule, &sheet), Some(3.0), "\"b\" > \"a\"");

        let mut rule = DrawRule::new(&sheet, from_b);
        rule.merge(&sheet, from_a);
        assert_eq!(width_of(&rule, &sheet), Some(3.0));
    }

    #[test]
    fn merge_fills_only_new_keys_from_shallower_layers() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let sub = sheet.add_sublayer(root, "major", Filter::Always);
        let deep = sheet.add_rule(sub, "lines", [StyleParam::plain(K::Width, 4.0_f32)]);
        let shallow = sheet.add_rule(
            root,
            "lines",
            [
                StyleParam::plain(K::Width, 1.0_f32),
                StyleParam::plain(K::Cap, "round"),
            ],
        );

        let mut rule = DrawRule::new(&sheet, deep);
        rule.merge(&sheet, shallow);
        assert_eq!(width_of(&rule, &sheet), Some(4.0));
        assert_eq!(rule.layer_name(&sheet, K::Cap), Some("roads"));
        assert_eq!(rule.definition(), deep, "name source stays the seed");
    }

    #[test]
    fn merge_is_idempotent() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let a = sheet.add_sublayer(root, "a", Filter::Always);
        let seed = sheet.add_rule(root, "lines", [StyleParam::plain(K::Width, 1.0_f32)]);
        let other = sheet.add_rule(
            a,
            "lines",
            [
                StyleParam::plain(K::Width, 2.0_f32),
                StyleParam::plain(K::Order, 4_u32),
            ],
        );

        let mut once = DrawRule::new(&sheet, seed);
        once.merge(&sheet, other);
        let mut twice = once.clone();
        twice.merge(&sheet, other);
        twice.merge(&sheet, seed);
        for key in K::ALL {
            assert_eq!(once.slot(key), twice.slot(key), "{key}");
        }
    }

    #[test]
    fn param_set_hash_tracks_contributors() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let a = sheet.add_sublayer(root, "a", Filter::Always);
        let base = sheet.add_rule(root, "lines", [StyleParam::plain(K::Width, 1.0_f32)]);
        let same_layer = sheet.add_rule(root, "lines", [StyleParam::plain(K::Width, 9.0_f32)]);
        let over = sheet.add_rule(a, "lines", [StyleParam::plain(K::Width, 2.0_f32)]);

        let h_base = DrawRule::new(&sheet, base).param_set_hash(&sheet);
        let h_same = DrawRule::new(&sheet, same_layer).param_set_hash(&sheet);
        assert_eq!(h_base, h_same, "hash depends on layer names, not values");

        let mut merged = DrawRule::new(&sheet, base);
        merged.merge(&sheet, over);
        assert_ne!(merged.param_set_hash(&sheet), h_base);
        assert_ne!(h_base, 0);
    }

    #[test]
    fn fnv_reference_values() {
        assert_eq!(fnv1a(""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(fnv1a("a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[cfg(feature = "trace")]
    #[test]
    fn conflicts_reported_for_same_depth_siblings() {
        use alloc::vec;
        use alloc::vec::Vec;

        use crate::trace::TraceSink;

        struct Conflicts(Vec<(K, bool)>);
        impl TraceSink for Conflicts {
            fn on_rule_conflict(&mut self, e: &RuleConflictEvent) {
                self.0.push((e.key, e.incoming_wins));
            }
        }

        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let a = sheet.add_sublayer(root, "a", Filter::Always);
        let b = sheet.add_sublayer(root, "b", Filter::Always);
        let from_b = sheet.add_rule(
            b,
            "lines",
            [
                StyleParam::plain(K::Width, 1.0_f32),
                StyleParam::plain(K::Cap, "round"),
            ],
        );
        let from_a = sheet.add_rule(
            a,
            "lines",
            [
                StyleParam::plain(K::Width, 2.0_f32),
                StyleParam::plain(K::Cap, "round"),
            ],
        );

        let rule = DrawRule::new(&sheet, from_b);
        let mut sink = Conflicts(vec![]);
        rule.report_conflicts(&sheet, from_a, &mut Tracer::new(&mut sink));
        assert_eq!(sink.0, [(K::Width, false)], "equal values are not conflicts");
    }
}
