// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays storage for style layers and rule definitions.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::param::{ParamValue, StyleParam, StyleParamKey, coerce};

use super::filter::Filter;
use super::id::{DefinitionId, INVALID, LayerId, ParamRef, RuleId};
use super::traverse::Sublayers;

static NEXT_SHEET_TAG: AtomicU32 = AtomicU32::new(0);

/// One named block of parameters declared in a layer.
///
/// Parameters are sorted by key and unique per key; when a key is declared
/// more than once, the last declaration wins. Plain values are normalized
/// with [`coerce`] on the way in (a scalar width becomes a constant
/// [`Width`](crate::param::Width), a color string becomes a
/// [`Color`](crate::color::Color)); plain values that cannot be normalized
/// are dropped with a warning.
#[derive(Clone, Debug, PartialEq)]
pub struct RuleData {
    name: String,
    id: RuleId,
    params: Vec<StyleParam>,
}

impl RuleData {
    fn new(name: String, id: RuleId, params: impl IntoIterator<Item = StyleParam>) -> Self {
        let mut params: Vec<StyleParam> = params.into_iter().filter_map(normalize).collect();
        // Reversed + stable sort puts the last declaration of a key first in
        // its run, which is the one dedup keeps.
        params.reverse();
        params.sort_by_key(|p| p.key);
        params.dedup_by_key(|p| p.key);
        Self { name, id, params }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the id shared by every definition with this name.
    #[must_use]
    pub const fn id(&self) -> RuleId {
        self.id
    }

    /// Returns the parameters in key order.
    #[must_use]
    pub fn params(&self) -> &[StyleParam] {
        &self.params
    }

    /// Returns the position and value of the parameter declared for `key`.
    #[must_use]
    pub fn find(&self, key: StyleParamKey) -> Option<(usize, &StyleParam)> {
        let i = self.params.binary_search_by_key(&key, |p| p.key).ok()?;
        Some((i, &self.params[i]))
    }

    /// Returns whether `key` is declared.
    #[must_use]
    pub fn contains(&self, key: StyleParamKey) -> bool {
        self.find(key).is_some()
    }
}

/// Brings a plain value into the shape its key expects, so typed reads see
/// the same kinds whether a value was declared or computed.
fn normalize(param: StyleParam) -> Option<StyleParam> {
    let StyleParam { key, value } = param;
    match value {
        ParamValue::Plain(v) => {
            let kind = v.kind();
            let Some(v) = coerce(key, v) else {
                log::warn!("dropping `{key}`: a {kind} value does not fit this key");
                return None;
            };
            Some(StyleParam::plain(key, v))
        }
        value => Some(StyleParam { key, value }),
    }
}

impl fmt::Display for RuleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.name)?;
        for p in &self.params {
            writeln!(f, "    {}: {}", p.key, p.value)?;
        }
        write!(f, "}}")
    }
}

/// Struct-of-arrays storage for a tree of style layers.
///
/// Layers and rule definitions are addressed by [`LayerId`] and
/// [`DefinitionId`] handles. The sheet only grows; once built it is shared
/// read-only by every tile worker.
///
/// Handles are tagged with the sheet that issued them. Passing a handle from
/// another sheet to any method panics.
#[derive(Debug)]
pub struct StyleSheet {
    tag: u32,

    // -- Layer topology --
    pub(crate) parent: Vec<u32>,
    pub(crate) first_child: Vec<u32>,
    pub(crate) last_child: Vec<u32>,
    pub(crate) next_sibling: Vec<u32>,
    pub(crate) roots: Vec<u32>,

    // -- Layer properties --
    pub(crate) name: Vec<String>,
    pub(crate) depth: Vec<u32>,
    pub(crate) visible: Vec<bool>,
    pub(crate) filter: Vec<Filter>,
    pub(crate) rules: Vec<Vec<DefinitionId>>,

    // -- Rule definitions --
    pub(crate) definitions: Vec<RuleData>,
    pub(crate) definition_layer: Vec<u32>,

    // -- Rule names --
    rule_names: Vec<String>,
    rule_ids: HashMap<String, RuleId>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheet {
    /// Creates an empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tag: NEXT_SHEET_TAG.fetch_add(1, Ordering::Relaxed),
            parent: Vec::new(),
            first_child: Vec::new(),
            last_child: Vec::new(),
            next_sibling: Vec::new(),
            roots: Vec::new(),
            name: Vec::new(),
            depth: Vec::new(),
            visible: Vec::new(),
            filter: Vec::new(),
            rules: Vec::new(),
            definitions: Vec::new(),
            definition_layer: Vec::new(),
            rule_names: Vec::new(),
            rule_ids: HashMap::new(),
        }
    }

    // -- Construction API --

    /// Creates a top-level layer. Roots have depth 0 and start visible.
    pub fn create_root(&mut self, name: impl Into<String>, filter: Filter) -> LayerId {
        let idx = self.push_layer(name.into(), filter, INVALID, 0);
        self.roots.push(idx);
        self.layer_handle(idx)
    }

    /// Appends a sublayer to `parent`, one level deeper.
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this sheet.
    pub fn add_sublayer(
        &mut self,
        parent: LayerId,
        name: impl Into<String>,
        filter: Filter,
    ) -> LayerId {
        self.validate(parent);
        let p = parent.idx;
        let depth = self.depth[p as usize] + 1;
        let c = self.push_layer(name.into(), filter, p, depth);

        let last = self.last_child[p as usize];
        if last == INVALID {
            self.first_child[p as usize] = c;
        } else {
            self.next_sibling[last as usize] = c;
        }
        self.last_child[p as usize] = c;

        self.layer_handle(c)
    }

    /// Sets whether a layer (and with it its whole subtree) takes part in
    /// matching.
    ///
    /// # Panics
    ///
    /// Panics if `layer` was not issued by this sheet.
    pub fn set_visible(&mut self, layer: LayerId, visible: bool) {
        self.validate(layer);
        self.visible[layer.idx as usize] = visible;
    }

    /// Declares a named rule in `layer` and returns its definition handle.
    ///
    /// All definitions with the same `name` share one [`RuleId`].
    ///
    /// # Panics
    ///
    /// Panics if `layer` was not issued by this sheet.
    pub fn add_rule(
        &mut self,
        layer: LayerId,
        name: impl Into<String>,
        params: impl IntoIterator<Item = StyleParam>,
    ) -> DefinitionId {
        self.validate(layer);
        let name = name.into();
        let id = self.intern_rule_name(&name);

        #[expect(clippy::cast_possible_truncation, reason = "definition count fits u32")]
        let idx = self.definitions.len() as u32;
        self.definitions.push(RuleData::new(name, id, params));
        self.definition_layer.push(layer.idx);

        let def = DefinitionId {
            idx,
            sheet: self.tag,
        };
        self.rules[layer.idx as usize].push(def);
        def
    }

    // -- Layer getters --

    /// Returns the number of layers.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.name.len()
    }

    /// Iterates the top-level layers in creation order.
    pub fn roots(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.roots.iter().map(|&idx| self.layer_handle(idx))
    }

    /// Returns the first root named `name`.
    #[must_use]
    pub fn find_root(&self, name: &str) -> Option<LayerId> {
        self.roots().find(|&id| self.layer_name(id) == name)
    }

    /// Returns the name of a layer.
    #[must_use]
    pub fn layer_name(&self, layer: LayerId) -> &str {
        self.validate(layer);
        &self.name[layer.idx as usize]
    }

    /// Returns the depth of a layer (roots are 0).
    #[must_use]
    pub fn depth(&self, layer: LayerId) -> u32 {
        self.validate(layer);
        self.depth[layer.idx as usize]
    }

    /// Returns whether a layer takes part in matching.
    #[must_use]
    pub fn is_visible(&self, layer: LayerId) -> bool {
        self.validate(layer);
        self.visible[layer.idx as usize]
    }

    /// Returns the filter of a layer.
    #[must_use]
    pub fn filter(&self, layer: LayerId) -> &Filter {
        self.validate(layer);
        &self.filter[layer.idx as usize]
    }

    /// Returns the parent of a layer, if any.
    #[must_use]
    pub fn parent(&self, layer: LayerId) -> Option<LayerId> {
        self.validate(layer);
        let p = self.parent[layer.idx as usize];
        (p != INVALID).then(|| self.layer_handle(p))
    }

    /// Returns an iterator over the direct sublayers of a layer.
    #[must_use]
    pub fn sublayers(&self, layer: LayerId) -> Sublayers<'_> {
        self.validate(layer);
        Sublayers::new(self, self.first_child[layer.idx as usize])
    }

    /// Returns the rule definitions declared in a layer, in declaration order.
    #[must_use]
    pub fn rules(&self, layer: LayerId) -> &[DefinitionId] {
        self.validate(layer);
        &self.rules[layer.idx as usize]
    }

    // -- Definition getters --

    /// Returns the number of rule definitions.
    #[must_use]
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Returns a rule definition.
    #[must_use]
    pub fn definition(&self, def: DefinitionId) -> &RuleData {
        self.validate_definition(def);
        &self.definitions[def.idx as usize]
    }

    /// Returns the layer a definition was declared in.
    #[must_use]
    pub fn definition_layer(&self, def: DefinitionId) -> LayerId {
        self.validate_definition(def);
        self.layer_handle(self.definition_layer[def.idx as usize])
    }

    /// Returns the parameter a [`ParamRef`] points at.
    ///
    /// # Panics
    ///
    /// Panics if the definition was not issued by this sheet or the index is
    /// out of range.
    #[must_use]
    pub fn param(&self, param: ParamRef) -> &StyleParam {
        &self.definition(param.definition).params[param.index as usize]
    }

    // -- Rule names --

    /// Returns the id assigned to a rule name, if any definition uses it.
    #[must_use]
    pub fn rule_id(&self, name: &str) -> Option<RuleId> {
        self.rule_ids.get(name).copied()
    }

    /// Returns the name behind a rule id.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this sheet.
    #[must_use]
    pub fn rule_name(&self, id: RuleId) -> &str {
        &self.rule_names[id.0 as usize]
    }

    /// Returns the number of distinct rule names.
    #[must_use]
    pub fn rule_name_count(&self) -> usize {
        self.rule_names.len()
    }

    // -- Internal helpers --

    pub(crate) fn layer_handle(&self, idx: u32) -> LayerId {
        LayerId {
            idx,
            sheet: self.tag,
        }
    }

    fn push_layer(&mut self, name: String, filter: Filter, parent: u32, depth: u32) -> u32 {
        #[expect(clippy::cast_possible_truncation, reason = "layer count fits u32")]
        let idx = self.name.len() as u32;
        self.parent.push(parent);
        self.first_child.push(INVALID);
        self.last_child.push(INVALID);
        self.next_sibling.push(INVALID);
        self.name.push(name);
        self.depth.push(depth);
        self.visible.push(true);
        self.filter.push(filter);
        self.rules.push(Vec::new());
        idx
    }

    fn intern_rule_name(&mut self, name: &str) -> RuleId {
        if let Some(&id) = self.rule_ids.get(name) {
            return id;
        }
        #[expect(clippy::cast_possible_truncation, reason = "rule name count fits u32")]
        let id = RuleId(self.rule_names.len() as u32);
        self.rule_names.push(name.into());
        self.rule_ids.insert(name.into(), id);
        id
    }

    /// Panics if the handle was not issued by this sheet.
    fn validate(&self, id: LayerId) {
        assert!(
            id.sheet == self.tag && (id.idx as usize) < self.name.len(),
            "foreign LayerId: {id:?} (sheet {} has {} layers)",
            self.tag,
            self.name.len()
        );
    }

    fn validate_definition(&self, id: DefinitionId) {
        assert!(
            id.sheet == self.tag && (id.idx as usize) < self.definitions.len(),
            "foreign DefinitionId: {id:?} (sheet {} has {} definitions)",
            self.tag,
            self.definitions.len()
        );
    }
}
