// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-feature matching, cascading, evaluation, and dispatch.
//!
//! [`DrawRuleMergeSet`] is the styling engine for one worker. For each
//! feature it:
//!
//! 1. **matches**: walks the layer tree depth first from a root, pruning
//!    every subtree whose layer is hidden or whose filter rejects the feature;
//! 2. **merges**: folds the rule definitions of every matched layer into one
//!    [`DrawRule`] per rule id (see [`draw_rule`](crate::draw_rule) for the
//!    override policy);
//! 3. **evaluates**: resolves scripted and zoom-dependent values of a rule
//!    into the [`EvaluatedParams`] scratch;
//! 4. **dispatches**: hands the feature and a [`ResolvedRule`] view to the
//!    builder named by the rule's style, with an outline pass first when the
//!    rule names an `outline_style`.
//!
//! All buffers are owned by the merge set and reused from feature to feature.
//! Nothing it hands out outlives the next call.

use core::fmt;

use alloc::vec::Vec;

use crate::builder::{BuildMode, StyleBuilders};
use crate::config::MergeSetConfig;
use crate::context::StyleContext;
use crate::draw_rule::DrawRule;
use crate::error::StyleError;
use crate::feature::Feature;
use crate::param::{
    FromValue, ParamValue, STYLE_PARAM_KEY_COUNT, StyleParamKey, Value, Width, coerce,
};
use crate::sheet::{LayerId, RuleId, StyleSheet};
use crate::trace::{
    FeatureStyledEvent, MissingBuilderEvent, ParamDroppedEvent, RejectReason, RuleRejectedEvent,
    Tracer,
};

/// Scratch storage for values computed during evaluation, one entry per key.
///
/// Overwritten by every [`DrawRuleMergeSet::evaluate_rule`] call; an entry is
/// meaningful only for keys in the evaluated rule's
/// [`evaluated`](DrawRule::evaluated) set.
#[derive(Clone, Debug)]
pub struct EvaluatedParams {
    values: [Option<Value>; STYLE_PARAM_KEY_COUNT],
}

impl Default for EvaluatedParams {
    fn default() -> Self {
        Self {
            values: core::array::from_fn(|_| None),
        }
    }
}

impl EvaluatedParams {
    /// Returns the last value computed for `key`.
    #[must_use]
    pub fn get(&self, key: StyleParamKey) -> Option<&Value> {
        self.values[key.index()].as_ref()
    }

    fn set(&mut self, key: StyleParamKey, value: Value) {
        self.values[key.index()] = Some(value);
    }
}

/// A fully evaluated rule as seen by a [`StyleBuilder`](crate::builder::StyleBuilder).
///
/// Borrows the sheet, the rule, and the evaluation scratch; valid only for
/// the builder call it is passed to.
#[derive(Clone, Copy)]
pub struct ResolvedRule<'a> {
    sheet: &'a StyleSheet,
    rule: &'a DrawRule,
    evaluated: &'a EvaluatedParams,
}

impl fmt::Debug for ResolvedRule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedRule")
            .field("name", &self.rule_name())
            .field("active", &self.rule.active())
            .finish_non_exhaustive()
    }
}

impl<'a> ResolvedRule<'a> {
    /// Returns the rule id.
    #[must_use]
    pub fn id(&self) -> RuleId {
        self.rule.id()
    }

    /// Returns the underlying merged rule.
    #[must_use]
    pub fn draw_rule(&self) -> &'a DrawRule {
        self.rule
    }

    /// Returns the rule's own name.
    #[must_use]
    pub fn rule_name(&self) -> &'a str {
        self.rule.name(self.sheet)
    }

    /// Returns whether `key` is active.
    #[must_use]
    pub fn contains(&self, key: StyleParamKey) -> bool {
        self.rule.contains(key)
    }

    /// Returns the concrete value of `key`.
    #[must_use]
    pub fn value(&self, key: StyleParamKey) -> Option<&'a Value> {
        if self.rule.evaluated().contains(key) {
            return self.evaluated.get(key);
        }
        self.rule
            .param(self.sheet, key)
            .and_then(|p| p.value.as_plain())
    }

    /// Reads `key` as `T`.
    ///
    /// Returns `None` when the key is inactive, and also when it holds a
    /// different kind, which is logged as a warning.
    #[must_use]
    pub fn get<T: FromValue<'a>>(&self, key: StyleParamKey) -> Option<T> {
        let value = self.value(key)?;
        let typed = T::from_value(value);
        if typed.is_none() {
            log::warn!(
                "style parameter `{key}` of rule `{}` holds {}, read as {}",
                self.rule_name(),
                value.kind(),
                T::KIND
            );
        }
        typed
    }

    /// Reads `key` as `T`, reporting why it could not be read.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Missing`] when the key is inactive and
    /// [`StyleError::TypeMismatch`] when it holds a different kind.
    pub fn try_get<T: FromValue<'a>>(&self, key: StyleParamKey) -> Result<T, StyleError> {
        let value = self.value(key).ok_or(StyleError::Missing(key))?;
        T::from_value(value).ok_or(StyleError::TypeMismatch {
            key,
            expected: T::KIND,
            found: value.kind(),
        })
    }

    /// Returns the style the rule is built with: the `style` parameter when
    /// it is a string, otherwise the rule's own name.
    #[must_use]
    pub fn style_name(&self) -> &'a str {
        self.value(StyleParamKey::Style)
            .and_then(Value::as_str)
            .unwrap_or_else(|| self.rule_name())
    }

    /// Returns the name of the layer that contributed `key`.
    #[must_use]
    pub fn layer_name(&self, key: StyleParamKey) -> Option<&'a str> {
        self.rule.layer_name(self.sheet, key)
    }

    /// Returns the rule's [`param_set_hash`](DrawRule::param_set_hash).
    #[must_use]
    pub fn param_set_hash(&self) -> u64 {
        self.rule.param_set_hash(self.sheet)
    }
}

/// The styling engine for one worker.
///
/// Holds the matched-rule list, the layer stack, and the evaluation scratch,
/// all reused across features. The merge set never holds on to the sheet,
/// the context, or the builders between calls.
#[derive(Debug)]
pub struct DrawRuleMergeSet {
    config: MergeSetConfig,
    matched_rules: Vec<DrawRule>,
    queued_layers: Vec<LayerId>,
    evaluated: EvaluatedParams,
    /// Index of the rule whose values are in `evaluated`.
    last_evaluated: Option<usize>,
}

impl Default for DrawRuleMergeSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawRuleMergeSet {
    /// Creates a merge set with [`MergeSetConfig::DEFAULT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MergeSetConfig::DEFAULT)
    }

    /// Creates a merge set, reserving scratch space as `config` asks.
    #[must_use]
    pub fn with_config(config: MergeSetConfig) -> Self {
        Self {
            config,
            matched_rules: Vec::with_capacity(config.rule_capacity),
            queued_layers: Vec::with_capacity(config.layer_stack_capacity),
            evaluated: EvaluatedParams::default(),
            last_evaluated: None,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MergeSetConfig {
        &self.config
    }

    /// Returns the rules produced by the last [`match_feature`](Self::match_feature).
    #[must_use]
    pub fn matched_rules(&self) -> &[DrawRule] {
        &self.matched_rules
    }

    /// Matches `feature` against the tree under `root`, leaving one merged
    /// rule per matched rule id in [`matched_rules`](Self::matched_rules).
    ///
    /// Returns `false`, with no rules, when the root is hidden or its filter
    /// rejects the feature.
    pub fn match_feature<C>(
        &mut self,
        feature: &Feature,
        root: LayerId,
        sheet: &StyleSheet,
        ctx: &mut C,
        tracer: &mut Tracer<'_>,
    ) -> bool
    where
        C: StyleContext + ?Sized,
    {
        ctx.set_feature(feature);
        self.matched_rules.clear();
        self.queued_layers.clear();
        self.last_evaluated = None;

        if !sheet.is_visible(root) {
            return false;
        }
        if !ctx.eval_filter(sheet.filter(root), feature) {
            return false;
        }

        self.queued_layers.push(root);
        while let Some(layer) = self.queued_layers.pop() {
            self.merge_rules(layer, sheet, tracer);
            for sublayer in sheet.sublayers(layer) {
                if sheet.is_visible(sublayer) && ctx.eval_filter(sheet.filter(sublayer), feature) {
                    self.queued_layers.push(sublayer);
                }
            }
        }

        true
    }

    /// Folds the rule definitions of `layer` into the matched rules.
    ///
    /// A definition whose id is not yet matched seeds a new rule; otherwise it
    /// is merged into the existing one.
    pub fn merge_rules(&mut self, layer: LayerId, sheet: &StyleSheet, tracer: &mut Tracer<'_>) {
        let detect_conflicts = self.config.detect_conflicts && tracer.is_attached();
        for &definition in sheet.rules(layer) {
            let id = sheet.definition(definition).id();
            match self.matched_rules.iter_mut().find(|r| r.id() == id) {
                Some(rule) => {
                    if detect_conflicts {
                        rule.report_conflicts(sheet, definition, tracer);
                    }
                    rule.merge(sheet, definition);
                }
                None => self.matched_rules.push(DrawRule::new(sheet, definition)),
            }
        }
    }

    /// Resolves every dynamic value of matched rule `index` into the scratch.
    ///
    /// Returns `false` when the rule must not be drawn: `visible` resolved to
    /// `false`, or a required key could not be resolved. Optional keys that
    /// cannot be resolved are deactivated instead. After `true`, every active
    /// key of the rule has a concrete value.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn evaluate_rule<C>(
        &mut self,
        index: usize,
        feature: &Feature,
        sheet: &StyleSheet,
        ctx: &mut C,
        tracer: &mut Tracer<'_>,
    ) -> bool
    where
        C: StyleContext + ?Sized,
    {
        let Self {
            matched_rules,
            evaluated,
            last_evaluated,
            ..
        } = self;
        let rule = &mut matched_rules[index];
        let id = rule.id();
        rule.clear_evaluated();
        *last_evaluated = None;

        if let Some(param) = rule.param(sheet, StyleParamKey::Visible) {
            let key = StyleParamKey::Visible;
            let visible = match &param.value {
                ParamValue::Plain(Value::Bool(b)) => Some(*b),
                ParamValue::Function(function) => {
                    match ctx.eval_function(*function, key, feature) {
                        Some(Value::Bool(b)) => Some(b),
                        _ => None,
                    }
                }
                ParamValue::Plain(_) | ParamValue::Stops(_) => None,
            };
            match visible {
                Some(false) => {
                    log::trace!("rule `{}` hidden", sheet.rule_name(id));
                    tracer.rule_rejected(&RuleRejectedEvent {
                        rule: id,
                        reason: RejectReason::Hidden,
                    });
                    return false;
                }
                Some(true) => {
                    if param.value.is_dynamic() {
                        evaluated.set(key, Value::Bool(true));
                        rule.mark_evaluated(key);
                    }
                }
                None => {
                    rule.deactivate(key);
                    tracer.param_dropped(&ParamDroppedEvent { rule: id, key });
                }
            }
        }

        for key in rule.active().iter() {
            if key == StyleParamKey::Visible {
                continue;
            }
            let Some(param) = rule.param(sheet, key) else {
                continue;
            };
            match &param.value {
                ParamValue::Plain(_) => {}
                ParamValue::Function(function) => {
                    let value = ctx
                        .eval_function(*function, key, feature)
                        .and_then(|v| coerce(key, v));
                    match value {
                        Some(value) => {
                            evaluated.set(key, value);
                            rule.mark_evaluated(key);
                        }
                        None if key.is_required() => {
                            log::debug!(
                                "rule `{}` skipped: `{key}` did not resolve",
                                sheet.rule_name(id)
                            );
                            tracer.rule_rejected(&RuleRejectedEvent {
                                rule: id,
                                reason: RejectReason::RequiredUnresolved(key),
                            });
                            return false;
                        }
                        None => {
                            rule.deactivate(key);
                            tracer.param_dropped(&ParamDroppedEvent { rule: id, key });
                        }
                    }
                }
                ParamValue::Stops(stops) => {
                    let zoom = ctx.zoom();
                    let value = if key.is_color() {
                        Value::Color(stops.eval_color(zoom))
                    } else if key.is_width() {
                        Value::Width(Width {
                            value: stops.eval_width(zoom),
                            next: stops.eval_width(zoom + 1.0),
                        })
                    } else if key.is_offsets() {
                        Value::Vec2(stops.eval_vec2(zoom))
                    } else {
                        Value::Float(stops.eval_float(zoom))
                    };
                    evaluated.set(key, value);
                    rule.mark_evaluated(key);
                }
            }
        }

        *last_evaluated = Some(index);
        true
    }

    /// Returns the resolved view of matched rule `index`, if it is the rule
    /// most recently evaluated successfully.
    #[must_use]
    pub fn resolved<'a>(&'a self, index: usize, sheet: &'a StyleSheet) -> Option<ResolvedRule<'a>> {
        (self.last_evaluated == Some(index)).then(|| ResolvedRule {
            sheet,
            rule: &self.matched_rules[index],
            evaluated: &self.evaluated,
        })
    }

    /// Matches, evaluates, and dispatches `feature` to `builders`.
    ///
    /// Returns the number of rules that reached their main builder. Rules
    /// that fail evaluation or name a style with no builder are skipped;
    /// neither stops the remaining rules.
    pub fn apply<C, B>(
        &mut self,
        feature: &Feature,
        root: LayerId,
        sheet: &StyleSheet,
        ctx: &mut C,
        builders: &mut B,
        tracer: &mut Tracer<'_>,
    ) -> usize
    where
        C: StyleContext + ?Sized,
        B: StyleBuilders + ?Sized,
    {
        if !self.match_feature(feature, root, sheet, ctx, tracer) {
            return 0;
        }

        let mut dispatched = 0;
        for index in 0..self.matched_rules.len() {
            if !self.evaluate_rule(index, feature, sheet, ctx, tracer) {
                continue;
            }
            let Some(rule) = self.resolved(index, sheet) else {
                continue;
            };

            let style = rule.style_name();
            if builders.style_builder(style).is_none() {
                log::warn!("no builder for style `{style}` (rule `{}`)", rule.rule_name());
                tracer.missing_builder(&MissingBuilderEvent {
                    rule: rule.id(),
                    style,
                    mode: BuildMode::Full,
                });
                continue;
            }

            if let Some(outline) = rule.value(StyleParamKey::OutlineStyle).and_then(Value::as_str) {
                match builders.style_builder(outline) {
                    Some(builder) => builder.add_feature(feature, &rule, BuildMode::OutlineOnly),
                    None => {
                        log::warn!(
                            "no builder for outline style `{outline}` (rule `{}`)",
                            rule.rule_name()
                        );
                        tracer.missing_builder(&MissingBuilderEvent {
                            rule: rule.id(),
                            style: outline,
                            mode: BuildMode::OutlineOnly,
                        });
                    }
                }
            }

            if let Some(builder) = builders.style_builder(style) {
                builder.add_feature(feature, &rule, BuildMode::Full);
                dispatched += 1;
            }
        }

        #[expect(clippy::cast_possible_truncation, reason = "per-feature rule counts are small")]
        let event = FeatureStyledEvent {
            rules_matched: self.matched_rules.len() as u32,
            rules_dispatched: dispatched as u32,
        };
        tracer.feature_styled(&event);
        dispatched
    }
}
