// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A builder that batches features instead of tessellating them.

use kurbo::Vec2;

use strata_core::builder::{BuildMode, StyleBuilder};
use strata_core::color::Color;
use strata_core::feature::Feature;
use strata_core::merge_set::ResolvedRule;
use strata_core::param::{StyleParamKey, Width};

use crate::plan::{BatchItem, BatchKey, BatchPlan};

/// Collects dispatched features into a [`BatchPlan`].
///
/// In [`BuildMode::OutlineOnly`] the `outline_*` parameters are read in place
/// of their main counterparts. Unset colors default to black, unset widths
/// and orders to zero.
#[derive(Clone, Debug, Default)]
pub struct BatchBuilder {
    plan: BatchPlan,
}

impl BatchBuilder {
    /// Creates a builder with an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the plan built so far.
    #[must_use]
    pub fn plan(&self) -> &BatchPlan {
        &self.plan
    }

    /// Takes the plan, leaving an empty one.
    pub fn take_plan(&mut self) -> BatchPlan {
        core::mem::take(&mut self.plan)
    }
}

impl StyleBuilder for BatchBuilder {
    fn add_feature(&mut self, feature: &Feature, rule: &ResolvedRule<'_>, mode: BuildMode) {
        let (color, width, order) = match mode {
            BuildMode::Full => (
                StyleParamKey::Color,
                StyleParamKey::Width,
                StyleParamKey::Order,
            ),
            BuildMode::OutlineOnly => (
                StyleParamKey::OutlineColor,
                StyleParamKey::OutlineWidth,
                StyleParamKey::OutlineOrder,
            ),
        };
        let item = BatchItem {
            geometry: feature.geometry,
            color: rule.get::<Color>(color).unwrap_or(Color::BLACK),
            width: rule.get::<Width>(width).unwrap_or_default(),
            offset: rule.get::<Vec2>(StyleParamKey::Offset).unwrap_or(Vec2::ZERO),
        };
        let key = BatchKey {
            param_set_hash: rule.param_set_hash(),
            mode,
        };
        let order = rule.get::<u32>(order).unwrap_or(0);
        self.plan.push(key, rule.rule_name(), order, item);
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;
    use strata_core::builder::BuilderRegistry;
    use strata_core::context::{NativeContext, StyleContext};
    use strata_core::feature::GeometryType;
    use strata_core::param::{StyleParam, StyleParamKey as K, Value};
    use strata_core::sheet::{Filter, StyleSheet};
    use strata_core::stops::{Frame, Stops};
    use strata_core::tile::{DataLayer, TileData, TileStyler};
    use strata_core::trace::Tracer;

    fn roads_sheet(ctx: &mut NativeContext) -> StyleSheet {
        let by_lanes = ctx.register(|f, _| {
            let lanes = f.properties.get("lanes")?.as_number()?;
            #[expect(clippy::cast_possible_truncation, reason = "lane counts are small")]
            let lanes = lanes as f32;
            Some(Value::Float(lanes))
        });
        let mut sheet = StyleSheet::new();
        let roads = sheet.create_root("roads", Filter::Always);
        sheet.add_rule(
            roads,
            "lines",
            [
                StyleParam::plain(K::Color, "#808080"),
                StyleParam::function(K::Width, by_lanes),
                StyleParam::plain(K::Order, 2_u32),
                StyleParam::plain(K::OutlineStyle, "lines"),
                StyleParam::plain(K::OutlineColor, "black"),
                StyleParam::stops(
                    K::OutlineWidth,
                    Stops::new(vec![Frame::new(10.0, 1.0_f32), Frame::new(20.0, 11.0_f32)])
                        .unwrap(),
                ),
                StyleParam::plain(K::OutlineOrder, 1_u32),
            ],
        );
        let major = sheet.add_sublayer(roads, "major", Filter::equals("kind", "major"));
        sheet.add_rule(major, "lines", [StyleParam::plain(K::Color, "orange")]);
        sheet
    }

    fn road(kind: &str, lanes: f64) -> Feature {
        Feature::new(GeometryType::Lines)
            .with("kind", kind)
            .with("lanes", lanes)
    }

    #[test]
    fn tile_batches_by_layer_combination_and_pass() {
        let mut ctx = NativeContext::new();
        let sheet = roads_sheet(&mut ctx);
        let tile = TileData {
            zoom: 12.0,
            layers: vec![DataLayer::new(
                "roads",
                vec![road("minor", 1.0), road("minor", 2.0), road("major", 4.0)],
            )],
        };

        let mut builders = BuilderRegistry::new();
        builders.insert("lines", BatchBuilder::new());
        let mut styler = TileStyler::new(ctx, builders);
        let stats = styler.build(&sheet, &tile, &mut Tracer::none());
        assert_eq!(stats.rules_dispatched, 3);
        assert_eq!(styler.context().zoom(), 12.0);

        let plan = styler
            .builders_mut()
            .get_mut("lines")
            .map(BatchBuilder::take_plan)
            .unwrap();
        // minor and major roads differ in contributing layers; each has an
        // outline pass and a main pass.
        assert_eq!(plan.len(), 4);
        assert_eq!(plan.item_count(), 6);

        let order: Vec<_> = plan.draw_order().iter().map(|b| (b.order, b.key.mode)).collect();
        assert_eq!(
            order,
            [
                (1, BuildMode::OutlineOnly),
                (1, BuildMode::OutlineOnly),
                (2, BuildMode::Full),
                (2, BuildMode::Full),
            ]
        );

        let minor = &plan.batches()[1];
        assert_eq!(minor.key.mode, BuildMode::Full);
        assert_eq!(minor.items.len(), 2);
        assert_eq!(minor.items[0].width, Width::constant(1.0));
        assert_eq!(minor.items[1].width, Width::constant(2.0));
        assert_eq!(minor.items[0].color, Color::rgb(0x80, 0x80, 0x80));

        let outline = &plan.batches()[0];
        assert_eq!(outline.key.mode, BuildMode::OutlineOnly);
        assert_eq!(outline.items[0].color, Color::BLACK);
        assert_eq!(
            outline.items[0].width,
            Width {
                value: 3.0,
                next: 4.0
            }
        );

        let major_main = plan
            .batches()
            .iter()
            .find(|b| b.key.mode == BuildMode::Full && b.items.len() == 1)
            .unwrap();
        assert_eq!(major_main.items[0].color, Color::rgb(255, 165, 0));
        assert_eq!(major_main.items[0].width, Width::constant(4.0));
    }

    #[test]
    fn unset_parameters_use_defaults() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("points", Filter::Always);
        sheet.add_rule(root, "icons", []);

        let mut builders = BuilderRegistry::new();
        builders.insert("icons", BatchBuilder::new());
        let mut styler = TileStyler::new(NativeContext::new(), builders);
        let tile = TileData {
            zoom: 3.0,
            layers: vec![DataLayer::new("points", vec![Feature::new(GeometryType::Points)])],
        };
        styler.build(&sheet, &tile, &mut Tracer::none());

        let plan = styler.builders().get("icons").map(BatchBuilder::plan).unwrap();
        let batch = &plan.batches()[0];
        assert_eq!(batch.order, 0);
        assert_eq!(
            batch.items[0],
            BatchItem {
                geometry: GeometryType::Points,
                color: Color::BLACK,
                width: Width::default(),
                offset: Vec2::ZERO,
            }
        );
    }
}
