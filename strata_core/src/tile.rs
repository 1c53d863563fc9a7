// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Styling a whole tile.
//!
//! A [`TileStyler`] owns one worker's context, merge set, and builders, and
//! runs every feature of a [`TileData`] through the sheet. Root layers are
//! paired with data layers by name; roots without data and data without a
//! root are skipped.

use alloc::string::String;
use alloc::vec::Vec;

use crate::builder::StyleBuilders;
use crate::config::MergeSetConfig;
use crate::context::StyleContext;
use crate::feature::Feature;
use crate::merge_set::DrawRuleMergeSet;
use crate::sheet::StyleSheet;
use crate::trace::Tracer;

/// A named collection of features from one source layer.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataLayer {
    /// Name matched against root layer names.
    pub name: String,
    /// Features in source order.
    pub features: Vec<Feature>,
}

impl DataLayer {
    /// Creates a data layer.
    #[must_use]
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }
}

/// Decoded features of one tile.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TileData {
    /// Zoom level the tile is built for.
    pub zoom: f32,
    /// Source layers.
    pub layers: Vec<DataLayer>,
}

impl TileData {
    /// Returns the data layer named `name`.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&DataLayer> {
        self.layers.iter().find(|l| l.name == name)
    }
}

/// Counters from one [`TileStyler::build`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileStats {
    /// Features run through a root layer.
    pub features_seen: usize,
    /// Features that matched at least one rule.
    pub features_matched: usize,
    /// Builder dispatches in [`BuildMode::Full`](crate::builder::BuildMode::Full).
    pub rules_dispatched: usize,
}

/// One worker's styling state.
#[derive(Debug)]
pub struct TileStyler<C, B> {
    ctx: C,
    merge_set: DrawRuleMergeSet,
    builders: B,
}

impl<C: StyleContext, B: StyleBuilders> TileStyler<C, B> {
    /// Creates a styler with [`MergeSetConfig::DEFAULT`].
    pub fn new(ctx: C, builders: B) -> Self {
        Self::with_config(ctx, builders, MergeSetConfig::DEFAULT)
    }

    /// Creates a styler with `config`.
    pub fn with_config(ctx: C, builders: B, config: MergeSetConfig) -> Self {
        Self {
            ctx,
            merge_set: DrawRuleMergeSet::with_config(config),
            builders,
        }
    }

    /// Returns the context.
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Returns the builders.
    pub fn builders(&self) -> &B {
        &self.builders
    }

    /// Returns the builders mutably.
    pub fn builders_mut(&mut self) -> &mut B {
        &mut self.builders
    }

    /// Returns the merge set.
    pub fn merge_set(&self) -> &DrawRuleMergeSet {
        &self.merge_set
    }

    /// Consumes the styler, returning the builders.
    pub fn into_builders(self) -> B {
        self.builders
    }

    /// Styles every feature of `tile` against `sheet`.
    pub fn build(&mut self, sheet: &StyleSheet, tile: &TileData, tracer: &mut Tracer<'_>) -> TileStats {
        self.ctx.set_zoom(tile.zoom);
        let mut stats = TileStats::default();

        for root in sheet.roots() {
            let name = sheet.layer_name(root);
            let Some(data) = tile.layer(name) else {
                log::trace!("no data layer for root `{name}`");
                continue;
            };
            for feature in &data.features {
                stats.features_seen += 1;
                stats.rules_dispatched += self.merge_set.apply(
                    feature,
                    root,
                    sheet,
                    &mut self.ctx,
                    &mut self.builders,
                    tracer,
                );
                if !self.merge_set.matched_rules().is_empty() {
                    stats.features_matched += 1;
                }
            }
        }

        log::debug!(
            "styled tile at z{}: {} features, {} matched, {} dispatches",
            tile.zoom,
            stats.features_seen,
            stats.features_matched,
            stats.rules_dispatched
        );
        stats
    }
}
