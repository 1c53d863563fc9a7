// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style cascade and evaluation engine for vector-map tiles.
//!
//! `strata_core` decides, for every feature of a tile, which style rules apply
//! to it, what their parameters resolve to after layered overrides, and which
//! geometry builder receives it. It is `no_std` compatible (with `alloc`) and
//! stores the layer tree as struct-of-arrays with index handles.
//!
//! # Architecture
//!
//! A sheet is built once and shared read-only; each worker owns the rest:
//!
//! ```text
//!   StyleSheet (layers, filters, rule definitions)
//!       │
//!       ▼
//!   TileStyler::build() ── per feature ──► DrawRuleMergeSet::apply()
//!                                              │
//!        match_feature() ──► merge_rules() ──► evaluate_rule()
//!                                              │
//!                                              ▼
//!                         StyleBuilders ──► StyleBuilder::add_feature()
//! ```
//!
//! **[`sheet`]**: Struct-of-arrays layer tree, layer filters, and interned
//! rule definitions.
//!
//! **[`param`]**: The closed set of style keys, concrete values, and declared
//! values (plain, scripted, or zoom stops).
//!
//! **[`stops`]**: Zoom-keyed interpolation tables.
//!
//! **[`draw_rule`]**: One merged rule with per-key provenance and the
//! override policy (deeper wins, ties broken by layer name).
//!
//! **[`merge_set`]**: Per-feature matching, cascading, evaluation, and
//! dispatch, with reusable scratch.
//!
//! **[`context`]**: The [`StyleContext`](context::StyleContext) seam for
//! scripted functions and filter predicates.
//!
//! **[`builder`]**: The [`StyleBuilder`](builder::StyleBuilder) contract and a
//! name-keyed registry.
//!
//! **[`tile`]**: Whole-tile driver pairing root layers with data layers.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! cascade diagnostics, with a zero-overhead [`Tracer`](trace::Tracer)
//! wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod builder;
pub mod color;
pub mod config;
pub mod context;
pub mod draw_rule;
pub mod error;
pub mod feature;
pub mod merge_set;
pub mod param;
pub mod sheet;
pub mod stops;
pub mod tile;
pub mod trace;
