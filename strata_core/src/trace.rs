// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the styling pipeline.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! merge set calls while matching, merging, evaluating, and dispatching. All
//! method bodies default to no-ops, so implementing only the events you care
//! about is fine.
//!
//! [`Tracer`] wraps an optional `&mut dyn TraceSink`. When the `trace` feature
//! is **off**, every `Tracer` method compiles to nothing (zero overhead). When
//! **on**, each method performs a single `Option` branch before dispatching.
//!
//! # Crate features
//!
//! - `trace`: enables the `Tracer` method bodies (one branch per call).

use crate::builder::BuildMode;
use crate::param::StyleParamKey;
use crate::sheet::{LayerId, RuleId};

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Why a matched rule was not dispatched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RejectReason {
    /// `visible` resolved to `false`.
    Hidden,
    /// A required key could not be resolved.
    RequiredUnresolved(StyleParamKey),
}

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted when two layers at the same depth declare different values for
/// the same key of the same rule.
///
/// The cascade still picks a winner by layer name; the event only reports
/// that the choice was arbitrary from the author's point of view.
#[derive(Clone, Copy, Debug)]
pub struct RuleConflictEvent {
    /// The rule being merged.
    pub rule: RuleId,
    /// The contested key.
    pub key: StyleParamKey,
    /// The layer currently holding the slot.
    pub current: LayerId,
    /// The layer being merged in.
    pub incoming: LayerId,
    /// Depth shared by both layers.
    pub depth: u32,
    /// Whether the incoming layer takes the slot.
    pub incoming_wins: bool,
}

/// Emitted when a matched rule is dropped during evaluation.
#[derive(Clone, Copy, Debug)]
pub struct RuleRejectedEvent {
    /// The rejected rule.
    pub rule: RuleId,
    /// Why it was rejected.
    pub reason: RejectReason,
}

/// Emitted when an optional key fails to resolve and is dropped.
#[derive(Clone, Copy, Debug)]
pub struct ParamDroppedEvent {
    /// The rule the key belonged to.
    pub rule: RuleId,
    /// The dropped key.
    pub key: StyleParamKey,
}

/// Emitted when no builder is registered under a resolved style name.
#[derive(Clone, Copy, Debug)]
pub struct MissingBuilderEvent<'a> {
    /// The rule that named the style.
    pub rule: RuleId,
    /// The style name that had no builder.
    pub style: &'a str,
    /// The pass that was skipped.
    pub mode: BuildMode,
}

/// Emitted once per feature after dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeatureStyledEvent {
    /// Rules produced by matching.
    pub rules_matched: u32,
    /// Rules that reached a main builder.
    pub rules_dispatched: u32,
}

// ---------------------------------------------------------------------------
// TraceSink trait
// ---------------------------------------------------------------------------

/// Receives trace events from the styling pipeline.
///
/// All methods have default no-op implementations, so you only need to
/// override the events you care about.
pub trait TraceSink {
    /// Called for each same-depth conflict (only when conflict detection is
    /// enabled in the merge set's configuration).
    fn on_rule_conflict(&mut self, e: &RuleConflictEvent) {
        _ = e;
    }

    /// Called when a matched rule is rejected.
    fn on_rule_rejected(&mut self, e: &RuleRejectedEvent) {
        _ = e;
    }

    /// Called when an optional key is dropped.
    fn on_param_dropped(&mut self, e: &ParamDroppedEvent) {
        _ = e;
    }

    /// Called when a style has no builder.
    fn on_missing_builder(&mut self, e: &MissingBuilderEvent<'_>) {
        _ = e;
    }

    /// Called after each feature is dispatched.
    fn on_feature_styled(&mut self, e: &FeatureStyledEvent) {
        _ = e;
    }
}

// ---------------------------------------------------------------------------
// NoopSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that discards all events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSink;

impl TraceSink for NoopSink {}

// ---------------------------------------------------------------------------
// Tracer wrapper
// ---------------------------------------------------------------------------

/// Thin wrapper around an optional [`TraceSink`].
///
/// When the `trace` feature is **off**, every method compiles to nothing. When
/// **on**, each method checks the inner `Option` (one branch) before
/// dispatching to the sink.
pub struct Tracer<'a> {
    #[cfg(feature = "trace")]
    sink: Option<&'a mut dyn TraceSink>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<&'a mut dyn TraceSink>,
}

impl core::fmt::Debug for Tracer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tracer").finish_non_exhaustive()
    }
}

impl<'a> Tracer<'a> {
    /// Creates a tracer that dispatches to the given sink.
    #[inline]
    #[must_use]
    pub fn new(sink: &'a mut dyn TraceSink) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Returns whether events reach a sink.
    ///
    /// Lets callers skip work that only feeds trace events.
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        #[cfg(feature = "trace")]
        {
            self.sink.is_some()
        }
        #[cfg(not(feature = "trace"))]
        {
            false
        }
    }

    /// Emits a [`RuleConflictEvent`].
    #[inline]
    pub fn rule_conflict(&mut self, e: &RuleConflictEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rule_conflict(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`RuleRejectedEvent`].
    #[inline]
    pub fn rule_rejected(&mut self, e: &RuleRejectedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_rule_rejected(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`ParamDroppedEvent`].
    #[inline]
    pub fn param_dropped(&mut self, e: &ParamDroppedEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_param_dropped(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`MissingBuilderEvent`].
    #[inline]
    pub fn missing_builder(&mut self, e: &MissingBuilderEvent<'_>) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_missing_builder(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`FeatureStyledEvent`].
    #[inline]
    pub fn feature_styled(&mut self, e: &FeatureStyledEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_feature_styled(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
