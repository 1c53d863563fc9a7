// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compact binary event recording and decoding.
//!
//! [`RecorderSink`] implements [`TraceSink`] and encodes events into a
//! `Vec<u8>` as little-endian records. [`decode`] reads them back as an
//! iterator of [`RecordedEvent`].
//!
//! Handles are stored as raw indices, so decoded events name rules and layers
//! by number rather than by handle.

use strata_core::builder::BuildMode;
use strata_core::param::StyleParamKey;
use strata_core::trace::{
    FeatureStyledEvent, MissingBuilderEvent, ParamDroppedEvent, RejectReason, RuleConflictEvent,
    RuleRejectedEvent, TraceSink,
};

// ---------------------------------------------------------------------------
// Event type discriminants
// ---------------------------------------------------------------------------

const TAG_RULE_CONFLICT: u8 = 1;
const TAG_RULE_REJECTED: u8 = 2;
const TAG_PARAM_DROPPED: u8 = 3;
const TAG_MISSING_BUILDER: u8 = 4;
const TAG_FEATURE_STYLED: u8 = 5;

const REASON_HIDDEN: u8 = 0;
const REASON_REQUIRED: u8 = 1;

// ---------------------------------------------------------------------------
// RecorderSink
// ---------------------------------------------------------------------------

/// A [`TraceSink`] that encodes events into a compact binary buffer.
#[derive(Debug, Default)]
pub struct RecorderSink {
    buf: Vec<u8>,
}

impl RecorderSink {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a view of the recorded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consumes the recorder and returns the recorded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Discards everything recorded so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    // -- encoding helpers --------------------------------------------------

    fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn write_key(&mut self, key: StyleParamKey) {
        #[expect(clippy::cast_possible_truncation, reason = "fewer than 64 keys")]
        self.write_u8(key.index() as u8);
    }

    fn write_mode(&mut self, mode: BuildMode) {
        self.write_u8(match mode {
            BuildMode::Full => 0,
            BuildMode::OutlineOnly => 1,
        });
    }

    fn write_str(&mut self, s: &str) {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "style names capped at u32::MAX bytes for recording"
        )]
        let len = s.len().min(u32::MAX as usize) as u32;
        self.write_u32(len);
        self.buf.extend_from_slice(&s.as_bytes()[..len as usize]);
    }
}

impl TraceSink for RecorderSink {
    fn on_rule_conflict(&mut self, e: &RuleConflictEvent) {
        self.write_u8(TAG_RULE_CONFLICT);
        self.write_u32(e.rule.get());
        self.write_key(e.key);
        self.write_u32(e.current.index());
        self.write_u32(e.incoming.index());
        self.write_u32(e.depth);
        self.write_u8(u8::from(e.incoming_wins));
    }

    fn on_rule_rejected(&mut self, e: &RuleRejectedEvent) {
        self.write_u8(TAG_RULE_REJECTED);
        self.write_u32(e.rule.get());
        match e.reason {
            RejectReason::Hidden => {
                self.write_u8(REASON_HIDDEN);
                self.write_u8(0);
            }
            RejectReason::RequiredUnresolved(key) => {
                self.write_u8(REASON_REQUIRED);
                self.write_key(key);
            }
        }
    }

    fn on_param_dropped(&mut self, e: &ParamDroppedEvent) {
        self.write_u8(TAG_PARAM_DROPPED);
        self.write_u32(e.rule.get());
        self.write_key(e.key);
    }

    fn on_missing_builder(&mut self, e: &MissingBuilderEvent<'_>) {
        self.write_u8(TAG_MISSING_BUILDER);
        self.write_u32(e.rule.get());
        self.write_mode(e.mode);
        self.write_str(e.style);
    }

    fn on_feature_styled(&mut self, e: &FeatureStyledEvent) {
        self.write_u8(TAG_FEATURE_STYLED);
        self.write_u32(e.rules_matched);
        self.write_u32(e.rules_dispatched);
    }
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// A decoded event from a binary recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RecordedEvent {
    /// A [`RuleConflictEvent`].
    RuleConflict {
        /// Raw rule id.
        rule: u32,
        /// The contested key.
        key: StyleParamKey,
        /// Raw index of the layer holding the slot.
        current_layer: u32,
        /// Raw index of the layer being merged in.
        incoming_layer: u32,
        /// Depth shared by both layers.
        depth: u32,
        /// Whether the incoming layer took the slot.
        incoming_wins: bool,
    },
    /// A [`RuleRejectedEvent`].
    RuleRejected {
        /// Raw rule id.
        rule: u32,
        /// Why the rule was rejected.
        reason: RejectReason,
    },
    /// A [`ParamDroppedEvent`].
    ParamDropped {
        /// Raw rule id.
        rule: u32,
        /// The dropped key.
        key: StyleParamKey,
    },
    /// A [`MissingBuilderEvent`].
    MissingBuilder {
        /// Raw rule id.
        rule: u32,
        /// The style name that had no builder.
        style: String,
        /// The pass that was skipped.
        mode: BuildMode,
    },
    /// A [`FeatureStyledEvent`].
    FeatureStyled(FeatureStyledEvent),
}

/// Decodes a byte slice produced by [`RecorderSink`] into an iterator of
/// [`RecordedEvent`].
///
/// Decoding stops at the first truncated or unrecognized record.
pub fn decode(bytes: &[u8]) -> DecodeIter<'_> {
    DecodeIter {
        data: bytes,
        pos: 0,
    }
}

/// Iterator over decoded events.
#[derive(Debug)]
pub struct DecodeIter<'a> {
    data: &'a [u8],
    pos: usize,
}

impl DecodeIter<'_> {
    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn read_u8(&mut self) -> Option<u8> {
        if self.remaining() < 1 {
            return None;
        }
        let v = self.data[self.pos];
        self.pos += 1;
        Some(v)
    }

    fn read_u32(&mut self) -> Option<u32> {
        if self.remaining() < 4 {
            return None;
        }
        let v = u32::from_le_bytes(self.data[self.pos..self.pos + 4].try_into().ok()?);
        self.pos += 4;
        Some(v)
    }

    fn read_key(&mut self) -> Option<StyleParamKey> {
        StyleParamKey::from_index(usize::from(self.read_u8()?))
    }

    fn read_mode(&mut self) -> Option<BuildMode> {
        Some(match self.read_u8()? {
            0 => BuildMode::Full,
            _ => BuildMode::OutlineOnly,
        })
    }

    fn read_string(&mut self) -> Option<String> {
        let len = self.read_u32()? as usize;
        if self.remaining() < len {
            return None;
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Some(String::from_utf8_lossy(bytes).into_owned())
    }

    fn decode_rule_conflict(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::RuleConflict {
            rule: self.read_u32()?,
            key: self.read_key()?,
            current_layer: self.read_u32()?,
            incoming_layer: self.read_u32()?,
            depth: self.read_u32()?,
            incoming_wins: self.read_u8()? != 0,
        })
    }

    fn decode_rule_rejected(&mut self) -> Option<RecordedEvent> {
        let rule = self.read_u32()?;
        let reason = match self.read_u8()? {
            REASON_HIDDEN => {
                self.read_u8()?;
                RejectReason::Hidden
            }
            _ => RejectReason::RequiredUnresolved(self.read_key()?),
        };
        Some(RecordedEvent::RuleRejected { rule, reason })
    }

    fn decode_param_dropped(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::ParamDropped {
            rule: self.read_u32()?,
            key: self.read_key()?,
        })
    }

    fn decode_missing_builder(&mut self) -> Option<RecordedEvent> {
        let rule = self.read_u32()?;
        let mode = self.read_mode()?;
        let style = self.read_string()?;
        Some(RecordedEvent::MissingBuilder { rule, style, mode })
    }

    fn decode_feature_styled(&mut self) -> Option<RecordedEvent> {
        Some(RecordedEvent::FeatureStyled(FeatureStyledEvent {
            rules_matched: self.read_u32()?,
            rules_dispatched: self.read_u32()?,
        }))
    }
}

impl Iterator for DecodeIter<'_> {
    type Item = RecordedEvent;

    fn next(&mut self) -> Option<Self::Item> {
        let tag = self.read_u8()?;
        match tag {
            TAG_RULE_CONFLICT => self.decode_rule_conflict(),
            TAG_RULE_REJECTED => self.decode_rule_rejected(),
            TAG_PARAM_DROPPED => self.decode_param_dropped(),
            TAG_MISSING_BUILDER => self.decode_missing_builder(),
            TAG_FEATURE_STYLED => self.decode_feature_styled(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::builder::{BuilderRegistry, StyleBuilder};
    use strata_core::config::MergeSetConfig;
    use strata_core::context::NativeContext;
    use strata_core::feature::{Feature, GeometryType};
    use strata_core::merge_set::{DrawRuleMergeSet, ResolvedRule};
    use strata_core::param::{StyleParam, StyleParamKey as K};
    use strata_core::sheet::{Filter, StyleSheet};
    use strata_core::trace::Tracer;

    /// Runs one feature through a sheet that triggers every event kind.
    fn record_sample() -> RecorderSink {
        let mut ctx = NativeContext::new();
        let broken = ctx.register(|_, _| None);
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let a = sheet.add_sublayer(root, "a", Filter::Always);
        let b = sheet.add_sublayer(root, "b", Filter::Always);
        sheet.add_rule(a, "lines", [StyleParam::plain(K::Width, 1.0_f32)]);
        sheet.add_rule(b, "lines", [StyleParam::plain(K::Width, 2.0_f32)]);
        sheet.add_rule(root, "hidden", [StyleParam::plain(K::Visible, false)]);
        sheet.add_rule(root, "broken", [StyleParam::function(K::Order, broken)]);
        sheet.add_rule(
            root,
            "partial",
            [
                StyleParam::function(K::Cap, broken),
                StyleParam::plain(K::Style, "lines"),
            ],
        );
        sheet.add_rule(root, "nobuilder", []);

        let mut builders: BuilderRegistry = BuilderRegistry::new();
        builders.insert("lines", Box::new(Noop));

        let mut rec = RecorderSink::new();
        let mut set = DrawRuleMergeSet::with_config(MergeSetConfig::diagnostic());
        let feature = Feature::new(GeometryType::Lines).with("kind", "road");
        set.apply(
            &feature,
            root,
            &sheet,
            &mut ctx,
            &mut builders,
            &mut Tracer::new(&mut rec),
        );
        rec
    }

    #[derive(Debug)]
    struct Noop;

    impl StyleBuilder for Noop {
        fn add_feature(&mut self, _: &Feature, _: &ResolvedRule<'_>, _: BuildMode) {}
    }

    #[test]
    fn records_a_styled_feature() {
        let rec = record_sample();
        let events: Vec<_> = decode(rec.as_bytes()).collect();

        assert_eq!(events.len(), 6, "got: {events:?}");
        assert!(matches!(
            events[0],
            RecordedEvent::RuleConflict {
                key: K::Width,
                depth: 1,
                incoming_wins: false,
                ..
            }
        ));
        assert!(matches!(
            events[1],
            RecordedEvent::RuleRejected {
                reason: RejectReason::Hidden,
                ..
            }
        ));
        assert!(matches!(
            events[2],
            RecordedEvent::RuleRejected {
                reason: RejectReason::RequiredUnresolved(K::Order),
                ..
            }
        ));
        assert!(matches!(
            events[3],
            RecordedEvent::ParamDropped { key: K::Cap, .. }
        ));
        match &events[4] {
            RecordedEvent::MissingBuilder { style, mode, .. } => {
                assert_eq!(style, "nobuilder");
                assert_eq!(*mode, BuildMode::Full);
            }
            other => panic!("expected MissingBuilder, got {other:?}"),
        }
        assert_eq!(
            events[5],
            RecordedEvent::FeatureStyled(FeatureStyledEvent {
                rules_matched: 5,
                rules_dispatched: 2,
            })
        );
    }

    #[test]
    fn empty_buffer_decodes_to_nothing() {
        let events: Vec<_> = decode(&[]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn truncated_record_ends_decoding() {
        let rec = record_sample();
        let bytes = rec.as_bytes();
        let events: Vec<_> = decode(&bytes[..bytes.len() - 1]).collect();
        assert_eq!(events.len(), 5);
    }

    #[test]
    fn unknown_tag_ends_decoding() {
        let events: Vec<_> = decode(&[0xff, 1, 2, 3]).collect();
        assert!(events.is_empty());
    }

    #[test]
    fn clear_discards_recording() {
        let mut rec = record_sample();
        assert!(!rec.as_bytes().is_empty());
        rec.clear();
        assert!(rec.into_bytes().is_empty());
    }
}
