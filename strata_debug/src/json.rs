// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! JSON exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes them as a JSON array, one object per event, for style authoring
//! tools to load.

use std::io::{self, Write};

use serde_json::{Value, json};

use strata_core::trace::RejectReason;

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as a JSON array.
///
/// Every object carries an `"event"` name; the remaining fields mirror the
/// event. Keys are written by name and rules by raw id.
pub fn export(bytes: &[u8], writer: &mut dyn Write) -> io::Result<()> {
    let events: Vec<Value> = decode(bytes).map(|e| to_json(&e)).collect();
    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

/// Converts one recorded event to its JSON object.
#[must_use]
pub fn to_json(event: &RecordedEvent) -> Value {
    match event {
        RecordedEvent::RuleConflict {
            rule,
            key,
            current_layer,
            incoming_layer,
            depth,
            incoming_wins,
        } => json!({
            "event": "RuleConflict",
            "rule": rule,
            "key": key.as_str(),
            "current_layer": current_layer,
            "incoming_layer": incoming_layer,
            "depth": depth,
            "incoming_wins": incoming_wins,
        }),
        RecordedEvent::RuleRejected { rule, reason } => {
            let (reason, key) = match reason {
                RejectReason::Hidden => ("hidden", None),
                RejectReason::RequiredUnresolved(key) => ("unresolved", Some(key.as_str())),
            };
            json!({
                "event": "RuleRejected",
                "rule": rule,
                "reason": reason,
                "key": key,
            })
        }
        RecordedEvent::ParamDropped { rule, key } => json!({
            "event": "ParamDropped",
            "rule": rule,
            "key": key.as_str(),
        }),
        RecordedEvent::MissingBuilder { rule, style, mode } => json!({
            "event": "MissingBuilder",
            "rule": rule,
            "style": style,
            "mode": mode.as_str(),
        }),
        RecordedEvent::FeatureStyled(e) => json!({
            "event": "FeatureStyled",
            "rules_matched": e.rules_matched,
            "rules_dispatched": e.rules_dispatched,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use strata_core::builder::BuildMode;
    use strata_core::param::StyleParamKey;
    use strata_core::sheet::{Filter, StyleSheet};
    use strata_core::trace::{
        FeatureStyledEvent, MissingBuilderEvent, RuleRejectedEvent, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", Filter::Always);
        let def = sheet.add_rule(root, "lines", []);
        let rule = sheet.definition(def).id();

        let mut rec = RecorderSink::new();
        rec.on_rule_rejected(&RuleRejectedEvent {
            rule,
            reason: RejectReason::Hidden,
        });
        rec.on_rule_rejected(&RuleRejectedEvent {
            rule,
            reason: RejectReason::RequiredUnresolved(StyleParamKey::Width),
        });
        rec.on_missing_builder(&MissingBuilderEvent {
            rule,
            style: "lines",
            mode: BuildMode::Full,
        });
        rec.on_feature_styled(&FeatureStyledEvent {
            rules_matched: 1,
            rules_dispatched: 0,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["event"], "RuleRejected");
        assert_eq!(parsed[0]["reason"], "hidden");
        assert!(parsed[0]["key"].is_null());
        assert_eq!(parsed[1]["key"], "width");
        assert_eq!(parsed[2]["style"], "lines");
        assert_eq!(parsed[2]["mode"], "full");
        assert_eq!(parsed[3]["rules_matched"], 1);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], &mut out).unwrap();
        let parsed: Vec<Value> = serde_json::from_slice(&out).unwrap();
        assert!(parsed.is_empty());
    }
}
