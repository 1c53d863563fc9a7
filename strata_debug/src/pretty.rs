// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable trace output.
//!
//! [`PrettyPrintSink`] implements [`TraceSink`] and writes one line per event
//! to a [`Write`](std::io::Write) destination (default: stderr).

use std::io::Write;

use strata_core::trace::{
    FeatureStyledEvent, MissingBuilderEvent, ParamDroppedEvent, RejectReason, RuleConflictEvent,
    RuleRejectedEvent, TraceSink,
};

/// Writes human-readable trace lines to a [`Write`](std::io::Write) destination.
pub struct PrettyPrintSink<W: Write = Box<dyn Write>> {
    writer: W,
    /// Skip `[styled]` lines, which appear once per feature.
    quiet: bool,
}

impl<W: Write> std::fmt::Debug for PrettyPrintSink<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrettyPrintSink")
            .field("quiet", &self.quiet)
            .finish_non_exhaustive()
    }
}

impl PrettyPrintSink {
    /// Creates a sink that writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Box::new(std::io::stderr()))
    }

    /// Creates a sink that writes to a boxed writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            quiet: false,
        }
    }
}

impl<W: Write> PrettyPrintSink<W> {
    /// Creates a sink that writes to the given destination.
    #[must_use]
    pub fn with_writer(writer: W) -> Self {
        Self {
            writer,
            quiet: false,
        }
    }

    /// Suppresses the per-feature summary lines.
    #[must_use]
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Consumes the sink and returns the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<W: Write> TraceSink for PrettyPrintSink<W> {
    fn on_rule_conflict(&mut self, e: &RuleConflictEvent) {
        let winner = if e.incoming_wins { "incoming" } else { "current" };
        let _ = writeln!(
            self.writer,
            "[conflict] rule={} key={} depth={} current={:?} incoming={:?} kept={winner}",
            e.rule.get(),
            e.key,
            e.depth,
            e.current,
            e.incoming,
        );
    }

    fn on_rule_rejected(&mut self, e: &RuleRejectedEvent) {
        let _ = match e.reason {
            RejectReason::Hidden => writeln!(self.writer, "[rejected] rule={} hidden", e.rule.get()),
            RejectReason::RequiredUnresolved(key) => writeln!(
                self.writer,
                "[rejected] rule={} unresolved={key}",
                e.rule.get(),
            ),
        };
    }

    fn on_param_dropped(&mut self, e: &ParamDroppedEvent) {
        let _ = writeln!(
            self.writer,
            "[dropped] rule={} key={}",
            e.rule.get(),
            e.key,
        );
    }

    fn on_missing_builder(&mut self, e: &MissingBuilderEvent<'_>) {
        let _ = writeln!(
            self.writer,
            "[missing] rule={} style={:?} mode={}",
            e.rule.get(),
            e.style,
            e.mode.as_str(),
        );
    }

    fn on_feature_styled(&mut self, e: &FeatureStyledEvent) {
        if self.quiet {
            return;
        }
        let _ = writeln!(
            self.writer,
            "[styled] matched={} dispatched={}",
            e.rules_matched, e.rules_dispatched,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::builder::BuildMode;
    use strata_core::param::StyleParamKey;
    use strata_core::sheet::StyleSheet;

    fn lines(sink: PrettyPrintSink<Vec<u8>>) -> String {
        String::from_utf8(sink.into_writer()).unwrap()
    }

    #[test]
    fn pretty_print_rejections() {
        let mut sheet = StyleSheet::new();
        let root = sheet.create_root("roads", strata_core::sheet::Filter::Always);
        let def = sheet.add_rule(root, "lines", []);
        let rule = sheet.definition(def).id();

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_rule_rejected(&RuleRejectedEvent {
            rule,
            reason: RejectReason::RequiredUnresolved(StyleParamKey::Color),
        });
        sink.on_missing_builder(&MissingBuilderEvent {
            rule,
            style: "lines-outline",
            mode: BuildMode::OutlineOnly,
        });
        let output = lines(sink);
        assert!(output.contains("[rejected] rule=0 unresolved=color"), "got: {output}");
        assert!(
            output.contains("style=\"lines-outline\" mode=outline"),
            "got: {output}"
        );
        assert_eq!(output.lines().count(), 2);
    }

    #[test]
    fn quiet_skips_feature_lines() {
        let event = FeatureStyledEvent {
            rules_matched: 3,
            rules_dispatched: 1,
        };

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new());
        sink.on_feature_styled(&event);
        assert_eq!(lines(sink), "[styled] matched=3 dispatched=1\n");

        let mut sink = PrettyPrintSink::with_writer(Vec::<u8>::new()).quiet();
        sink.on_feature_styled(&event);
        assert!(lines(sink).is_empty());
    }
}
