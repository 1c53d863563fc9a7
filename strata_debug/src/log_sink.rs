// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Forwarding trace events to the `log` facade.

use strata_core::trace::{
    FeatureStyledEvent, MissingBuilderEvent, ParamDroppedEvent, RejectReason, RuleConflictEvent,
    RuleRejectedEvent, TraceSink,
};

/// A [`TraceSink`] that logs every event under one target.
///
/// Missing builders log at `warn`, per-feature summaries at `trace`, and
/// everything else at `debug`.
#[derive(Clone, Copy, Debug)]
pub struct LogSink {
    target: &'static str,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink {
    /// Creates a sink logging under the `strata` target.
    #[must_use]
    pub const fn new() -> Self {
        Self { target: "strata" }
    }

    /// Creates a sink logging under `target`.
    #[must_use]
    pub const fn with_target(target: &'static str) -> Self {
        Self { target }
    }

    /// Returns the log target.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }
}

impl TraceSink for LogSink {
    fn on_rule_conflict(&mut self, e: &RuleConflictEvent) {
        log::debug!(
            target: self.target,
            "rule {} has conflicting `{}` at depth {} ({:?} vs {:?})",
            e.rule.get(),
            e.key,
            e.depth,
            e.current,
            e.incoming,
        );
    }

    fn on_rule_rejected(&mut self, e: &RuleRejectedEvent) {
        match e.reason {
            RejectReason::Hidden => {
                log::debug!(target: self.target, "rule {} hidden", e.rule.get());
            }
            RejectReason::RequiredUnresolved(key) => {
                log::debug!(
                    target: self.target,
                    "rule {} skipped: `{key}` did not resolve",
                    e.rule.get(),
                );
            }
        }
    }

    fn on_param_dropped(&mut self, e: &ParamDroppedEvent) {
        log::debug!(target: self.target, "rule {} dropped `{}`", e.rule.get(), e.key);
    }

    fn on_missing_builder(&mut self, e: &MissingBuilderEvent<'_>) {
        log::warn!(
            target: self.target,
            "rule {} names style `{}` with no builder ({} pass)",
            e.rule.get(),
            e.style,
            e.mode.as_str(),
        );
    }

    fn on_feature_styled(&mut self, e: &FeatureStyledEvent) {
        log::trace!(
            target: self.target,
            "feature styled: {} matched, {} dispatched",
            e.rules_matched,
            e.rules_dispatched,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn targets() {
        assert_eq!(LogSink::default().target(), "strata");
        assert_eq!(LogSink::with_target("tiles").target(), "tiles");
    }

    #[test]
    fn forwards_without_a_logger() {
        let mut sink = LogSink::new();
        sink.on_feature_styled(&FeatureStyledEvent::default());
    }
}
