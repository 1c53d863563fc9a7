// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Merge set configuration.

/// Configuration for a [`DrawRuleMergeSet`](crate::merge_set::DrawRuleMergeSet).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MergeSetConfig {
    /// Report same-depth value conflicts to the tracer while merging.
    ///
    /// Has no effect unless a sink is attached to the tracer.
    pub detect_conflicts: bool,
    /// Matched-rule slots reserved up front.
    pub rule_capacity: usize,
    /// Layer stack entries reserved up front.
    pub layer_stack_capacity: usize,
}

impl MergeSetConfig {
    /// Settings for tile workers: no conflict detection, room for a typical
    /// feature without reallocating. Also the [`Default`] value.
    pub const DEFAULT: Self = Self {
        detect_conflicts: false,
        rule_capacity: 8,
        layer_stack_capacity: 16,
    };

    /// Settings for style authoring tools: conflict detection on.
    #[must_use]
    pub const fn diagnostic() -> Self {
        Self {
            detect_conflicts: true,
            ..Self::DEFAULT
        }
    }

    /// Settings for memory-constrained hosts: nothing reserved.
    #[must_use]
    pub const fn compact() -> Self {
        Self {
            detect_conflicts: false,
            rule_capacity: 0,
            layer_stack_capacity: 0,
        }
    }
}

impl Default for MergeSetConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets() {
        assert!(!MergeSetConfig::default().detect_conflicts);
        assert!(MergeSetConfig::diagnostic().detect_conflicts);
        assert_eq!(
            MergeSetConfig::diagnostic().rule_capacity,
            MergeSetConfig::DEFAULT.rule_capacity
        );
        assert_eq!(MergeSetConfig::compact().layer_stack_capacity, 0);
        assert_eq!(MergeSetConfig::default(), MergeSetConfig::DEFAULT);
    }
}
