// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry builder contract.
//!
//! The engine stops at a fully resolved rule. Turning a feature plus its
//! resolved parameters into geometry is the job of a [`StyleBuilder`], one per
//! style name, looked up through [`StyleBuilders`].
//!
//! # Dispatch pseudocode
//!
//! For every matched rule that survives evaluation:
//!
//! ```rust,ignore
//! let style = rule.style_name();
//! if let Some(outline) = rule.get::<&str>(StyleParamKey::OutlineStyle) {
//!     builders.style_builder(outline)?.add_feature(feature, &rule, BuildMode::OutlineOnly);
//! }
//! builders.style_builder(style)?.add_feature(feature, &rule, BuildMode::Full);
//! ```

use alloc::boxed::Box;
use alloc::string::String;

use hashbrown::HashMap;

use crate::feature::Feature;
use crate::merge_set::ResolvedRule;

/// Which part of a rule a builder should emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Everything the rule describes.
    #[default]
    Full,
    /// Only the outline, using the `outline_*` parameters. Issued to the
    /// builder named by `outline_style`, before the main pass.
    OutlineOnly,
}

impl BuildMode {
    /// Returns a short name for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::OutlineOnly => "outline",
        }
    }
}

/// Turns features into geometry for one style.
pub trait StyleBuilder {
    /// Adds `feature`, styled by `rule`, to the builder's output.
    ///
    /// `rule` borrows engine scratch and is valid only for this call.
    fn add_feature(&mut self, feature: &Feature, rule: &ResolvedRule<'_>, mode: BuildMode);
}

impl<B: StyleBuilder + ?Sized> StyleBuilder for Box<B> {
    fn add_feature(&mut self, feature: &Feature, rule: &ResolvedRule<'_>, mode: BuildMode) {
        (**self).add_feature(feature, rule, mode);
    }
}

/// Looks up the builder for a style name.
pub trait StyleBuilders {
    /// Returns the builder registered under `name`.
    fn style_builder(&mut self, name: &str) -> Option<&mut dyn StyleBuilder>;
}

/// A name-keyed set of builders.
///
/// Use `BuilderRegistry<Box<dyn StyleBuilder + Send>>` (the default) to mix
/// builder types, or a concrete `B` when every style uses the same one.
#[derive(Debug)]
pub struct BuilderRegistry<B = Box<dyn StyleBuilder + Send>> {
    builders: HashMap<String, B>,
}

impl<B> Default for BuilderRegistry<B> {
    fn default() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }
}

impl<B> BuilderRegistry<B> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `builder` under `name`, returning the builder it replaces.
    pub fn insert(&mut self, name: impl Into<String>, builder: B) -> Option<B> {
        self.builders.insert(name.into(), builder)
    }

    /// Removes and returns the builder registered under `name`.
    pub fn remove(&mut self, name: &str) -> Option<B> {
        self.builders.remove(name)
    }

    /// Returns the builder registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&B> {
        self.builders.get(name)
    }

    /// Returns the builder registered under `name`, mutably.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut B> {
        self.builders.get_mut(name)
    }

    /// Returns the number of registered builders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Returns whether no builder is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }

    /// Iterates `(name, builder)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &B)> {
        self.builders.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<B: StyleBuilder> StyleBuilders for BuilderRegistry<B> {
    fn style_builder(&mut self, name: &str) -> Option<&mut dyn StyleBuilder> {
        self.builders
            .get_mut(name)
            .map(|b| b as &mut dyn StyleBuilder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter(usize);

    impl StyleBuilder for Counter {
        fn add_feature(&mut self, _: &Feature, _: &ResolvedRule<'_>, _: BuildMode) {
            self.0 += 1;
        }
    }

    #[test]
    fn registry_lookup() {
        let mut registry = BuilderRegistry::new();
        assert!(registry.insert("lines", Counter::default()).is_none());
        assert!(registry.insert("points", Counter::default()).is_none());
        assert!(registry.insert("lines", Counter(5)).is_some());
        assert_eq!(registry.len(), 2);
        assert!(registry.style_builder("lines").is_some());
        assert!(registry.style_builder("polygons").is_none());
        assert_eq!(registry.get("lines").map(|c| c.0), Some(5));
        assert!(registry.remove("points").is_some());
        assert_eq!(registry.iter().count(), 1);
    }

    #[test]
    fn boxed_registry_accepts_mixed_builders() {
        let mut registry: BuilderRegistry = BuilderRegistry::new();
        registry.insert("lines", Box::new(Counter::default()));
        assert!(registry.style_builder("lines").is_some());
        assert!(!registry.is_empty());
    }

    #[test]
    fn mode_names() {
        assert_eq!(BuildMode::default(), BuildMode::Full);
        assert_eq!(BuildMode::OutlineOnly.as_str(), "outline");
    }
}
