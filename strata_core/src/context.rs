// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Evaluation context for filters and scripted values.
//!
//! The engine never runs scripts itself. It hands [`FunctionId`]s to a
//! [`StyleContext`], which owns whatever runtime backs them, and gets
//! concrete [`Value`]s back. [`NativeContext`] is a context whose functions
//! are plain Rust closures.

use core::fmt;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::feature::Feature;
use crate::param::{FunctionId, StyleParamKey, Value};
use crate::sheet::Filter;

/// Supplies zoom, filter results, and scripted values during matching and
/// evaluation.
///
/// One context is used by one tile worker at a time.
pub trait StyleContext {
    /// Makes `feature` the current feature. Called once per feature before
    /// any filter or function is evaluated for it.
    fn set_feature(&mut self, feature: &Feature);

    /// Sets the zoom of the tile being built.
    fn set_zoom(&mut self, zoom: f32);

    /// Returns the zoom of the tile being built.
    fn zoom(&self) -> f32;

    /// Runs a scripted function for `key`. Returns `None` when the function
    /// fails or produces nothing.
    ///
    /// The result is passed through [`coerce`](crate::param::coerce) by the
    /// caller, so implementations may return any [`Value`] that converts.
    fn eval_function(
        &mut self,
        function: FunctionId,
        key: StyleParamKey,
        feature: &Feature,
    ) -> Option<Value>;

    /// Runs a scripted filter predicate.
    ///
    /// Defaults to [`eval_function`](Self::eval_function) under the
    /// `visible` key, accepting only `Bool(true)`.
    fn eval_predicate(&mut self, function: FunctionId, feature: &Feature) -> bool {
        matches!(
            self.eval_function(function, StyleParamKey::Visible, feature),
            Some(Value::Bool(true))
        )
    }

    /// Evaluates a layer filter against `feature`.
    ///
    /// Defaults to [`Filter::eval`] at the current zoom.
    fn eval_filter(&mut self, filter: &Filter, feature: &Feature) -> bool {
        let zoom = self.zoom();
        filter.eval(feature, zoom, &mut |id| self.eval_predicate(id, feature))
    }
}

/// Signature of a [`NativeContext`] function: feature and zoom in, value out.
pub type NativeFn = dyn Fn(&Feature, f32) -> Option<Value> + Send + Sync;

/// A [`StyleContext`] backed by Rust closures.
#[derive(Default)]
pub struct NativeContext {
    zoom: f32,
    functions: Vec<Box<NativeFn>>,
}

impl fmt::Debug for NativeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeContext")
            .field("zoom", &self.zoom)
            .field("functions", &self.functions.len())
            .finish()
    }
}

impl NativeContext {
    /// Creates a context with no functions at zoom 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a function and returns the id style parameters refer to it by.
    pub fn register(
        &mut self,
        function: impl Fn(&Feature, f32) -> Option<Value> + Send + Sync + 'static,
    ) -> FunctionId {
        #[expect(clippy::cast_possible_truncation, reason = "function count fits u32")]
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(Box::new(function));
        id
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

impl StyleContext for NativeContext {
    // Closures receive the feature directly.
    fn set_feature(&mut self, _feature: &Feature) {}

    fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    fn zoom(&self) -> f32 {
        self.zoom
    }

    fn eval_function(
        &mut self,
        function: FunctionId,
        key: StyleParamKey,
        feature: &Feature,
    ) -> Option<Value> {
        let Some(f) = self.functions.get(function.0 as usize) else {
            log::debug!("no native function {} for `{key}`", function.0);
            return None;
        };
        f(feature, self.zoom)
    }
}
