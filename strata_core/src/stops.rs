// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zoom breakpoint tables.
//!
//! [`Stops`] maps zoom levels to values. Evaluation clamps to the first
//! frame below the table and to the last frame above it; between two frames
//! the value is interpolated according to the table's [`Interpolation`].
//! All evaluation methods are pure functions of the table and the zoom.

use alloc::vec::Vec;

use kurbo::Vec2;

use crate::color::Color;
use crate::error::StyleError;
use crate::param::{Value, ValueKind};

/// How values between two frames are blended.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Interpolation {
    /// Straight-line blend.
    #[default]
    Linear,
    /// Exponential blend with the given base; a base of 1 is linear.
    Exponential(f32),
}

/// One breakpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Zoom level of the breakpoint.
    pub zoom: f32,
    /// Value at that zoom.
    pub value: Value,
}

impl Frame {
    /// Creates a frame.
    #[must_use]
    pub fn new(zoom: f32, value: impl Into<Value>) -> Self {
        Self {
            zoom,
            value: value.into(),
        }
    }
}

/// A zoom breakpoint table.
#[derive(Clone, Debug, PartialEq)]
pub struct Stops {
    frames: Vec<Frame>,
    interpolation: Interpolation,
}

/// Where a zoom falls relative to the frames.
enum Bracket<'a> {
    /// Clamped to a single frame.
    At(&'a Value),
    /// Between two frames, with blend factor `t` in `0..1`.
    Between(&'a Value, &'a Value, f32),
}

impl Stops {
    /// Builds a linearly interpolated table, sorting frames by zoom.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidStops`] if `frames` is empty, a zoom is not
    /// finite, frames mix value kinds, or the value kind is not one of
    /// float, color, or vec2.
    pub fn new(mut frames: Vec<Frame>) -> Result<Self, StyleError> {
        let first = frames
            .first()
            .ok_or(StyleError::InvalidStops("no frames"))?;
        let kind = first.value.kind();
        if !matches!(kind, ValueKind::Float | ValueKind::Color | ValueKind::Vec2) {
            return Err(StyleError::InvalidStops(
                "frames must hold floats, colors, or vec2 values",
            ));
        }
        if frames.iter().any(|f| f.value.kind() != kind) {
            return Err(StyleError::InvalidStops("frames mix value kinds"));
        }
        if frames.iter().any(|f| !f.zoom.is_finite()) {
            return Err(StyleError::InvalidStops("frame zoom is not finite"));
        }
        frames.sort_by(|a, b| a.zoom.total_cmp(&b.zoom));
        Ok(Self {
            frames,
            interpolation: Interpolation::Linear,
        })
    }

    /// Replaces the interpolation mode.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidStops`] if an exponential base is not
    /// finite and positive.
    pub fn with_interpolation(
        mut self,
        interpolation: Interpolation,
    ) -> Result<Self, StyleError> {
        if let Interpolation::Exponential(base) = interpolation
            && !(base.is_finite() && base > 0.0)
        {
            return Err(StyleError::InvalidStops(
                "exponential base must be finite and positive",
            ));
        }
        self.interpolation = interpolation;
        Ok(self)
    }

    /// Returns the frames in ascending zoom order.
    #[must_use]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Returns the number of frames (never zero).
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; construction rejects empty tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the interpolation mode.
    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Evaluates a scalar at `zoom`.
    #[must_use]
    pub fn eval_float(&self, zoom: f32) -> f32 {
        match self.bracket(zoom) {
            Bracket::At(v) => scalar(v),
            Bracket::Between(a, b, t) => {
                let (a, b) = (scalar(a), scalar(b));
                a + (b - a) * t
            }
        }
    }

    /// Evaluates a width at `zoom`.
    ///
    /// Widths share the scalar blend; the evaluator calls this at `zoom` and
    /// `zoom + 1` to build a [`Width`](crate::param::Width) pair.
    #[must_use]
    pub fn eval_width(&self, zoom: f32) -> f32 {
        self.eval_float(zoom)
    }

    /// Evaluates a color at `zoom`.
    #[must_use]
    pub fn eval_color(&self, zoom: f32) -> Color {
        match self.bracket(zoom) {
            Bracket::At(v) => color(v),
            Bracket::Between(a, b, t) => color(a).lerp(color(b), t),
        }
    }

    /// Evaluates a 2D offset at `zoom`.
    #[must_use]
    pub fn eval_vec2(&self, zoom: f32) -> Vec2 {
        match self.bracket(zoom) {
            Bracket::At(v) => vec2(v),
            Bracket::Between(a, b, t) => vec2(a).lerp(vec2(b), f64::from(t)),
        }
    }

    fn bracket(&self, zoom: f32) -> Bracket<'_> {
        // First frame strictly above `zoom`.
        let upper = self.frames.partition_point(|f| f.zoom <= zoom);
        if upper == 0 {
            return Bracket::At(&self.frames[0].value);
        }
        if upper == self.frames.len() {
            return Bracket::At(&self.frames[upper - 1].value);
        }
        let lo = &self.frames[upper - 1];
        let hi = &self.frames[upper];
        let range = hi.zoom - lo.zoom;
        let progress = zoom - lo.zoom;
        let t = match self.interpolation {
            Interpolation::Exponential(base) if base != 1.0 => {
                (libm::powf(base, progress) - 1.0) / (libm::powf(base, range) - 1.0)
            }
            _ => progress / range,
        };
        Bracket::Between(&lo.value, &hi.value, t)
    }
}

fn scalar(v: &Value) -> f32 {
    match v {
        Value::Float(f) => *f,
        _ => 0.0,
    }
}

fn color(v: &Value) -> Color {
    match v {
        Value::Color(c) => *c,
        _ => Color::TRANSPARENT,
    }
}

fn vec2(v: &Value) -> Vec2 {
    match v {
        Value::Vec2(v) => *v,
        _ => Vec2::ZERO,
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    fn widths() -> Stops {
        Stops::new(vec![Frame::new(15.0, 8.0_f32), Frame::new(5.0, 1.0_f32)]).unwrap()
    }

    #[test]
    fn frames_are_sorted() {
        let stops = widths();
        assert_eq!(stops.frames()[0].zoom, 5.0);
        assert_eq!(stops.frames()[1].zoom, 15.0);
    }

    #[test]
    fn clamps_outside_the_table() {
        let stops = widths();
        assert_eq!(stops.eval_float(0.0), 1.0);
        assert_eq!(stops.eval_float(5.0), 1.0);
        assert_eq!(stops.eval_float(15.0), 8.0);
        assert_eq!(stops.eval_float(22.0), 8.0);
    }

    #[test]
    fn linear_between_frames() {
        let stops = widths();
        assert!((stops.eval_float(10.0) - 4.5).abs() < 1e-5);
        assert!((stops.eval_width(12.5) - 6.25).abs() < 1e-5);
    }

    #[test]
    fn exponential_is_front_loaded_less() {
        let stops = widths()
            .with_interpolation(Interpolation::Exponential(2.0))
            .unwrap();
        let v = stops.eval_float(10.0);
        // (2^5 - 1) / (2^10 - 1) of the way from 1 to 8.
        let expected = 1.0 + 7.0 * (31.0 / 1023.0);
        assert!((v - expected).abs() < 1e-4, "got {v}");
        assert!(v < widths().eval_float(10.0));
    }

    #[test]
    fn color_and_vec2_frames() {
        let colors = Stops::new(vec![
            Frame::new(0.0, Color::BLACK),
            Frame::new(10.0, Color::WHITE),
        ])
        .unwrap();
        assert_eq!(colors.eval_color(5.0), Color::rgba(128, 128, 128, 255));

        let offsets = Stops::new(vec![
            Frame::new(0.0, Vec2::new(0.0, 0.0)),
            Frame::new(4.0, Vec2::new(4.0, -8.0)),
        ])
        .unwrap();
        assert_eq!(offsets.eval_vec2(1.0), Vec2::new(1.0, -2.0));
    }

    #[test]
    fn duplicate_zooms_step() {
        let stops = Stops::new(vec![
            Frame::new(10.0, 1.0_f32),
            Frame::new(10.0, 2.0_f32),
            Frame::new(12.0, 4.0_f32),
        ])
        .unwrap();
        assert_eq!(stops.eval_float(10.0), 2.0);
        assert_eq!(stops.eval_float(11.0), 3.0);
    }

    #[test]
    fn rejects_bad_tables() {
        assert_eq!(
            Stops::new(vec![]),
            Err(StyleError::InvalidStops("no frames"))
        );
        assert_eq!(
            Stops::new(vec![Frame::new(0.0, 1.0_f32), Frame::new(1.0, Color::BLACK)]),
            Err(StyleError::InvalidStops("frames mix value kinds"))
        );
        assert!(Stops::new(vec![Frame::new(0.0, "x")]).is_err());
        assert!(Stops::new(vec![Frame::new(f32::NAN, 1.0_f32)]).is_err());
    }

    #[test]
    fn rejects_non_positive_exponential_base() {
        for base in [-2.0, 0.0, f32::INFINITY, f32::NAN] {
            assert_eq!(
                widths().with_interpolation(Interpolation::Exponential(base)),
                Err(StyleError::InvalidStops(
                    "exponential base must be finite and positive"
                )),
                "base {base}"
            );
        }
        let stops = widths()
            .with_interpolation(Interpolation::Exponential(0.5))
            .unwrap();
        assert!(stops.eval_float(10.0).is_finite());
    }
}
