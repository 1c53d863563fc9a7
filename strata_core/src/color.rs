// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! RGBA8 color values.

use core::fmt;
use core::str::FromStr;

use alloc::string::ToString;
use alloc::vec::Vec;

use crate::error::StyleError;

/// An 8-bit-per-channel, non-premultiplied RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgba(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Self = Self::rgba(255, 255, 255, 255);

    /// Creates a color from its four channels.
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Unpacks a `0xAABBGGRR` word, the layout vertex buffers use.
    #[must_use]
    pub const fn from_abgr(abgr: u32) -> Self {
        let [r, g, b, a] = abgr.to_le_bytes();
        Self { r, g, b, a }
    }

    /// Packs into a `0xAABBGGRR` word.
    #[must_use]
    pub const fn to_abgr(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    /// Linearly interpolates each channel; `t` is clamped to `0..=1`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| {
            let v = f32::from(a) + (f32::from(b) - f32::from(a)) * t;
            #[expect(clippy::cast_possible_truncation, reason = "value is in 0..=255")]
            let v = (v + 0.5) as u8;
            v
        };
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Parses a CSS-style color string.
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)`,
    /// `rgba(r, g, b, a)` with `a` in `0..=1`, and a small set of names.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if s.starts_with("rgb") {
            return parse_rgb(s);
        }
        let named = match s.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "blue" => Self::rgb(0, 0, 255),
            "yellow" => Self::rgb(255, 255, 0),
            "cyan" => Self::rgb(0, 255, 255),
            "magenta" => Self::rgb(255, 0, 255),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "orange" => Self::rgb(255, 165, 0),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(named)
    }
}

impl FromStr for Color {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| StyleError::InvalidColor(s.to_string()))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => Some(Color::rgb(nibble(0)?, nibble(1)?, nibble(2)?)),
        4 => Some(Color::rgba(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
        6 => Some(Color::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Color::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

fn parse_rgb(s: &str) -> Option<Color> {
    let inner = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))?
        .strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return None;
    }
    let channel = |p: &str| p.parse::<u8>().ok();
    let alpha = match parts.get(3) {
        Some(p) => {
            let a = p.parse::<f32>().ok()?.clamp(0.0, 1.0);
            #[expect(clippy::cast_possible_truncation, reason = "value is in 0..=255")]
            let a = (a * 255.0 + 0.5) as u8;
            a
        }
        None => 255,
    };
    Some(Color::rgba(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        alpha,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_hex_forms() {
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#ff0000"), Some(Color::rgb(255, 0, 0)));
        assert_eq!(Color::parse("#00ff0080"), Some(Color::rgba(0, 255, 0, 128)));
        assert_eq!(Color::parse("#f008"), Some(Color::rgba(255, 0, 0, 136)));
        assert_eq!(Color::parse("#ff00"), Some(Color::rgba(255, 255, 0, 0)));
        assert_eq!(Color::parse("#12345"), None);
    }

    #[test]
    fn parse_rgb_forms() {
        assert_eq!(Color::parse("rgb(10, 20, 30)"), Some(Color::rgb(10, 20, 30)));
        assert_eq!(
            Color::parse("rgba(0, 0, 255, 0.5)"),
            Some(Color::rgba(0, 0, 255, 128))
        );
        assert_eq!(Color::parse("rgb(300, 0, 0)"), None);
    }

    #[test]
    fn parse_names_and_errors() {
        assert_eq!(Color::parse(" Red "), Some(Color::rgb(255, 0, 0)));
        assert_eq!("transparent".parse::<Color>(), Ok(Color::TRANSPARENT));
        assert_eq!(
            "chartreuse".parse::<Color>(),
            Err(StyleError::InvalidColor("chartreuse".into()))
        );
    }

    #[test]
    fn abgr_round_trip_layout() {
        let c = Color::rgba(1, 2, 3, 4);
        assert_eq!(c.to_abgr(), 0x0403_0201);
        assert_eq!(Color::from_abgr(0x0403_0201), c);
    }

    #[test]
    fn lerp_midpoint_rounds() {
        let mid = Color::BLACK.lerp(Color::WHITE, 0.5);
        assert_eq!(mid, Color::rgba(128, 128, 128, 255));
        assert_eq!(Color::BLACK.lerp(Color::WHITE, 2.0), Color::WHITE);
    }
}
