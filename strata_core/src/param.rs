// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Style parameter keys and values.
//!
//! A [`StyleParam`] is one `key: value` declaration inside a rule. Keys come
//! from the closed [`StyleParamKey`] enumeration so that a resolved rule can
//! keep one fixed slot per key. Values are a closed sum, [`ParamValue`]:
//!
//! - [`ParamValue::Plain`]: an already concrete [`Value`].
//! - [`ParamValue::Function`]: a handle to a scripted function, resolved per
//!   feature by the [`StyleContext`](crate::context::StyleContext).
//! - [`ParamValue::Stops`]: a zoom breakpoint table, interpolated per tile.

use core::fmt;
use core::str::FromStr;

use alloc::string::{String, ToString};

use kurbo::Vec2;

use crate::color::Color;
use crate::error::StyleError;
use crate::stops::Stops;

/// Number of [`StyleParamKey`] members.
pub const STYLE_PARAM_KEY_COUNT: usize = 39;

/// The closed set of style parameter keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StyleParamKey {
    /// Text alignment.
    Align,
    /// Label anchor.
    Anchor,
    /// Point rotation.
    Angle,
    /// Label collision buffer.
    Buffer,
    /// Line cap.
    Cap,
    /// Whether labels take part in collision.
    Collide,
    /// Fill or stroke color.
    Color,
    /// Polygon extrusion height.
    Extrude,
    /// Disable lighting.
    Flat,
    /// Whether the feature can be picked.
    Interactive,
    /// Line join.
    Join,
    /// Miter limit for line joins.
    MiterLimit,
    /// Screen-space offset.
    Offset,
    /// Draw order.
    Order,
    /// Outline cap.
    OutlineCap,
    /// Outline color.
    OutlineColor,
    /// Outline join.
    OutlineJoin,
    /// Outline miter limit.
    OutlineMiterLimit,
    /// Outline draw order.
    OutlineOrder,
    /// Style used for the outline pass.
    OutlineStyle,
    /// Outline visibility.
    OutlineVisible,
    /// Outline width.
    OutlineWidth,
    /// Point placement mode.
    Placement,
    /// Spacing between placed points.
    PlacementSpacing,
    /// Label priority.
    Priority,
    /// Minimum distance between repeated labels.
    RepeatDistance,
    /// Label repeat group.
    RepeatGroup,
    /// Point size.
    Size,
    /// Sprite name.
    Sprite,
    /// Fallback sprite name.
    SpriteDefault,
    /// Style (geometry builder) name.
    Style,
    /// Text fill color.
    TextFontFill,
    /// Text stroke color.
    TextFontStrokeColor,
    /// Text stroke width.
    TextFontStrokeWidth,
    /// Text offset.
    TextOffset,
    /// Property the label text is read from.
    TextSource,
    /// Text wrap width.
    TextWrap,
    /// Rule visibility.
    Visible,
    /// Line width.
    Width,
}

impl StyleParamKey {
    /// Every key, in declaration order (which is also slot order).
    pub const ALL: [Self; STYLE_PARAM_KEY_COUNT] = [
        Self::Align,
        Self::Anchor,
        Self::Angle,
        Self::Buffer,
        Self::Cap,
        Self::Collide,
        Self::Color,
        Self::Extrude,
        Self::Flat,
        Self::Interactive,
        Self::Join,
        Self::MiterLimit,
        Self::Offset,
        Self::Order,
        Self::OutlineCap,
        Self::OutlineColor,
        Self::OutlineJoin,
        Self::OutlineMiterLimit,
        Self::OutlineOrder,
        Self::OutlineStyle,
        Self::OutlineVisible,
        Self::OutlineWidth,
        Self::Placement,
        Self::PlacementSpacing,
        Self::Priority,
        Self::RepeatDistance,
        Self::RepeatGroup,
        Self::Size,
        Self::Sprite,
        Self::SpriteDefault,
        Self::Style,
        Self::TextFontFill,
        Self::TextFontStrokeColor,
        Self::TextFontStrokeWidth,
        Self::TextOffset,
        Self::TextSource,
        Self::TextWrap,
        Self::Visible,
        Self::Width,
    ];

    /// Returns the slot index of this key.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the key stored at slot `idx`.
    #[must_use]
    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Returns the key's name as written in style sheets.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Align => "align",
            Self::Anchor => "anchor",
            Self::Angle => "angle",
            Self::Buffer => "buffer",
            Self::Cap => "cap",
            Self::Collide => "collide",
            Self::Color => "color",
            Self::Extrude => "extrude",
            Self::Flat => "flat",
            Self::Interactive => "interactive",
            Self::Join => "join",
            Self::MiterLimit => "miter_limit",
            Self::Offset => "offset",
            Self::Order => "order",
            Self::OutlineCap => "outline_cap",
            Self::OutlineColor => "outline_color",
            Self::OutlineJoin => "outline_join",
            Self::OutlineMiterLimit => "outline_miter_limit",
            Self::OutlineOrder => "outline_order",
            Self::OutlineStyle => "outline_style",
            Self::OutlineVisible => "outline_visible",
            Self::OutlineWidth => "outline_width",
            Self::Placement => "placement",
            Self::PlacementSpacing => "placement_spacing",
            Self::Priority => "priority",
            Self::RepeatDistance => "repeat_distance",
            Self::RepeatGroup => "repeat_group",
            Self::Size => "size",
            Self::Sprite => "sprite",
            Self::SpriteDefault => "sprite_default",
            Self::Style => "style",
            Self::TextFontFill => "text_font_fill",
            Self::TextFontStrokeColor => "text_font_stroke_color",
            Self::TextFontStrokeWidth => "text_font_stroke_width",
            Self::TextOffset => "text_offset",
            Self::TextSource => "text_source",
            Self::TextWrap => "text_wrap",
            Self::Visible => "visible",
            Self::Width => "width",
        }
    }

    /// Keys that must resolve for a rule to be drawn at all.
    #[must_use]
    pub const fn is_required(self) -> bool {
        matches!(self, Self::Color | Self::Order | Self::Width)
    }

    /// Keys whose stops interpolate to a [`Color`].
    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(
            self,
            Self::Color | Self::OutlineColor | Self::TextFontFill | Self::TextFontStrokeColor
        )
    }

    /// Keys whose stops interpolate to a [`Width`] pair.
    #[must_use]
    pub const fn is_width(self) -> bool {
        matches!(
            self,
            Self::Width | Self::OutlineWidth | Self::TextFontStrokeWidth
        )
    }

    /// Keys whose stops interpolate to a 2D offset.
    #[must_use]
    pub const fn is_offsets(self) -> bool {
        matches!(self, Self::Offset | Self::TextOffset)
    }
}

impl fmt::Display for StyleParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleParamKey {
    type Err = StyleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| StyleError::UnknownKey(s.to_string()))
    }
}

/// A set of [`StyleParamKey`]s packed into one word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct KeySet(u64);

impl KeySet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Returns whether `key` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, key: StyleParamKey) -> bool {
        self.0 & (1 << key.index()) != 0
    }

    /// Adds `key` to the set.
    #[inline]
    pub fn insert(&mut self, key: StyleParamKey) {
        self.0 |= 1 << key.index();
    }

    /// Removes `key` from the set.
    #[inline]
    pub fn remove(&mut self, key: StyleParamKey) {
        self.0 &= !(1 << key.index());
    }

    /// Returns the number of keys in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates the keys in slot order.
    pub fn iter(self) -> impl Iterator<Item = StyleParamKey> {
        StyleParamKey::ALL
            .into_iter()
            .filter(move |key| self.contains(*key))
    }
}

/// A pair of widths: at the current zoom and at the next integer zoom.
///
/// Builders use the pair to scale geometry continuously between zoom levels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Width {
    /// Width at the evaluated zoom.
    pub value: f32,
    /// Width at the evaluated zoom plus one.
    pub next: f32,
}

impl Width {
    /// A width that does not change with zoom.
    #[must_use]
    pub const fn constant(value: f32) -> Self {
        Self { value, next: value }
    }

    /// Change in width per zoom level.
    #[must_use]
    pub fn slope(self) -> f32 {
        self.next - self.value
    }
}

/// Handle to a scripted function owned by a
/// [`StyleContext`](crate::context::StyleContext).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FunctionId(pub u32);

/// The kind of a [`Value`], used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Bool`].
    Bool,
    /// [`Value::Float`].
    Float,
    /// [`Value::Uint`].
    Uint,
    /// [`Value::String`].
    String,
    /// [`Value::Color`].
    Color,
    /// [`Value::Width`].
    Width,
    /// [`Value::Vec2`].
    Vec2,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "bool",
            Self::Float => "float",
            Self::Uint => "uint",
            Self::String => "string",
            Self::Color => "color",
            Self::Width => "width",
            Self::Vec2 => "vec2",
        })
    }
}

/// A concrete style value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Boolean flag.
    Bool(bool),
    /// Scalar.
    Float(f32),
    /// Unsigned integer (orders, priorities, packed colors).
    Uint(u32),
    /// String (style names, joins, caps, text sources).
    String(String),
    /// Color.
    Color(Color),
    /// Width pair.
    Width(Width),
    /// 2D offset.
    Vec2(Vec2),
}

impl Value {
    /// Returns the kind of this value.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Bool(_) => ValueKind::Bool,
            Self::Float(_) => ValueKind::Float,
            Self::Uint(_) => ValueKind::Uint,
            Self::String(_) => ValueKind::String,
            Self::Color(_) => ValueKind::Color,
            Self::Width(_) => ValueKind::Width,
            Self::Vec2(_) => ValueKind::Vec2,
        }
    }

    /// Returns the string payload, if this is a [`Value::String`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Uint(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Color(c) => write!(f, "{c}"),
            Self::Width(w) => write!(f, "{}..{}", w.value, w.next),
            Self::Vec2(v) => write!(f, "({}, {})", v.x, v.y),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Uint(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Color> for Value {
    fn from(v: Color) -> Self {
        Self::Color(v)
    }
}

impl From<Width> for Value {
    fn from(v: Width) -> Self {
        Self::Width(v)
    }
}

impl From<Vec2> for Value {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

/// Types that can be read out of a [`Value`] by typed parameter access.
pub trait FromValue<'a>: Sized {
    /// The value kind this type reads.
    const KIND: ValueKind;

    /// Borrows or copies the payload if `value` is of kind [`Self::KIND`].
    fn from_value(value: &'a Value) -> Option<Self>;
}

macro_rules! impl_from_value {
    ($ty:ty, $kind:ident) => {
        impl<'a> FromValue<'a> for $ty {
            const KIND: ValueKind = ValueKind::$kind;

            fn from_value(value: &'a Value) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(f32, Float);
impl_from_value!(u32, Uint);
impl_from_value!(Color, Color);
impl_from_value!(Width, Width);
impl_from_value!(Vec2, Vec2);

impl<'a> FromValue<'a> for &'a str {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: &'a Value) -> Option<Self> {
        value.as_str()
    }
}

/// Normalizes a scripted function's result to the semantic type of `key`.
///
/// Color keys accept a [`Color`], a parseable color string, or a packed
/// `0xAABBGGRR` integer. Width keys accept a [`Width`] or a scalar, which
/// becomes a constant width. Offset keys accept only a [`Vec2`]. Other keys
/// take the value as is. Returns `None` when the value cannot be used.
#[must_use]
pub fn coerce(key: StyleParamKey, value: Value) -> Option<Value> {
    if key.is_color() {
        return match value {
            Value::Color(_) => Some(value),
            Value::String(s) => Color::parse(&s).map(Value::Color),
            Value::Uint(abgr) => Some(Value::Color(Color::from_abgr(abgr))),
            _ => None,
        };
    }
    if key.is_width() {
        return match value {
            Value::Width(_) => Some(value),
            Value::Float(v) => Some(Value::Width(Width::constant(v))),
            _ => None,
        };
    }
    if key.is_offsets() {
        return matches!(value, Value::Vec2(_)).then_some(value);
    }
    Some(value)
}

/// The declared value of a style parameter.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// A concrete value.
    Plain(Value),
    /// A scripted function evaluated per feature.
    Function(FunctionId),
    /// A zoom breakpoint table evaluated per tile.
    Stops(Stops),
}

impl ParamValue {
    /// Returns whether this value must be evaluated before use.
    #[must_use]
    pub const fn is_dynamic(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    /// Returns the concrete value, if any.
    #[must_use]
    pub const fn as_plain(&self) -> Option<&Value> {
        match self {
            Self::Plain(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(v) => write!(f, "{v}"),
            Self::Function(id) => write!(f, "function#{}", id.0),
            Self::Stops(stops) => write!(f, "stops[{}]", stops.len()),
        }
    }
}

/// One `key: value` declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleParam {
    /// The declared key.
    pub key: StyleParamKey,
    /// The declared value.
    pub value: ParamValue,
}

impl StyleParam {
    /// Declares a concrete value.
    #[must_use]
    pub fn plain(key: StyleParamKey, value: impl Into<Value>) -> Self {
        Self {
            key,
            value: ParamValue::Plain(value.into()),
        }
    }

    /// Declares a scripted value.
    #[must_use]
    pub const fn function(key: StyleParamKey, function: FunctionId) -> Self {
        Self {
            key,
            value: ParamValue::Function(function),
        }
    }

    /// Declares a zoom-interpolated value.
    #[must_use]
    pub const fn stops(key: StyleParamKey, stops: Stops) -> Self {
        Self {
            key,
            value: ParamValue::Stops(stops),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use super::*;

    #[test]
    fn key_table_is_consistent() {
        for (idx, key) in StyleParamKey::ALL.iter().enumerate() {
            assert_eq!(key.index(), idx, "ALL must follow declaration order");
            assert_eq!(key.as_str().parse::<StyleParamKey>(), Ok(*key));
        }
        assert!(STYLE_PARAM_KEY_COUNT <= 64, "KeySet packs keys into a u64");
    }

    #[test]
    fn unknown_key_name() {
        assert_eq!(
            "colour".parse::<StyleParamKey>(),
            Err(StyleError::UnknownKey("colour".into()))
        );
    }

    #[test]
    fn key_categories() {
        assert!(StyleParamKey::Color.is_required());
        assert!(!StyleParamKey::Visible.is_required());
        assert!(StyleParamKey::OutlineColor.is_color());
        assert!(StyleParamKey::OutlineWidth.is_width());
        assert!(StyleParamKey::TextOffset.is_offsets());
        assert!(!StyleParamKey::Order.is_width());
    }

    #[test]
    fn key_set_operations() {
        let mut set = KeySet::EMPTY;
        set.insert(StyleParamKey::Width);
        set.insert(StyleParamKey::Align);
        set.insert(StyleParamKey::Width);
        assert_eq!(set.len(), 2);
        set.remove(StyleParamKey::Align);
        assert!(!set.contains(StyleParamKey::Align));
        let keys: Vec<_> = set.iter().collect();
        assert_eq!(keys, [StyleParamKey::Width]);
    }

    #[test]
    fn coerce_color_sources() {
        assert_eq!(
            coerce(StyleParamKey::Color, Value::from("#00f")),
            Some(Value::Color(Color::rgb(0, 0, 255)))
        );
        assert_eq!(
            coerce(StyleParamKey::Color, Value::Uint(0xff00_00ff)),
            Some(Value::Color(Color::rgb(255, 0, 0)))
        );
        assert_eq!(coerce(StyleParamKey::Color, Value::from("nope")), None);
        assert_eq!(coerce(StyleParamKey::Color, Value::Bool(true)), None);
    }

    #[test]
    fn coerce_width_and_passthrough() {
        assert_eq!(
            coerce(StyleParamKey::Width, Value::Float(3.0)),
            Some(Value::Width(Width::constant(3.0)))
        );
        assert_eq!(coerce(StyleParamKey::Offset, Value::Float(1.0)), None);
        assert_eq!(
            coerce(StyleParamKey::Cap, Value::from("round")),
            Some(Value::from("round"))
        );
    }

    #[test]
    fn typed_reads() {
        let v = Value::from("lines");
        assert_eq!(<&str>::from_value(&v), Some("lines"));
        assert_eq!(f32::from_value(&v), None);
        assert_eq!(bool::from_value(&Value::Bool(true)), Some(true));
    }
}
