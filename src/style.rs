//! Immutable cell style descriptor.
//!
//! Many slots typically share one style, so [`Attribute`] is a plain `Copy`
//! value that is never mutated after construction: builders return new
//! values. Color values are normalized on construction — a channel whose
//! mode is [`ColorMode::Default`] or [`ColorMode::Invalid`] always carries
//! the value 0, so derived equality is exact equality of visible style.

use crate::color::ColorMode;

const COLOR_MASK: u32 = 0x00FF_FFFF;

/// Immutable color/style descriptor for one cell.
///
/// Two attributes are equal iff all four fields match; normalization at
/// construction makes that safe to rely on.
///
/// # Examples
///
/// ```
/// use cellgrid::{Attribute, Color, ColorMode};
///
/// let attr = Attribute::DEFAULT
///     .with_foreground(ColorMode::Palette, Color::Black.index())
///     .with_background(ColorMode::Real, 0x00_30_60);
/// assert!(attr.is_valid());
/// assert!(attr.has_background());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Attribute {
    fg_mode: ColorMode,
    fg: u32,
    bg_mode: ColorMode,
    bg: u32,
}

impl Attribute {
    /// Terminal-native style: both channels `Default`.
    pub const DEFAULT: Self = Self {
        fg_mode: ColorMode::Default,
        fg: 0,
        bg_mode: ColorMode::Default,
        bg: 0,
    };

    /// Diff-seed sentinel: both channels `Invalid`. Compares unequal to
    /// every drawable style, so the first diffed cell always emits an
    /// explicit style switch.
    pub const INVALID: Self = Self {
        fg_mode: ColorMode::Invalid,
        fg: 0,
        bg_mode: ColorMode::Invalid,
        bg: 0,
    };

    /// Build an attribute from both channels.
    #[must_use]
    pub const fn new(fg_mode: ColorMode, fg: u32, bg_mode: ColorMode, bg: u32) -> Self {
        Self {
            fg_mode,
            fg: Self::normalize(fg_mode, fg),
            bg_mode,
            bg: Self::normalize(bg_mode, bg),
        }
    }

    const fn normalize(mode: ColorMode, color: u32) -> u32 {
        match mode {
            ColorMode::Default | ColorMode::Invalid => 0,
            ColorMode::Palette | ColorMode::Real => color & COLOR_MASK,
        }
    }

    /// Return a copy with the foreground channel replaced.
    #[must_use]
    pub const fn with_foreground(self, mode: ColorMode, color: u32) -> Self {
        Self {
            fg_mode: mode,
            fg: Self::normalize(mode, color),
            ..self
        }
    }

    /// Return a copy with the background channel replaced.
    #[must_use]
    pub const fn with_background(self, mode: ColorMode, color: u32) -> Self {
        Self {
            bg_mode: mode,
            bg: Self::normalize(mode, color),
            ..self
        }
    }

    /// Foreground channel mode.
    #[must_use]
    pub const fn fg_mode(&self) -> ColorMode {
        self.fg_mode
    }

    /// Foreground color value (24-bit).
    #[must_use]
    pub const fn fg(&self) -> u32 {
        self.fg
    }

    /// Background channel mode.
    #[must_use]
    pub const fn bg_mode(&self) -> ColorMode {
        self.bg_mode
    }

    /// Background color value (24-bit).
    #[must_use]
    pub const fn bg(&self) -> u32 {
        self.bg
    }

    /// Non-destructive composite: each channel of `other` overrides the
    /// corresponding channel of `self` only when `other`'s mode for that
    /// channel is not `Default`.
    #[must_use]
    pub const fn mix_with(self, other: Self) -> Self {
        let (fg_mode, fg) = match other.fg_mode {
            ColorMode::Default => (self.fg_mode, self.fg),
            _ => (other.fg_mode, other.fg),
        };
        let (bg_mode, bg) = match other.bg_mode {
            ColorMode::Default => (self.bg_mode, self.bg),
            _ => (other.bg_mode, other.bg),
        };
        Self {
            fg_mode,
            fg,
            bg_mode,
            bg,
        }
    }

    /// Keep this attribute's foreground but take `other`'s background.
    ///
    /// The serializer and diff track a running cursor style; drawing a
    /// null cell only switches the background channel, so the tracked
    /// style keeps its foreground.
    #[must_use]
    pub const fn apply_background(self, other: Self) -> Self {
        Self {
            bg_mode: other.bg_mode,
            bg: other.bg,
            ..self
        }
    }

    /// False iff either channel mode is `Invalid`.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.fg_mode.is_drawable() && self.bg_mode.is_drawable()
    }

    /// Whether the background channel selects a non-default color.
    ///
    /// Erase opcodes paint with the current background, so erasing is
    /// only worthwhile when this returns true.
    #[must_use]
    pub const fn has_background(&self) -> bool {
        !matches!(self.bg_mode, ColorMode::Default)
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Self::DEFAULT
    }
}
