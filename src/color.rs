//! Color model: channel interpretation modes and the classic 16-color palette.

/// How a color channel value is interpreted.
///
/// `Default` means the terminal's native color for that channel; no escape
/// code is needed to select it. `Palette` is a 0-255 indexed color and
/// `Real` is 24-bit RGB packed into the low bits of the value.
///
/// `Invalid` is a sentinel, never a legal cell color: it exists only so a
/// freshly seeded diff baseline compares unequal to every real style and
/// forces an explicit style switch on the first drawn cell. Passing an
/// `Invalid` channel to a drawing operation is a programming error and
/// fails fast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Terminal-native color; no escape emitted.
    #[default]
    Default,
    /// Indexed palette color (0-255).
    Palette,
    /// 24-bit RGB packed as `0xRRGGBB`.
    Real,
    /// Diff-seed sentinel; never drawable.
    Invalid,
}

impl ColorMode {
    /// Whether this mode may appear on a drawable cell.
    #[must_use]
    pub const fn is_drawable(self) -> bool {
        !matches!(self, Self::Invalid)
    }
}

/// Named palette entries for the classic 16 colors.
///
/// Indices 0-7 are the normal intensities, 8-15 the bright ones. The
/// numeric value is the palette index used with [`ColorMode::Palette`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Color {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
    BlackBright = 8,
    RedBright = 9,
    GreenBright = 10,
    YellowBright = 11,
    BlueBright = 12,
    MagentaBright = 13,
    CyanBright = 14,
    WhiteBright = 15,
}

impl Color {
    /// Alias for [`Color::BlackBright`].
    pub const GRAY: Self = Self::BlackBright;

    /// Palette index of this color.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }
}

impl From<Color> for u32 {
    fn from(color: Color) -> Self {
        color.index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_indices() {
        assert_eq!(Color::Black.index(), 0);
        assert_eq!(Color::White.index(), 7);
        assert_eq!(Color::BlackBright.index(), 8);
        assert_eq!(Color::WhiteBright.index(), 15);
        assert_eq!(Color::GRAY, Color::BlackBright);
    }

    #[test]
    fn test_drawable_modes() {
        assert!(ColorMode::Default.is_drawable());
        assert!(ColorMode::Palette.is_drawable());
        assert!(ColorMode::Real.is_drawable());
        assert!(!ColorMode::Invalid.is_drawable());
    }
}
