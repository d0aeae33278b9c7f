//! Grid cell type.
//!
//! A display surface is a grid of slots, one per terminal column. A glyph
//! of display width 2 occupies two slots: the first carries the text with
//! `width == 2`, the second is a *placeholder* with `width == 0` and no
//! text. A slot with empty text and `width == 1` is a *null* cell: no
//! glyph, background only.

use crate::style::Attribute;

/// One grid cell: display width, glyph text, and style.
///
/// Invariants maintained by [`TerminalBuffer`](crate::TerminalBuffer):
///
/// - `width == 0` only for placeholder cells (second column of a wide
///   glyph); placeholders never hold text.
/// - `width == 2` only for wide glyph heads; the next slot in the row is
///   always a placeholder.
/// - a non-empty `text` decodes to display width exactly `width`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    /// Columns this slot occupies on screen: 0, 1 or 2.
    pub width: u8,
    /// The glyph (one extended grapheme), or empty for null/placeholder.
    pub text: String,
    /// Cell style.
    pub attributes: Attribute,
}

impl Slot {
    /// A null cell carrying the given fill text and style.
    #[must_use]
    pub fn null(fill: &str, attributes: Attribute) -> Self {
        Self {
            width: 1,
            text: fill.to_owned(),
            attributes,
        }
    }

    /// The second column of a wide glyph.
    #[must_use]
    pub const fn placeholder(attributes: Attribute) -> Self {
        Self {
            width: 0,
            text: String::new(),
            attributes,
        }
    }

    /// Whether this slot is the content-less second column of a wide glyph.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        self.width == 0
    }

    /// Whether this slot has no visible glyph (background only).
    #[must_use]
    pub const fn is_null(&self) -> bool {
        self.width != 0 && self.text.is_empty()
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            width: 1,
            text: String::new(),
            attributes: Attribute::DEFAULT,
        }
    }
}
