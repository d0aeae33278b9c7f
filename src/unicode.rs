//! Display width lookup for terminal rendering.
//!
//! The engine treats Unicode width as an external pure function: a grapheme
//! occupies 0, 1 or 2 terminal columns. Widths come from the
//! `unicode-width` tables; segmentation from `unicode-segmentation`.

use std::sync::atomic::{AtomicU8, Ordering};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Width calculation method for ambiguous-width characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WidthMethod {
    /// POSIX-like wcwidth: ambiguous width = 1.
    #[default]
    WcWidth,
    /// Unicode East Asian Width: ambiguous width = 2.
    Unicode,
}

const WIDTH_METHOD_WCWIDTH: u8 = 0;
const WIDTH_METHOD_UNICODE: u8 = 1;

static WIDTH_METHOD: AtomicU8 = AtomicU8::new(WIDTH_METHOD_WCWIDTH);

/// Set the global width method used by the width helpers.
pub fn set_width_method(method: WidthMethod) {
    let value = match method {
        WidthMethod::WcWidth => WIDTH_METHOD_WCWIDTH,
        WidthMethod::Unicode => WIDTH_METHOD_UNICODE,
    };
    WIDTH_METHOD.store(value, Ordering::Relaxed);
}

/// Get the global width method.
#[must_use]
pub fn width_method() -> WidthMethod {
    match WIDTH_METHOD.load(Ordering::Relaxed) {
        WIDTH_METHOD_UNICODE => WidthMethod::Unicode,
        _ => WidthMethod::WcWidth,
    }
}

/// Display width in columns of a single extended grapheme, clamped to 0-2.
///
/// A terminal cell grid has no notion of wider glyphs; anything the tables
/// report as wider than 2 (unusual cluster combinations) renders in 2
/// columns on real terminals.
#[must_use]
pub fn grapheme_width(g: &str) -> usize {
    let w = match width_method() {
        WidthMethod::WcWidth => UnicodeWidthStr::width(g),
        WidthMethod::Unicode => UnicodeWidthStr::width_cjk(g),
    };
    w.min(2)
}

/// Total display width of a string in terminal columns.
#[must_use]
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_width).sum()
}

/// Iterate the extended graphemes of `s` paired with their display widths.
pub fn grapheme_widths(s: &str) -> impl Iterator<Item = (&str, usize)> {
    s.graphemes(true).map(|g| (g, grapheme_width(g)))
}
