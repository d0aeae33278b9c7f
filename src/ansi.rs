//! Escape transcript opcode emission.
//!
//! Everything the engine sends to a terminal funnels through here: SGR
//! style switches, cursor-relative movement (`CSI n C`) and erase
//! (`CSI n X`). The byte layout is a wire format — receiving terminals
//! must reconstruct exactly the modeled state — so sequences are built
//! with a manual decimal writer instead of `format!` and covered by
//! byte-exact tests.

use crate::color::ColorMode;
use crate::error::{Error, Result};
use crate::style::Attribute;

/// Reset all SGR state.
pub const RESET: &str = "\x1b[0m";

/// Move the cursor to row 1, column 1.
pub const CURSOR_HOME: &str = "\x1b[1;1H";

/// Append `n` in decimal without going through the formatting machinery.
fn push_decimal(out: &mut String, n: u32) {
    if n >= 10 {
        push_decimal(out, n / 10);
    }
    out.push((b'0' + (n % 10) as u8) as char);
}

/// Append `CSI n C`: advance the cursor `n` columns.
pub fn push_cursor_forward(out: &mut String, n: u32) {
    if n == 0 {
        return;
    }
    out.push_str("\x1b[");
    push_decimal(out, n);
    out.push('C');
}

/// Append `CSI n X`: erase `n` cells at the cursor using the current
/// background, without moving the cursor.
pub fn push_erase_chars(out: &mut String, n: u32) {
    if n == 0 {
        return;
    }
    out.push_str("\x1b[");
    push_decimal(out, n);
    out.push('X');
}

/// SGR parameter codes selecting a foreground color.
fn fg_codes(mode: ColorMode, color: u32, seq: &mut Vec<u32>) -> Result<()> {
    match mode {
        ColorMode::Palette => {
            if color < 16 {
                // Classic 8/16-color opcodes; bit 3 selects the bright range.
                seq.push(if color & 8 != 0 {
                    90 + (color & 7)
                } else {
                    30 + (color & 7)
                });
            } else {
                seq.extend([38, 5, color]);
            }
        }
        ColorMode::Real => {
            seq.extend([38, 2, (color >> 16) & 0xFF, (color >> 8) & 0xFF, color & 0xFF]);
        }
        ColorMode::Default => seq.push(39),
        ColorMode::Invalid => return Err(Error::InvalidAttribute),
    }
    Ok(())
}

/// SGR parameter codes selecting a background color.
fn bg_codes(mode: ColorMode, color: u32, seq: &mut Vec<u32>) -> Result<()> {
    match mode {
        ColorMode::Palette => {
            if color < 16 {
                seq.push(if color & 8 != 0 {
                    100 + (color & 7)
                } else {
                    40 + (color & 7)
                });
            } else {
                seq.extend([48, 5, color]);
            }
        }
        ColorMode::Real => {
            seq.extend([48, 2, (color >> 16) & 0xFF, (color >> 8) & 0xFF, color & 0xFF]);
        }
        ColorMode::Default => seq.push(49),
        ColorMode::Invalid => return Err(Error::InvalidAttribute),
    }
    Ok(())
}

fn push_sgr(out: &mut String, seq: &[u32]) {
    out.push_str("\x1b[");
    for (i, code) in seq.iter().enumerate() {
        if i > 0 {
            out.push(';');
        }
        push_decimal(out, *code);
    }
    out.push('m');
}

/// Append the minimal SGR switch from `prev` to `next` (both channels).
///
/// Returns whether anything was emitted. `next` must be drawable; an
/// `Invalid` channel on `next` is a fatal internal error. `prev` may be
/// the [`Attribute::INVALID`] seed, in which case both channels are
/// emitted unconditionally.
pub fn push_style_diff(out: &mut String, prev: Attribute, next: Attribute) -> Result<bool> {
    let fg_changed = prev.fg_mode() != next.fg_mode() || prev.fg() != next.fg();
    let bg_changed = prev.bg_mode() != next.bg_mode() || prev.bg() != next.bg();

    if !fg_changed && !bg_changed {
        return Ok(false);
    }

    let mut seq = Vec::with_capacity(6);
    if fg_changed {
        fg_codes(next.fg_mode(), next.fg(), &mut seq)?;
    }
    if bg_changed {
        bg_codes(next.bg_mode(), next.bg(), &mut seq)?;
    }
    push_sgr(out, &seq);
    Ok(true)
}

/// Append the minimal SGR switch of the background channel only.
///
/// Used when the next cell to draw is a null cell: its foreground is
/// invisible, so only the background needs to be current.
pub fn push_bg_diff(out: &mut String, prev: Attribute, next: Attribute) -> Result<bool> {
    if prev.bg_mode() == next.bg_mode() && prev.bg() == next.bg() {
        return Ok(false);
    }

    let mut seq = Vec::with_capacity(5);
    bg_codes(next.bg_mode(), next.bg(), &mut seq)?;
    push_sgr(out, &seq);
    Ok(true)
}
