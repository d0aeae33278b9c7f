//! Full-state transcript emission.
//!
//! `serialize` renders the whole buffer as one escape transcript against a
//! terminal assumed to carry all-default style. This is the slow path used
//! for the initial paint and forced repaints; incremental updates go
//! through [`diff`](super::TerminalBuffer::diff).

use crate::ansi;
use crate::error::{Error, Result};
use crate::event::{emit_log, LogLevel};
use crate::style::Attribute;

use super::TerminalBuffer;

impl TerminalBuffer {
    /// Render the buffer's full visible state as an escape transcript.
    ///
    /// The transcript assumes the cursor starts at the buffer's first cell
    /// with all-default style. Placeholder cells are skipped (the wide
    /// glyph head already covers both columns). Consecutive null cells are
    /// batched into one erase-and-advance, with the erase dropped when the
    /// run's background is default (erasing against an already-default
    /// background is wasted bytes). Rows are separated by `\r\n`.
    ///
    /// # Errors
    ///
    /// [`Error::CorruptSlot`] if the grid violates the wide-glyph pairing
    /// invariant, [`Error::InvalidAttribute`] if a cell carries the
    /// `Invalid` sentinel. Both are internal errors, logged before return.
    pub fn serialize(&self) -> Result<String> {
        let mut out = String::new();
        let mut current = Attribute::DEFAULT;

        for row in 0..self.height() {
            if row > 0 {
                out.push_str("\r\n");
            }

            let mut null_run: u32 = 0;
            let mut col = 0;
            while col < self.width() {
                let slot = self
                    .slot(i32::try_from(row).unwrap_or(i32::MAX), i32::try_from(col).unwrap_or(i32::MAX))
                    .ok_or(Error::CorruptSlot { row, col })?;

                if slot.width > 2 || (slot.is_placeholder() && !slot.text.is_empty()) {
                    emit_log(
                        LogLevel::Error,
                        &format!("serialize: malformed slot at ({row}, {col})"),
                    );
                    return Err(Error::CorruptSlot { row, col });
                }

                if slot.is_placeholder() {
                    if col == 0 {
                        emit_log(
                            LogLevel::Error,
                            &format!("serialize: orphan placeholder at ({row}, 0)"),
                        );
                        return Err(Error::CorruptSlot { row, col });
                    }
                    col += 1;
                    continue;
                }

                if slot.is_null() {
                    // Extend the run only while the background is stable.
                    let same_bg = current.bg_mode() == slot.attributes.bg_mode()
                        && current.bg() == slot.attributes.bg();
                    if null_run > 0 && !same_bg {
                        flush_null_run(&mut out, &mut null_run, current, false);
                    }
                    if null_run == 0 && !same_bg {
                        ansi::push_bg_diff(&mut out, current, slot.attributes)?;
                        current = current.apply_background(slot.attributes);
                    }
                    null_run += 1;
                    col += 1;
                    continue;
                }

                flush_null_run(&mut out, &mut null_run, current, false);

                if crate::unicode::display_width(&slot.text) != usize::from(slot.width) {
                    emit_log(
                        LogLevel::Error,
                        &format!("serialize: width/text mismatch at ({row}, {col})"),
                    );
                    return Err(Error::CorruptSlot { row, col });
                }

                if slot.width == 2 {
                    let tail = self.slot(
                        i32::try_from(row).unwrap_or(i32::MAX),
                        i32::try_from(col + 1).unwrap_or(i32::MAX),
                    );
                    if !tail.is_some_and(crate::slot::Slot::is_placeholder) {
                        emit_log(
                            LogLevel::Error,
                            &format!("serialize: wide glyph without placeholder at ({row}, {col})"),
                        );
                        return Err(Error::CorruptSlot { row, col });
                    }
                }

                ansi::push_style_diff(&mut out, current, slot.attributes)?;
                current = slot.attributes;
                out.push_str(&slot.text);
                col += usize::from(slot.width);
            }

            flush_null_run(&mut out, &mut null_run, current, true);
        }

        Ok(out)
    }
}

/// Emit a batched null-cell run: erase (when the background matters) then
/// advance past the run. At the end of a row the advance is dead bytes —
/// the row separator repositions the cursor anyway — so only the erase
/// goes out there.
fn flush_null_run(out: &mut String, run: &mut u32, current: Attribute, at_row_end: bool) {
    if *run == 0 {
        return;
    }
    if current.has_background() {
        ansi::push_erase_chars(out, *run);
    }
    if !at_row_end {
        ansi::push_cursor_forward(out, *run);
    }
    *run = 0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Color, ColorMode};
    use crate::slot::Slot;

    fn palette_bg(color: Color) -> Attribute {
        Attribute::DEFAULT.with_background(ColorMode::Palette, color.index())
    }

    #[test]
    fn test_empty_buffer_emits_only_row_breaks() {
        // Trailing default-background runs draw nothing and advance
        // nowhere useful, so they vanish entirely.
        let buf = TerminalBuffer::new(3, 2);
        assert_eq!(buf.serialize().unwrap(), "\r\n");
    }

    #[test]
    fn test_plain_text() {
        let mut buf = TerminalBuffer::new(3, 1);
        buf.write(0, 0, "ab", None).unwrap();
        assert_eq!(buf.serialize().unwrap(), "ab");
    }

    #[test]
    fn test_wide_glyph_emitted_once() {
        let mut buf = TerminalBuffer::new(4, 1);
        buf.write(0, 0, "中a", None).unwrap();
        assert_eq!(buf.serialize().unwrap(), "中a");
    }

    #[test]
    fn test_styled_null_run_erases() {
        let mut buf = TerminalBuffer::new(4, 1);
        buf.fill(0, 1, 1, 2, "", Some(&palette_bg(Color::Blue))).unwrap();
        // Default-bg null, two blue nulls (erased), default-bg null;
        // the trailing default run disappears.
        assert_eq!(
            buf.serialize().unwrap(),
            "\x1b[1C\x1b[44m\x1b[2X\x1b[2C\x1b[49m"
        );
    }

    #[test]
    fn test_trailing_styled_run_erases_without_advance() {
        let mut buf = TerminalBuffer::new(4, 1);
        buf.write(0, 0, "a", None).unwrap();
        buf.fill(0, 1, 1, 3, "", Some(&palette_bg(Color::Blue))).unwrap();
        // The blue run at the row's end still needs its erase to paint
        // the background, but no cursor advance after it.
        assert_eq!(buf.serialize().unwrap(), "a\x1b[44m\x1b[3X");
    }

    #[test]
    fn test_style_switch_minimal_across_cells() {
        let red = Attribute::DEFAULT.with_foreground(ColorMode::Palette, Color::Red.index());
        let mut buf = TerminalBuffer::new(2, 1);
        buf.write(0, 0, "ab", Some(&red)).unwrap();
        // One switch covers both cells.
        assert_eq!(buf.serialize().unwrap(), "\x1b[31mab");
    }

    #[test]
    fn test_null_fill_glyph_is_regular_text() {
        let mut buf = TerminalBuffer::new(2, 1);
        buf.set_null_fill(".");
        buf.clear(None);
        assert_eq!(buf.serialize().unwrap(), "..");
    }

    #[test]
    fn test_background_run_tracking_keeps_foreground() {
        let red_on_blue = Attribute::new(
            ColorMode::Palette,
            Color::Red.index(),
            ColorMode::Palette,
            Color::Blue.index(),
        );
        let mut buf = TerminalBuffer::new(3, 1);
        buf.write(0, 0, "a", Some(&red_on_blue)).unwrap();
        buf.fill(0, 1, 1, 1, "", Some(&palette_bg(Color::Blue))).unwrap();
        buf.write(0, 2, "b", Some(&red_on_blue)).unwrap();

        // The null cell shares the blue background, so no switch happens
        // around it, and the trailing 'b' needs no switch either because
        // the tracked style kept its red foreground across the run.
        assert_eq!(buf.serialize().unwrap(), "\x1b[31;44ma\x1b[1X\x1b[1Cb");
    }

    #[test]
    fn test_orphan_placeholder_is_corrupt() {
        let mut buf = TerminalBuffer::new(2, 1);
        if let Some(slot) = buf.slot_mut(0, 0) {
            *slot = Slot::placeholder(Attribute::DEFAULT);
        }
        let err = buf.serialize().unwrap_err();
        assert!(matches!(err, Error::CorruptSlot { row: 0, col: 0 }));
    }

    #[test]
    fn test_wide_head_without_tail_is_corrupt() {
        let mut buf = TerminalBuffer::new(2, 1);
        buf.write(0, 0, "中", None).unwrap();
        // Wreck the pairing by hand: the tail becomes a plain glyph cell.
        if let Some(slot) = buf.slot_mut(0, 1) {
            *slot = Slot::null("x", Attribute::DEFAULT);
        }
        let err = buf.serialize().unwrap_err();
        assert!(matches!(err, Error::CorruptSlot { row: 0, col: 0 }));
    }
}
