//! Incremental transcript emission.
//!
//! `diff` is the hot path of a frame update: it compares a rectangle of
//! this buffer against the same-sized rectangle of a baseline buffer and
//! emits only the opcodes needed to bring the baseline up to date. Cells
//! whose text and effective style are unchanged are never re-emitted;
//! unchanged and changed-to-null cells are coalesced into single
//! cursor-advance and erase-advance runs.

use crate::ansi;
use crate::error::Result;
use crate::style::Attribute;

use super::TerminalBuffer;

/// A cell as the diff sees it, with boundary artifacts normalized away.
#[derive(Clone, Copy)]
enum CellView<'a> {
    /// No visible glyph; only the background channel matters.
    Null(Attribute),
    /// A glyph cell spanning `width` columns.
    Glyph {
        width: u8,
        text: &'a str,
        attr: Attribute,
    },
    /// Second column of a wide glyph (only ever observed in the baseline;
    /// a well-formed source rectangle never lands on one).
    Placeholder,
}

/// View of a rectangle cell, clipped and boundary-normalized.
///
/// Out-of-range cells read as default null cells. A glyph half-cut by the
/// rectangle boundary — a placeholder in the first column, or a wide head
/// in the last — reads as a null cell with the glyph's style, so a cut
/// glyph can never be mistaken for unchanged content.
fn view(buf: &TerminalBuffer, base_y: i32, base_x: i32, r: usize, c: usize, w: usize) -> CellView<'_> {
    let row = base_y.saturating_add(i32::try_from(r).unwrap_or(i32::MAX));
    let col = base_x.saturating_add(i32::try_from(c).unwrap_or(i32::MAX));
    let Some(slot) = buf.slot(row, col) else {
        return CellView::Null(Attribute::DEFAULT);
    };

    if slot.is_placeholder() {
        if c == 0 {
            let attr = buf.style_at(row, col).unwrap_or(Attribute::DEFAULT);
            return CellView::Null(attr);
        }
        return CellView::Placeholder;
    }
    if slot.width == 2 && c + 1 >= w {
        return CellView::Null(slot.attributes);
    }
    if slot.is_null() {
        return CellView::Null(slot.attributes);
    }
    CellView::Glyph {
        width: slot.width,
        text: &slot.text,
        attr: slot.attributes,
    }
}

fn same_bg(a: Attribute, b: Attribute) -> bool {
    a.bg_mode() == b.bg_mode() && a.bg() == b.bg()
}

fn unchanged(new: &CellView<'_>, old: &CellView<'_>) -> bool {
    match (new, old) {
        (CellView::Null(a), CellView::Null(b)) => same_bg(*a, *b),
        (
            CellView::Glyph {
                width: wa,
                text: ta,
                attr: aa,
            },
            CellView::Glyph {
                width: wb,
                text: tb,
                attr: ab,
            },
        ) => wa == wb && ta == tb && aa == ab,
        _ => false,
    }
}

/// Pending run of cells the cursor still has to move past.
enum Run {
    None,
    /// Unchanged cells: advance without drawing.
    Skip(u32),
    /// Changed cells that are null in the new state: erase then advance,
    /// all sharing one background.
    Blank(u32, Attribute),
}

impl Run {
    fn flush(&mut self, out: &mut String, current: &mut Attribute) -> Result<()> {
        match *self {
            Run::None => {}
            Run::Skip(n) => ansi::push_cursor_forward(out, n),
            Run::Blank(n, attr) => {
                ansi::push_bg_diff(out, *current, attr)?;
                *current = current.apply_background(attr);
                ansi::push_erase_chars(out, n);
                ansi::push_cursor_forward(out, n);
            }
        }
        *self = Run::None;
        Ok(())
    }
}

impl TerminalBuffer {
    /// Emit the opcodes that transform `baseline`'s rectangle at
    /// `(to_y, to_x)` into this buffer's rectangle at `(from_y, from_x)`,
    /// both `h` rows by `w` columns.
    ///
    /// The transcript assumes the physical cursor already sits at the
    /// rectangle's first cell; the caller positions it (see
    /// [`Printer`](crate::Printer)). Style switches are tracked against a
    /// running cursor style seeded with this buffer's
    /// [`default_style`](Self::default_style) sentinel, so the first drawn
    /// cell always emits an explicit switch. When nothing differs the
    /// result is byte-empty.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAttribute`](crate::Error::InvalidAttribute) if a
    /// drawn cell carries the `Invalid` sentinel.
    pub fn diff(
        &self,
        baseline: &TerminalBuffer,
        from_y: i32,
        from_x: i32,
        to_y: i32,
        to_x: i32,
        h: i32,
        w: i32,
    ) -> Result<String> {
        let h = usize::try_from(h).unwrap_or(0);
        let w = usize::try_from(w).unwrap_or(0);

        let mut out = String::new();
        let mut current = self.default_style();
        let mut cursor_row = 0;

        for r in 0..h {
            let mut row_out = String::new();
            let mut run = Run::None;
            let mut c = 0;
            while c < w {
                let new = view(self, from_y, from_x, r, c, w);
                let old = view(baseline, to_y, to_x, r, c, w);

                if unchanged(&new, &old) {
                    let step = match new {
                        CellView::Glyph { width: 2, .. } => 2,
                        _ => 1,
                    };
                    match run {
                        Run::Skip(ref mut n) => *n += step,
                        _ => {
                            run.flush(&mut row_out, &mut current)?;
                            run = Run::Skip(step);
                        }
                    }
                    c += step as usize;
                    continue;
                }

                match new {
                    CellView::Null(_) | CellView::Placeholder => {
                        // A placeholder only reaches here via a malformed
                        // grid; treat it as a default null cell.
                        let attr = match new {
                            CellView::Null(attr) => attr,
                            _ => Attribute::DEFAULT,
                        };
                        match run {
                            Run::Blank(ref mut n, run_attr) if same_bg(run_attr, attr) => *n += 1,
                            _ => {
                                run.flush(&mut row_out, &mut current)?;
                                run = Run::Blank(1, attr);
                            }
                        }
                        c += 1;
                    }
                    CellView::Glyph { width, text, attr } => {
                        run.flush(&mut row_out, &mut current)?;
                        ansi::push_style_diff(&mut row_out, current, attr)?;
                        current = attr;
                        row_out.push_str(text);
                        c += usize::from(width.max(1));
                    }
                }
            }

            // A trailing skip run draws nothing; only pending erases
            // must still go out.
            if let Run::Blank(..) = run {
                run.flush(&mut row_out, &mut current)?;
            }

            if !row_out.is_empty() {
                for _ in cursor_row..r {
                    out.push_str("\r\n");
                }
                cursor_row = r;
                out.push_str(&row_out);
            }
        }

        Ok(out)
    }
}
