//! Cell-grid surface and its compositing primitives.
//!
//! [`TerminalBuffer`] is the drawing surface: a row-major grid of
//! [`Slot`]s with wide-character accounting. The primitives keep the
//! grid's double-width invariants intact under arbitrary overlapping
//! writes, fills and blits:
//!
//! - **write**: lay a string onto one row, clipped to a column window
//! - **fill**: paint a rectangle, tiling text and/or compositing style
//! - **draw**: blit a rectangle from another buffer (or from self)
//! - **resize**: truncate/pad the grid, repairing cut glyphs
//!
//! Serialization and diffing live in the submodules.

// Region operations naturally take source and destination rectangles
#![allow(clippy::too_many_arguments)]

mod diff;
mod serialize;

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::slot::Slot;
use crate::style::Attribute;
use crate::unicode::{display_width, grapheme_widths};

bitflags! {
    /// Controls what a [`TerminalBuffer::fill_composite`] call overrides.
    ///
    /// With `OVERRIDE_CONTENT` unset, existing glyphs survive; with
    /// `OVERRIDE_STYLE` unset, the fill style is mixed onto each cell's
    /// style instead of replacing it.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CompositeMode: u8 {
        const OVERRIDE_CONTENT = 0b01;
        const OVERRIDE_STYLE = 0b10;
    }
}

impl Default for CompositeMode {
    fn default() -> Self {
        Self::all()
    }
}

/// A `width x height` grid of display cells.
///
/// Coordinates in the public API are `i32` and may be negative or exceed
/// the grid: out-of-range cells are clipped or skipped silently, since
/// compositing code routinely issues rectangles that partially overlap
/// the surface. Only precondition violations (an `Invalid` attribute, an
/// overlapping self-blit) are errors.
#[derive(Clone, Debug)]
pub struct TerminalBuffer {
    width: usize,
    height: usize,
    slots: Vec<Slot>,
    null_fill: String,
    default_style: Attribute,
}

/// A captured source rectangle for blitting.
///
/// Cells are cloned and placeholder styles are resolved to their head
/// glyph's style up front, so applying the snapshot never reads the
/// source again. This is what makes the destination zoning safe even
/// when source and destination share a buffer.
struct RectSnapshot {
    h: usize,
    w: usize,
    cells: Vec<Option<Slot>>,
    styles: Vec<Option<Attribute>>,
}

impl RectSnapshot {
    fn capture(buf: &TerminalBuffer, sy: i32, sx: i32, h: usize, w: usize) -> Self {
        let mut cells = Vec::with_capacity(h * w);
        let mut styles = Vec::with_capacity(h * w);
        for r in 0..h {
            for c in 0..w {
                let row = sy.saturating_add(i32::try_from(r).unwrap_or(i32::MAX));
                let col = sx.saturating_add(i32::try_from(c).unwrap_or(i32::MAX));
                cells.push(buf.slot(row, col).cloned());
                styles.push(buf.style_at(row, col));
            }
        }
        Self {
            h,
            w,
            cells,
            styles,
        }
    }

    fn cell(&self, r: usize, c: usize) -> Option<&Slot> {
        self.cells[r * self.w + c].as_ref()
    }

    fn style(&self, r: usize, c: usize) -> Option<Attribute> {
        self.styles[r * self.w + c]
    }
}

impl TerminalBuffer {
    /// Create a buffer of null cells with default style.
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            slots: vec![Slot::default(); width.saturating_mul(height)],
            null_fill: String::new(),
            default_style: Attribute::INVALID,
        }
    }

    /// Buffer width in columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Buffer height in rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The fill glyph written into null cells (empty by default).
    #[must_use]
    pub fn null_fill(&self) -> &str {
        &self.null_fill
    }

    /// Set the fill glyph for null cells.
    ///
    /// Must be empty or a single grapheme of display width 1; a wider
    /// fill would break the slot width invariant.
    pub fn set_null_fill(&mut self, fill: impl Into<String>) {
        let fill = fill.into();
        debug_assert!(display_width(&fill) <= 1, "null fill must be at most one column");
        self.null_fill = fill;
    }

    /// The sentinel style used to seed diff baselines.
    #[must_use]
    pub const fn default_style(&self) -> Attribute {
        self.default_style
    }

    /// Total display width of a string in columns.
    #[must_use]
    pub fn width_of(text: &str) -> usize {
        display_width(text)
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(row * self.width + col)
    }

    /// Slot at a position, if in range.
    #[must_use]
    pub fn slot(&self, row: i32, col: i32) -> Option<&Slot> {
        self.index(row, col).map(|idx| &self.slots[idx])
    }

    fn slot_mut(&mut self, row: i32, col: i32) -> Option<&mut Slot> {
        self.index(row, col).map(|idx| &mut self.slots[idx])
    }

    /// Effective style at a position: a placeholder reports the style of
    /// the wide glyph's head in the previous column.
    #[must_use]
    pub fn style_at(&self, row: i32, col: i32) -> Option<Attribute> {
        let slot = self.slot(row, col)?;
        if slot.is_placeholder() {
            return self.slot(row, col - 1).map(|head| head.attributes);
        }
        Some(slot.attributes)
    }

    /// Turn a slot into a null cell, keeping its style.
    fn blank(&mut self, row: i32, col: i32) {
        let fill = self.null_fill.clone();
        if let Some(slot) = self.slot_mut(row, col) {
            slot.width = 1;
            slot.text = fill;
        }
    }

    /// Reset every cell to a null-fill cell.
    ///
    /// With `attr`, every cell is restamped with it; without, styles
    /// reset to [`Attribute::DEFAULT`].
    pub fn clear(&mut self, attr: Option<&Attribute>) {
        let attributes = attr.copied().unwrap_or(Attribute::DEFAULT);
        let fill = Slot::null(&self.null_fill, attributes);
        self.slots.fill(fill);
    }

    /// Lay `text` onto one row starting at `col`.
    ///
    /// Returns the number of columns consumed. Equivalent to
    /// [`write_clipped`](Self::write_clipped) with unbounded clipping.
    pub fn write(
        &mut self,
        row: i32,
        col: i32,
        text: &str,
        attr: Option<&Attribute>,
    ) -> Result<usize> {
        self.write_clipped(row, col, text, attr, i32::MIN, i32::MAX)
    }

    /// Lay `text` onto one row starting at `col`, clipped to the column
    /// window `[bound_start, bound_end)` and to the buffer width.
    ///
    /// Graphemes are accepted greedily while their cumulative width fits.
    /// If the next grapheme is too wide but one more column would still
    /// fit, that column is reserved as a styled filler ("end cap") so a
    /// cut-off wide glyph cannot leak stale style into it. Every occupied
    /// column is first zoned — reset to a null cell and restamped with
    /// `attr` — which also repairs any wide glyph cut open at either end
    /// of the zone. A glyph starting before `bound_start` but reaching
    /// into it becomes null filler rather than a half-rendered glyph.
    ///
    /// Returns the number of columns consumed (including the end cap);
    /// returns 0 without mutating when the row is out of range, `col` is
    /// past the right edge, or `text` is empty.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAttribute`] if `attr` has an `Invalid` channel.
    pub fn write_clipped(
        &mut self,
        row: i32,
        col: i32,
        text: &str,
        attr: Option<&Attribute>,
        bound_start: i32,
        bound_end: i32,
    ) -> Result<usize> {
        if let Some(attr) = attr {
            if !attr.is_valid() {
                return Err(Error::InvalidAttribute);
            }
        }
        if row < 0 || i64::from(row) >= self.height as i64 {
            return Ok(0);
        }
        if i64::from(col) >= self.width as i64 || text.is_empty() {
            return Ok(0);
        }

        let col = i64::from(col);
        let real_bound_start = col.max(0).max(i64::from(bound_start));
        let max_len = i64::from(bound_end)
            .saturating_sub(col)
            .min(self.width as i64 - col);

        let mut offset: i64 = 0;
        let mut end_capped = false;
        let mut accepted: Vec<(i64, usize, &str)> = Vec::new();
        for (g, wc) in grapheme_widths(text) {
            if offset + wc as i64 > max_len {
                if offset + 1 <= max_len {
                    end_capped = true;
                }
                break;
            }
            accepted.push((col + offset, wc, g));
            offset += wc as i64;
        }
        let consumed = if end_capped { offset + 1 } else { offset };
        if col + consumed <= 0 {
            return Ok(0);
        }
        let zone_end = col + consumed; // exclusive

        if real_bound_start < zone_end {
            let head = clamp_col(real_bound_start);
            let last = clamp_col(zone_end - 1);

            // A placeholder at the zone head means a wide glyph is being
            // cut in half; both halves become null cells.
            if self.slot(row, head).is_some_and(Slot::is_placeholder) {
                self.blank(row, head - 1);
                self.blank(row, head);
            }
            // A wide glyph head on the zone's last column loses its tail.
            if self.slot(row, last).is_some_and(|s| s.width == 2) {
                self.blank(row, last);
                self.blank(row, last.saturating_add(1));
            }

            let fill = self.null_fill.clone();
            for i in real_bound_start..zone_end {
                if let Some(slot) = self.slot_mut(row, clamp_col(i)) {
                    slot.width = 1;
                    slot.text.clone_from(&fill);
                    if let Some(attr) = attr {
                        slot.attributes = *attr;
                    }
                }
            }
        }

        for (pos, wc, g) in accepted {
            if pos < real_bound_start {
                // Head-clipped wide glyph: expose null filler, not half a glyph.
                if pos >= 0 && pos + wc as i64 > real_bound_start {
                    self.blank(row, clamp_col(pos));
                    self.blank(row, clamp_col(pos + 1));
                }
                continue;
            }
            match wc {
                1 => {
                    if let Some(slot) = self.slot_mut(row, clamp_col(pos)) {
                        slot.width = 1;
                        slot.text = g.to_owned();
                    }
                }
                2 => {
                    if self.index(row, clamp_col(pos)).is_some()
                        && self.index(row, clamp_col(pos + 1)).is_some()
                    {
                        if let Some(head) = self.slot_mut(row, clamp_col(pos)) {
                            head.width = 2;
                            head.text = g.to_owned();
                        }
                        if let Some(tail) = self.slot_mut(row, clamp_col(pos + 1)) {
                            tail.width = 0;
                            tail.text.clear();
                        }
                    }
                }
                _ => {} // zero-width graphemes occupy no column
            }
        }

        Ok(usize::try_from(consumed).unwrap_or(0))
    }

    /// Paint a rectangle, overriding both content and style.
    ///
    /// Shorthand for [`fill_composite`](Self::fill_composite) with
    /// [`CompositeMode::all`].
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAttribute`] if `attr` has an `Invalid` channel.
    pub fn fill(
        &mut self,
        row: i32,
        col: i32,
        h: i32,
        w: i32,
        text: &str,
        attr: Option<&Attribute>,
    ) -> Result<()> {
        self.fill_composite(row, col, h, w, text, attr, CompositeMode::all())
    }

    /// Paint a rectangle under a composite mode.
    ///
    /// With `OVERRIDE_CONTENT`, glyphs in the rectangle are reset and
    /// `text` is tiled across each row (wide glyphs straddling the
    /// rectangle edge are repaired first). Without it, existing glyphs
    /// are preserved and edge cells belonging to a glyph that straddles
    /// the rectangle boundary are skipped entirely.
    ///
    /// With `OVERRIDE_STYLE`, cells receive `attr` verbatim; without it,
    /// `attr` is mixed onto each cell's style (its `Default` channels
    /// fall back to the existing per-cell color).
    ///
    /// Out-of-range cells are skipped silently.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidAttribute`] if `attr` has an `Invalid` channel.
    pub fn fill_composite(
        &mut self,
        row: i32,
        col: i32,
        h: i32,
        w: i32,
        text: &str,
        attr: Option<&Attribute>,
        mode: CompositeMode,
    ) -> Result<()> {
        if let Some(attr) = attr {
            if !attr.is_valid() {
                return Err(Error::InvalidAttribute);
            }
        }

        for r in 0..h.max(0) {
            let abs_r = row.saturating_add(r);
            for c in 0..w.max(0) {
                let abs_c = col.saturating_add(c);
                let Some(cell_width) = self.slot(abs_r, abs_c).map(|s| s.width) else {
                    continue;
                };

                if mode.contains(CompositeMode::OVERRIDE_CONTENT) {
                    if cell_width == 0 {
                        self.blank(abs_r, abs_c - 1);
                    }
                    if cell_width == 2 {
                        self.blank(abs_r, abs_c + 1);
                    }
                    self.blank(abs_r, abs_c);
                } else {
                    // Content preserved: never touch a glyph half whose
                    // other half lies outside the rectangle.
                    let straddles_head = cell_width == 0 && c == 0;
                    let straddles_tail = cell_width == 2 && c == w - 1;
                    if straddles_head || straddles_tail {
                        continue;
                    }
                }

                if let Some(attr) = attr {
                    if let Some(slot) = self.slot_mut(abs_r, abs_c) {
                        slot.attributes = if mode.contains(CompositeMode::OVERRIDE_STYLE) {
                            *attr
                        } else {
                            slot.attributes.mix_with(*attr)
                        };
                    }
                }
            }
        }

        if mode.contains(CompositeMode::OVERRIDE_CONTENT) && !text.is_empty() {
            // The style pass above already stamped every rectangle cell
            // (mixed or verbatim); tiling with the raw attribute would
            // wipe the mixed channels, so only the verbatim mode passes
            // it through to the zoning in write.
            let tile_attr = if mode.contains(CompositeMode::OVERRIDE_STYLE) {
                attr
            } else {
                None
            };
            let bound_end = col.saturating_add(w.max(0));
            for r in 0..h.max(0) {
                let abs_r = row.saturating_add(r);
                let mut pos = col;
                while pos < bound_end {
                    let n = self.write_clipped(abs_r, pos, text, tile_attr, col, bound_end)?;
                    if n == 0 {
                        break;
                    }
                    pos = pos.saturating_add(i32::try_from(n).unwrap_or(i32::MAX));
                }
            }
        }

        Ok(())
    }

    /// Blit an `h x w` rectangle from `source` at `(sy, sx)` onto self at
    /// `(dy, dx)`.
    ///
    /// Destination cells are zoned exactly as in `write` (wide glyphs
    /// straddling the destination edges are repaired), restyled from the
    /// source's effective style, then glyphs are copied: a wide glyph
    /// only when both its columns land inside the rectangle, and
    /// placeholders never on their own. Out-of-range cells on either
    /// side are skipped silently.
    ///
    /// For blitting within one buffer, see [`draw_within`](Self::draw_within).
    pub fn draw(
        &mut self,
        source: &TerminalBuffer,
        sy: i32,
        sx: i32,
        dy: i32,
        dx: i32,
        h: i32,
        w: i32,
    ) {
        let snap = RectSnapshot::capture(
            source,
            sy,
            sx,
            usize::try_from(h).unwrap_or(0),
            usize::try_from(w).unwrap_or(0),
        );
        self.blit_snapshot(&snap, dy, dx);
    }

    /// Blit a rectangle from this buffer onto itself.
    ///
    /// # Errors
    ///
    /// [`Error::OverlappingBlit`] when the source and destination
    /// rectangles overlap; no mutation occurs in that case.
    pub fn draw_within(
        &mut self,
        sy: i32,
        sx: i32,
        dy: i32,
        dx: i32,
        h: i32,
        w: i32,
    ) -> Result<()> {
        let (sy64, sx64) = (i64::from(sy), i64::from(sx));
        let (dy64, dx64) = (i64::from(dy), i64::from(dx));
        let (h64, w64) = (i64::from(h.max(0)), i64::from(w.max(0)));
        let overlaps = sy64 + h64 > dy64
            && dy64 + h64 > sy64
            && sx64 + w64 > dx64
            && dx64 + w64 > sx64;
        if h64 > 0 && w64 > 0 && overlaps {
            return Err(Error::OverlappingBlit {
                sy,
                sx,
                dy,
                dx,
                h,
                w,
            });
        }

        let snap = RectSnapshot::capture(
            self,
            sy,
            sx,
            usize::try_from(h).unwrap_or(0),
            usize::try_from(w).unwrap_or(0),
        );
        self.blit_snapshot(&snap, dy, dx);
        Ok(())
    }

    fn blit_snapshot(&mut self, snap: &RectSnapshot, dy: i32, dx: i32) {
        // First pass: zone and restyle every destination cell.
        for r in 0..snap.h {
            let abs_r = dy.saturating_add(i32::try_from(r).unwrap_or(i32::MAX));
            for c in 0..snap.w {
                let abs_c = dx.saturating_add(i32::try_from(c).unwrap_or(i32::MAX));
                let Some(cell_width) = self.slot(abs_r, abs_c).map(|s| s.width) else {
                    continue;
                };
                if cell_width == 0 {
                    self.blank(abs_r, abs_c - 1);
                }
                if cell_width == 2 {
                    self.blank(abs_r, abs_c + 1);
                }
                self.blank(abs_r, abs_c);
                if let Some(style) = snap.style(r, c) {
                    if let Some(slot) = self.slot_mut(abs_r, abs_c) {
                        slot.attributes = style;
                    }
                }
            }
        }

        // Second pass: copy glyph text cell by cell.
        for r in 0..snap.h {
            let abs_r = dy.saturating_add(i32::try_from(r).unwrap_or(i32::MAX));
            for c in 0..snap.w {
                let Some(from) = snap.cell(r, c) else {
                    continue;
                };
                let abs_c = dx.saturating_add(i32::try_from(c).unwrap_or(i32::MAX));
                match from.width {
                    1 => {
                        if let Some(slot) = self.slot_mut(abs_r, abs_c) {
                            slot.width = 1;
                            slot.text.clone_from(&from.text);
                        }
                    }
                    2 if c + 1 < snap.w
                        && self.index(abs_r, abs_c).is_some()
                        && self.index(abs_r, abs_c + 1).is_some() =>
                    {
                        if let Some(head) = self.slot_mut(abs_r, abs_c) {
                            head.width = 2;
                            head.text.clone_from(&from.text);
                        }
                        if let Some(tail) = self.slot_mut(abs_r, abs_c + 1) {
                            tail.width = 0;
                            tail.text.clear();
                        }
                    }
                    _ => {} // placeholders are never copied on their own
                }
            }
        }
    }

    /// Grow or shrink the grid, preserving overlapping content.
    ///
    /// Rows and columns are truncated or padded with default null cells.
    /// A wide glyph whose second column is cut off at the new right edge
    /// is demoted to a width-1 null cell.
    pub fn resize(&mut self, width: usize, height: usize) {
        let mut slots = Vec::with_capacity(width.saturating_mul(height));
        for r in 0..height {
            for c in 0..width {
                if r < self.height && c < self.width {
                    slots.push(self.slots[r * self.width + c].clone());
                } else {
                    slots.push(Slot::default());
                }
            }
        }
        self.slots = slots;
        self.width = width;
        self.height = height;

        if width > 0 {
            let fill = self.null_fill.clone();
            for r in 0..height {
                let idx = r * width + (width - 1);
                if self.slots[idx].width == 2 {
                    self.slots[idx].width = 1;
                    self.slots[idx].text.clone_from(&fill);
                }
            }
        }
    }
}

fn clamp_col(col: i64) -> i32 {
    i32::try_from(col).unwrap_or(if col < 0 { i32::MIN } else { i32::MAX })
}
