//! Double-buffered frame presentation.
//!
//! [`Printer`] owns a drawing surface and a shadow copy of whatever was
//! last flushed to the sink. Frames are composed on the surface through
//! the passthrough drawing methods; [`update_screen`](Printer::update_screen)
//! then sends only the opcodes that differ from the shadow, making
//! redundant frames (nearly) free.

use std::io::Write;

use crate::ansi;
use crate::buffer::{CompositeMode, TerminalBuffer};
use crate::error::Result;
use crate::event::{emit_log, LogLevel};
use crate::style::Attribute;

/// Double-buffered transcript emitter over an arbitrary byte sink.
///
/// The sink is typically a raw-mode stdout handle, but any [`Write`]
/// works; tests drive a `Vec<u8>`.
pub struct Printer<W: Write> {
    sink: W,
    surface: TerminalBuffer,
    shadow: TerminalBuffer,
    initialized: bool,
    needs_full: bool,
}

impl<W: Write> Printer<W> {
    /// Create a printer with a blank `width x height` surface.
    ///
    /// Nothing is sent until the first screen update.
    pub fn new(sink: W, width: usize, height: usize) -> Self {
        Self {
            sink,
            surface: TerminalBuffer::new(width, height),
            shadow: TerminalBuffer::new(width, height),
            initialized: false,
            needs_full: false,
        }
    }

    /// Surface width in columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.surface.width()
    }

    /// Surface height in rows.
    #[must_use]
    pub fn height(&self) -> usize {
        self.surface.height()
    }

    /// The drawing surface.
    #[must_use]
    pub const fn buffer(&self) -> &TerminalBuffer {
        &self.surface
    }

    /// Mutable access to the drawing surface for compositing not covered
    /// by the passthrough methods.
    pub fn buffer_mut(&mut self) -> &mut TerminalBuffer {
        &mut self.surface
    }

    /// Consume the printer, returning the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// See [`TerminalBuffer::write`].
    ///
    /// # Errors
    ///
    /// Propagates the surface's error.
    pub fn write(
        &mut self,
        row: i32,
        col: i32,
        text: &str,
        attr: Option<&Attribute>,
    ) -> Result<usize> {
        self.surface.write(row, col, text, attr)
    }

    /// See [`TerminalBuffer::fill`].
    ///
    /// # Errors
    ///
    /// Propagates the surface's error.
    pub fn fill(
        &mut self,
        row: i32,
        col: i32,
        h: i32,
        w: i32,
        text: &str,
        attr: Option<&Attribute>,
    ) -> Result<()> {
        self.surface.fill(row, col, h, w, text, attr)
    }

    /// See [`TerminalBuffer::fill_composite`].
    ///
    /// # Errors
    ///
    /// Propagates the surface's error.
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
        self.surface.fill_composite(row, col, h, w, text, attr, mode)
    }

    /// See [`TerminalBuffer::draw`].
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
        self.surface.draw(source, sy, sx, dy, dx, h, w);
    }

    /// See [`TerminalBuffer::clear`].
    pub fn clear(&mut self, attr: Option<&Attribute>) {
        self.surface.clear(attr);
    }

    /// Resize the surface; see [`TerminalBuffer::resize`].
    ///
    /// The shadow no longer reflects the screen after a resize, so the
    /// next update repaints in full. Screen space was already claimed,
    /// so no scroll prefix is re-emitted.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.surface.resize(width, height);
        self.needs_full = true;
    }

    /// Claim screen space and paint the full surface.
    ///
    /// Emits enough line breaks to scroll `height - 1` fresh rows into
    /// view, homes the cursor, and sends the surface's full transcript.
    /// The terminal should already be positioned at the start of a row
    /// (and usually in raw mode).
    ///
    /// # Errors
    ///
    /// Serialization or sink I/O errors.
    pub fn init_screen(&mut self) -> Result<()> {
        let mut transcript = String::new();
        for _ in 1..self.surface.height() {
            transcript.push_str("\r\n");
        }
        transcript.push_str(ansi::CURSOR_HOME);
        transcript.push_str(ansi::RESET);
        transcript.push_str(&self.surface.serialize()?);
        transcript.push_str(ansi::RESET);

        self.sink.write_all(transcript.as_bytes())?;
        self.sink.flush()?;
        self.shadow = self.surface.clone();
        self.initialized = true;
        self.needs_full = false;
        emit_log(
            LogLevel::Debug,
            &format!("init frame: {} bytes", transcript.len()),
        );
        Ok(())
    }

    /// Flush the surface to the sink, sending only what changed.
    ///
    /// Falls back to [`init_screen`](Self::init_screen) when the screen
    /// was never initialized, and to
    /// [`update_screen_full`](Self::update_screen_full) after a resize
    /// made the shadow stale. When nothing changed since the last
    /// update, nothing is sent at all.
    ///
    /// # Errors
    ///
    /// Diff emission or sink I/O errors. On I/O failure the shadow is
    /// left untouched, so the next update retries the same delta.
    pub fn update_screen(&mut self) -> Result<()> {
        if !self.initialized {
            return self.init_screen();
        }
        if self.needs_full {
            return self.update_screen_full();
        }

        let h = i32::try_from(self.surface.height()).unwrap_or(i32::MAX);
        let w = i32::try_from(self.surface.width()).unwrap_or(i32::MAX);
        let body = self.surface.diff(&self.shadow, 0, 0, 0, 0, h, w)?;
        if body.is_empty() {
            return Ok(());
        }

        let mut transcript = String::with_capacity(body.len() + 16);
        transcript.push_str(ansi::CURSOR_HOME);
        transcript.push_str(ansi::RESET);
        transcript.push_str(&body);
        transcript.push_str(ansi::RESET);

        self.sink.write_all(transcript.as_bytes())?;
        self.sink.flush()?;
        self.shadow = self.surface.clone();
        emit_log(
            LogLevel::Debug,
            &format!("delta frame: {} bytes", transcript.len()),
        );
        Ok(())
    }

    /// Repaint the whole surface regardless of the shadow state.
    ///
    /// Recovers from anything that corrupted the real screen behind the
    /// shadow's back (a stray print, terminal glitches).
    ///
    /// # Errors
    ///
    /// Serialization or sink I/O errors.
    pub fn update_screen_full(&mut self) -> Result<()> {
        let mut transcript = String::new();
        transcript.push_str(ansi::CURSOR_HOME);
        transcript.push_str(ansi::RESET);
        transcript.push_str(&self.surface.serialize()?);
        transcript.push_str(ansi::RESET);

        self.sink.write_all(transcript.as_bytes())?;
        self.sink.flush()?;
        self.shadow = self.surface.clone();
        self.initialized = true;
        self.needs_full = false;
        emit_log(
            LogLevel::Debug,
            &format!("full frame: {} bytes", transcript.len()),
        );
        Ok(())
    }
}
