//! `cellgrid` - Terminal cell-grid compositing engine
//!
//! A double-buffered drawing surface for terminal applications: grid
//! buffers with wide-glyph accounting, rectangle fills and blits, and
//! diff-based escape transcript emission so unchanged cells cost nothing
//! to redraw.
//!
//! # Examples
//!
//! ```no_run
//! use cellgrid::{Attribute, Color, ColorMode, Printer, Result};
//!
//! fn main() -> Result<()> {
//!     let bar = Attribute::DEFAULT.with_background(ColorMode::Palette, Color::Blue.index());
//!     let mut printer = Printer::new(std::io::stdout(), 80, 24);
//!     printer.fill(0, 0, 1, 80, "", Some(&bar))?;
//!     printer.write(0, 2, "cellgrid", Some(&bar))?;
//!     printer.update_screen()?;
//!     Ok(())
//! }
//! ```

// Crate-level lint configuration
#![warn(unsafe_code)]
#![allow(clippy::cast_possible_truncation)] // Intentional coordinate casts
#![allow(clippy::cast_sign_loss)] // Intentional coordinate conversions
#![allow(clippy::cast_possible_wrap)] // Intentional coordinate conversions
#![allow(clippy::module_name_repetitions)] // Allow buffer::TerminalBuffer etc
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::redundant_clone)] // Clones in tests for clarity are fine
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening

pub mod ansi;
pub mod buffer;
pub mod color;
pub mod error;
pub mod event;
pub mod printer;
pub mod slot;
pub mod style;
pub mod unicode;

// Re-export core types at crate root
pub use buffer::{CompositeMode, TerminalBuffer};
pub use color::{Color, ColorMode};
pub use error::{Error, Result};
pub use event::{LogLevel, emit_log, set_log_callback};
pub use printer::Printer;
pub use slot::Slot;
pub use style::Attribute;
pub use unicode::{WidthMethod, set_width_method, width_method};
