//! Error types for cellgrid.

use std::fmt;
use std::io;

/// Result type alias for cellgrid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cellgrid operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the output sink.
    Io(io::Error),
    /// An attribute with an `Invalid` color channel was passed to a
    /// drawing operation.
    InvalidAttribute,
    /// A self-blit was requested with overlapping source and destination
    /// rectangles.
    OverlappingBlit {
        sy: i32,
        sx: i32,
        dy: i32,
        dx: i32,
        h: i32,
        w: i32,
    },
    /// A slot violated the width/text consistency invariant.
    CorruptSlot { row: usize, col: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidAttribute => {
                write!(f, "invalid attribute: Invalid color mode is not drawable")
            }
            Self::OverlappingBlit {
                sy,
                sx,
                dy,
                dx,
                h,
                w,
            } => {
                write!(
                    f,
                    "overlapping self-blit: {h}x{w} from ({sy}, {sx}) onto ({dy}, {dx})"
                )
            }
            Self::CorruptSlot { row, col } => {
                write!(f, "corrupt slot at ({row}, {col}): width disagrees with text")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
