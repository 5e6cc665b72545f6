//! Crate error type.
//!
//! Frame rendering never surfaces these to the caller: the document logs
//! them and skips the frame. They exist so the internal pipeline can use `?`.

use thiserror::Error;

/// Errors produced while building, laying out or drawing a frame.
#[derive(Debug, Error)]
pub enum Error {
    /// The layout engine rejected an operation on its node tree.
    #[error("layout engine error: {0}")]
    Layout(#[from] taffy::TaffyError),

    /// Writing to the output sink or spawning a worker thread failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
