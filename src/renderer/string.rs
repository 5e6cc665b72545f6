//! Renderer that writes each frame into a string.
//!
//! Useful for tests and for capturing a document's output without a
//! terminal. Every frame replaces the previous contents; no escape sequences
//! are emitted.

use std::sync::{Arc, Mutex, PoisonError};

use super::tree::write_tree;
use super::{PreviousFrame, Renderer};
use crate::error::Result;
use crate::layout::{LayoutTree, TerminalSize};

/// Width used when none is configured.
pub const DEFAULT_WIDTH: u16 = 80;

/// Shared handle to the text of the last frame a [`StringRenderer`] drew.
#[derive(Debug, Clone, Default)]
pub struct StringOutput(Arc<Mutex<String>>);

impl StringOutput {
    /// Contents of the last frame.
    pub fn get(&self) -> String {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// Renders frames to a [`StringOutput`] with unlimited height.
#[derive(Debug, Clone)]
pub struct StringRenderer {
    output: StringOutput,
    width: u16,
}

impl StringRenderer {
    pub fn new() -> Self {
        Self {
            output: StringOutput::default(),
            width: DEFAULT_WIDTH,
        }
    }

    /// Lay frames out `width` columns wide. 0 falls back to the default.
    pub fn with_width(mut self, width: u16) -> Self {
        self.width = if width == 0 { DEFAULT_WIDTH } else { width };
        self
    }

    /// Handle for reading what was rendered, usable after the renderer has
    /// been handed to a document.
    pub fn output(&self) -> StringOutput {
        self.output.clone()
    }
}

impl Default for StringRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for StringRenderer {
    fn layout_root(&mut self) -> Result<Option<LayoutTree>> {
        LayoutTree::new(TerminalSize {
            rows: 0,
            cols: self.width,
        })
        .map(Some)
    }

    fn render_root(&mut self, root: &LayoutTree, _prev: Option<PreviousFrame<'_>>) -> Result<()> {
        let mut frame = String::new();
        write_tree(&mut frame, root, root.root(), None).map_err(std::io::Error::other)?;
        *self.output.0.lock().unwrap_or_else(PoisonError::into_inner) = frame;
        Ok(())
    }
}
