//! Inline renderer for normal terminal mode.
//!
//! Draws into the normal screen buffer (no alternate screen) and redraws the
//! live part of the document in place every frame. Finalized output that the
//! document pruned stays behind in the scrollback.

use std::io::{self, IsTerminal, Write};

use crossterm::queue;
use crossterm::terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate};
use tracing::trace;

use super::diff::{erase_action, write_erase};
use super::tree::write_tree;
use super::{PreviousFrame, Renderer};
use crate::error::Result;
use crate::input::InputStream;
use crate::layout::{LayoutTree, TerminalSize};

/// Renders a document inline to a terminal.
pub struct TerminalRenderer {
    output: Box<dyn Write + Send>,
    size: Option<TerminalSize>,
    detect_size: bool,
    stdin_input: bool,
    buffer: Vec<u8>,
}

impl TerminalRenderer {
    /// Render to an arbitrary writer. A size must be set with
    /// [`with_size`](Self::with_size), otherwise frames are skipped.
    pub fn new(output: impl Write + Send + 'static) -> Self {
        Self {
            output: Box::new(output),
            size: None,
            detect_size: false,
            stdin_input: false,
            buffer: Vec::with_capacity(16384),
        }
    }

    /// Render to stdout, sized from the terminal and reading input from
    /// stdin.
    ///
    /// When stdout is not a terminal and no size is set, nothing is drawn.
    pub fn stdout() -> Self {
        Self {
            detect_size: true,
            stdin_input: true,
            ..Self::new(io::stdout())
        }
    }

    /// Use a fixed size instead of querying the terminal.
    pub fn with_size(mut self, rows: u16, cols: u16) -> Self {
        self.size = Some(TerminalSize { rows, cols });
        self
    }

    fn terminal_size(&self) -> Option<TerminalSize> {
        if let Some(size) = self.size {
            return Some(size);
        }
        if !self.detect_size || !io::stdout().is_terminal() {
            return None;
        }
        crossterm::terminal::size()
            .ok()
            .map(|(cols, rows)| TerminalSize { rows, cols })
    }
}

impl Renderer for TerminalRenderer {
    fn layout_root(&mut self) -> Result<Option<LayoutTree>> {
        let Some(size) = self.terminal_size() else {
            trace!("no terminal size, skipping frame");
            return Ok(None);
        };
        if size.rows == 0 || size.cols == 0 {
            return Ok(None);
        }
        LayoutTree::new(size).map(Some)
    }

    fn render_root(&mut self, root: &LayoutTree, prev: Option<PreviousFrame<'_>>) -> Result<()> {
        let mut tree_text = String::new();
        write_tree(&mut tree_text, root, root.root(), None).map_err(io::Error::other)?;

        self.buffer.clear();
        queue!(self.buffer, BeginSynchronizedUpdate)?;
        let rows = root.terminal_size().rows;
        write_erase(&mut self.buffer, erase_action(prev.as_ref(), rows))?;
        self.buffer.extend_from_slice(tree_text.as_bytes());
        queue!(self.buffer, EndSynchronizedUpdate)?;

        self.output.write_all(&self.buffer)?;
        self.output.flush()?;
        Ok(())
    }

    fn input_stream(&self) -> Option<InputStream> {
        self.stdin_input.then(InputStream::stdin)
    }
}
