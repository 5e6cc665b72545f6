//! Renderer Module
//!
//! Renderers configure the root of each frame's layout and draw the computed
//! tree. Two are provided:
//!
//! - [`TerminalRenderer`] - redraws in place using cursor-control sequences
//! - [`StringRenderer`] - writes the frame to a string, for tests and snapshots
//!
//! Both share the same tree walk ([`write_tree`]); they differ only in what
//! happens to the previous frame before drawing (see [`erase_action`]).

mod diff;
mod inline;
mod string;
mod tree;

pub use diff::{EraseAction, erase_action, write_erase};
pub use inline::TerminalRenderer;
pub use string::{StringOutput, StringRenderer};
pub use tree::{fit_leaves, write_tree};

use crate::error::Result;
use crate::input::InputStream;
use crate::layout::LayoutTree;

/// What the renderer drew last frame.
#[derive(Clone, Copy)]
pub struct PreviousFrame<'a> {
    /// The computed tree of the previous frame.
    pub tree: &'a LayoutTree,
    /// Rows of the previous frame still live on screen, after finalized
    /// output was pruned into the scrollback.
    pub height: usize,
    /// Rows the previous frame drew before pruning.
    pub drawn: usize,
}

/// Configures layout roots and draws computed frames.
pub trait Renderer: Send {
    /// A fresh root for the next frame, sized to the output.
    ///
    /// Returning `None` skips the frame, e.g. when the output is not a
    /// terminal and no explicit size was configured.
    fn layout_root(&mut self) -> Result<Option<LayoutTree>>;

    /// Draw the computed tree rooted at `root`. `prev` is `None` on the
    /// first frame.
    fn render_root(&mut self, root: &LayoutTree, prev: Option<PreviousFrame<'_>>) -> Result<()>;

    /// Raw input stream backing this output, used by input components.
    ///
    /// `None` means input is unsupported; subscribers then see end-of-stream.
    fn input_stream(&self) -> Option<InputStream> {
        None
    }
}
