//! Layout Module
//!
//! Flexbox layout for live terminal output using Taffy.
//!
//! # Architecture
//!
//! 1. The tree compiler turns components into Taffy nodes ([`LayoutTree`])
//! 2. [`Layout`] settings from components are applied onto node styles
//! 3. Leaves are sized by a measure callback that renders their text
//! 4. Computed geometry is read back by the renderer
//!
//! Text measurement ([`count_lines`], [`longest_line`]) and the truncation
//! helpers used when a leaf ends up in a smaller box live here too, since the
//! measure callback and the renderer share them.

mod style;
mod text_measure;
mod tree;

pub use style::{Direction, Edges, Layout, Overflow};
pub use text_measure::{clamp_text_width, count_lines, longest_line, truncate_text_height};
pub use tree::{
    EdgeSizes, Geometry, LayoutTree, NodeContext, TerminalSize, TextMeasure, measure_leaf,
    measure_node,
};
