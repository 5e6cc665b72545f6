//! Finalize-prune.
//!
//! Finalized components at the front of a document are drawn once and then
//! left in the terminal scrollback. This module finds how long that prefix
//! is for a computed frame.

use tracing::trace;

use crate::component::{ComponentRef, same_component};
use crate::layout::LayoutTree;

/// Finalized prefix of the root list found in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Prune {
    /// Number of root components to drop.
    pub count: usize,
    /// Rows those components occupied.
    pub height: usize,
}

/// Measure the contiguous finalized prefix of `roots` as compiled in `tree`.
///
/// Root-level nodes are matched against `roots` slot by slot. Scanning stops
/// at the first node that is not finalized or no longer corresponds to the
/// root component at that position (a fragment at the root, for instance).
pub fn finalized_prefix(tree: &LayoutTree, roots: &[ComponentRef]) -> Prune {
    let mut prune = Prune::default();

    for (node, component) in tree.children(tree.root()).into_iter().zip(roots) {
        let Some(ctx) = tree.context(node) else {
            trace!(index = prune.count, "prune stopped: node without context");
            break;
        };
        if !ctx.finalized {
            break;
        }
        if !same_component(&ctx.component, component) {
            trace!(index = prune.count, "prune stopped: root list mismatch");
            break;
        }

        prune.count += 1;
        prune.height += tree.geometry(node).height;
    }

    prune
}
