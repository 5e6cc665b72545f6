//! Layout Tree - one frame's worth of Taffy nodes.
//!
//! The tree compiler fills a [`LayoutTree`] with one node per non-fragment
//! component, Taffy resolves the geometry, and the renderer reads it back.
//! Nodes are never reused across frames: every frame builds a fresh tree.
//!
//! Each compiled node carries a [`NodeContext`] pointing back at the
//! component that produced it. Leaves additionally carry a [`TextMeasure`],
//! which caches the text rendered during measurement so the renderer can
//! draw it without asking the component again.

use taffy::{
    AvailableSpace, Dimension as TaffyDimension, FlexDirection as TaffyFlexDirection,
    LengthPercentageAuto, NodeId, Size, Style, TaffyTree,
};

use super::text_measure::{count_lines, longest_line};
use crate::component::ComponentRef;
use crate::error::Result;

// =============================================================================
// Contexts
// =============================================================================

/// Terminal dimensions a frame is laid out for.
///
/// `rows == 0` means the output has no height limit (e.g. a string buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalSize {
    pub rows: u16,
    pub cols: u16,
}

/// Last text a leaf rendered and its natural size.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMeasure {
    pub text: String,
    pub width: usize,
    pub height: usize,
}

/// Back-reference from a layout node to the component that produced it.
#[derive(Clone)]
pub struct NodeContext {
    pub component: ComponentRef,
    /// Set on a finalized wrapper and everything compiled beneath it.
    pub finalized: bool,
    /// Present on terminal (text-producing) leaves only.
    pub text: Option<TextMeasure>,
}

impl NodeContext {
    pub fn new(component: ComponentRef) -> Self {
        Self {
            component,
            finalized: false,
            text: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.text.is_some()
    }
}

// =============================================================================
// Geometry
// =============================================================================

/// Resolved spacing per edge, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EdgeSizes {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

/// Computed box of a node. `left`/`top` are relative to the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Geometry {
    pub left: usize,
    pub top: usize,
    pub width: usize,
    pub height: usize,
    pub margin: EdgeSizes,
    pub padding: EdgeSizes,
}

impl Geometry {
    /// Width available to content once padding is removed.
    pub fn content_width(&self) -> usize {
        self.width
            .saturating_sub(self.padding.left + self.padding.right)
    }

    /// Height available to content once padding is removed.
    pub fn content_height(&self) -> usize {
        self.height
            .saturating_sub(self.padding.top + self.padding.bottom)
    }
}

fn cells(v: f32) -> usize {
    if v.is_finite() && v > 0.0 {
        v.round() as usize
    } else {
        0
    }
}

fn resolved_margin(v: LengthPercentageAuto) -> usize {
    match v {
        LengthPercentageAuto::Length(v) => cells(v),
        _ => 0,
    }
}

// =============================================================================
// Layout Tree
// =============================================================================

/// One frame of compiled layout nodes rooted at a renderer-configured root.
pub struct LayoutTree {
    taffy: TaffyTree<NodeContext>,
    root: NodeId,
    size: TerminalSize,
}

impl LayoutTree {
    /// Create a tree whose root spans `size.cols` columns.
    pub fn new(size: TerminalSize) -> Result<Self> {
        let mut taffy = TaffyTree::new();
        let root = taffy.new_leaf(Style {
            flex_direction: TaffyFlexDirection::Column,
            size: Size {
                width: TaffyDimension::Length(size.cols as f32),
                height: TaffyDimension::Auto,
            },
            ..Default::default()
        })?;

        Ok(Self { taffy, root, size })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn terminal_size(&self) -> TerminalSize {
        self.size
    }

    /// Append a node with `style` and `ctx` as the last child of `parent`.
    pub fn add_node(&mut self, parent: NodeId, style: Style, ctx: NodeContext) -> Result<NodeId> {
        let node = self.taffy.new_leaf_with_context(style, ctx)?;
        self.taffy.add_child(parent, node)?;
        Ok(node)
    }

    /// Resolve geometry for the whole tree, measuring leaves as needed.
    pub fn compute(&mut self) -> Result<()> {
        let available = Size {
            width: AvailableSpace::Definite(self.size.cols as f32),
            height: AvailableSpace::MaxContent,
        };
        let max_width = self.size.cols as usize;

        self.taffy.compute_layout_with_measure(
            self.root,
            available,
            |known, available, _node, ctx, _style| measure_node(known, available, max_width, ctx),
        )?;
        Ok(())
    }

    /// Children of `node` in document order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.taffy.children(node).unwrap_or_default()
    }

    pub fn context(&self, node: NodeId) -> Option<&NodeContext> {
        self.taffy.get_node_context(node)
    }

    pub fn context_mut(&mut self, node: NodeId) -> Option<&mut NodeContext> {
        self.taffy.get_node_context_mut(node)
    }

    /// Computed geometry of `node`. Zero for unknown nodes.
    pub fn geometry(&self, node: NodeId) -> Geometry {
        let Ok(layout) = self.taffy.layout(node) else {
            return Geometry::default();
        };

        // Taffy does not report resolved margins; ours are always absolute
        // lengths, so the style holds the resolved value.
        let margin = self
            .taffy
            .style(node)
            .map(|style| EdgeSizes {
                top: resolved_margin(style.margin.top),
                right: resolved_margin(style.margin.right),
                bottom: resolved_margin(style.margin.bottom),
                left: resolved_margin(style.margin.left),
            })
            .unwrap_or_default();

        Geometry {
            left: cells(layout.location.x),
            top: cells(layout.location.y),
            width: cells(layout.size.width),
            height: cells(layout.size.height),
            margin,
            padding: EdgeSizes {
                top: cells(layout.padding.top),
                right: cells(layout.padding.right),
                bottom: cells(layout.padding.bottom),
                left: cells(layout.padding.left),
            },
        }
    }

    /// Total computed height of the frame.
    pub fn height(&self) -> usize {
        self.geometry(self.root).height
    }

    /// Every node below the root, depth-first in document order.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(self.root).into_iter().rev().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).into_iter().rev());
        }
        out
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// Convert a Taffy constraint into a render hint.
///
/// Content-sized probes (min/max content) have no number attached and fall
/// back to `at_most`. 0 means unconstrained.
fn hint(known: Option<f32>, available: AvailableSpace, at_most: usize) -> usize {
    match (known, available) {
        (Some(v), _) => cells(v),
        (None, AvailableSpace::Definite(v)) => cells(v),
        (None, _) => at_most,
    }
}

/// Render a leaf's component at the given hints and cache the result.
pub fn measure_leaf(ctx: &mut NodeContext, height: usize, width: usize) -> Option<&TextMeasure> {
    if !ctx.is_leaf() {
        return None;
    }

    let text = ctx.component.render(height, width);
    let measure = ctx.text.get_or_insert_with(TextMeasure::default);
    measure.width = longest_line(&text);
    measure.height = count_lines(&text);
    measure.text = text;
    Some(measure)
}

/// Measurement callback handed to the layout engine.
///
/// Nodes without a text context keep whatever size the engine proposed.
/// Leaves render their text and report its natural size. Flex basis probes
/// offer a leaf at most `max_width` columns, so width-filling text still
/// claims space inside a row.
pub fn measure_node(
    known: Size<Option<f32>>,
    available: Size<AvailableSpace>,
    max_width: usize,
    ctx: Option<&mut NodeContext>,
) -> Size<f32> {
    let proposed = Size {
        width: known.width.unwrap_or(0.0),
        height: known.height.unwrap_or(0.0),
    };

    let Some(ctx) = ctx.filter(|ctx| ctx.is_leaf()) else {
        return proposed;
    };

    let height = hint(known.height, available.height, 0);
    let width = hint(known.width, available.width, max_width);
    match measure_leaf(ctx, height, width) {
        Some(measure) => Size {
            width: known.width.unwrap_or(measure.width as f32),
            height: known.height.unwrap_or(measure.height as f32),
        },
        None => proposed,
    }
}
