//! Tree Compiler - components to layout nodes.
//!
//! Walks a component tree, expanding containers through their body,
//! splicing fragments into their parent, applying layout settings and
//! propagating finalization. The result is one layout node per
//! non-fragment component; leaves carry a text measurement context.

use taffy::{
    Dimension as TaffyDimension, FlexDirection as TaffyFlexDirection, NodeId, Style,
};

use crate::component::ComponentRef;
use crate::error::Result;
use crate::layout::{LayoutTree, NodeContext, TextMeasure};

/// Style every compiled node starts from: a vertical stack.
fn base_style() -> Style {
    Style {
        flex_direction: TaffyFlexDirection::Column,
        ..Default::default()
    }
}

/// Defaults for an inline text run. Applied after the component's own
/// layout so they describe how text behaves, not how it is placed.
fn leaf_style(style: &mut Style) {
    style.flex_shrink = 1.0;
    style.flex_grow = 0.0;
    style.flex_direction = TaffyFlexDirection::Row;

    // Let text shrink below its natural size so it can be truncated, unless
    // the component asked for a minimum itself.
    if style.min_size.width == TaffyDimension::Auto {
        style.min_size.width = TaffyDimension::Length(0.0);
    }
    if style.min_size.height == TaffyDimension::Auto {
        style.min_size.height = TaffyDimension::Length(0.0);
    }
}

/// Compile `component` into `tree` beneath `parent`.
///
/// `finalize` is true when an ancestor was wrapped by
/// [`Finalized`](crate::Finalized); every component compiled under it is
/// notified through its [`Finalizer`](crate::Finalizer) capability.
pub fn compile(
    tree: &mut LayoutTree,
    parent: NodeId,
    component: Option<&ComponentRef>,
    mut finalize: bool,
) -> Result<()> {
    let Some(component) = component else {
        return Ok(());
    };

    // Fragments don't create a node
    if let Some(children) = component.fragment_children() {
        for child in children {
            compile(tree, parent, Some(child), finalize)?;
        }
        return Ok(());
    }

    if let Some(sizer) = component.as_terminal_sizer() {
        let size = tree.terminal_size();
        sizer.set_terminal_size(size.rows, size.cols);
    }

    let mut ctx = NodeContext::new(component.clone());
    if component.is_finalized() {
        finalize = true;
    }
    if finalize {
        ctx.finalized = true;
        if let Some(finalizer) = component.as_finalizer() {
            finalizer.finalize();
        }
    }

    let mut style = base_style();
    if let Some(layout) = component.layout() {
        layout.apply(&mut style);
    }

    match component.body() {
        None => {
            leaf_style(&mut style);
            ctx.text = Some(TextMeasure::default());
            tree.add_node(parent, style, ctx)?;
        }
        Some(body) => {
            let node = tree.add_node(parent, style, ctx)?;
            compile(tree, node, Some(&body), finalize)?;
        }
    }

    Ok(())
}
