//! Tree walk shared by all renderers.

use std::fmt::{self, Write};

use taffy::NodeId;

use crate::layout::{
    LayoutTree, clamp_text_width, count_lines, longest_line, measure_leaf, truncate_text_height,
};

/// Give leaves that ended up in a smaller box than they asked for a chance
/// to reflow, then cut whatever still does not fit.
///
/// After this, every leaf's cached text fits its final content box.
pub fn fit_leaves(tree: &mut LayoutTree) {
    for node in tree.descendants() {
        let geometry = tree.geometry(node);
        let height = geometry.content_height();
        let width = geometry.content_width();

        let Some(ctx) = tree.context_mut(node) else {
            continue;
        };
        let Some(measure) = ctx.text.as_ref() else {
            continue;
        };
        if height >= measure.height && width >= measure.width {
            continue;
        }

        measure_leaf(ctx, height, width);
        if let Some(measure) = ctx.text.as_mut() {
            let fitted = clamp_text_width(truncate_text_height(&measure.text, height), width);
            measure.width = longest_line(&fitted);
            measure.height = count_lines(&fitted);
            measure.text = fitted;
        }
    }
}

fn spaces(out: &mut impl Write, n: usize) -> fmt::Result {
    for _ in 0..n {
        out.write_char(' ')?;
    }
    Ok(())
}

/// Draw the children of `parent` in document order.
///
/// A newline is emitted whenever a child sits lower than its previous
/// sibling, so children that share a row (a spinner followed by its label)
/// are drawn on one line. Margins and padding on the left and right are
/// drawn as spaces. `last_row` is the row of the previously drawn node at
/// this level, `None` before anything was drawn.
pub fn write_tree(
    out: &mut impl Write,
    tree: &LayoutTree,
    parent: NodeId,
    mut last_row: Option<usize>,
) -> fmt::Result {
    for child in tree.children(parent) {
        let geometry = tree.geometry(child);
        // Occupies no row (an input listener, empty text).
        if geometry.height == 0 {
            continue;
        }
        if last_row.is_some_and(|row| geometry.top > row) {
            out.write_char('\n')?;
        }
        last_row = Some(geometry.top);

        spaces(out, geometry.margin.left + geometry.padding.left)?;

        match tree.context(child).and_then(|ctx| ctx.text.as_ref()) {
            Some(measure) => out.write_str(&measure.text)?,
            None => write_tree(out, tree, child, last_row)?,
        }

        spaces(out, geometry.padding.right + geometry.margin.right)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::component::{Component, ComponentRef, fragment, text};
    use crate::layout::{Edges, Layout, TerminalSize};
    use crate::pipeline::compile;

    struct Group {
        children: Vec<ComponentRef>,
        layout: Layout,
    }

    impl Component for Group {
        fn body(&self) -> Option<ComponentRef> {
            Some(Arc::new(fragment(self.children.iter().cloned())))
        }

        fn layout(&self) -> Option<Layout> {
            Some(self.layout.clone())
        }
    }

    fn group(layout: Layout, children: Vec<ComponentRef>) -> ComponentRef {
        Arc::new(Group { children, layout })
    }

    fn draw(cols: u16, roots: Vec<ComponentRef>) -> String {
        let mut tree = LayoutTree::new(TerminalSize { rows: 0, cols }).unwrap();
        let root = tree.root();
        let all: ComponentRef = Arc::new(fragment(roots));
        compile(&mut tree, root, Some(&all), false).unwrap();
        tree.compute().unwrap();
        fit_leaves(&mut tree);

        let mut out = String::new();
        write_tree(&mut out, &tree, root, None).unwrap();
        out
    }

    #[test]
    fn test_column_of_leaves() {
        let out = draw(80, vec![Arc::new(text("one")), Arc::new(text("two\nthree"))]);
        assert_eq!(out, "one\ntwo\nthree");
    }

    #[test]
    fn test_row_shares_a_line() {
        let out = draw(
            80,
            vec![
                group(
                    Layout::new().row(),
                    vec![
                        Arc::new(text("-")),
                        group(Layout::new().margin(Edges::LEFT, 1), vec![Arc::new(text("working"))]),
                    ],
                ),
                Arc::new(text("next")),
            ],
        );
        assert_eq!(out, "- working\nnext");
    }

    #[test]
    fn test_margin_and_padding_as_spaces() {
        let out = draw(
            80,
            vec![group(
                Layout::new().margin(Edges::LEFT, 2).padding(Edges::LEFT, 1),
                vec![Arc::new(text("indented"))],
            )],
        );
        assert_eq!(out, "   indented");
    }

    #[test]
    fn test_empty_leaf_draws_nothing() {
        let out = draw(80, vec![Arc::new(text("a")), Arc::new(text(""))]);
        assert_eq!(out, "a");
    }

    #[test]
    fn test_leaf_clamped_to_box() {
        let out = draw(5, vec![Arc::new(text("hello world\nok"))]);
        assert_eq!(out, "hello\nok");
    }

    #[test]
    fn test_leaf_reflows_into_box() {
        let reflowing: ComponentRef = Arc::new(crate::component::text_fn(|_, width| {
            if width > 0 && width < 10 { "short".into() } else { "a rather long line".into() }
        }));
        let out = draw(8, vec![reflowing]);
        assert_eq!(out, "short");
    }

    #[test]
    fn test_max_height_truncates() {
        let out = draw(
            80,
            vec![group(
                Layout::new().max_height(2).overflow(crate::layout::Overflow::Hidden),
                vec![Arc::new(text("a\nb\nc\nd"))],
            )],
        );
        assert_eq!(out, "a\nb");
    }
}
