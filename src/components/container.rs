//! Layout container.

use std::sync::Arc;

use crate::component::{Component, ComponentRef, fragment};
use crate::layout::{Edges, Layout, Overflow};

/// Lays its children out according to a [`Layout`].
///
/// ```
/// use std::sync::Arc;
/// use spark_inline::{ComponentRef, Edges, components::container, text};
///
/// let status = container([Arc::new(text("-")) as ComponentRef, Arc::new(text("working"))])
///     .row()
///     .margin(Edges::LEFT, 2);
/// ```
pub struct Container {
    children: Vec<ComponentRef>,
    layout: Layout,
}

impl Container {
    pub fn new(children: impl IntoIterator<Item = ComponentRef>) -> Self {
        Self {
            children: children.into_iter().collect(),
            layout: Layout::new(),
        }
    }

    /// Replace the layout wholesale.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn row(mut self) -> Self {
        self.layout = self.layout.row();
        self
    }

    pub fn column(mut self) -> Self {
        self.layout = self.layout.column();
        self
    }

    pub fn margin(mut self, edges: Edges, cells: u16) -> Self {
        self.layout = self.layout.margin(edges, cells);
        self
    }

    pub fn padding(mut self, edges: Edges, cells: u16) -> Self {
        self.layout = self.layout.padding(edges, cells);
        self
    }

    pub fn min_width(mut self, cells: u16) -> Self {
        self.layout = self.layout.min_width(cells);
        self
    }

    pub fn min_height(mut self, cells: u16) -> Self {
        self.layout = self.layout.min_height(cells);
        self
    }

    pub fn max_height(mut self, cells: u16) -> Self {
        self.layout = self.layout.max_height(cells);
        self
    }

    pub fn grow(mut self, factor: f32) -> Self {
        self.layout = self.layout.grow(factor);
        self
    }

    pub fn shrink(mut self, factor: f32) -> Self {
        self.layout = self.layout.shrink(factor);
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.layout = self.layout.overflow(overflow);
        self
    }
}

impl Component for Container {
    fn body(&self) -> Option<ComponentRef> {
        Some(Arc::new(fragment(self.children.iter().cloned())))
    }

    fn layout(&self) -> Option<Layout> {
        Some(self.layout.clone())
    }
}

pub fn container(children: impl IntoIterator<Item = ComponentRef>) -> Container {
    Container::new(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::text;

    #[test]
    fn test_container_exposes_layout() {
        let c = container([Arc::new(text("a")) as ComponentRef]).row().min_height(2);
        assert_eq!(c.layout(), Some(Layout::new().row().min_height(2)));

        let body = c.body().unwrap();
        assert_eq!(body.fragment_children().map(<[_]>::len), Some(1));
    }
}
