//! Declarative layout settings.
//!
//! Components that want control over their own layout node return a
//! [`Layout`] from [`Component::layout`](crate::Component::layout). The
//! settings are applied on top of the compiler's defaults, so anything left
//! unset keeps the default behaviour.

use bitflags::bitflags;
use taffy::{
    Dimension as TaffyDimension, FlexDirection as TaffyFlexDirection, LengthPercentage,
    LengthPercentageAuto, Overflow as TaffyOverflow, Style,
};

// =============================================================================
// Edges
// =============================================================================

bitflags! {
    /// Set of box edges a margin or padding value applies to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Edges: u8 {
        const TOP = 0b0001;
        const RIGHT = 0b0010;
        const BOTTOM = 0b0100;
        const LEFT = 0b1000;

        const HORIZONTAL = Self::LEFT.bits() | Self::RIGHT.bits();
        const VERTICAL = Self::TOP.bits() | Self::BOTTOM.bits();
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

// =============================================================================
// Enums
// =============================================================================

/// Main axis of a layout container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Children stack vertically (one row each).
    #[default]
    Column,
    /// Children share a row, left to right.
    Row,
}

impl From<Direction> for TaffyFlexDirection {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Column => TaffyFlexDirection::Column,
            Direction::Row => TaffyFlexDirection::Row,
        }
    }
}

/// What happens to content that does not fit its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

impl From<Overflow> for TaffyOverflow {
    fn from(overflow: Overflow) -> Self {
        match overflow {
            Overflow::Visible => TaffyOverflow::Visible,
            Overflow::Hidden => TaffyOverflow::Hidden,
            Overflow::Scroll => TaffyOverflow::Scroll,
        }
    }
}

// =============================================================================
// Layout
// =============================================================================

/// Per-edge spacing in cells.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Spacing {
    top: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
    left: Option<f32>,
}

impl Spacing {
    fn set(&mut self, edges: Edges, cells: u16) {
        let v = Some(cells as f32);
        if edges.contains(Edges::TOP) {
            self.top = v;
        }
        if edges.contains(Edges::RIGHT) {
            self.right = v;
        }
        if edges.contains(Edges::BOTTOM) {
            self.bottom = v;
        }
        if edges.contains(Edges::LEFT) {
            self.left = v;
        }
    }
}

/// Layout settings for a single node.
///
/// Built fluently; each call returns the updated settings:
///
/// ```
/// use spark_inline::{Edges, Layout};
///
/// let layout = Layout::new().row().margin(Edges::LEFT, 2).min_height(1);
/// assert!(!layout.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    direction: Option<Direction>,
    margin: Spacing,
    padding: Spacing,
    width: Option<f32>,
    height: Option<f32>,
    min_width: Option<f32>,
    min_height: Option<f32>,
    max_width: Option<f32>,
    max_height: Option<f32>,
    grow: Option<f32>,
    shrink: Option<f32>,
    overflow: Option<Overflow>,
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no setting has been made.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Lay children out side by side.
    pub fn row(self) -> Self {
        self.direction(Direction::Row)
    }

    /// Stack children vertically.
    pub fn column(self) -> Self {
        self.direction(Direction::Column)
    }

    pub fn margin(mut self, edges: Edges, cells: u16) -> Self {
        self.margin.set(edges, cells);
        self
    }

    pub fn padding(mut self, edges: Edges, cells: u16) -> Self {
        self.padding.set(edges, cells);
        self
    }

    pub fn width(mut self, cells: u16) -> Self {
        self.width = Some(cells as f32);
        self
    }

    pub fn height(mut self, cells: u16) -> Self {
        self.height = Some(cells as f32);
        self
    }

    pub fn min_width(mut self, cells: u16) -> Self {
        self.min_width = Some(cells as f32);
        self
    }

    pub fn min_height(mut self, cells: u16) -> Self {
        self.min_height = Some(cells as f32);
        self
    }

    pub fn max_width(mut self, cells: u16) -> Self {
        self.max_width = Some(cells as f32);
        self
    }

    pub fn max_height(mut self, cells: u16) -> Self {
        self.max_height = Some(cells as f32);
        self
    }

    pub fn grow(mut self, factor: f32) -> Self {
        self.grow = Some(factor);
        self
    }

    pub fn shrink(mut self, factor: f32) -> Self {
        self.shrink = Some(factor);
        self
    }

    pub fn overflow(mut self, overflow: Overflow) -> Self {
        self.overflow = Some(overflow);
        self
    }

    /// Apply the settings that were made onto `style`.
    pub fn apply(&self, style: &mut Style) {
        if let Some(dir) = self.direction {
            style.flex_direction = dir.into();
        }

        apply_margin(&self.margin, style);
        apply_padding(&self.padding, style);

        if let Some(v) = self.width {
            style.size.width = TaffyDimension::Length(v);
        }
        if let Some(v) = self.height {
            style.size.height = TaffyDimension::Length(v);
        }
        if let Some(v) = self.min_width {
            style.min_size.width = TaffyDimension::Length(v);
        }
        if let Some(v) = self.min_height {
            style.min_size.height = TaffyDimension::Length(v);
        }
        if let Some(v) = self.max_width {
            style.max_size.width = TaffyDimension::Length(v);
        }
        if let Some(v) = self.max_height {
            style.max_size.height = TaffyDimension::Length(v);
        }
        if let Some(v) = self.grow {
            style.flex_grow = v;
        }
        if let Some(v) = self.shrink {
            style.flex_shrink = v;
        }
        if let Some(overflow) = self.overflow {
            style.overflow.x = overflow.into();
            style.overflow.y = overflow.into();
        }
    }
}

fn apply_margin(spacing: &Spacing, style: &mut Style) {
    if let Some(v) = spacing.top {
        style.margin.top = LengthPercentageAuto::Length(v);
    }
    if let Some(v) = spacing.right {
        style.margin.right = LengthPercentageAuto::Length(v);
    }
    if let Some(v) = spacing.bottom {
        style.margin.bottom = LengthPercentageAuto::Length(v);
    }
    if let Some(v) = spacing.left {
        style.margin.left = LengthPercentageAuto::Length(v);
    }
}

fn apply_padding(spacing: &Spacing, style: &mut Style) {
    if let Some(v) = spacing.top {
        style.padding.top = LengthPercentage::Length(v);
    }
    if let Some(v) = spacing.right {
        style.padding.right = LengthPercentage::Length(v);
    }
    if let Some(v) = spacing.bottom {
        style.padding.bottom = LengthPercentage::Length(v);
    }
    if let Some(v) = spacing.left {
        style.padding.left = LengthPercentage::Length(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_groups() {
        assert_eq!(Edges::HORIZONTAL, Edges::LEFT | Edges::RIGHT);
        assert!(Edges::ALL.contains(Edges::VERTICAL));
    }

    #[test]
    fn test_empty_layout_leaves_style_untouched() {
        let mut style = Style::default();
        Layout::new().apply(&mut style);
        assert_eq!(style, Style::default());
        assert!(Layout::new().is_empty());
    }

    #[test]
    fn test_margin_applies_to_selected_edges() {
        let mut style = Style::default();
        Layout::new().margin(Edges::HORIZONTAL, 2).apply(&mut style);

        assert_eq!(style.margin.left, LengthPercentageAuto::Length(2.0));
        assert_eq!(style.margin.right, LengthPercentageAuto::Length(2.0));
        assert_eq!(style.margin.top, Style::default().margin.top);
    }

    #[test]
    fn test_later_settings_win() {
        let mut style = Style::default();
        Layout::new()
            .padding(Edges::ALL, 1)
            .padding(Edges::LEFT, 3)
            .row()
            .overflow(Overflow::Hidden)
            .apply(&mut style);

        assert_eq!(style.padding.left, LengthPercentage::Length(3.0));
        assert_eq!(style.padding.top, LengthPercentage::Length(1.0));
        assert_eq!(style.flex_direction, TaffyFlexDirection::Row);
        assert_eq!(style.overflow.x, TaffyOverflow::Hidden);
    }
}
