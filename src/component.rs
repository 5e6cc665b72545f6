//! Component Model
//!
//! A [`Component`] is a node in the declarative render tree. Containers
//! return another component from [`Component::body`]; terminal leaves return
//! `None` and produce text through [`Component::render`].
//!
//! Optional behaviour is exposed through capability probes that default to
//! "not supported". The compiler and the document ask for each capability
//! independently, so a component opts in by overriding only the probes it
//! needs:
//!
//! | Capability | Probe | Effect |
//! |---|---|---|
//! | [`Finalizer`] | [`Component::as_finalizer`] | told it will never change again |
//! | [`TerminalSizer`] | [`Component::as_terminal_sizer`] | receives the full terminal size |
//! | layout provider | [`Component::layout`] | styles its own layout node |
//! | [`Mounter`] | [`Component::as_mounter`] | receives mount/unmount callbacks |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spark_inline::{Component, ComponentRef, text};
//!
//! struct Greeting;
//!
//! impl Component for Greeting {
//!     fn body(&self) -> Option<ComponentRef> {
//!         Some(Arc::new(text("hello")))
//!     }
//! }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::input::{InputRegistry, OwnerKey};
use crate::layout::Layout;
use crate::renderer::Renderer;

/// Shared handle to a component. Identity is the allocation, not the value.
pub type ComponentRef = Arc<dyn Component>;

// =============================================================================
// Component
// =============================================================================

/// A node in the declarative render tree.
pub trait Component: Send + Sync {
    /// The body of this component, or `None` for a terminal (text) leaf.
    ///
    /// Called once per frame. Components are encouraged to support
    /// finalization (see [`Finalizer`]) so static output can be frozen.
    fn body(&self) -> Option<ComponentRef>;

    /// Text for a terminal leaf, given the box it may occupy.
    ///
    /// `height` and `width` are hints in cells; 0 means unconstrained. The
    /// renderer truncates anything that does not fit the final box.
    fn render(&self, height: usize, width: usize) -> String {
        let _ = (height, width);
        String::new()
    }

    fn as_finalizer(&self) -> Option<&dyn Finalizer> {
        None
    }

    fn as_terminal_sizer(&self) -> Option<&dyn TerminalSizer> {
        None
    }

    /// Layout settings for this component's node.
    fn layout(&self) -> Option<Layout> {
        None
    }

    fn as_mounter(&self) -> Option<&dyn Mounter> {
        None
    }

    /// Children to splice into the parent when this component is a fragment.
    fn fragment_children(&self) -> Option<&[ComponentRef]> {
        None
    }

    /// True for the [`Finalized`] wrapper.
    fn is_finalized(&self) -> bool {
        false
    }
}

/// Notified that a component will be finalized.
///
/// A finalized component is never asked to change again; the body returned
/// after finalization should stay the same. `finalize` may be called once per
/// frame until the component is pruned, so it must be idempotent.
pub trait Finalizer {
    fn finalize(&self);
}

/// Receives the full terminal size before layout, even if its own box ends
/// up smaller.
pub trait TerminalSizer {
    fn set_terminal_size(&self, rows: u16, cols: u16);
}

/// Receives lifecycle callbacks as a component enters and leaves the
/// rendered tree.
///
/// Callbacks run on the rendering thread while the document is locked; they
/// must not call back into the document.
pub trait Mounter {
    fn mount(&self, ctx: &MountContext<'_>);
    fn unmount(&self, ctx: &MountContext<'_>);
}

// =============================================================================
// Identity
// =============================================================================

/// Stable identity of a component allocation.
///
/// Two structurally identical components are distinct instances and get
/// distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentKey(usize);

impl ComponentKey {
    pub fn of(component: &ComponentRef) -> Self {
        Self(Arc::as_ptr(component) as *const () as usize)
    }
}

/// True if both handles point at the same component instance.
pub fn same_component(a: &ComponentRef, b: &ComponentRef) -> bool {
    ComponentKey::of(a) == ComponentKey::of(b)
}

// =============================================================================
// Mount Context
// =============================================================================

/// What a [`Mounter`] can reach while being mounted or unmounted.
pub struct MountContext<'a> {
    renderer: Option<&'a dyn Renderer>,
    owner: OwnerKey,
    inputs: &'a Arc<InputRegistry>,
}

impl<'a> MountContext<'a> {
    pub(crate) fn new(
        renderer: Option<&'a dyn Renderer>,
        owner: OwnerKey,
        inputs: &'a Arc<InputRegistry>,
    ) -> Self {
        Self {
            renderer,
            owner,
            inputs,
        }
    }

    /// The renderer drawing the current frame.
    pub fn renderer(&self) -> Option<&'a dyn Renderer> {
        self.renderer
    }

    /// Key identifying the current renderer in the input registry.
    pub fn owner(&self) -> OwnerKey {
        self.owner
    }

    pub fn inputs(&self) -> &'a Arc<InputRegistry> {
        self.inputs
    }
}

// =============================================================================
// Fragment
// =============================================================================

/// Splices a list of children into its parent without a layout node of its
/// own.
pub struct Fragment {
    children: Vec<ComponentRef>,
}

impl Component for Fragment {
    fn body(&self) -> Option<ComponentRef> {
        None
    }

    fn fragment_children(&self) -> Option<&[ComponentRef]> {
        Some(&self.children)
    }
}

/// Group `children` without adding a level of nesting.
pub fn fragment(children: impl IntoIterator<Item = ComponentRef>) -> Fragment {
    Fragment {
        children: children.into_iter().collect(),
    }
}

// =============================================================================
// Finalized
// =============================================================================

/// Marks a component and everything in its body as never redrawn again.
///
/// Once a finalized component sits at the front of a document and has been
/// drawn, it is left in the scrollback and pruned from the live tree.
pub struct Finalized {
    inner: ComponentRef,
}

impl Finalized {
    pub fn inner(&self) -> &ComponentRef {
        &self.inner
    }
}

impl Component for Finalized {
    fn body(&self) -> Option<ComponentRef> {
        Some(self.inner.clone())
    }

    fn is_finalized(&self) -> bool {
        true
    }
}

/// Wrap `component` so it is finalized. Already-finalized components are
/// returned as-is.
pub fn finalize(component: ComponentRef) -> ComponentRef {
    if component.is_finalized() {
        return component;
    }
    Arc::new(Finalized { inner: component })
}

// =============================================================================
// Text
// =============================================================================

type TextFn = Box<dyn Fn(usize, usize) -> String + Send + Sync>;

/// Where a [`Text`] gets its content from.
enum TextSource {
    Static(Mutex<String>),
    Func(TextFn),
}

/// Terminal leaf that renders text.
///
/// Static text can be changed with [`Text::update`] while a document is
/// rendering it; function text is recomputed every time it is measured.
pub struct Text {
    source: TextSource,
}

impl Text {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            source: TextSource::Static(Mutex::new(content.into())),
        }
    }

    /// Text produced by `f(height, width)` on every measurement.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(usize, usize) -> String + Send + Sync + 'static,
    {
        Self {
            source: TextSource::Func(Box::new(f)),
        }
    }

    /// Replace static content. Function text ignores updates.
    pub fn update(&self, content: impl Into<String>) {
        if let TextSource::Static(text) = &self.source {
            *text.lock().unwrap_or_else(PoisonError::into_inner) = content.into();
        }
    }
}

impl Component for Text {
    fn body(&self) -> Option<ComponentRef> {
        None
    }

    fn render(&self, height: usize, width: usize) -> String {
        match &self.source {
            TextSource::Static(text) => text.lock().unwrap_or_else(PoisonError::into_inner).clone(),
            TextSource::Func(f) => f(height, width),
        }
    }
}

impl fmt::Debug for Text {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            TextSource::Static(_) => f.debug_tuple("Text").field(&self.render(0, 0)).finish(),
            TextSource::Func(_) => f.write_str("Text(<fn>)"),
        }
    }
}

/// Static text leaf.
pub fn text(content: impl Into<String>) -> Text {
    Text::new(content)
}

/// Text leaf computed from the box hints on every measurement.
pub fn text_fn<F>(f: F) -> Text
where
    F: Fn(usize, usize) -> String + Send + Sync + 'static,
{
    Text::from_fn(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_key_is_identity() {
        let a: ComponentRef = Arc::new(text("same"));
        let b: ComponentRef = Arc::new(text("same"));
        let a2 = a.clone();

        assert!(same_component(&a, &a2));
        assert!(!same_component(&a, &b));
    }

    #[test]
    fn test_finalize_does_not_double_wrap() {
        let c: ComponentRef = Arc::new(text("x"));
        let once = finalize(c.clone());
        let twice = finalize(once.clone());

        assert!(once.is_finalized());
        assert!(same_component(&once, &twice));
        assert!(same_component(&once.body().unwrap(), &c));
    }

    #[test]
    fn test_fragment_exposes_children() {
        let f = fragment([Arc::new(text("a")) as ComponentRef, Arc::new(text("b"))]);
        assert_eq!(f.fragment_children().map(<[_]>::len), Some(2));
        assert!(f.body().is_none());
    }

    #[test]
    fn test_text_update_and_fn() {
        let t = text("one");
        t.update("two");
        assert_eq!(t.render(0, 0), "two");

        let sized = text_fn(|h, w| format!("{h}x{w}"));
        assert_eq!(sized.render(3, 40), "3x40");
        sized.update("ignored");
        assert_eq!(sized.render(1, 2), "1x2");
    }
}
