//! Document - the render loop.
//!
//! A [`Document`] owns the list of root components and drives frames:
//!
//! ```text
//! layout_root → compile → compute → fit leaves → render_root
//!             → mount delta → prune finalized prefix → remember frame
//! ```
//!
//! All state sits behind one mutex, so frames never overlap and components
//! can be appended from any thread while a render loop is running.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use spark_inline::{ComponentRef, Document, StringRenderer, text};
//!
//! let doc = Document::new();
//! let renderer = StringRenderer::new();
//! let output = renderer.output();
//! doc.set_renderer(renderer);
//!
//! doc.append([Arc::new(text("hello")) as ComponentRef]);
//! doc.render_frame();
//! assert_eq!(output.get(), "hello");
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use crate::component::{ComponentRef, MountContext, finalize, fragment};
use crate::error::Result;
use crate::input::{InputRegistry, OwnerKey};
use crate::layout::LayoutTree;
use crate::pipeline::{MountTracker, compile, finalized_prefix};
use crate::renderer::{PreviousFrame, Renderer, fit_leaves};

/// Interval between frames of [`Document::render`] unless configured.
pub const DEFAULT_REFRESH_RATE: Duration = Duration::from_nanos(1_000_000_000 / 24);

// =============================================================================
// Document
// =============================================================================

struct DocumentState {
    components: Vec<ComponentRef>,
    renderer: Option<Box<dyn Renderer>>,
    owner: OwnerKey,
    refresh_rate: Duration,
    mounts: MountTracker,

    /// Tree of the last drawn frame.
    prev: Option<LayoutTree>,
    /// Rows of `prev` still live after pruning.
    prev_height: usize,
    /// Rows `prev` drew.
    prev_drawn: usize,
}

/// A live region of terminal output built from components.
pub struct Document {
    state: Mutex<DocumentState>,
    inputs: Arc<InputRegistry>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DocumentState {
                components: Vec::new(),
                renderer: None,
                owner: OwnerKey::next(),
                refresh_rate: DEFAULT_REFRESH_RATE,
                mounts: MountTracker::new(),
                prev: None,
                prev_height: 0,
                prev_drawn: 0,
            }),
            inputs: Arc::new(InputRegistry::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DocumentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add components after the existing ones.
    pub fn append(&self, components: impl IntoIterator<Item = ComponentRef>) {
        self.lock().components.extend(components);
    }

    /// Replace all components.
    pub fn set(&self, components: impl IntoIterator<Item = ComponentRef>) {
        self.lock().components = components.into_iter().collect();
    }

    /// Number of root components that have not been pruned.
    pub fn len(&self) -> usize {
        self.lock().components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().components.is_empty()
    }

    /// Draw with `renderer` from the next frame on.
    pub fn set_renderer(&self, renderer: impl Renderer + 'static) {
        let mut state = self.lock();
        state.renderer = Some(Box::new(renderer));
        state.owner = OwnerKey::next();
    }

    pub fn set_refresh_rate(&self, rate: Duration) {
        self.lock().refresh_rate = rate;
    }

    pub fn refresh_rate(&self) -> Duration {
        self.lock().refresh_rate
    }

    /// Registry of input managers used by input components in this
    /// document.
    pub fn inputs(&self) -> &Arc<InputRegistry> {
        &self.inputs
    }

    /// Render one frame.
    ///
    /// Without a renderer, or when the renderer declines to provide a root,
    /// nothing happens. Errors abort the frame and are logged.
    pub fn render_frame(&self) {
        let mut state = self.lock();
        if let Err(err) = self.frame(&mut state) {
            warn!(%err, "frame aborted");
        }
    }

    fn frame(&self, state: &mut DocumentState) -> Result<()> {
        let Some(renderer) = state.renderer.as_mut() else {
            return Ok(());
        };
        let Some(mut tree) = renderer.layout_root()? else {
            return Ok(());
        };

        let root = tree.root();
        let all: ComponentRef = Arc::new(fragment(state.components.iter().cloned()));
        compile(&mut tree, root, Some(&all), false)?;
        tree.compute()?;
        fit_leaves(&mut tree);

        let prev = state.prev.as_ref().map(|prev_tree| PreviousFrame {
            tree: prev_tree,
            height: state.prev_height,
            drawn: state.prev_drawn,
        });
        renderer.render_root(&tree, prev)?;

        let ctx = MountContext::new(Some(&**renderer), state.owner, &self.inputs);
        state.mounts.update(&tree, &ctx);

        let prune = finalized_prefix(&tree, &state.components);
        state.components.drain(..prune.count);

        let drawn = tree.height();
        debug!(height = drawn, pruned = prune.count, "frame rendered");
        state.prev_height = drawn.saturating_sub(prune.height);
        state.prev_drawn = drawn;
        state.prev = Some(tree);
        Ok(())
    }

    /// Render frames at the refresh rate until `cancel` is cancelled.
    ///
    /// A frame in progress when cancellation arrives is completed.
    pub fn render(&self, cancel: &CancelToken) {
        while !cancel.is_cancelled() {
            self.render_frame();
            if cancel.wait_timeout(self.refresh_rate()) {
                break;
            }
        }
    }

    /// Run [`render`](Self::render) on a background thread.
    pub fn spawn_render(self: &Arc<Self>) -> Result<RenderHandle> {
        let cancel = CancelToken::new();
        let doc = self.clone();
        let token = cancel.clone();
        let thread = thread::Builder::new()
            .name("spark-inline-render".to_string())
            .spawn(move || doc.render(&token))?;

        Ok(RenderHandle {
            cancel,
            thread: Some(thread),
        })
    }

    /// Finalize every component and render the last frames.
    ///
    /// The first frame draws the finalized output and prunes it; the second
    /// delivers unmount notifications for everything that was pruned.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            for component in state.components.iter_mut() {
                *component = finalize(component.clone());
            }
        }

        self.render_frame();
        self.render_frame();
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Cancellation
// =============================================================================

/// Cooperative cancellation for [`Document::render`].
#[derive(Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel and wake anything waiting on this token.
    pub fn cancel(&self) {
        let (cancelled, wake) = &*self.inner;
        *cancelled.lock().unwrap_or_else(PoisonError::into_inner) = true;
        wake.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` or until cancelled. Returns true if cancelled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let (cancelled, wake) = &*self.inner;
        let guard = cancelled.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = wake
            .wait_timeout_while(guard, timeout, |cancelled| !*cancelled)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// A render loop running on a background thread. Dropping it stops the
/// loop and waits for the current frame to finish.
pub struct RenderHandle {
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
}

impl RenderHandle {
    /// Token that stops this loop when cancelled.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Stop the loop and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!("render thread panicked");
            }
        }
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
