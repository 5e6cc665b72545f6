//! Frame Pipeline
//!
//! The steps a document runs for every frame, between asking the renderer
//! for a root and handing it the computed tree:
//!
//! ```text
//! components → compile → Taffy layout → fit leaves → draw → mount delta → prune
//! ```
//!
//! - [`compile`] - component tree to layout nodes
//! - [`MountTracker`] - mount/unmount notifications between frames
//! - [`finalized_prefix`] - how much finalized output can be frozen

pub mod compile;
pub mod mount;
pub mod prune;

pub use compile::compile;
pub use mount::MountTracker;
pub use prune::{Prune, finalized_prefix};
