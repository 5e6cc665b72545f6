//! # spark-inline
//!
//! Declarative, inline terminal output for Rust.
//!
//! Build a tree of [`Component`]s, hand it to a [`Document`] and let it redraw
//! the live part of your output in place - spinners, progress, timers -
//! while finished output scrolls away untouched.
//!
//! ## Architecture
//!
//! Every frame the document compiles its components into a fresh flexbox
//! layout (computed by [Taffy](https://docs.rs/taffy)), fits leaf text into the
//! boxes it was given and draws the result:
//!
//! ```text
//! Components → compile → Taffy layout → fit leaves → Renderer
//!                                              ↓
//!                         mount/unmount delta, finalize-prune
//! ```
//!
//! Components wrapped with [`finalize`] never change again; once they lead
//! the document they are drawn one last time and dropped from the live tree.
//!
//! ## Modules
//!
//! - [`component`] - the component model and core leaves
//! - [`components`] - containers, spinner, stopwatch, input listener
//! - [`document`] - the render loop
//! - [`layout`] - layout settings, text measurement, the per-frame tree
//! - [`pipeline`] - compile, mount tracking, pruning
//! - [`renderer`] - terminal and string renderers
//! - [`input`] - shared raw input streams

pub mod component;
pub mod components;
pub mod document;
pub mod error;
pub mod input;
pub mod layout;
pub mod pipeline;
pub mod renderer;

pub use component::{
    Component, ComponentKey, ComponentRef, Finalized, Finalizer, Fragment, MountContext, Mounter,
    TerminalSizer, Text, finalize, fragment, text, text_fn,
};

pub use document::{CancelToken, DEFAULT_REFRESH_RATE, Document, RenderHandle};

pub use error::{Error, Result};

pub use input::{InputEvent, InputRegistry, InputStream};

pub use layout::{Direction, Edges, Layout, Overflow};

pub use renderer::{Renderer, StringOutput, StringRenderer, TerminalRenderer};
