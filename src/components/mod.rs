//! Components - ready-made building blocks.
//!
//! - [`Container`] - groups children under a layout (row, margins, padding)
//! - [`Spinner`] - a one-cell activity indicator, advanced every frame
//! - [`Stopwatch`] - time elapsed since a start instant
//! - [`Input`] - receives raw input while it is mounted
//!
//! Plain text comes from [`text`](crate::text) and
//! [`text_fn`](crate::text_fn).

mod container;
mod input;
mod spinner;
mod stopwatch;

pub use container::{Container, container};
pub use input::{Input, input};
pub use spinner::{Spinner, spinner};
pub use stopwatch::{Stopwatch, format_elapsed, stopwatch};
