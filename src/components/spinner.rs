//! Spinner.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::component::{Component, ComponentRef, Finalizer, text};

const DEFAULT_FRAMES: &[&str] = &["|", "/", "-", "\\"];

/// Shows the next frame of an animation each time it is rendered.
///
/// Once finalized it keeps showing the frame it was on.
pub struct Spinner {
    frames: Vec<String>,
    next: AtomicUsize,
    frozen: AtomicBool,
}

impl Spinner {
    pub fn new() -> Self {
        Self::with_frames(DEFAULT_FRAMES.iter().copied())
    }

    /// Animate through `frames` instead of the default `|/-\`.
    pub fn with_frames<S: Into<String>>(frames: impl IntoIterator<Item = S>) -> Self {
        Self {
            frames: frames.into_iter().map(Into::into).collect(),
            next: AtomicUsize::new(0),
            frozen: AtomicBool::new(false),
        }
    }

    fn frame(&self) -> String {
        if self.frames.is_empty() {
            return String::new();
        }
        let idx = if self.frozen.load(Ordering::Relaxed) {
            self.next.load(Ordering::Relaxed)
        } else {
            self.next.fetch_add(1, Ordering::Relaxed)
        };
        self.frames[idx % self.frames.len()].clone()
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for Spinner {
    fn body(&self) -> Option<ComponentRef> {
        Some(Arc::new(text(self.frame())))
    }

    fn as_finalizer(&self) -> Option<&dyn Finalizer> {
        Some(self)
    }
}

impl Finalizer for Spinner {
    fn finalize(&self) {
        if !self.frozen.swap(true, Ordering::Relaxed) {
            // Stay on the frame that was last shown.
            let _ = self
                .next
                .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| Some(n.saturating_sub(1)));
        }
    }
}

pub fn spinner() -> Spinner {
    Spinner::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(s: &Spinner) -> String {
        s.body().unwrap().render(0, 0)
    }

    #[test]
    fn test_spinner_cycles() {
        let s = spinner();
        let frames: Vec<String> = (0..5).map(|_| shown(&s)).collect();
        assert_eq!(frames, ["|", "/", "-", "\\", "|"]);
    }

    #[test]
    fn test_finalized_spinner_is_still() {
        let s = Spinner::with_frames(["a", "b", "c"]);
        assert_eq!(shown(&s), "a");
        assert_eq!(shown(&s), "b");

        s.finalize();
        s.finalize();
        assert_eq!(shown(&s), "b");
        assert_eq!(shown(&s), "b");
    }

    #[test]
    fn test_no_frames_renders_empty() {
        let s = Spinner::with_frames(Vec::<String>::new());
        assert_eq!(shown(&s), "");
    }
}
