//! Input Module - raw terminal input shared between components.
//!
//! Each renderer can expose an [`InputStream`]. The first input component
//! mounted for a renderer starts an [`InputManager`] for that stream: a
//! reader thread that fans raw byte batches out to every subscriber.
//! Managers are reference counted per renderer in an [`InputRegistry`]; when
//! the last user releases one, raw mode is restored.
//!
//! # Architecture
//!
//! ```text
//! stdin → reader thread ──(waits for subscribers)──→ callbacks (in order)
//!              ↑
//!   InputRegistry: OwnerKey → (InputManager, count)
//! ```

mod manager;
mod raw;

pub use manager::{InputManager, InputRegistry};
pub use raw::{RawDevice, disable_raw_mode, enable_raw_mode};
#[cfg(unix)]
pub use raw::TtyDevice;

use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

// =============================================================================
// Keys
// =============================================================================

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

fn next_key() -> u64 {
    NEXT_KEY.fetch_add(1, Ordering::Relaxed)
}

/// Identifies the owner of an input manager, one per renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OwnerKey(u64);

impl OwnerKey {
    /// A key no other owner has.
    pub fn next() -> Self {
        Self(next_key())
    }
}

/// Identifies one subscriber of an input manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberKey(u64);

impl SubscriberKey {
    pub fn next() -> Self {
        Self(next_key())
    }
}

// =============================================================================
// Events
// =============================================================================

/// What a subscriber receives from the reader thread.
#[derive(Debug, Clone, Copy)]
pub enum InputEvent<'a> {
    /// One batch of raw bytes, as read.
    Data(&'a [u8]),
    /// The read failed. Reading continues afterwards.
    Error(&'a io::Error),
    /// The stream ended, or never existed. No further events follow.
    Eof,
}

/// Subscriber callback.
pub type InputCallback = Arc<dyn Fn(InputEvent<'_>) + Send + Sync>;

// =============================================================================
// Input Stream
// =============================================================================

/// A readable input source, optionally backed by a terminal device that can
/// be put into raw mode.
pub struct InputStream {
    reader: Box<dyn Read + Send>,
    device: Option<Arc<dyn RawDevice>>,
}

impl InputStream {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            reader: Box::new(reader),
            device: None,
        }
    }

    /// Put `device` into raw mode while the stream is in use.
    pub fn with_device(mut self, device: Arc<dyn RawDevice>) -> Self {
        self.device = Some(device);
        self
    }

    /// Process stdin; raw mode is used when stdin is a terminal.
    pub fn stdin() -> Self {
        let stream = Self::new(io::stdin());
        #[cfg(unix)]
        if let Some(tty) = TtyDevice::stdin() {
            return stream.with_device(tty);
        }
        stream
    }

    pub fn device(&self) -> Option<&Arc<dyn RawDevice>> {
        self.device.as_ref()
    }

    pub(crate) fn into_parts(self) -> (Box<dyn Read + Send>, Option<Arc<dyn RawDevice>>) {
        (self.reader, self.device)
    }
}

impl fmt::Debug for InputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStream")
            .field("raw", &self.device.as_ref().map(|d| d.device_id()))
            .finish_non_exhaustive()
    }
}
