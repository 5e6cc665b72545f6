//! Raw mode, reference counted per device.
//!
//! Several input managers may read from the same terminal. The device is
//! switched into raw mode by the first of them and restored by the last one
//! to let go; calls in between only move the count.

use std::collections::HashMap;
use std::io;
use std::sync::{LazyLock, Mutex, PoisonError};

use tracing::debug;

/// A terminal device whose line discipline can be switched to raw mode.
pub trait RawDevice: Send + Sync {
    /// Identity of the underlying device. Handles to the same device must
    /// return the same id.
    fn device_id(&self) -> u64;

    /// Switch to raw mode, remembering the current settings.
    fn enable_raw(&self) -> io::Result<()>;

    /// Put back the settings saved by [`enable_raw`](Self::enable_raw).
    fn restore(&self) -> io::Result<()>;
}

/// Raw mode users per device id.
static RAW_USERS: LazyLock<Mutex<HashMap<u64, usize>>> = LazyLock::new(Default::default);

/// Enter raw mode on `device` unless another user already did.
pub fn enable_raw_mode(device: &dyn RawDevice) -> io::Result<()> {
    let mut users = RAW_USERS.lock().unwrap_or_else(PoisonError::into_inner);
    let id = device.device_id();

    match users.get_mut(&id) {
        Some(count) => *count += 1,
        None => {
            device.enable_raw()?;
            debug!(device = id, "raw mode enabled");
            users.insert(id, 1);
        }
    }
    Ok(())
}

/// Drop one raw mode user of `device`, restoring it when none are left.
/// Extra calls are ignored.
pub fn disable_raw_mode(device: &dyn RawDevice) -> io::Result<()> {
    let mut users = RAW_USERS.lock().unwrap_or_else(PoisonError::into_inner);
    let id = device.device_id();

    let Some(count) = users.get_mut(&id) else {
        return Ok(());
    };
    *count -= 1;
    if *count > 0 {
        return Ok(());
    }

    users.remove(&id);
    debug!(device = id, "raw mode restored");
    device.restore()
}

// =============================================================================
// TTY (unix)
// =============================================================================

#[cfg(unix)]
pub use tty::TtyDevice;

#[cfg(unix)]
mod tty {
    use std::io;
    use std::os::unix::io::{AsRawFd, RawFd};
    use std::sync::{Arc, LazyLock, Mutex, PoisonError};

    use super::RawDevice;

    static STDIN: LazyLock<Option<Arc<TtyDevice>>> = LazyLock::new(|| {
        let fd = io::stdin().as_raw_fd();
        TtyDevice::open(fd).map(Arc::new)
    });

    /// A terminal file descriptor, switched to raw mode with termios.
    pub struct TtyDevice {
        fd: RawFd,
        saved: Mutex<Option<libc::termios>>,
    }

    impl TtyDevice {
        /// `None` if `fd` is not a terminal.
        pub fn open(fd: RawFd) -> Option<Self> {
            if unsafe { libc::isatty(fd) } == 0 {
                return None;
            }
            Some(Self {
                fd,
                saved: Mutex::new(None),
            })
        }

        /// The process's stdin, if it is a terminal.
        pub fn stdin() -> Option<Arc<Self>> {
            STDIN.clone()
        }
    }

    impl RawDevice for TtyDevice {
        fn device_id(&self) -> u64 {
            self.fd as u64
        }

        fn enable_raw(&self) -> io::Result<()> {
            let mut termios: libc::termios = unsafe { std::mem::zeroed() };
            if unsafe { libc::tcgetattr(self.fd, &mut termios) } != 0 {
                return Err(io::Error::last_os_error());
            }
            *self.saved.lock().unwrap_or_else(PoisonError::into_inner) = Some(termios);

            // Output post-processing stays on: inline redraws rely on "\n"
            // returning the cursor to column 0.
            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_lflag &=
                !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &termios) } != 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        }

        fn restore(&self) -> io::Result<()> {
            let saved = self.saved.lock().unwrap_or_else(PoisonError::into_inner).take();
            if let Some(original) = saved {
                if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, &original) } != 0 {
                    return Err(io::Error::last_os_error());
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

    use super::*;

    static NEXT_ID: AtomicU64 = AtomicU64::new(1 << 40);

    /// Device that only counts transitions.
    pub(crate) struct CountingDevice {
        id: u64,
        pub enabled: AtomicUsize,
        pub restored: AtomicUsize,
    }

    impl CountingDevice {
        pub fn new() -> Self {
            Self {
                id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
                enabled: AtomicUsize::new(0),
                restored: AtomicUsize::new(0),
            }
        }
    }

    impl RawDevice for CountingDevice {
        fn device_id(&self) -> u64 {
            self.id
        }

        fn enable_raw(&self) -> io::Result<()> {
            self.enabled.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn restore(&self) -> io::Result<()> {
            self.restored.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_raw_mode_is_counted() {
        let device = CountingDevice::new();

        enable_raw_mode(&device).unwrap();
        enable_raw_mode(&device).unwrap();
        assert_eq!(device.enabled.load(Ordering::SeqCst), 1);

        disable_raw_mode(&device).unwrap();
        assert_eq!(device.restored.load(Ordering::SeqCst), 0);
        disable_raw_mode(&device).unwrap();
        disable_raw_mode(&device).unwrap();
        assert_eq!(device.restored.load(Ordering::SeqCst), 1);

        enable_raw_mode(&device).unwrap();
        assert_eq!(device.enabled.load(Ordering::SeqCst), 2);
        disable_raw_mode(&device).unwrap();
    }

    #[test]
    fn test_unknown_device_release_is_noop() {
        let device = CountingDevice::new();
        disable_raw_mode(&device).unwrap();
        assert_eq!(device.restored.load(Ordering::SeqCst), 0);
    }
}
