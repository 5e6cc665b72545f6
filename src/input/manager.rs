//! Input managers and the per-renderer registry.

use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;

use tracing::{debug, trace, warn};

use super::raw::{disable_raw_mode, enable_raw_mode};
use super::{InputCallback, InputEvent, InputStream, OwnerKey, RawDevice, SubscriberKey};
use crate::error::Result;

// =============================================================================
// Registry
// =============================================================================

struct Entry {
    manager: Arc<InputManager>,
    users: usize,
}

/// Input managers by owner, reference counted.
#[derive(Default)]
pub struct InputRegistry {
    entries: Mutex<HashMap<OwnerKey, Entry>>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The manager for `owner`, started on first use.
    ///
    /// `stream` is only called when no manager exists yet. A `None` stream
    /// produces a manager that is already closed: every subscriber receives
    /// [`InputEvent::Eof`] straight away. A manager whose last user released
    /// it is revived with its reader and any input it is holding.
    pub fn acquire(
        &self,
        owner: OwnerKey,
        stream: impl FnOnce() -> Option<InputStream>,
    ) -> Result<Arc<InputManager>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get_mut(&owner) {
            if entry.users == 0 {
                debug!(?owner, "input manager revived");
                entry.manager.enable_raw();
            }
            entry.users += 1;
            return Ok(entry.manager.clone());
        }

        let manager = InputManager::start(stream())?;
        entries.insert(
            owner,
            Entry {
                manager: manager.clone(),
                users: 1,
            },
        );
        debug!(?owner, "input manager started");
        Ok(manager)
    }

    /// Give up one use of `owner`'s manager. The last release restores raw
    /// mode; the manager stays registered and keeps its reader, so input
    /// typed before the next [`acquire`](Self::acquire) is not lost.
    /// Releasing an unknown or unused owner does nothing.
    pub fn release(&self, owner: OwnerKey) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        let Some(entry) = entries.get_mut(&owner) else {
            return;
        };
        if entry.users == 0 {
            return;
        }
        entry.users -= 1;
        if entry.users == 0 {
            debug!(?owner, "input manager released");
            entry.manager.restore_raw();
        }
    }

    /// Number of live users of `owner`'s manager.
    pub fn users(&self, owner: OwnerKey) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&owner)
            .map_or(0, |entry| entry.users)
    }
}

impl Drop for InputRegistry {
    fn drop(&mut self) {
        let entries = self.entries.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (_, entry) in entries.drain() {
            if entry.users > 0 {
                entry.manager.restore_raw();
            }
            entry.manager.abandon();
        }
    }
}

// =============================================================================
// Manager
// =============================================================================

#[derive(Default)]
struct Subscribers {
    callbacks: Vec<(SubscriberKey, InputCallback)>,
    closed: bool,
    abandoned: bool,
}

/// Fans one input stream out to every subscriber.
///
/// A reader thread reads batches of up to 128 bytes. Read errors are passed
/// on and reading continues; only end-of-stream stops it. While nobody is
/// subscribed it holds on to the batch it read and waits, so no input is
/// dropped between one input component unmounting and the next mounting,
/// even when the manager's last user released it in between. The reader
/// only exits at end-of-stream or once its registry is dropped.
pub struct InputManager {
    state: Mutex<Subscribers>,
    wake: Condvar,
    device: Option<Arc<dyn RawDevice>>,
}

impl InputManager {
    fn start(stream: Option<InputStream>) -> io::Result<Arc<Self>> {
        let Some(stream) = stream else {
            return Ok(Arc::new(Self {
                state: Mutex::new(Subscribers {
                    closed: true,
                    ..Default::default()
                }),
                wake: Condvar::new(),
                device: None,
            }));
        };

        let (reader, device) = stream.into_parts();
        let manager = Arc::new(Self {
            state: Mutex::new(Subscribers::default()),
            wake: Condvar::new(),
            device,
        });
        manager.enable_raw();

        let worker = manager.clone();
        let spawned = thread::Builder::new()
            .name("spark-inline-input".to_string())
            .spawn(move || worker.read_loop(reader));
        if let Err(err) = spawned {
            warn!(%err, "could not start input reader");
            manager.restore_raw();
            return Err(err);
        }

        Ok(manager)
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `callback` under `key`. Does nothing if `key` is already
    /// subscribed. If the stream has already ended, the callback receives
    /// [`InputEvent::Eof`] immediately and is not kept.
    pub fn subscribe<F>(&self, key: SubscriberKey, callback: F)
    where
        F: Fn(InputEvent<'_>) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        if state.callbacks.iter().any(|(k, _)| *k == key) {
            return;
        }
        if state.closed {
            drop(state);
            callback(InputEvent::Eof);
            return;
        }

        state.callbacks.push((key, Arc::new(callback)));
        self.wake.notify_all();
    }

    /// Remove the callback under `key`, if any.
    pub fn unsubscribe(&self, key: SubscriberKey) {
        self.lock().callbacks.retain(|(k, _)| *k != key);
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().callbacks.len()
    }

    /// True once the stream has ended.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn enable_raw(&self) {
        if let Some(device) = &self.device {
            if let Err(err) = enable_raw_mode(device.as_ref()) {
                warn!(%err, "could not enable raw mode");
            }
        }
    }

    fn restore_raw(&self) {
        if let Some(device) = &self.device {
            if let Err(err) = disable_raw_mode(device.as_ref()) {
                warn!(%err, "could not restore terminal mode");
            }
        }
    }

    fn abandon(&self) {
        self.lock().abandoned = true;
        self.wake.notify_all();
    }

    /// Block until someone is subscribed and snapshot the callbacks.
    ///
    /// `last` marks the stream closed in the same critical section, so a
    /// subscriber arriving later still learns about the end. Returns `None`
    /// when the registry was dropped with nobody left to deliver to.
    fn wait_for_subscribers(&self, last: bool) -> Option<Vec<InputCallback>> {
        let mut state = self.lock();
        while state.callbacks.is_empty() && !state.abandoned {
            state = self.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        if state.callbacks.is_empty() {
            return None;
        }

        if last {
            state.closed = true;
        }
        Some(state.callbacks.iter().map(|(_, cb)| cb.clone()).collect())
    }

    fn read_loop(&self, mut reader: Box<dyn Read + Send>) {
        let mut buf = [0u8; 128];

        loop {
            let read = match reader.read(&mut buf) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                read => read,
            };
            let last = matches!(read, Ok(0));

            // Callbacks run outside the lock so they may subscribe or
            // unsubscribe, and so a slow callback cannot stall mounting.
            let Some(callbacks) = self.wait_for_subscribers(last) else {
                trace!("input reader exiting, registry dropped");
                return;
            };

            let event = match &read {
                Ok(0) => InputEvent::Eof,
                Ok(n) => InputEvent::Data(&buf[..*n]),
                Err(err) => InputEvent::Error(err),
            };
            for callback in &callbacks {
                callback(event);
            }

            if last {
                trace!("input stream closed");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::mpsc::{self, Receiver};
    use std::time::Duration;

    use super::*;
    use crate::input::raw::tests::CountingDevice;

    /// Reads one queued batch per call; ends when the sender is dropped.
    struct ChannelReader(Receiver<Vec<u8>>);

    impl Read for ChannelReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.recv() {
                Ok(batch) => {
                    buf[..batch.len()].copy_from_slice(&batch);
                    Ok(batch.len())
                }
                Err(_) => Ok(0),
            }
        }
    }

    fn describe(event: InputEvent<'_>) -> String {
        match event {
            InputEvent::Data(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            InputEvent::Error(err) => format!("<error {err}>"),
            InputEvent::Eof => "<eof>".to_string(),
        }
    }

    #[test]
    fn test_subscribers_see_same_batches_in_order() {
        let registry = InputRegistry::new();
        let owner = OwnerKey::next();
        let (data, rx) = mpsc::channel();
        let manager = registry
            .acquire(owner, || Some(InputStream::new(ChannelReader(rx))))
            .unwrap();

        let (events, received) = mpsc::channel();
        for name in ["a", "b"] {
            let events = events.clone();
            manager.subscribe(SubscriberKey::next(), move |event| {
                let _ = events.send(format!("{name}:{}", describe(event)));
            });
        }

        data.send(b"hi".to_vec()).unwrap();
        data.send(b"x".to_vec()).unwrap();
        drop(data);

        let got: Vec<String> = (0..6)
            .map(|_| received.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(
            got,
            ["a:hi", "b:hi", "a:x", "b:x", "a:<eof>", "b:<eof>"]
        );
        assert!(manager.is_closed());

        let (late, late_rx) = mpsc::channel();
        manager.subscribe(SubscriberKey::next(), move |event| {
            let _ = late.send(describe(event));
        });
        assert_eq!(late_rx.try_recv().unwrap(), "<eof>");
        assert_eq!(manager.subscriber_count(), 2);

        registry.release(owner);
    }

    #[test]
    fn test_duplicate_subscription_ignored() {
        let registry = InputRegistry::new();
        let owner = OwnerKey::next();
        let (_data, rx) = mpsc::channel::<Vec<u8>>();
        let manager = registry
            .acquire(owner, || Some(InputStream::new(ChannelReader(rx))))
            .unwrap();

        let key = SubscriberKey::next();
        manager.subscribe(key, |_| {});
        manager.subscribe(key, |_| {});
        assert_eq!(manager.subscriber_count(), 1);

        manager.unsubscribe(key);
        assert_eq!(manager.subscriber_count(), 0);
        registry.release(owner);
    }

    #[test]
    fn test_missing_stream_is_closed() {
        let registry = InputRegistry::new();
        let owner = OwnerKey::next();
        let manager = registry.acquire(owner, || None).unwrap();
        assert!(manager.is_closed());

        let (tx, rx) = mpsc::channel();
        manager.subscribe(SubscriberKey::next(), move |event| {
            let _ = tx.send(describe(event));
        });
        assert_eq!(rx.try_recv().unwrap(), "<eof>");
        assert_eq!(manager.subscriber_count(), 0);
    }

    #[test]
    fn test_release_restores_raw_mode_once() {
        let registry = InputRegistry::new();
        let owner = OwnerKey::next();
        let device = Arc::new(CountingDevice::new());

        let stream = {
            let device = device.clone();
            move || Some(InputStream::new(io::empty()).with_device(device))
        };
        let first = registry.acquire(owner, stream).unwrap();
        let second = registry.acquire(owner, || unreachable!()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.users(owner), 2);
        assert_eq!(device.enabled.load(Ordering::SeqCst), 1);

        registry.release(owner);
        assert_eq!(device.restored.load(Ordering::SeqCst), 0);
        registry.release(owner);
        registry.release(owner);
        assert_eq!(device.restored.load(Ordering::SeqCst), 1);
        assert_eq!(registry.users(owner), 0);
    }

    #[test]
    fn test_input_read_while_released_reaches_next_user() {
        let registry = InputRegistry::new();
        let owner = OwnerKey::next();
        let device = Arc::new(CountingDevice::new());
        let (data, rx) = mpsc::channel();

        let stream = {
            let device = device.clone();
            move || Some(InputStream::new(ChannelReader(rx)).with_device(device))
        };
        let first = registry.acquire(owner, stream).unwrap();
        let key = SubscriberKey::next();
        first.subscribe(key, |_| {});
        first.unsubscribe(key);
        registry.release(owner);
        assert_eq!(device.restored.load(Ordering::SeqCst), 1);

        data.send(b"q".to_vec()).unwrap();

        let second = registry.acquire(owner, || unreachable!()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(device.enabled.load(Ordering::SeqCst), 2);

        let (events, received) = mpsc::channel();
        second.subscribe(SubscriberKey::next(), move |event| {
            let _ = events.send(describe(event));
        });
        data.send(b"w".to_vec()).unwrap();

        assert_eq!(received.recv_timeout(Duration::from_secs(5)).unwrap(), "q");
        assert_eq!(received.recv_timeout(Duration::from_secs(5)).unwrap(), "w");

        registry.release(owner);
        assert_eq!(device.restored.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_owners_share_raw_device() {
        let registry = InputRegistry::new();
        let device = Arc::new(CountingDevice::new());
        let (a, b) = (OwnerKey::next(), OwnerKey::next());

        for owner in [a, b] {
            let device = device.clone();
            registry
                .acquire(owner, move || Some(InputStream::new(io::empty()).with_device(device)))
                .unwrap();
        }
        assert_eq!(device.enabled.load(Ordering::SeqCst), 1);

        registry.release(a);
        assert_eq!(device.restored.load(Ordering::SeqCst), 0);
        registry.release(b);
        assert_eq!(device.restored.load(Ordering::SeqCst), 1);
    }
}
