//! Input listener.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::component::{Component, ComponentRef, MountContext, Mounter};
use crate::input::{InputCallback, InputEvent, InputManager, OwnerKey, SubscriberKey};

/// Receives raw input from the renderer's input stream while mounted.
///
/// Draws nothing. The stream is shared with every other input listener of
/// the same renderer and switched to raw mode for as long as any of them is
/// mounted. When the renderer has no input stream the callback receives
/// [`InputEvent::Eof`] once on mount.
///
/// The callback runs on the input reader thread, or on the rendering thread
/// for that first `Eof`, and must not call back into the document.
pub struct Input {
    key: SubscriberKey,
    callback: InputCallback,
    subscription: Mutex<Option<(OwnerKey, Arc<InputManager>)>>,
}

impl Input {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(InputEvent<'_>) + Send + Sync + 'static,
    {
        Self {
            key: SubscriberKey::next(),
            callback: Arc::new(callback),
            subscription: Mutex::new(None),
        }
    }
}

impl Component for Input {
    fn body(&self) -> Option<ComponentRef> {
        None
    }

    fn as_mounter(&self) -> Option<&dyn Mounter> {
        Some(self)
    }
}

impl Mounter for Input {
    fn mount(&self, ctx: &MountContext<'_>) {
        let mut subscription = self.subscription.lock().unwrap_or_else(PoisonError::into_inner);
        if subscription.is_some() {
            return;
        }

        let renderer = ctx.renderer();
        let manager = match ctx
            .inputs()
            .acquire(ctx.owner(), || renderer.and_then(|r| r.input_stream()))
        {
            Ok(manager) => manager,
            Err(err) => {
                warn!(%err, "input listener could not start");
                return;
            }
        };

        let callback = self.callback.clone();
        manager.subscribe(self.key, move |event| callback(event));
        *subscription = Some((ctx.owner(), manager));
    }

    fn unmount(&self, ctx: &MountContext<'_>) {
        let subscription = self
            .subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some((owner, manager)) = subscription {
            manager.unsubscribe(self.key);
            ctx.inputs().release(owner);
        }
    }
}

pub fn input<F>(callback: F) -> Input
where
    F: Fn(InputEvent<'_>) + Send + Sync + 'static,
{
    Input::new(callback)
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::input::InputRegistry;

    #[test]
    fn test_without_renderer_sees_eof_and_releases() {
        let inputs = Arc::new(InputRegistry::new());
        let owner = OwnerKey::next();
        let ctx = MountContext::new(None, owner, &inputs);

        let (tx, rx) = mpsc::channel();
        let listener = input(move |event| {
            let _ = tx.send(matches!(event, InputEvent::Eof));
        });

        listener.mount(&ctx);
        listener.mount(&ctx);
        assert_eq!(rx.try_recv(), Ok(true));
        assert!(rx.try_recv().is_err());
        assert_eq!(inputs.users(owner), 1);

        listener.unmount(&ctx);
        listener.unmount(&ctx);
        assert_eq!(inputs.users(owner), 0);
    }
}
