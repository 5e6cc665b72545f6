//! Mount/Unmount lifecycle.
//!
//! After each frame is laid out, the tracker walks the computed tree and
//! compares the mountable components it finds against the previous frame:
//!
//! - seen now, not mounted before → `mount`
//! - mounted before, not seen now → `unmount`
//!
//! Every `mount` for a frame runs before that frame's `unmount`s, and
//! unmounts run in the order their components were mounted. The same
//! instance appended again across frames stays mounted and is not notified.

use std::collections::HashSet;

use tracing::trace;

use crate::component::{ComponentKey, ComponentRef, MountContext};
use crate::layout::LayoutTree;

/// Components currently mounted, in mount order.
///
/// Holding the [`ComponentRef`] keeps the allocation alive, so a key cannot
/// be reused by another component while it is tracked.
#[derive(Default)]
pub struct MountTracker {
    mounted: Vec<(ComponentKey, ComponentRef)>,
    keys: HashSet<ComponentKey>,
}

impl MountTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.mounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounted.is_empty()
    }

    pub fn is_mounted(&self, component: &ComponentRef) -> bool {
        self.keys.contains(&ComponentKey::of(component))
    }

    /// Deliver mount/unmount notifications for the frame in `tree`.
    pub fn update(&mut self, tree: &LayoutTree, ctx: &MountContext<'_>) {
        let mut seen: HashSet<ComponentKey> = HashSet::new();
        let mut mounted_now = Vec::new();

        for node in tree.descendants() {
            let Some(node_ctx) = tree.context(node) else {
                continue;
            };
            let Some(mounter) = node_ctx.component.as_mounter() else {
                continue;
            };

            let key = ComponentKey::of(&node_ctx.component);
            if !seen.insert(key) {
                continue;
            }

            if !self.keys.contains(&key) {
                trace!(?key, "mount");
                mounter.mount(ctx);
                mounted_now.push((key, node_ctx.component.clone()));
            }
        }

        let previous = std::mem::take(&mut self.mounted);
        for (key, component) in previous {
            if seen.contains(&key) {
                self.mounted.push((key, component));
                continue;
            }
            if let Some(mounter) = component.as_mounter() {
                trace!(?key, "unmount");
                mounter.unmount(ctx);
            }
        }

        self.mounted.extend(mounted_now);
        self.keys = seen;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::component::{Component, Mounter, fragment};
    use crate::input::{InputRegistry, OwnerKey};
    use crate::layout::TerminalSize;
    use crate::pipeline::compile;

    /// Appends `name:event` to a shared log.
    struct Logging {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Component for Logging {
        fn body(&self) -> Option<ComponentRef> {
            None
        }

        fn as_mounter(&self) -> Option<&dyn Mounter> {
            Some(self)
        }
    }

    impl Mounter for Logging {
        fn mount(&self, _ctx: &MountContext<'_>) {
            self.log.lock().unwrap().push(format!("{}:mount", self.name));
        }

        fn unmount(&self, _ctx: &MountContext<'_>) {
            self.log.lock().unwrap().push(format!("{}:unmount", self.name));
        }
    }

    #[derive(Default)]
    struct Counting {
        mounts: AtomicUsize,
        unmounts: AtomicUsize,
    }

    impl Component for Counting {
        fn body(&self) -> Option<ComponentRef> {
            None
        }

        fn as_mounter(&self) -> Option<&dyn Mounter> {
            Some(self)
        }
    }

    impl Mounter for Counting {
        fn mount(&self, _ctx: &MountContext<'_>) {
            self.mounts.fetch_add(1, Ordering::SeqCst);
        }

        fn unmount(&self, _ctx: &MountContext<'_>) {
            self.unmounts.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn frame(components: &[ComponentRef]) -> LayoutTree {
        let mut tree = LayoutTree::new(TerminalSize { rows: 0, cols: 80 }).unwrap();
        let root = tree.root();
        let all: ComponentRef = Arc::new(fragment(components.iter().cloned()));
        compile(&mut tree, root, Some(&all), false).unwrap();
        tree.compute().unwrap();
        tree
    }

    #[test]
    fn test_mount_once_unmount_once() {
        let inputs = Arc::new(InputRegistry::new());
        let ctx = MountContext::new(None, OwnerKey::default(), &inputs);
        let counting = Arc::new(Counting::default());
        let c: ComponentRef = counting.clone();
        let mut tracker = MountTracker::new();

        tracker.update(&frame(&[c.clone()]), &ctx);
        tracker.update(&frame(&[c.clone()]), &ctx);
        assert_eq!(counting.mounts.load(Ordering::SeqCst), 1);
        assert_eq!(counting.unmounts.load(Ordering::SeqCst), 0);
        assert!(tracker.is_mounted(&c));

        tracker.update(&frame(&[]), &ctx);
        tracker.update(&frame(&[]), &ctx);
        assert_eq!(counting.mounts.load(Ordering::SeqCst), 1);
        assert_eq!(counting.unmounts.load(Ordering::SeqCst), 1);
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_duplicate_instance_mounts_once() {
        let inputs = Arc::new(InputRegistry::new());
        let ctx = MountContext::new(None, OwnerKey::default(), &inputs);
        let counting = Arc::new(Counting::default());
        let c: ComponentRef = counting.clone();
        let mut tracker = MountTracker::new();

        tracker.update(&frame(&[c.clone(), c.clone()]), &ctx);

        assert_eq!(counting.mounts.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_unmounts_follow_mount_order() {
        let inputs = Arc::new(InputRegistry::new());
        let ctx = MountContext::new(None, OwnerKey::default(), &inputs);
        let log = Arc::new(Mutex::new(Vec::new()));
        let [a, b, c]: [ComponentRef; 3] = ["a", "b", "c"].map(|name| {
            Arc::new(Logging {
                name,
                log: log.clone(),
            }) as ComponentRef
        });
        let mut tracker = MountTracker::new();

        tracker.update(&frame(&[b.clone()]), &ctx);
        tracker.update(&frame(&[a.clone(), b.clone(), c.clone()]), &ctx);
        log.lock().unwrap().clear();

        tracker.update(&frame(&[]), &ctx);
        assert_eq!(
            *log.lock().unwrap(),
            ["b:unmount", "a:unmount", "c:unmount"]
        );
        assert!(tracker.is_empty());
    }
}
