//! In-memory render hierarchy for hosts without their own tree.

use std::collections::HashMap;
use std::sync::atomic::{
    AtomicU64,
    Ordering,
};

use parking_lot::Mutex;

use crate::engine::{
    Engine,
    Subscriber,
};
use crate::notify::{
    RenderLayer,
    TargetId,
};

/// One mounted render target.
#[derive(Debug)]
struct Node {
    /// Enclosing target, `None` at a root.
    parent: Option<TargetId>,
    /// Engine instance the target renders with.
    instance: Option<String>,
    /// Cleared by [`RenderTree::unmount`].
    live: bool,
}

/// A tree of render targets, each optionally bound to an engine instance.
///
/// Refresh requests are recorded and can be drained with
/// [`RenderTree::take_refreshed`].
#[derive(Debug, Default)]
pub struct RenderTree {
    /// All targets mounted so far, live or not.
    nodes: Mutex<HashMap<TargetId, Node>>,
    /// Last assigned id; ids start at 1.
    next_id: AtomicU64,
    /// Refresh requests not yet drained.
    refreshed: Mutex<Vec<TargetId>>,
}

impl RenderTree {
    /// Empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a live node under `parent`.
    pub fn mount(&self, parent: Option<TargetId>, instance: Option<&str>) -> TargetId {
        let id = TargetId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.nodes
            .lock()
            .insert(id, Node { parent, instance: instance.map(str::to_string), live: true });
        id
    }

    /// Mounts a node bound to `engine` and registers it as a subscriber.
    pub fn attach(
        &self,
        engine: &Engine,
        parent: Option<TargetId>,
        force_rebuild: Option<bool>,
    ) -> Subscriber {
        let id = self.mount(parent, Some(engine.name()));
        engine.register(id, force_rebuild)
    }

    /// Marks `target` and everything below it as no longer live.
    pub fn unmount(&self, target: TargetId) {
        let mut nodes = self.nodes.lock();
        let mut pending = vec![target];
        while let Some(current) = pending.pop() {
            if let Some(node) = nodes.get_mut(&current) {
                node.live = false;
            }
            pending.extend(
                nodes.iter().filter(|(_, node)| node.parent == Some(current)).map(|(id, _)| *id),
            );
        }
    }

    /// Refresh requests received so far, in arrival order.
    pub fn take_refreshed(&self) -> Vec<TargetId> {
        std::mem::take(&mut *self.refreshed.lock())
    }
}

impl RenderLayer for RenderTree {
    fn find_topmost_ancestor_with_same_instance(
        &self,
        target: TargetId,
        instance: &str,
    ) -> Option<TargetId> {
        let nodes = self.nodes.lock();
        let mut topmost = None;
        let mut current = nodes.get(&target).and_then(|node| node.parent);

        while let Some(id) = current {
            let Some(node) = nodes.get(&id) else {
                break;
            };
            if node.instance.as_deref() == Some(instance) {
                topmost = Some(id);
            }
            current = node.parent;
        }
        topmost
    }

    fn parent(&self, target: TargetId) -> Option<TargetId> {
        self.nodes.lock().get(&target).and_then(|node| node.parent)
    }

    fn is_live(&self, target: TargetId) -> bool {
        self.nodes.lock().get(&target).is_some_and(|node| node.live)
    }

    fn request_refresh(&self, target: TargetId) {
        tracing::trace!(%target, "Refresh requested");
        self.refreshed.lock().push(target);
    }
}
