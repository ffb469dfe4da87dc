//! Subscriber registry and rebuild coalescing.

use std::collections::{
    BTreeSet,
    HashMap,
    HashSet,
};
use std::fmt;

/// Identifier of a render target, assigned by the render layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub u64);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hierarchy operations the notifier needs from the host's render tree.
pub trait RenderLayer: Send + Sync + fmt::Debug {
    /// Outermost ancestor of `target` (excluding `target`) bound to the engine
    /// instance named `instance`.
    fn find_topmost_ancestor_with_same_instance(
        &self,
        target: TargetId,
        instance: &str,
    ) -> Option<TargetId>;

    /// Direct parent of `target`; `None` at a root or for unknown targets.
    fn parent(&self, target: TargetId) -> Option<TargetId>;

    /// False once the target has been unmounted.
    fn is_live(&self, target: TargetId) -> bool;

    /// Re-renders `target`; descendants are expected to refresh with it.
    fn request_refresh(&self, target: TargetId);
}

/// Render targets bound to one engine instance, with their own refresh policy.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    /// `None` inherits the engine's `force_rebuild` setting.
    entries: HashMap<TargetId, Option<bool>>,
}

impl SubscriberRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the target was already registered; its policy is
    /// updated either way.
    pub fn register(&mut self, target: TargetId, force_rebuild: Option<bool>) -> bool {
        self.entries.insert(target, force_rebuild).is_none()
    }

    /// Returns false when the target was not registered.
    pub fn unregister(&mut self, target: TargetId) -> bool {
        self.entries.remove(&target).is_some()
    }

    /// Whether `target` is registered.
    #[must_use]
    pub fn contains(&self, target: TargetId) -> bool {
        self.entries.contains_key(&target)
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// No target registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every registration.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Computes which targets to refresh after a language change.
    ///
    /// Force-rebuild subscribers refresh themselves. Every other subscriber
    /// delegates to its topmost registered, live ancestor bound to `instance`,
    /// or refreshes itself when there is none. When the topmost same-instance
    /// ancestor is not subscribed, the nearest subscribed one above it still
    /// covers the target. Each target appears once.
    #[must_use]
    pub fn plan_refresh(
        &self,
        layer: &dyn RenderLayer,
        instance: &str,
        inherited_force: bool,
    ) -> Vec<TargetId> {
        let mut plan = BTreeSet::new();

        for (&target, force) in &self.entries {
            if force.unwrap_or(inherited_force) {
                plan.insert(target);
                continue;
            }

            let ancestor = layer
                .find_topmost_ancestor_with_same_instance(target, instance)
                .filter(|&ancestor| ancestor != target && self.is_refreshable(layer, ancestor))
                .or_else(|| self.topmost_subscribed_ancestor(layer, target));
            plan.insert(ancestor.unwrap_or(target));
        }

        plan.into_iter().collect()
    }

    /// Registered and still mounted.
    fn is_refreshable(&self, layer: &dyn RenderLayer, target: TargetId) -> bool {
        self.contains(target) && layer.is_live(target)
    }

    /// Walks the parent chain and keeps the outermost refreshable subscriber.
    fn topmost_subscribed_ancestor(
        &self,
        layer: &dyn RenderLayer,
        target: TargetId,
    ) -> Option<TargetId> {
        let mut visited = HashSet::from([target]);
        let mut topmost = None;
        let mut current = layer.parent(target);

        while let Some(id) = current {
            if !visited.insert(id) {
                break;
            }
            if self.is_refreshable(layer, id) {
                topmost = Some(id);
            }
            current = layer.parent(id);
        }
        topmost
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::render::RenderTree;

    const INSTANCE: &str = "main";

    /// root(main) -> page(main) -> label(main); other(isolated) -> inner(isolated)
    struct Fixture {
        tree: RenderTree,
        root: TargetId,
        page: TargetId,
        label: TargetId,
        inner: TargetId,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let tree = RenderTree::new();
        let root = tree.mount(None, Some(INSTANCE));
        let page = tree.mount(Some(root), Some(INSTANCE));
        let label = tree.mount(Some(page), Some(INSTANCE));
        let other = tree.mount(Some(label), Some("isolated"));
        let inner = tree.mount(Some(other), Some("isolated"));
        Fixture { tree, root, page, label, inner }
    }

    #[rstest]
    fn descendants_coalesce_to_topmost_ancestor(fixture: Fixture) {
        let mut registry = SubscriberRegistry::new();
        registry.register(fixture.root, None);
        registry.register(fixture.page, None);
        registry.register(fixture.label, None);

        let plan = registry.plan_refresh(&fixture.tree, INSTANCE, false);

        assert_that!(plan, elements_are![eq(&fixture.root)]);
    }

    #[rstest]
    fn force_rebuild_subscribers_refresh_individually(fixture: Fixture) {
        let mut registry = SubscriberRegistry::new();
        registry.register(fixture.root, None);
        registry.register(fixture.label, Some(true));

        let plan = registry.plan_refresh(&fixture.tree, INSTANCE, false);

        assert_that!(plan, unordered_elements_are![eq(&fixture.root), eq(&fixture.label)]);
    }

    #[rstest]
    fn inherited_force_applies_to_unset_policies(fixture: Fixture) {
        let mut registry = SubscriberRegistry::new();
        registry.register(fixture.root, None);
        registry.register(fixture.page, None);
        registry.register(fixture.label, Some(false));

        let plan = registry.plan_refresh(&fixture.tree, INSTANCE, true);

        assert_that!(plan, unordered_elements_are![eq(&fixture.root), eq(&fixture.page)]);
    }

    #[rstest]
    fn unmounted_ancestor_is_skipped(fixture: Fixture) {
        let mut registry = SubscriberRegistry::new();
        registry.register(fixture.root, None);
        registry.register(fixture.label, None);
        fixture.tree.unmount(fixture.root);

        let plan = registry.plan_refresh(&fixture.tree, INSTANCE, false);

        assert_that!(plan, unordered_elements_are![eq(&fixture.root), eq(&fixture.label)]);
    }

    #[rstest]
    fn unregistered_ancestor_is_not_refreshed(fixture: Fixture) {
        let mut registry = SubscriberRegistry::new();
        registry.register(fixture.label, None);

        let plan = registry.plan_refresh(&fixture.tree, INSTANCE, false);

        assert_that!(plan, elements_are![eq(&fixture.label)]);
    }

    #[rstest]
    fn unsubscribed_outer_ancestor_falls_back_to_subscribed_one(fixture: Fixture) {
        let mut registry = SubscriberRegistry::new();
        registry.register(fixture.page, None);
        registry.register(fixture.label, None);

        let plan = registry.plan_refresh(&fixture.tree, INSTANCE, false);

        assert_that!(plan, elements_are![eq(&fixture.page)]);
    }

    #[rstest]
    fn ancestors_are_matched_by_instance(fixture: Fixture) {
        let mut isolated = SubscriberRegistry::new();
        isolated.register(fixture.inner, None);
        let mut main = SubscriberRegistry::new();
        main.register(fixture.page, None);

        let isolated_plan = isolated.plan_refresh(&fixture.tree, "isolated", false);
        let main_plan = main.plan_refresh(&fixture.tree, INSTANCE, false);

        assert_that!(isolated_plan, elements_are![eq(&fixture.inner)]);
        assert_that!(main_plan, elements_are![eq(&fixture.page)]);
    }

    #[rstest]
    fn register_and_unregister() {
        let mut registry = SubscriberRegistry::new();

        assert_that!(registry.register(TargetId(1), None), eq(true));
        assert_that!(registry.register(TargetId(1), Some(true)), eq(false));
        assert_that!(registry.len(), eq(1));
        assert_that!(registry.unregister(TargetId(1)), eq(true));
        assert_that!(registry.unregister(TargetId(1)), eq(false));
        assert_that!(registry.is_empty(), eq(true));
    }
}
