//! Ambient "currently rendering" engine stack.
//!
//! A render pass enters its engine with [`enter`] and keeps the returned
//! [`RenderScope`] alive while user rendering code runs. Lookups that do not
//! name an engine use [`current`]. The stack is per thread and strictly nested;
//! a scope is popped when dropped, including during unwinding.

use std::cell::RefCell;
use std::marker::PhantomData;

use crate::engine::Engine;

thread_local! {
    /// Engines of the enclosing render passes, innermost last.
    static RENDER_STACK: RefCell<Vec<Engine>> = const { RefCell::new(Vec::new()) };
}

/// Guard that pops its engine from the ambient stack on drop.
#[must_use = "the engine is popped as soon as the scope is dropped"]
#[derive(Debug)]
pub struct RenderScope {
    /// Stack length right after the push.
    depth: usize,
    /// Pinned to the thread whose stack it pushed onto.
    _not_send: PhantomData<*const ()>,
}

/// Pushes `engine` as the current rendering engine.
pub fn enter(engine: &Engine) -> RenderScope {
    let depth = RENDER_STACK.with_borrow_mut(|stack| {
        stack.push(engine.clone());
        stack.len()
    });
    RenderScope { depth, _not_send: PhantomData }
}

/// Runs `render` with `engine` as the current rendering engine.
pub fn render_with<R>(engine: &Engine, render: impl FnOnce() -> R) -> R {
    let _scope = enter(engine);
    render()
}

/// Top of the stack, or the global engine when nothing is rendering.
#[must_use]
pub fn current() -> Engine {
    RENDER_STACK.with_borrow(|stack| stack.last().cloned()).unwrap_or_else(Engine::global)
}

/// Number of scopes currently entered on this thread.
#[must_use]
pub fn depth() -> usize {
    RENDER_STACK.with_borrow(Vec::len)
}

impl Drop for RenderScope {
    fn drop(&mut self) {
        RENDER_STACK.with_borrow_mut(|stack| {
            if stack.len() != self.depth {
                tracing::warn!(
                    expected = self.depth,
                    actual = stack.len(),
                    "Render scopes dropped out of order"
                );
            }
            stack.truncate(self.depth.saturating_sub(1));
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::test_utils::unique_name;

    #[rstest]
    fn scopes_nest_and_unwind() {
        let outer = Engine::instance(&unique_name("outer"));
        let inner = Engine::instance(&unique_name("inner"));

        let before = depth();
        {
            let _outer = enter(&outer);
            assert_that!(current().name(), eq(outer.name()));
            {
                let _inner = enter(&inner);
                assert_that!(current().name(), eq(inner.name()));
                assert_that!(depth(), eq(before + 2));
            }
            assert_that!(current().name(), eq(outer.name()));
        }
        assert_that!(depth(), eq(before));
    }

    #[rstest]
    fn scope_is_popped_on_panic() {
        let engine = Engine::instance(&unique_name("panicking"));
        let before = depth();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            render_with::<()>(&engine, || panic!("render failed"));
        }));

        assert!(result.is_err());
        assert_that!(depth(), eq(before));
    }

    #[rstest]
    fn empty_stack_falls_back_to_global() {
        assert_that!(depth(), eq(0));
        assert_that!(current().name(), eq(Engine::global().name()));
    }

    #[rstest]
    fn render_with_returns_result() {
        let engine = Engine::instance(&unique_name("render"));

        let name = render_with(&engine, || current().name().to_string());

        assert_that!(name, eq(engine.name()));
    }
}
