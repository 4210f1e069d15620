//! Hidden step scope
//!
//! While a `HiddenScope` guard is alive on a thread, every step executed on
//! that thread is marked hidden. Scopes nest through a depth counter so that
//! leaving an inner scope keeps the outer one active.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static HIDDEN_DEPTH: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Guard for an active hidden scope; leaving it exits the scope
#[derive(Debug)]
#[must_use = "the hidden scope ends as soon as the guard is dropped"]
pub struct HiddenScope {
    depth: usize,
    _thread_bound: PhantomData<*const ()>,
}

impl HiddenScope {
    /// Depth this guard entered at, 0 for the outermost scope
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Exit the scope explicitly
    pub fn exit(self) {}
}

impl Drop for HiddenScope {
    fn drop(&mut self) {
        HIDDEN_DEPTH.with(|depth| {
            let next = match depth.get() {
                Some(0) | None => None,
                Some(n) => Some(n - 1),
            };
            depth.set(next);
        });
    }
}

/// Enter a hidden scope on the current thread
pub fn enter() -> HiddenScope {
    let depth = HIDDEN_DEPTH.with(|depth| {
        let next = depth.get().map_or(0, |n| n + 1);
        depth.set(Some(next));
        next
    });

    HiddenScope {
        depth,
        _thread_bound: PhantomData,
    }
}

/// Current depth, `None` outside of any hidden scope
pub fn depth() -> Option<usize> {
    HIDDEN_DEPTH.with(Cell::get)
}

/// Check whether the current thread is inside a hidden scope
pub fn is_active() -> bool {
    depth().is_some()
}

/// Run `block` inside a hidden scope
pub fn hidden<F, R>(block: F) -> R
where
    F: FnOnce() -> R,
{
    let _scope = enter();
    block()
}
