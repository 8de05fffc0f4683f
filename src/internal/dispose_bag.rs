//! Release hooks for cached singletons.

use std::panic::{self, AssertUnwindSafe};

type Hook = Box<dyn FnOnce() + Send>;

/// Release hooks, run in LIFO order.
#[derive(Default)]
pub(crate) struct DisposeBag {
    hooks: Vec<(&'static str, Hook)>,
}

impl DisposeBag {
    pub(crate) fn push(&mut self, name: &'static str, hook: Hook) {
        self.hooks.push((name, hook));
    }

    /// Takes every pending hook, leaving the bag empty.
    pub(crate) fn take(&mut self) -> DisposeBag {
        std::mem::take(self)
    }

    /// Runs all hooks in reverse order. A panicking hook is logged and the
    /// remaining hooks still run.
    pub(crate) fn run_all_reverse(mut self) -> usize {
        let mut released = 0;
        while let Some((name, hook)) = self.hooks.pop() {
            match panic::catch_unwind(AssertUnwindSafe(hook)) {
                Ok(()) => released += 1,
                Err(_) => tracing::warn!(implementation = name, "release hook panicked"),
            }
        }
        released
    }

    pub(crate) fn len(&self) -> usize {
        self.hooks.len()
    }
}
