//! Cycle detection for recursive construction.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};
use crate::key::TypeKey;

thread_local! {
    static RESOLUTION_STACK: RefCell<Vec<TypeKey>> = RefCell::new(Vec::new());
}

/// Marks an implementation as under construction on this thread. Dropping
/// the guard pops it again.
pub(crate) struct StackGuard {
    key: TypeKey,
}

impl StackGuard {
    /// Pushes `key`, or reports the cycle if it is already being built.
    pub(crate) fn enter(key: TypeKey) -> DiResult<Self> {
        RESOLUTION_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(start) = stack.iter().position(|entry| *entry == key) {
                let mut path: Vec<&'static str> =
                    stack[start..].iter().map(TypeKey::display_name).collect();
                path.push(key.display_name());
                return Err(DiError::CyclicDependency(path));
            }
            stack.push(key);
            Ok(StackGuard { key })
        })
    }
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        RESOLUTION_STACK.with(|stack| {
            if let Some(last) = stack.borrow_mut().pop() {
                debug_assert_eq!(last, self.key);
            }
        });
    }
}
