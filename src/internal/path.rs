//! Cycle detection for a single resolution call chain.

use crate::error::{DiError, DiResult};
use crate::key::Key;

/// Default limit on nested constructions.
pub(crate) const MAX_DEPTH: usize = 1024;

/// Stack of concrete types currently under construction.
///
/// One path is created per top-level resolution and threaded through the
/// recursion, so concurrent resolutions never see each other's frames.
#[derive(Debug, Clone)]
pub(crate) struct ResolutionPath {
    stack: Vec<Key>,
    max_depth: usize,
}

impl ResolutionPath {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            stack: Vec::new(),
            max_depth,
        }
    }

    /// Pushes `key`, failing if it is already being constructed further up
    /// the chain or if the depth limit is reached.
    fn enter(&mut self, key: Key) -> DiResult<()> {
        // Circular detection BEFORE pushing the new key
        if self.stack.contains(&key) {
            let mut path: Vec<&'static str> = self.stack.iter().map(Key::display_name).collect();
            path.push(key.display_name());
            return Err(DiError::CyclicDependency(path));
        }

        if self.stack.len() >= self.max_depth {
            return Err(DiError::DepthExceeded(self.stack.len()));
        }

        self.stack.push(key);
        Ok(())
    }

    fn leave(&mut self, key: Key) {
        let last = self.stack.pop();
        debug_assert_eq!(last, Some(key));
    }

    /// Runs `f` with `key` on the stack, popping it whatever `f` returns.
    pub(crate) fn with_entered<T, F>(&mut self, key: Key, f: F) -> DiResult<T>
    where
        F: FnOnce(&mut Self) -> DiResult<T>,
    {
        self.enter(key)?;
        let result = f(self);
        self.leave(key);
        result
    }

    /// The concrete type whose constructor is currently resolving arguments.
    pub(crate) fn requested_from(&self) -> Option<Key> {
        self.stack.last().copied()
    }

    pub(crate) fn depth(&self) -> usize {
        self.stack.len()
    }
}
