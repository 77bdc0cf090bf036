//! Entries currently being resolved, for cycle detection.

use std::collections::HashMap;
use std::thread::{self, ThreadId};

use diwan_support::rendering::render_chain;
use parking_lot::Mutex;
use tracing::warn;

use crate::error::{CircularDependencyError, DiError, Result};

/// The resolution-in-progress stack of a container.
///
/// Each thread resolving through the same container gets its own stack,
/// so two threads building the same singleton are not mistaken for a
/// cycle.
#[derive(Debug, Default)]
pub struct ResolutionStack {
    stacks: Mutex<HashMap<ThreadId, Vec<String>>>,
}

impl ResolutionStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `entry`, failing if it is already being resolved.
    ///
    /// The entry is popped when the returned guard drops.
    pub fn enter(&self, entry: &str) -> Result<StackGuard<'_>> {
        let mut stacks = self.stacks.lock();
        let stack = stacks.entry(thread::current().id()).or_default();

        if stack.iter().any(|e| e == entry) {
            let mut chain = stack.clone();
            chain.push(entry.to_string());
            warn!(entry, chain = %render_chain(&chain), "Circular dependency detected");
            return Err(DiError::CircularDependency(CircularDependencyError { chain }));
        }

        stack.push(entry.to_string());
        Ok(StackGuard { stack: self })
    }

    /// Entries being resolved on the current thread, outermost first.
    pub fn path(&self) -> Vec<String> {
        self.stacks
            .lock()
            .get(&thread::current().id())
            .cloned()
            .unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.stacks
            .lock()
            .get(&thread::current().id())
            .map_or(0, Vec::len)
    }

    fn pop(&self) {
        let id = thread::current().id();
        let mut stacks = self.stacks.lock();
        if let Some(stack) = stacks.get_mut(&id) {
            stack.pop();
            if stack.is_empty() {
                stacks.remove(&id);
            }
        }
    }
}

/// Pops its entry from the [`ResolutionStack`] on drop, error paths included.
#[must_use = "the entry is popped as soon as the guard is dropped"]
pub struct StackGuard<'a> {
    stack: &'a ResolutionStack,
}

impl Drop for StackGuard<'_> {
    fn drop(&mut self) {
        self.stack.pop();
    }
}
