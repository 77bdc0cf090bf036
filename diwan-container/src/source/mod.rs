//! Definition sources and the chain that consults them.
//!
//! A source answers "what is the definition of `name`?". Several sources
//! are stacked in a [`SourceChain`]: the first one that knows a name wins,
//! and definitions that extend a previous one are merged with what the
//! lower-priority sources provide.

pub mod array;
pub mod chain;

use crate::definition::Definition;
use crate::error::Result;

pub use array::DefinitionArray;
pub use chain::SourceChain;

/// Provides definitions by entry name.
pub trait DefinitionSource: Send + Sync {
    /// Returns the definition of `name`, or `None` if this source does not know it.
    fn get_definition(&self, name: &str) -> Result<Option<Definition>>;

    /// Every entry name this source can enumerate, in declaration order.
    fn definition_names(&self) -> Vec<String>;

    /// Every definition this source can enumerate.
    fn definitions(&self) -> Result<Vec<Definition>> {
        let mut definitions = Vec::new();
        for name in self.definition_names() {
            if let Some(definition) = self.get_definition(&name)? {
                definitions.push(definition);
            }
        }
        Ok(definitions)
    }
}

/// A source definitions can be added to at runtime.
///
/// The container keeps one at the head of its chain for `set()`.
pub trait MutableDefinitionSource: DefinitionSource {
    fn add_definition(&self, definition: Definition) -> Result<()>;

    fn remove_definition(&self, name: &str) -> Option<Definition>;
}
