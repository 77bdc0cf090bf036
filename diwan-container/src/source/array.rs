//! In-memory definition source.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use super::{DefinitionSource, MutableDefinitionSource};
use crate::definition::Definition;
use crate::error::Result;

#[derive(Default)]
struct Entries {
    definitions: HashMap<String, Definition>,
    order: Vec<String>,
}

/// Definitions keyed by entry name, kept in declaration order.
///
/// Adding a definition names it and checks its nested definitions;
/// adding the same name twice replaces the earlier definition.
///
/// # Examples
/// ```
/// use diwan_container::definition::helpers::{create, get, value};
/// use diwan_container::source::{DefinitionArray, DefinitionSource};
///
/// let definitions = DefinitionArray::new();
/// definitions.add("db.host", value("localhost")).unwrap();
/// definitions.add("app::Mailer", create()).unwrap();
/// definitions.add("mailer", get("app::Mailer")).unwrap();
///
/// assert_eq!(definitions.definition_names(), ["db.host", "app::Mailer", "mailer"]);
/// ```
#[derive(Default)]
pub struct DefinitionArray {
    entries: RwLock<Entries>,
}

impl DefinitionArray {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from `(name, definition)` pairs.
    pub fn from_definitions<N, D, I>(definitions: I) -> Result<Self>
    where
        N: Into<String>,
        D: Into<Definition>,
        I: IntoIterator<Item = (N, D)>,
    {
        let array = Self::new();
        for (name, definition) in definitions {
            array.add(name, definition)?;
        }
        Ok(array)
    }

    /// Adds (or replaces) the definition of `name`.
    pub fn add(&self, name: impl Into<String>, definition: impl Into<Definition>) -> Result<()> {
        self.add_definition(definition.into().named(name))
    }

    pub fn len(&self) -> usize {
        self.entries.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().order.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().definitions.contains_key(name)
    }
}

impl DefinitionSource for DefinitionArray {
    fn get_definition(&self, name: &str) -> Result<Option<Definition>> {
        Ok(self.entries.read().definitions.get(name).cloned())
    }

    fn definition_names(&self) -> Vec<String> {
        self.entries.read().order.clone()
    }
}

impl MutableDefinitionSource for DefinitionArray {
    fn add_definition(&self, definition: Definition) -> Result<()> {
        definition.validate_nested()?;

        let name = definition.name().to_string();
        debug!(entry = %name, kind = definition.kind(), "Added definition");

        let mut entries = self.entries.write();
        if entries.definitions.insert(name.clone(), definition).is_none() {
            entries.order.push(name);
        }
        Ok(())
    }

    fn remove_definition(&self, name: &str) -> Option<Definition> {
        let mut entries = self.entries.write();
        let removed = entries.definitions.remove(name)?;
        entries.order.retain(|n| n != name);
        Some(removed)
    }
}

impl std::fmt::Debug for DefinitionArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionArray")
            .field("entries", &self.entries.read().order)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{create, decorate, get, value};

    #[test]
    fn add_names_the_definition() {
        let definitions = DefinitionArray::new();
        definitions.add("mailer", create()).unwrap();

        let definition = definitions.get_definition("mailer").unwrap().unwrap();
        assert_eq!(definition.name(), "mailer");
        assert!(definitions.get_definition("logger").unwrap().is_none());
    }

    #[test]
    fn replacing_keeps_declaration_order() {
        let definitions = DefinitionArray::from_definitions([
            ("a", value(1)),
            ("b", value(2)),
            ("a", get("b")),
        ])
        .unwrap();

        assert_eq!(definitions.definition_names(), ["a", "b"]);
        assert_eq!(definitions.len(), 2);
        assert!(matches!(
            definitions.get_definition("a").unwrap(),
            Some(Definition::Reference(_))
        ));
    }

    #[test]
    fn nested_decorators_are_rejected() {
        let definitions = DefinitionArray::new();
        let result = definitions.add("x", create().property("p", decorate(|v, _| Ok(v))));
        assert!(result.is_err());
        assert!(definitions.is_empty());
    }

    #[test]
    fn remove_definition() {
        let definitions = DefinitionArray::from_definitions([("a", value(1))]).unwrap();
        assert!(definitions.remove_definition("a").is_some());
        assert!(definitions.remove_definition("a").is_none());
        assert!(definitions.definition_names().is_empty());
    }
}
