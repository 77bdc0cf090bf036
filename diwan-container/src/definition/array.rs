//! Array definitions and array extensions.

use std::fmt;

use diwan_support::rendering::indent;
use tracing::debug;

use super::Definition;
use crate::error::{DiError, Result};
use crate::value::{ArrayKey, merge_entries};

/// An array whose items are resolved recursively, keys and order kept.
///
/// With `extends` set (see [`add`](super::helpers::add)) the items are
/// merged onto the previous definition of the same entry.
#[derive(Clone, Default)]
pub struct ArrayDefinition {
    pub(crate) name: String,
    pub values: Vec<(ArrayKey, Definition)>,
    pub extends: bool,
}

impl ArrayDefinition {
    /// An indexed array.
    pub fn new(values: Vec<Definition>) -> Self {
        let values = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (ArrayKey::Index(i as i64), v))
            .collect();
        Self {
            name: String::new(),
            values,
            extends: false,
        }
    }

    /// An array with string keys.
    pub fn keyed<K: Into<String>>(entries: Vec<(K, Definition)>) -> Self {
        let values = entries
            .into_iter()
            .map(|(k, v)| (ArrayKey::Key(k.into()), v))
            .collect();
        Self {
            name: String::new(),
            values,
            extends: false,
        }
    }

    /// Appends an item under the next index.
    pub fn item(mut self, value: impl Into<Definition>) -> Self {
        let next = self
            .values
            .iter()
            .filter_map(|(k, _)| match k {
                ArrayKey::Index(i) => Some(i + 1),
                ArrayKey::Key(_) => None,
            })
            .max()
            .unwrap_or(0);
        self.values.push((ArrayKey::Index(next), value.into()));
        self
    }

    /// Sets a keyed item.
    pub fn entry(mut self, key: impl Into<String>, value: impl Into<Definition>) -> Self {
        let key = ArrayKey::Key(key.into());
        let value = value.into();
        match self.values.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.values.push((key, value)),
        }
        self
    }

    /// Marks this array as an extension of the previous one.
    pub fn extending(mut self) -> Self {
        self.extends = true;
        self
    }

    pub(crate) fn extend_with(&mut self, base: Definition) -> Result<()> {
        if !self.extends {
            return Ok(());
        }
        match base {
            Definition::Array(base) => {
                debug!(entry = %self.name, base = base.values.len(), added = self.values.len(), "Extending array definition");
                self.values = merge_entries(&base.values, &self.values);
                self.extends = false;
                Ok(())
            }
            other => Err(DiError::invalid(
                self.name.clone(),
                format!(
                    "it adds array entries but the previous definition is a {} definition, not an array",
                    other.kind()
                ),
            )),
        }
    }
}

impl fmt::Display for ArrayDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[")?;
        for (key, value) in &self.values {
            writeln!(f, "    {key} => {},", indent(&value.to_string(), 1).trim_start())?;
        }
        write!(f, "]")
    }
}
