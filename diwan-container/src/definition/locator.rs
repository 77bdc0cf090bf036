//! Service locator definitions.

use std::fmt;

/// A read-only view exposing only the services a subscriber declared.
///
/// `services` maps the name the subscriber uses to the entry backing it.
#[derive(Debug, Clone)]
pub struct ServiceLocatorDefinition {
    pub(crate) name: String,
    pub subscriber: String,
    pub services: Vec<(String, String)>,
}

impl ServiceLocatorDefinition {
    pub fn new(subscriber: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            subscriber: subscriber.into(),
            services: Vec::new(),
        }
    }

    /// Exposes `entry` under its own name.
    pub fn service(self, entry: impl Into<String>) -> Self {
        let entry = entry.into();
        self.alias(entry.clone(), entry)
    }

    /// Exposes `entry` under `alias`.
    pub fn alias(mut self, alias: impl Into<String>, entry: impl Into<String>) -> Self {
        let alias = alias.into();
        let entry = entry.into();
        match self.services.iter_mut().find(|(a, _)| *a == alias) {
            Some(slot) => slot.1 = entry,
            None => self.services.push((alias, entry)),
        }
        self
    }
}

impl fmt::Display for ServiceLocatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ServiceLocator (")?;
        writeln!(f, "    subscriber = {}", self.subscriber)?;
        for (alias, entry) in &self.services {
            writeln!(f, "    {alias} => get({entry})")?;
        }
        write!(f, ")")
    }
}
