//! Factory and decorator definitions — entries produced by user callables.

use std::fmt;
use std::sync::Arc;

use diwan_support::rendering::indent;

use super::Definition;
use crate::container::Container;
use crate::error::{BoxError, Result};
use crate::scope::Scope;
use crate::value::Value;

/// Callable producing an entry.
pub type FactoryFn = Arc<dyn Fn(&FactoryContext<'_>) -> std::result::Result<Value, BoxError> + Send + Sync>;

/// Callable transforming the previous value of an entry.
pub type DecoratorFn = Arc<dyn Fn(Value, &Container) -> std::result::Result<Value, BoxError> + Send + Sync>;

/// What a factory receives when it is invoked.
pub struct FactoryContext<'a> {
    container: &'a Container,
    entry: &'a str,
    parameters: Vec<(String, Value)>,
}

impl<'a> FactoryContext<'a> {
    pub(crate) fn new(container: &'a Container, entry: &'a str, parameters: Vec<(String, Value)>) -> Self {
        Self {
            container,
            entry,
            parameters,
        }
    }

    pub fn container(&self) -> &Container {
        self.container
    }

    /// The entry being resolved (empty for a nested factory).
    pub fn entry_name(&self) -> &str {
        self.entry
    }

    /// A resolved named parameter.
    pub fn parameter(&self, name: &str) -> Option<&Value> {
        self.parameters.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn parameters(&self) -> &[(String, Value)] {
        &self.parameters
    }

    /// Shortcut for `ctx.container().get(name)`.
    pub fn get(&self, name: &str) -> Result<Value> {
        self.container.get(name)
    }
}

/// An entry produced by calling a closure.
#[derive(Clone)]
pub struct FactoryDefinition {
    pub(crate) name: String,
    pub factory: FactoryFn,
    pub parameters: Vec<(String, Definition)>,
    pub scope: Scope,
}

impl FactoryDefinition {
    pub fn new(
        factory: impl Fn(&FactoryContext<'_>) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: String::new(),
            factory: Arc::new(factory),
            parameters: Vec::new(),
            scope: Scope::Singleton,
        }
    }

    /// Passes a named parameter to the factory, resolved like any definition.
    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Definition>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.parameters.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.parameters.push((name, value)),
        }
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

impl fmt::Display for FactoryDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Factory (")?;
        writeln!(f, "    scope = {}", self.scope)?;
        for (name, parameter) in &self.parameters {
            writeln!(f, "    ${name} = {}", indent(&parameter.to_string(), 1).trim_start())?;
        }
        write!(f, ")")
    }
}

/// Wraps the value produced by the previous definition of the same entry.
#[derive(Clone)]
pub struct DecoratorDefinition {
    pub(crate) name: String,
    pub decorator: DecoratorFn,
    /// Set by the source chain; resolution fails while it is empty.
    pub previous: Option<Box<Definition>>,
}

impl DecoratorDefinition {
    pub fn new(
        decorator: impl Fn(Value, &Container) -> std::result::Result<Value, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: String::new(),
            decorator: Arc::new(decorator),
            previous: None,
        }
    }
}

impl fmt::Display for DecoratorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Decorate (")?;
        match &self.previous {
            Some(previous) => writeln!(f, "{}", indent(&previous.to_string(), 1))?,
            None => writeln!(f, "    <no previous definition>")?,
        }
        write!(f, ")")
    }
}
