//! Turning definitions into values.
//!
//! [`DefinitionResolver`] dispatches on the definition variant. It does not
//! cache anything: the container owns the singleton cache and the
//! resolution stack, and calls the resolver once per cache miss.

pub mod object;
pub mod stack;

use std::sync::Arc;

use tracing::trace;

use crate::container::{Container, ServiceLocator};
use crate::definition::{
    Definition, DecoratorDefinition, EnvironmentVariableDefinition, FactoryContext,
    FactoryDefinition, ObjectDefinition, StringDefinition,
};
use crate::definition::string::TemplatePart;
use crate::error::{BoxError, DiError, Result};
use crate::proxy::Thunk;
use crate::value::{ArrayValue, Value};

pub use stack::{ResolutionStack, StackGuard};

/// Explicit values for one [`Container::make`] call, by parameter or
/// property name.
pub type Parameters = Vec<(String, Value)>;

/// Resolves definitions against a container.
pub struct DefinitionResolver<'c> {
    container: &'c Container,
}

impl<'c> DefinitionResolver<'c> {
    pub fn new(container: &'c Container) -> Self {
        Self { container }
    }

    /// Resolves `definition`, applying `parameters` where the variant
    /// accepts them (objects and factories).
    pub fn resolve(&self, definition: &Definition, parameters: &[(String, Value)]) -> Result<Value> {
        trace!(entry = %definition.name(), kind = definition.kind(), "Resolving definition");
        match definition {
            Definition::Value(d) => Ok(d.value.clone()),
            Definition::Reference(d) => self.reference(&d.target),
            Definition::Object(d) => self.object(d, parameters),
            Definition::Factory(d) => self.factory(d, parameters),
            Definition::Array(d) => {
                let mut array = ArrayValue::new();
                for (key, item) in &d.values {
                    array.insert(key.clone(), self.resolve(item, &[])?);
                }
                Ok(Value::from(array))
            }
            Definition::Environment(d) => self.environment(d),
            Definition::Decorator(d) => self.decorator(d),
            Definition::ServiceLocator(d) => Ok(Value::Locator(Arc::new(ServiceLocator::new(
                self.container,
                d.subscriber.clone(),
                d.services.clone(),
            )))),
            Definition::String(d) => self.string(d),
        }
    }

    /// Whether `definition` can produce a value at all.
    ///
    /// Objects need a known, instantiable class; everything else is
    /// considered resolvable even if resolving it may still fail.
    pub fn is_resolvable(&self, definition: &Definition) -> bool {
        match definition {
            Definition::Object(d) => self
                .container
                .classes()
                .get(d.class_name())
                .is_some_and(|class| class.is_instantiable()),
            _ => true,
        }
    }

    /// Resolves another entry; an unknown target is a definition error.
    pub(crate) fn reference(&self, target: &str) -> Result<Value> {
        self.container.get(target).map_err(|err| match err {
            DiError::NotFound(not_found) if not_found.requested == target => {
                DiError::invalid(target, format!("no entry or class found for '{target}'"))
            }
            other => other,
        })
    }

    fn object(&self, definition: &ObjectDefinition, parameters: &[(String, Value)]) -> Result<Value> {
        if !definition.is_lazy() {
            return object::create(self.container, definition, parameters);
        }

        let weak = self.container.downgrade();
        let entry = definition.name.clone();
        let deferred = definition.clone();
        let parameters = parameters.to_vec();
        let thunk: Thunk = Arc::new(move || {
            let container = weak.upgrade().ok_or_else(|| DiError::ContainerDropped {
                entry: entry.clone(),
            })?;
            if entry.is_empty() {
                return object::create(&container, &deferred, &parameters);
            }
            let _guard = container.stack().enter(&entry)?;
            object::create(&container, &deferred, &parameters).map_err(|err| err.within(&entry))
        });

        self.container
            .proxy_factory()
            .create_proxy(definition.class_name(), thunk)
    }

    fn factory(&self, definition: &FactoryDefinition, overrides: &[(String, Value)]) -> Result<Value> {
        let mut parameters = Vec::with_capacity(definition.parameters.len() + overrides.len());
        for (name, value) in &definition.parameters {
            if overrides.iter().any(|(n, _)| n == name) {
                continue;
            }
            parameters.push((name.clone(), self.resolve(value, &[])?));
        }
        parameters.extend(overrides.iter().cloned());

        let context = FactoryContext::new(self.container, &definition.name, parameters);
        (definition.factory)(&context).map_err(|err| from_callable(&definition.name, err))
    }

    fn environment(&self, definition: &EnvironmentVariableDefinition) -> Result<Value> {
        if let Some(value) = self.container.environment().var(&definition.variable) {
            return Ok(Value::string(value));
        }
        if !definition.optional {
            return Err(missing_variable(&definition.name, &definition.variable));
        }
        match &definition.default {
            Some(default) => self.resolve(default, &[]),
            None => Ok(Value::Null),
        }
    }

    fn decorator(&self, definition: &DecoratorDefinition) -> Result<Value> {
        let Some(previous) = &definition.previous else {
            return Err(DiError::invalid(
                definition.name.clone(),
                "it is a decorator but there is no previous definition to decorate",
            ));
        };
        let value = self.resolve(previous, &[])?;
        (definition.decorator)(value, self.container).map_err(|err| from_callable(&definition.name, err))
    }

    fn string(&self, definition: &StringDefinition) -> Result<Value> {
        self.render_template(&definition.name, &definition.template, definition.parts()?)
    }

    /// Concatenates `parts`, resolving the entries they reference.
    pub(crate) fn render_template(
        &self,
        entry: &str,
        template: &str,
        parts: impl IntoIterator<Item = TemplatePart>,
    ) -> Result<Value> {
        let mut rendered = String::new();
        for part in parts {
            match part {
                TemplatePart::Text(text) => rendered.push_str(&text),
                TemplatePart::Entry(name) => {
                    let value = self.reference(&name).map_err(|err| match err {
                        DiError::InvalidDefinition(e) if e.entry == name && e.path.is_empty() => {
                            DiError::invalid(
                                entry,
                                format!("the string \"{template}\" references an unknown entry '{name}'"),
                            )
                        }
                        other => other,
                    })?;
                    let text = interpolated(&value).ok_or_else(|| {
                        DiError::invalid(
                            entry,
                            format!("the entry '{name}' is a {} and cannot be interpolated in a string", value.kind()),
                        )
                    })?;
                    rendered.push_str(&text);
                }
            }
        }
        Ok(Value::string(rendered))
    }
}

/// The error for a required environment variable that is not set.
pub(crate) fn missing_variable(entry: &str, variable: &str) -> DiError {
    DiError::invalid(entry, format!("the environment variable '{variable}' has not been defined"))
}

/// Text of a scalar value inside a string template.
pub(crate) fn interpolated(value: &Value) -> Option<String> {
    match value {
        Value::Null => Some(String::new()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(x) => Some(x.to_string()),
        Value::Str(s) => Some(s.to_string()),
        _ => None,
    }
}

/// Maps an error returned by a user callable.
///
/// Container errors raised inside the callable (e.g. a failed `get`) are
/// passed through unchanged; anything else is a construction failure.
pub(crate) fn from_callable(entry: &str, err: BoxError) -> DiError {
    match err.downcast::<DiError>() {
        Ok(err) => *err,
        Err(err) => DiError::construction(entry, err),
    }
}
