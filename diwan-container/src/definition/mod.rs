//! Definitions — declarative recipes for container entries.
//!
//! A [`Definition`] says *how* an entry is produced; the resolver turns it
//! into a [`Value`](crate::value::Value). The variant set is closed so the
//! resolver and the compiler can match on it exhaustively.
//!
//! Nested values (constructor arguments, properties, array items,
//! environment defaults) are themselves definitions. Plain values are
//! converted with `From`, so `create().property("debug", true)` and
//! `create().property("logger", get("app.logger"))` read the same way.

pub mod array;
pub mod environment;
pub mod factory;
pub mod helpers;
pub mod locator;
pub mod object;
pub mod reference;
pub mod string;
pub mod value;

use std::fmt;

use crate::error::{DiError, Result};
use crate::scope::Scope;

pub use array::ArrayDefinition;
pub use environment::EnvironmentVariableDefinition;
pub use factory::{DecoratorDefinition, DecoratorFn, FactoryContext, FactoryDefinition, FactoryFn};
pub use locator::ServiceLocatorDefinition;
pub use object::{CONSTRUCTOR, Extends, MethodInjection, ObjectDefinition, ParamKey};
pub use reference::Reference;
pub use string::StringDefinition;
pub use value::ValueDefinition;

/// How to produce the value of an entry.
#[derive(Clone)]
pub enum Definition {
    /// An already built value.
    Value(ValueDefinition),
    /// An alias to another entry.
    Reference(Reference),
    /// An object built from a class, with injections.
    Object(ObjectDefinition),
    /// A value returned by a callable.
    Factory(FactoryDefinition),
    /// An array whose items may be definitions.
    Array(ArrayDefinition),
    /// A value read from the environment.
    Environment(EnvironmentVariableDefinition),
    /// A callable wrapping the previous definition of the same entry.
    Decorator(DecoratorDefinition),
    /// A read-only view over a fixed set of entries.
    ServiceLocator(ServiceLocatorDefinition),
    /// A string template interpolating other entries.
    String(StringDefinition),
}

impl Definition {
    /// The entry name, empty for nested definitions.
    pub fn name(&self) -> &str {
        match self {
            Definition::Value(d) => &d.name,
            Definition::Reference(d) => &d.name,
            Definition::Object(d) => &d.name,
            Definition::Factory(d) => &d.name,
            Definition::Array(d) => &d.name,
            Definition::Environment(d) => &d.name,
            Definition::Decorator(d) => &d.name,
            Definition::ServiceLocator(d) => &d.name,
            Definition::String(d) => &d.name,
        }
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self {
            Definition::Value(d) => d.name = name,
            Definition::Reference(d) => d.name = name,
            Definition::Object(d) => d.name = name,
            Definition::Factory(d) => d.name = name,
            Definition::Array(d) => d.name = name,
            Definition::Environment(d) => d.name = name,
            Definition::Decorator(d) => d.name = name,
            Definition::ServiceLocator(d) => d.name = name,
            Definition::String(d) => d.name = name,
        }
    }

    /// Returns the definition renamed.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.set_name(name);
        self
    }

    /// Lifetime of the resolved value.
    pub fn scope(&self) -> Scope {
        match self {
            Definition::Value(_) => Scope::Singleton,
            Definition::Reference(_) => Scope::Prototype,
            Definition::Object(d) => d.get_scope(),
            Definition::Factory(d) => d.scope,
            Definition::Array(_) => Scope::Singleton,
            Definition::Environment(_) => Scope::Singleton,
            Definition::Decorator(d) => d.previous.as_ref().map_or(Scope::Singleton, |p| p.scope()),
            Definition::ServiceLocator(_) => Scope::Singleton,
            Definition::String(_) => Scope::Singleton,
        }
    }

    /// Whether resolved values of this definition go to the singleton cache.
    ///
    /// Values are returned as-is and never need caching.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Definition::Value(_)) && self.scope().is_cached()
    }

    /// Short name of the variant, for messages and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Definition::Value(_) => "value",
            Definition::Reference(_) => "reference",
            Definition::Object(_) => "object",
            Definition::Factory(_) => "factory",
            Definition::Array(_) => "array",
            Definition::Environment(_) => "environment variable",
            Definition::Decorator(_) => "decorator",
            Definition::ServiceLocator(_) => "service locator",
            Definition::String(_) => "string",
        }
    }

    /// Name of the definition this one extends, if any.
    ///
    /// Objects extend the definition named after their class (or the
    /// entry named with [`ObjectDefinition::extends`]); array extensions
    /// and decorators extend the previous definition of their own name.
    pub fn extension_target(&self) -> Option<&str> {
        match self {
            Definition::Object(d) => Some(d.extension_target()),
            Definition::Array(d) if d.extends => Some(&d.name),
            Definition::Decorator(d) => Some(&d.name),
            _ => None,
        }
    }

    /// Whether a missing base for [`Definition::extension_target`] is a
    /// configuration error.
    pub fn requires_extension(&self) -> bool {
        matches!(self, Definition::Object(d) if d.extends.is_some())
    }

    /// Merges this definition with the one it extends.
    pub fn extend_with(&mut self, base: Definition) -> Result<()> {
        match self {
            Definition::Object(object) => match base {
                Definition::Object(base) => {
                    let merged = std::mem::take(object).merge(base);
                    *object = merged;
                    Ok(())
                }
                other if object.extends.is_some() => Err(DiError::invalid(
                    object.name.clone(),
                    format!(
                        "it extends '{}', which is a {} definition and not an object",
                        object.extension_target(),
                        other.kind()
                    ),
                )),
                _ => Ok(()),
            },
            Definition::Array(array) => array.extend_with(base),
            Definition::Decorator(decorator) => {
                decorator.previous = Some(Box::new(base));
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Visits every direct sub-definition.
    pub fn for_each_nested(&self, f: &mut dyn FnMut(&Definition)) {
        match self {
            Definition::Object(d) => d.for_each_nested(f),
            Definition::Factory(d) => d.parameters.iter().for_each(|(_, p)| f(p)),
            Definition::Array(d) => d.values.iter().for_each(|(_, v)| f(v)),
            Definition::Environment(d) => {
                if let Some(default) = &d.default {
                    f(default)
                }
            }
            Definition::Value(_)
            | Definition::Reference(_)
            | Definition::Decorator(_)
            | Definition::ServiceLocator(_)
            | Definition::String(_) => {}
        }
    }

    /// Visits every direct sub-definition mutably, stopping at the first error.
    pub fn try_for_each_nested_mut(
        &mut self,
        f: &mut dyn FnMut(&mut Definition) -> Result<()>,
    ) -> Result<()> {
        match self {
            Definition::Object(d) => d.try_for_each_nested_mut(f),
            Definition::Factory(d) => d.parameters.iter_mut().try_for_each(|(_, p)| f(p)),
            Definition::Array(d) => d.values.iter_mut().try_for_each(|(_, v)| f(v)),
            Definition::Environment(d) => match &mut d.default {
                Some(default) => f(default),
                None => Ok(()),
            },
            Definition::Value(_)
            | Definition::Reference(_)
            | Definition::Decorator(_)
            | Definition::ServiceLocator(_)
            | Definition::String(_) => Ok(()),
        }
    }

    /// Checks the rules every root definition must follow.
    ///
    /// Decorators only make sense at the root: they wrap the previous
    /// definition of an entry, and a nested definition has no entry.
    pub fn validate_nested(&self) -> Result<()> {
        let mut error = None;
        self.for_each_nested(&mut |nested| {
            if error.is_some() {
                return;
            }
            if matches!(nested, Definition::Decorator(_)) {
                error = Some(DiError::invalid(
                    self.name(),
                    "decorators cannot be nested in another definition",
                ));
            } else if let Err(err) = nested.validate_nested() {
                error = Some(err);
            }
        });
        match error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Definition::Value(d) => fmt::Display::fmt(d, f),
            Definition::Reference(d) => fmt::Display::fmt(d, f),
            Definition::Object(d) => fmt::Display::fmt(d, f),
            Definition::Factory(d) => fmt::Display::fmt(d, f),
            Definition::Array(d) => fmt::Display::fmt(d, f),
            Definition::Environment(d) => fmt::Display::fmt(d, f),
            Definition::Decorator(d) => fmt::Display::fmt(d, f),
            Definition::ServiceLocator(d) => fmt::Display::fmt(d, f),
            Definition::String(d) => fmt::Display::fmt(d, f),
        }
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Definition::{}({:?})", self.kind(), self.name())
    }
}

macro_rules! definition_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Definition {
                fn from(definition: $ty) -> Self {
                    Definition::$variant(definition)
                }
            }
        )*
    };
}

definition_from!(
    Value(ValueDefinition),
    Reference(Reference),
    Object(ObjectDefinition),
    Factory(FactoryDefinition),
    Array(ArrayDefinition),
    Environment(EnvironmentVariableDefinition),
    Decorator(DecoratorDefinition),
    ServiceLocator(ServiceLocatorDefinition),
    String(StringDefinition),
);

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Definition {
                fn from(value: $ty) -> Self {
                    Definition::Value(ValueDefinition::new(value))
                }
            }
        )*
    };
}

literal_from!(crate::value::Value, &str, String, bool, i32, i64, u32, f64);

#[cfg(test)]
mod tests {
    use super::helpers::*;
    use super::*;

    #[test]
    fn literals_become_value_definitions() {
        let definition: Definition = "smtp".into();
        assert!(matches!(definition, Definition::Value(_)));
        assert_eq!(definition.kind(), "value");
    }

    #[test]
    fn references_are_prototype() {
        assert_eq!(get("a").scope(), Scope::Prototype);
        assert!(!get("a").is_cacheable());
        assert!(!value(1).is_cacheable());
        assert!(Definition::from(create()).is_cacheable());
    }

    #[test]
    fn extension_targets() {
        assert_eq!(Definition::from(create().class("Mailer")).named("m").extension_target(), Some("Mailer"));
        assert_eq!(Definition::from(create()).named("m").extension_target(), Some("m"));
        assert_eq!(Definition::from(add(vec![value(1)])).named("list").extension_target(), Some("list"));
        assert_eq!(Definition::from(array(vec![value(1)])).named("list").extension_target(), None);
        assert_eq!(decorate(|v, _| Ok(v)).named("x").extension_target(), Some("x"));
        assert_eq!(get("y").named("x").extension_target(), None);
    }

    #[test]
    fn nested_decorator_is_rejected() {
        let definition: Definition = create()
            .property("inner", decorate(|v, _| Ok(v)))
            .into();
        let err = definition.named("outer").validate_nested().unwrap_err();
        assert!(matches!(err, DiError::InvalidDefinition(_)));
        assert!(format!("{err}").contains("cannot be nested"));
    }

    #[test]
    fn decorator_scope_follows_previous() {
        let mut decorator = decorate(|v, _| Ok(v)).named("x");
        assert_eq!(decorator.scope(), Scope::Singleton);
        decorator
            .extend_with(create().scope(Scope::Prototype).into())
            .unwrap();
        assert_eq!(decorator.scope(), Scope::Prototype);
    }
}
