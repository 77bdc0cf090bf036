//! Short constructors for definitions.
//!
//! ```
//! use diwan_container::definition::helpers::*;
//!
//! let definitions = vec![
//!     ("db.host", env_or("DB_HOST", "localhost").into()),
//!     ("db.dsn", string("postgres://{db.host}/app")),
//!     ("app::Mailer", autowire().property("debug", true).into()),
//!     ("mailer", get("app::Mailer")),
//!     ("listeners", array(vec![get("audit"), get("metrics")]).into()),
//! ];
//! assert_eq!(definitions.len(), 5);
//! ```

use super::{
    ArrayDefinition, Definition, DecoratorDefinition, EnvironmentVariableDefinition, FactoryContext,
    FactoryDefinition, ObjectDefinition, Reference, ServiceLocatorDefinition, StringDefinition,
    ValueDefinition,
};
use crate::container::Container;
use crate::error::BoxError;
use crate::value::Value;

/// A ready value.
pub fn value(value: impl Into<Value>) -> Definition {
    Definition::Value(ValueDefinition::new(value))
}

/// An alias to another entry.
pub fn get(target: impl Into<String>) -> Definition {
    Definition::Reference(Reference::new(target))
}

/// An object built without autowiring.
pub fn create() -> ObjectDefinition {
    ObjectDefinition::new()
}

/// An object whose missing arguments are guessed from parameter types.
pub fn autowire() -> ObjectDefinition {
    ObjectDefinition::autowired()
}

/// A value returned by `factory`.
pub fn factory(
    factory: impl Fn(&FactoryContext<'_>) -> Result<Value, BoxError> + Send + Sync + 'static,
) -> FactoryDefinition {
    FactoryDefinition::new(factory)
}

/// Wraps the previous definition of the entry.
pub fn decorate(
    decorator: impl Fn(Value, &Container) -> Result<Value, BoxError> + Send + Sync + 'static,
) -> Definition {
    Definition::Decorator(DecoratorDefinition::new(decorator))
}

/// A required environment variable.
pub fn env(variable: impl Into<String>) -> EnvironmentVariableDefinition {
    EnvironmentVariableDefinition::new(variable)
}

/// An optional environment variable with a default.
pub fn env_or(variable: impl Into<String>, default: impl Into<Definition>) -> EnvironmentVariableDefinition {
    EnvironmentVariableDefinition::with_default(variable, default)
}

/// An indexed array.
pub fn array(values: Vec<Definition>) -> ArrayDefinition {
    ArrayDefinition::new(values)
}

/// An array with string keys.
pub fn array_keyed<K: Into<String>>(entries: Vec<(K, Definition)>) -> ArrayDefinition {
    ArrayDefinition::keyed(entries)
}

/// Items added to the previous array definition of the entry.
pub fn add(values: Vec<Definition>) -> ArrayDefinition {
    ArrayDefinition::new(values).extending()
}

/// A string template, e.g. `"{app.root}/cache"`.
pub fn string(template: impl Into<String>) -> Definition {
    Definition::String(StringDefinition::new(template))
}

/// A locator exposing the services `subscriber` declares.
pub fn service_locator(subscriber: impl Into<String>) -> ServiceLocatorDefinition {
    ServiceLocatorDefinition::new(subscriber)
}
