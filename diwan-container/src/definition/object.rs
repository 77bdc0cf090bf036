//! Object definitions: a class plus constructor, property and method injections.

use std::fmt;

use diwan_support::rendering::indent;
use tracing::trace;

use super::Definition;
use crate::error::Result;
use crate::registry::Parameter;
use crate::scope::Scope;

/// Method name used for constructor injection.
pub const CONSTRUCTOR: &str = "__construct";

/// Identifies a parameter by position or by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKey {
    Index(usize),
    Name(String),
}

impl From<usize> for ParamKey {
    fn from(index: usize) -> Self {
        ParamKey::Index(index)
    }
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Name(name.to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::Name(name)
    }
}

/// One call of a method (or the constructor) with explicit arguments.
///
/// Arguments are kept in precedence order, each under a position or a
/// name. When a position and a name both designate the same parameter,
/// the argument listed first wins. Merging lists the overriding side's
/// arguments before the base's, so an override wins however either side
/// spelled the parameter.
#[derive(Clone, Default)]
pub struct MethodInjection {
    pub method: String,
    pub arguments: Vec<(ParamKey, Definition)>,
}

impl MethodInjection {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    /// A call with positional arguments.
    pub fn with_arguments(method: impl Into<String>, arguments: Vec<Definition>) -> Self {
        Self {
            method: method.into(),
            arguments: arguments
                .into_iter()
                .enumerate()
                .map(|(index, argument)| (ParamKey::Index(index), argument))
                .collect(),
        }
    }

    /// Sets the argument under `key`, replacing one set under the same key.
    pub fn set(&mut self, key: ParamKey, value: Definition) {
        match self.arguments.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.arguments.push((key, value)),
        }
    }

    /// The argument given at position `index`.
    pub fn parameter(&self, index: usize) -> Option<&Definition> {
        self.arguments
            .iter()
            .find(|(key, _)| *key == ParamKey::Index(index))
            .map(|(_, d)| d)
    }

    /// The argument given under `name`.
    pub fn named_parameter(&self, name: &str) -> Option<&Definition> {
        self.arguments
            .iter()
            .find(|(key, _)| matches!(key, ParamKey::Name(n) if n == name))
            .map(|(_, d)| d)
    }

    /// The winning argument for `parameter` at `index`, by position or name.
    pub fn argument(&self, index: usize, parameter: &Parameter) -> Option<&Definition> {
        self.arguments
            .iter()
            .find(|(key, _)| match key {
                ParamKey::Index(i) => *i == index,
                ParamKey::Name(name) => *name == parameter.name,
            })
            .map(|(_, d)| d)
    }

    /// Whether an argument was given for `parameter` at `index`.
    pub fn has_argument(&self, index: usize, parameter: &Parameter) -> bool {
        self.argument(index, parameter).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }

    /// The first argument that `signature` cannot take: a position past
    /// its end or a name it does not declare.
    pub fn unexpected(&self, signature: &[Parameter]) -> Option<&ParamKey> {
        self.arguments
            .iter()
            .map(|(key, _)| key)
            .find(|key| match key {
                ParamKey::Index(index) => *index >= signature.len(),
                ParamKey::Name(name) => signature.iter().all(|p| p.name != *name),
            })
    }

    /// Moves named arguments to their position in `signature`.
    ///
    /// Arguments shadowed by an earlier one for the same parameter are
    /// dropped. Names that do not match any parameter are kept.
    pub fn resolve_names(&mut self, signature: &[Parameter]) {
        let arguments = std::mem::take(&mut self.arguments);
        for (key, value) in arguments {
            let key = match key {
                ParamKey::Name(name) => match signature.iter().position(|p| p.name == name) {
                    Some(index) => ParamKey::Index(index),
                    None => ParamKey::Name(name),
                },
                index => index,
            };
            if self.arguments.iter().all(|(k, _)| *k != key) {
                self.arguments.push((key, value));
            }
        }
    }

    /// Combines with `base`: arguments set here come first and win, the
    /// base's follow as fallbacks.
    pub fn merge(mut self, base: MethodInjection) -> MethodInjection {
        for (key, value) in base.arguments {
            if self.arguments.iter().all(|(k, _)| *k != key) {
                self.arguments.push((key, value));
            }
        }
        self
    }

    fn fmt_body(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}(", self.method)?;
        for (key, value) in &self.arguments {
            let value = indent(&value.to_string(), 1);
            match key {
                ParamKey::Index(index) => writeln!(f, "    #{index} = {}", value.trim_start())?,
                ParamKey::Name(name) => writeln!(f, "    ${name} = {}", value.trim_start())?,
            }
        }
        write!(f, ")")
    }
}

impl fmt::Display for MethodInjection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_body(f)
    }
}

/// How an object definition extends another definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extends {
    /// The previous definition of the same entry
    Previous,
    /// The definition of another entry
    Entry(String),
}

/// Describes an object to construct.
///
/// # Examples
/// ```
/// use diwan_container::definition::helpers::{create, get};
///
/// let mailer = create()
///     .class("app::Mailer")
///     .constructor(vec![get("app::Transport").into()])
///     .property("debug", true)
///     .method("add_recipient", vec!["admin@example.com".into()])
///     .method("add_recipient", vec!["ops@example.com".into()]);
///
/// assert_eq!(mailer.class_name(), "app::Mailer");
/// assert_eq!(mailer.method_calls.len(), 2);
/// ```
#[derive(Clone, Default)]
pub struct ObjectDefinition {
    pub(crate) name: String,
    pub class_name: Option<String>,
    pub constructor: Option<MethodInjection>,
    pub properties: Vec<(String, Definition)>,
    pub method_calls: Vec<MethodInjection>,
    pub lazy: Option<bool>,
    pub scope: Option<Scope>,
    /// Gaps are filled from the class's declared parameter types.
    pub autowired: bool,
    pub extends: Option<Extends>,
}

impl ObjectDefinition {
    /// An object of the class named like the entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`ObjectDefinition::new`] with autowiring enabled.
    pub fn autowired() -> Self {
        Self {
            autowired: true,
            ..Self::default()
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class_name = Some(class.into());
        self
    }

    /// Sets all constructor arguments by position.
    pub fn constructor(mut self, arguments: Vec<Definition>) -> Self {
        let mut injection = self.constructor.take().unwrap_or_else(|| MethodInjection::new(CONSTRUCTOR));
        for (index, argument) in arguments.into_iter().enumerate() {
            injection.set(ParamKey::Index(index), argument);
        }
        self.constructor = Some(injection);
        self
    }

    /// Sets one constructor argument by position or name.
    pub fn constructor_parameter(mut self, key: impl Into<ParamKey>, value: impl Into<Definition>) -> Self {
        self.constructor
            .get_or_insert_with(|| MethodInjection::new(CONSTRUCTOR))
            .set(key.into(), value.into());
        self
    }

    pub fn property(mut self, name: impl Into<String>, value: impl Into<Definition>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.properties.push((name, value)),
        }
        self
    }

    /// Adds a method call. Calling it again adds another call.
    pub fn method(mut self, method: impl Into<String>, arguments: Vec<Definition>) -> Self {
        self.method_calls.push(MethodInjection::with_arguments(method, arguments));
        self
    }

    /// Sets one argument of the first call to `method`, adding the call if needed.
    pub fn method_parameter(
        mut self,
        method: &str,
        key: impl Into<ParamKey>,
        value: impl Into<Definition>,
    ) -> Self {
        let position = self.method_calls.iter().position(|c| c.method == method);
        let call = match position {
            Some(position) => &mut self.method_calls[position],
            None => {
                self.method_calls.push(MethodInjection::new(method));
                let last = self.method_calls.len() - 1;
                &mut self.method_calls[last]
            }
        };
        call.set(key.into(), value.into());
        self
    }

    pub fn lazy(mut self) -> Self {
        self.lazy = Some(true);
        self
    }

    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Extends the previous definition of the same entry; it must exist.
    pub fn extends_previous(mut self) -> Self {
        self.extends = Some(Extends::Previous);
        self
    }

    /// Extends the definition of `entry`; it must exist.
    pub fn extends(mut self, entry: impl Into<String>) -> Self {
        self.extends = Some(Extends::Entry(entry.into()));
        self
    }

    /// The class to construct: the explicit class, or the entry name.
    pub fn class_name(&self) -> &str {
        self.class_name.as_deref().unwrap_or(&self.name)
    }

    pub fn is_lazy(&self) -> bool {
        self.lazy.unwrap_or(false)
    }

    pub fn get_scope(&self) -> Scope {
        self.scope.unwrap_or_default()
    }

    /// Name of the definition this one builds on.
    pub fn extension_target(&self) -> &str {
        match &self.extends {
            Some(Extends::Entry(entry)) => entry,
            Some(Extends::Previous) => &self.name,
            None => self.class_name(),
        }
    }

    /// Merges with the definition this one extends.
    ///
    /// Explicit values here win; constructor arguments not set here fall
    /// back to `base` at the same position; properties are united; method
    /// calls of `base` run first, then the calls declared here.
    pub fn merge(self, base: ObjectDefinition) -> ObjectDefinition {
        trace!(
            entry = %self.name,
            base = %base.name,
            base_calls = base.method_calls.len(),
            calls = self.method_calls.len(),
            "Merging object definitions"
        );

        let class_name = self
            .class_name
            .or_else(|| Some(base.class_name().to_string()).filter(|c| !c.is_empty()));

        let constructor = match (self.constructor, base.constructor) {
            (Some(own), Some(inherited)) => Some(own.merge(inherited)),
            (own, inherited) => own.or(inherited),
        };

        let mut properties = base.properties;
        for (name, value) in self.properties {
            match properties.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => properties.push((name, value)),
            }
        }

        let mut method_calls = base.method_calls;
        method_calls.extend(self.method_calls);

        ObjectDefinition {
            name: self.name,
            class_name,
            constructor,
            properties,
            method_calls,
            lazy: self.lazy.or(base.lazy),
            scope: self.scope.or(base.scope),
            autowired: self.autowired || base.autowired,
            extends: None,
        }
    }

    pub(crate) fn for_each_nested(&self, f: &mut dyn FnMut(&Definition)) {
        let injections = self.constructor.iter().chain(self.method_calls.iter());
        for injection in injections {
            injection.arguments.iter().for_each(|(_, d)| f(d));
        }
        self.properties.iter().for_each(|(_, d)| f(d));
    }

    pub(crate) fn try_for_each_nested_mut(
        &mut self,
        f: &mut dyn FnMut(&mut Definition) -> Result<()>,
    ) -> Result<()> {
        let injections = self.constructor.iter_mut().chain(self.method_calls.iter_mut());
        for injection in injections {
            injection.arguments.iter_mut().try_for_each(|(_, d)| f(d))?;
        }
        self.properties.iter_mut().try_for_each(|(_, d)| f(d))
    }
}

impl fmt::Display for ObjectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Object (")?;
        writeln!(f, "    class = {}", self.class_name())?;
        writeln!(f, "    lazy = {}", self.is_lazy())?;
        writeln!(f, "    scope = {}", self.get_scope())?;
        if let Some(constructor) = &self.constructor {
            writeln!(f, "{}", indent(&constructor.to_string(), 1))?;
        }
        for (name, value) in &self.properties {
            writeln!(f, "    ${name} = {}", indent(&value.to_string(), 1).trim_start())?;
        }
        for call in &self.method_calls {
            writeln!(f, "{}", indent(&call.to_string(), 1))?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{create, get, value};

    fn literal(definition: &Definition) -> String {
        definition.to_string()
    }

    #[test]
    fn merge_keeps_override_properties_and_appends_calls() {
        let base = create()
            .class("Foo")
            .property("p1", "base")
            .property("p2", "kept")
            .method("m", vec![value(1)]);
        let over = create().property("p1", "override").method("m", vec![value(2)]);

        let merged = over.merge(base);

        assert_eq!(merged.class_name(), "Foo");
        assert_eq!(merged.properties.len(), 2);
        assert_eq!(literal(&merged.properties[0].1), "Value (\"override\")");
        assert_eq!(literal(&merged.properties[1].1), "Value (\"kept\")");
        let calls: Vec<_> = merged
            .method_calls
            .iter()
            .map(|c| literal(c.parameter(0).unwrap()))
            .collect();
        assert_eq!(calls, vec!["Value (1)", "Value (2)"]);
    }

    #[test]
    fn merge_falls_back_to_base_constructor_by_index() {
        let base = create().constructor(vec![value("a"), value("b"), value("c")]);
        let over = create().constructor_parameter(1usize, get("x"));

        let merged = over.merge(base);
        let ctor = merged.constructor.unwrap();
        assert_eq!(literal(ctor.parameter(0).unwrap()), "Value (\"a\")");
        assert_eq!(literal(ctor.parameter(1).unwrap()), "get(x)");
        assert_eq!(literal(ctor.parameter(2).unwrap()), "Value (\"c\")");
    }

    #[test]
    fn merge_inherits_scope_and_lazy_when_unset() {
        let base = create().lazy().scope(Scope::Prototype);
        let merged = create().merge(base);
        assert!(merged.is_lazy());
        assert_eq!(merged.get_scope(), Scope::Prototype);

        let merged = create().scope(Scope::Singleton).merge(create().scope(Scope::Prototype));
        assert_eq!(merged.get_scope(), Scope::Singleton);
    }

    #[test]
    fn resolve_names_maps_to_positions() {
        let mut injection = MethodInjection::new(CONSTRUCTOR);
        injection.set("port".into(), value(25));
        injection.set("unknown".into(), value(0));
        injection.resolve_names(&[Parameter::new("host"), Parameter::new("port")]);

        assert!(injection.parameter(1).is_some());
        assert!(injection.named_parameter("port").is_none());
        assert!(injection.named_parameter("unknown").is_some());
        assert_eq!(
            injection.unexpected(&[Parameter::new("host"), Parameter::new("port")]),
            Some(&ParamKey::Name("unknown".into()))
        );
    }

    #[test]
    fn override_wins_across_positions_and_names() {
        let signature = [Parameter::new("logger"), Parameter::new("host")];

        let base = create().constructor_parameter("host", "base");
        let over = create().constructor(vec![get("Logger"), value("override")]);
        let mut ctor = over.merge(base).constructor.unwrap();
        assert_eq!(literal(ctor.argument(1, &signature[1]).unwrap()), "Value (\"override\")");
        ctor.resolve_names(&signature);
        assert_eq!(literal(ctor.parameter(1).unwrap()), "Value (\"override\")");
        assert!(ctor.named_parameter("host").is_none());

        let base = create().constructor(vec![get("Logger"), value("base")]);
        let over = create().constructor_parameter("host", "override");
        let mut ctor = over.merge(base).constructor.unwrap();
        assert_eq!(literal(ctor.argument(1, &signature[1]).unwrap()), "Value (\"override\")");
        ctor.resolve_names(&signature);
        assert_eq!(literal(ctor.parameter(1).unwrap()), "Value (\"override\")");
        assert_eq!(literal(ctor.parameter(0).unwrap()), "get(Logger)");
    }

    #[test]
    fn method_parameter_targets_first_call() {
        let definition = create()
            .method("add", vec![value(1)])
            .method("add", vec![value(2)])
            .method_parameter("add", 1usize, value(10))
            .method_parameter("configure", "debug", value(true));

        assert_eq!(definition.method_calls.len(), 3);
        assert!(definition.method_calls[0].parameter(1).is_some());
        assert!(definition.method_calls[1].parameter(1).is_none());
        assert_eq!(definition.method_calls[2].method, "configure");
    }

    #[test]
    fn extension_target_prefers_explicit_entry() {
        let mut definition = create().class("Mailer");
        definition.name = "mailer".into();
        assert_eq!(definition.extension_target(), "Mailer");
        assert_eq!(definition.clone().extends_previous().extension_target(), "mailer");
        assert_eq!(definition.extends("base.mailer").extension_target(), "base.mailer");
    }
}
