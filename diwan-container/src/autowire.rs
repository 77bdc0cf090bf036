//! Guessing object definitions from declared parameter types.
//!
//! For a class known to the [`ClassRegistry`], every constructor parameter
//! typed with a single class gets a reference to the entry named after
//! that class, unless an argument was already given for it. Calls listed
//! in a definition with only some arguments get their remaining slots
//! filled the same way. Parameters typed with builtins or unions, and
//! untyped ones, are left alone: optional ones fall back to their default
//! at resolution time.
//!
//! When declared dependencies are enabled, the injection metadata carried
//! by [`ClassInfo`] is applied as well: a parameter's `inject` entry wins
//! over its type, injected properties are set, and injected methods are
//! called.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::definition::{CONSTRUCTOR, Definition, MethodInjection, ObjectDefinition, ParamKey, Reference};
use crate::error::Result;
use crate::registry::{ClassInfo, ClassRegistry, Parameter};
use crate::source::DefinitionSource;

/// Autowiring strategy backed by a [`ClassRegistry`].
///
/// Also usable as the lowest-priority definition source: any registered
/// class name resolves to an autowired object definition.
#[derive(Clone)]
pub struct Autowiring {
    classes: Arc<ClassRegistry>,
    declared_dependencies: bool,
}

impl Autowiring {
    pub fn new(classes: Arc<ClassRegistry>) -> Self {
        Self {
            classes,
            declared_dependencies: false,
        }
    }

    /// Also honour the injection metadata of classes.
    pub fn with_declared_dependencies(mut self, enabled: bool) -> Self {
        self.declared_dependencies = enabled;
        self
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    /// Completes `existing` (or creates a definition for `name`) from the
    /// class signature.
    ///
    /// Returns `existing` unchanged when the class is unknown.
    pub fn autowire(
        &self,
        name: &str,
        existing: Option<ObjectDefinition>,
    ) -> Result<Option<ObjectDefinition>> {
        let class_name = match &existing {
            Some(definition) => definition.class_name().to_string(),
            None => name.to_string(),
        };
        let Some(class) = self.classes.get(&class_name) else {
            return Ok(existing);
        };

        let synthesized = existing.is_none();
        let mut definition = existing.unwrap_or_else(|| {
            let mut definition = ObjectDefinition::autowired();
            definition.name = name.to_string();
            definition
        });

        self.fill_constructor(&class, &mut definition);
        self.fill_method_calls(&class, &mut definition);
        if self.declared_dependencies {
            self.apply_declared(&class, &mut definition);
        }

        if synthesized {
            debug!(entry = %name, class = %class.name(), "Autowired definition");
        } else {
            trace!(entry = %definition.name, class = %class.name(), "Completed definition by autowiring");
        }
        Ok(Some(definition))
    }

    /// Autowires `definition` and every nested object definition flagged
    /// as autowired.
    pub fn apply(&self, definition: &mut Definition) -> Result<()> {
        if let Definition::Object(object) = definition {
            if object.autowired {
                let name = object.name.clone();
                let taken = std::mem::take(object);
                if let Some(completed) = self.autowire(&name, Some(taken))? {
                    *object = completed;
                }
            }
        }
        definition.try_for_each_nested_mut(&mut |nested| self.apply(nested))
    }

    fn fill_constructor(&self, class: &ClassInfo, definition: &mut ObjectDefinition) {
        let mut injection = definition
            .constructor
            .take()
            .unwrap_or_else(|| MethodInjection::new(CONSTRUCTOR));
        self.fill(&mut injection, class.constructor());
        if !injection.is_empty() {
            definition.constructor = Some(injection);
        }
    }

    fn fill_method_calls(&self, class: &ClassInfo, definition: &mut ObjectDefinition) {
        for call in &mut definition.method_calls {
            if let Some(method) = class.method_info(&call.method) {
                self.fill(call, &method.parameters);
            }
        }
    }

    fn apply_declared(&self, class: &ClassInfo, definition: &mut ObjectDefinition) {
        for property in class.properties() {
            let Some(entry) = &property.inject else { continue };
            if definition.properties.iter().all(|(name, _)| *name != property.name) {
                definition
                    .properties
                    .push((property.name.clone(), Definition::Reference(Reference::new(entry.clone()))));
            }
        }

        for method in class.methods().iter().filter(|m| m.inject) {
            if definition.method_calls.iter().any(|call| call.method == method.name) {
                continue;
            }
            let mut call = MethodInjection::new(method.name.clone());
            self.fill(&mut call, &method.parameters);
            definition.method_calls.push(call);
        }
    }

    fn fill(&self, injection: &mut MethodInjection, signature: &[Parameter]) {
        injection.resolve_names(signature);
        for (index, parameter) in signature.iter().enumerate() {
            if injection.has_argument(index, parameter) {
                continue;
            }
            if let Some(target) = self.guess(parameter) {
                injection.set(ParamKey::Index(index), Definition::Reference(Reference::new(target)));
            }
        }
    }

    fn guess<'p>(&self, parameter: &'p Parameter) -> Option<&'p str> {
        if self.declared_dependencies {
            if let Some(entry) = &parameter.inject {
                return Some(entry);
            }
        }
        parameter.type_hint.autowirable()
    }
}

impl DefinitionSource for Autowiring {
    fn get_definition(&self, name: &str) -> Result<Option<Definition>> {
        Ok(self.autowire(name, None)?.map(Definition::Object))
    }

    /// Classes are resolved on demand and never enumerated.
    fn definition_names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl std::fmt::Debug for Autowiring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autowiring")
            .field("classes", &self.classes.len())
            .field("declared_dependencies", &self.declared_dependencies)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{create, get, value};
    use crate::registry::ClassInfo;
    use crate::value::Value;

    fn classes() -> Arc<ClassRegistry> {
        let mut registry = ClassRegistry::new();
        registry.register(ClassInfo::new("Logger"));
        registry.register(
            ClassInfo::new("Mailer")
                .param(Parameter::typed("logger", "Logger"))
                .param(Parameter::builtin("host", "string").with_default("localhost"))
                .param(Parameter::union("transport", &["Smtp", "Sendmail"]).with_default(Value::Null))
                .method("setLogger", vec![Parameter::typed("logger", "Logger"), Parameter::new("level")])
                .injected_method("setClock", vec![Parameter::typed("clock", "Clock")])
                .injected_property("cache", "app.cache"),
        );
        Arc::new(registry)
    }

    fn reference_at(injection: &MethodInjection, index: usize) -> &str {
        match injection.parameter(index) {
            Some(Definition::Reference(reference)) => &reference.target,
            other => panic!("Expected reference at {index}, got: {other:?}"),
        }
    }

    #[test]
    fn unknown_class_returns_input_unchanged() {
        let autowiring = Autowiring::new(classes());
        assert!(autowiring.autowire("Unknown", None).unwrap().is_none());

        let existing = create().class("Unknown").property("a", 1);
        let result = autowiring.autowire("x", Some(existing)).unwrap().unwrap();
        assert!(result.constructor.is_none());
        assert_eq!(result.properties.len(), 1);
    }

    #[test]
    fn class_typed_parameters_become_references() {
        let autowiring = Autowiring::new(classes());
        let definition = autowiring.autowire("Mailer", None).unwrap().unwrap();

        assert!(definition.autowired);
        let constructor = definition.constructor.as_ref().unwrap();
        assert_eq!(reference_at(constructor, 0), "Logger");
        assert!(constructor.parameter(1).is_none());
        assert!(constructor.parameter(2).is_none());
    }

    #[test]
    fn explicit_arguments_are_preserved() {
        let autowiring = Autowiring::new(classes());
        let existing = create().class("Mailer").constructor_parameter("logger", get("audit.logger"));
        let definition = autowiring.autowire("mailer", Some(existing)).unwrap().unwrap();

        let constructor = definition.constructor.as_ref().unwrap();
        assert_eq!(reference_at(constructor, 0), "audit.logger");
        assert!(constructor.named_parameter("logger").is_none());
    }

    #[test]
    fn partial_method_calls_are_completed() {
        let autowiring = Autowiring::new(classes());
        let existing = create().class("Mailer").method_parameter("setLogger", 1, value("debug"));
        let definition = autowiring.autowire("mailer", Some(existing)).unwrap().unwrap();

        let call = &definition.method_calls[0];
        assert_eq!(reference_at(call, 0), "Logger");
        assert!(matches!(call.parameter(1), Some(Definition::Value(_))));
    }

    #[test]
    fn declared_dependencies_only_when_enabled() {
        let plain = Autowiring::new(classes());
        let definition = plain.autowire("Mailer", None).unwrap().unwrap();
        assert!(definition.properties.is_empty());
        assert!(definition.method_calls.is_empty());

        let declared = Autowiring::new(classes()).with_declared_dependencies(true);
        let definition = declared.autowire("Mailer", None).unwrap().unwrap();
        assert_eq!(definition.properties[0].0, "cache");
        assert_eq!(definition.method_calls[0].method, "setClock");
        assert_eq!(reference_at(&definition.method_calls[0], 0), "Clock");
    }

    #[test]
    fn apply_reaches_nested_autowired_objects() {
        let autowiring = Autowiring::new(classes());
        let mut definition: Definition = create()
            .class("Logger")
            .property("mailer", crate::definition::helpers::autowire().class("Mailer"))
            .into();
        autowiring.apply(&mut definition).unwrap();

        let Definition::Object(root) = &definition else {
            panic!("Expected object, got: {definition:?}");
        };
        match &root.properties[0].1 {
            Definition::Object(nested) => {
                assert_eq!(reference_at(nested.constructor.as_ref().unwrap(), 0), "Logger")
            }
            other => panic!("Expected object, got: {other:?}"),
        }
    }
}
