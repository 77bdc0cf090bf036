//! Building instances from object definitions.

use std::sync::Arc;

use tracing::trace;

use super::{DefinitionResolver, from_callable};
use crate::container::Container;
use crate::definition::{CONSTRUCTOR, MethodInjection, ObjectDefinition, ParamKey};
use crate::error::{DiError, Result};
use crate::registry::{ClassInfo, Parameter};
use crate::value::{Instance, MethodCall, Value};

/// Builds the instance described by `definition`.
///
/// Constructor arguments come from `overrides` first, then from the
/// definition, then from parameter defaults. Overrides that do not name a
/// constructor parameter are assigned as properties after the declared
/// ones. Method calls run last, in declaration order.
pub fn create(
    container: &Container,
    definition: &ObjectDefinition,
    overrides: &[(String, Value)],
) -> Result<Value> {
    let entry = definition.name.as_str();
    let class_name = definition.class_name();
    let class = container.classes().get(class_name).ok_or_else(|| {
        DiError::invalid(entry, format!("the class '{class_name}' does not exist"))
    })?;
    if !class.is_instantiable() {
        return Err(DiError::invalid(entry, format!("'{class_name}' is not instantiable")));
    }

    let resolver = DefinitionResolver::new(container);
    let arguments = resolve_arguments(
        &resolver,
        entry,
        &class,
        CONSTRUCTOR,
        class.constructor(),
        definition.constructor.as_ref(),
        overrides,
    )?;

    let instance = instantiate(entry, &class, arguments)?;

    for (property, value) in &definition.properties {
        check_property(entry, &class, property)?;
        instance.set_property(property.clone(), resolver.resolve(value, &[])?);
    }
    for (name, value) in overrides {
        if class.constructor_index(name).is_none() {
            check_property(entry, &class, name)?;
            instance.set_property(name.clone(), value.clone());
        }
    }

    for call in &definition.method_calls {
        let method = class.method_info(&call.method).ok_or_else(|| {
            DiError::invalid(
                entry,
                format!("the class '{class_name}' has no method '{}'", call.method),
            )
        })?;
        let arguments = resolve_arguments(&resolver, entry, &class, &call.method, &method.parameters, Some(call), &[])?;
        invoke(entry, &class, &instance, &call.method, arguments)?;
    }

    Ok(Value::Object(instance))
}

/// Runs the class's native builder and wraps the result.
pub(crate) fn instantiate(entry: &str, class: &ClassInfo, arguments: Vec<Value>) -> Result<Arc<Instance>> {
    let native = match class.builder() {
        Some(build) => Some(build(&arguments).map_err(|err| from_callable(entry, err))?),
        None => None,
    };
    trace!(entry, class = %class.name(), arguments = arguments.len(), native = native.is_some(), "Constructed instance");
    Ok(Arc::new(Instance::new(class.name(), arguments, native)))
}

/// Records a method call on `instance` and runs the method's hook.
pub(crate) fn invoke(
    entry: &str,
    class: &ClassInfo,
    instance: &Instance,
    method: &str,
    arguments: Vec<Value>,
) -> Result<()> {
    let hook = class.method_info(method).and_then(|m| m.hook()).cloned();
    instance.record_call(MethodCall {
        method: method.to_string(),
        arguments: arguments.clone(),
    });
    match hook {
        Some(hook) => hook(instance, &arguments).map_err(|err| from_callable(entry, err)),
        None => Ok(()),
    }
}

/// Resolves the arguments of one call against its signature.
fn resolve_arguments(
    resolver: &DefinitionResolver<'_>,
    entry: &str,
    class: &ClassInfo,
    method: &str,
    signature: &[Parameter],
    injection: Option<&MethodInjection>,
    overrides: &[(String, Value)],
) -> Result<Vec<Value>> {
    if let Some(injection) = injection {
        check_injection(entry, class, method, signature, injection)?;
    }

    let mut arguments = Vec::with_capacity(signature.len());
    for (index, parameter) in signature.iter().enumerate() {
        if let Some((_, value)) = overrides.iter().find(|(name, _)| *name == parameter.name) {
            arguments.push(value.clone());
            continue;
        }

        let explicit = injection.and_then(|injection| injection.argument(index, parameter));
        let value = match (explicit, &parameter.default) {
            (Some(definition), _) => resolver.resolve(definition, &[])?,
            (None, Some(default)) => default.clone(),
            (None, None) => {
                return Err(DiError::invalid(
                    entry,
                    format!(
                        "parameter ${} of {}::{}() has no value defined or guessable",
                        parameter.name,
                        class.name(),
                        method
                    ),
                ));
            }
        };
        arguments.push(value);
    }
    Ok(arguments)
}

fn check_injection(
    entry: &str,
    class: &ClassInfo,
    method: &str,
    signature: &[Parameter],
    injection: &MethodInjection,
) -> Result<()> {
    match injection.unexpected(signature) {
        Some(ParamKey::Name(name)) => Err(DiError::invalid(
            entry,
            format!("{}::{}() has no parameter named ${name}", class.name(), method),
        )),
        Some(ParamKey::Index(index)) => Err(DiError::invalid(
            entry,
            format!(
                "{}::{}() takes {} parameter(s) but an argument was given at position {index}",
                class.name(),
                method,
                signature.len()
            ),
        )),
        None => Ok(()),
    }
}

fn check_property(entry: &str, class: &ClassInfo, property: &str) -> Result<()> {
    if class.has_property(property) {
        Ok(())
    } else {
        Err(DiError::invalid(
            entry,
            format!("the class '{}' has no property '{property}'", class.name()),
        ))
    }
}
