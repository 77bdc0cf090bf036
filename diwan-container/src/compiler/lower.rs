//! Lowering definitions to routines.
//!
//! Lowering mirrors the interpreter: whatever the interpreter would reject
//! (an unknown class, a parameter with no value, a missing method) is not
//! compiled, so the entry keeps failing the same way at runtime.

use crate::definition::{CONSTRUCTOR, Definition, MethodInjection, ObjectDefinition};
use crate::registry::{ClassInfo, ClassRegistry, Parameter};

use super::ir::{CallExpr, Expr, Literal, Part, Routine};

/// Why an entry was left to the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("{0}")]
    Skipped(String),
}

fn skip(reason: impl Into<String>) -> CompileError {
    CompileError::Skipped(reason.into())
}

/// Lowers the root definition of one entry.
///
/// Returns the entry's routine first, followed by one helper routine per
/// nested definition. Routine ids are taken from `next_id`, which is only
/// advanced when lowering succeeds.
pub fn lower_entry(
    classes: &ClassRegistry,
    definition: &Definition,
    next_id: &mut usize,
) -> Result<Vec<Routine>, CompileError> {
    let mut lowering = Lowering {
        classes,
        entry: definition.name().to_string(),
        next_id: *next_id,
        helpers: Vec::new(),
    };

    let id = lowering.fresh_id();
    let body = lowering.body(definition)?;

    let mut routines = Vec::with_capacity(lowering.helpers.len() + 1);
    routines.push(Routine {
        id,
        entry: lowering.entry.clone(),
        body,
        shared: definition.is_cacheable(),
    });
    routines.append(&mut lowering.helpers);
    *next_id = lowering.next_id;
    Ok(routines)
}

struct Lowering<'a> {
    classes: &'a ClassRegistry,
    entry: String,
    next_id: usize,
    helpers: Vec<Routine>,
}

impl Lowering<'_> {
    fn fresh_id(&mut self) -> String {
        let id = format!("routine_{}", self.next_id);
        self.next_id += 1;
        id
    }

    /// The expression producing the value of `definition`.
    fn body(&mut self, definition: &Definition) -> Result<Expr, CompileError> {
        match definition {
            Definition::Value(d) => Literal::from_value(&d.value)
                .map(|value| Expr::Literal { value })
                .ok_or_else(|| skip(format!("a {} value cannot be written out", d.value.kind()))),
            Definition::Reference(d) => Ok(Expr::Get {
                entry: d.target.clone(),
            }),
            Definition::Object(d) if d.is_lazy() => {
                let body = self.object(d)?;
                let routine = self.helper(body);
                Ok(Expr::Lazy {
                    class: d.class_name().to_string(),
                    entry: d.name.clone(),
                    routine,
                })
            }
            Definition::Object(d) => self.object(d),
            Definition::Array(d) => {
                let mut items = Vec::with_capacity(d.values.len());
                for (key, value) in &d.values {
                    items.push((key.clone(), self.nested(value)?));
                }
                Ok(Expr::Array { items })
            }
            Definition::Environment(d) => {
                let default = match &d.default {
                    Some(default) => Some(Box::new(self.nested(default)?)),
                    None => None,
                };
                Ok(Expr::Env {
                    variable: d.variable.clone(),
                    optional: d.optional,
                    default,
                })
            }
            Definition::String(d) => {
                let parts = d.parts().map_err(|err| skip(err.to_string()))?;
                Ok(Expr::Interpolate {
                    template: d.template.clone(),
                    parts: parts.into_iter().map(Part::from).collect(),
                })
            }
            Definition::Factory(_) => Err(skip("factories are closures and only run interpreted")),
            Definition::Decorator(_) => Err(skip("decorators are closures and only run interpreted")),
            Definition::ServiceLocator(_) => Err(skip("service locators are built at runtime")),
        }
    }

    /// Literals are inlined; every other nested definition becomes a
    /// helper routine.
    fn nested(&mut self, definition: &Definition) -> Result<Expr, CompileError> {
        if let Definition::Value(_) = definition {
            return self.body(definition);
        }
        let body = self.body(definition)?;
        let routine = self.helper(body);
        Ok(Expr::Call { routine })
    }

    fn helper(&mut self, body: Expr) -> String {
        let id = self.fresh_id();
        self.helpers.push(Routine {
            id: id.clone(),
            entry: self.entry.clone(),
            body,
            shared: false,
        });
        id
    }

    fn object(&mut self, definition: &ObjectDefinition) -> Result<Expr, CompileError> {
        let class_name = definition.class_name();
        let class = self
            .classes
            .get(class_name)
            .ok_or_else(|| skip(format!("the class '{class_name}' is not registered")))?;
        if !class.is_instantiable() {
            return Err(skip(format!("'{class_name}' is not instantiable")));
        }

        let arguments = self.arguments(&class, CONSTRUCTOR, class.constructor(), definition.constructor.as_ref())?;

        let mut properties = Vec::with_capacity(definition.properties.len());
        for (property, value) in &definition.properties {
            if !class.has_property(property) {
                return Err(skip(format!("the class '{class_name}' has no property '{property}'")));
            }
            properties.push((property.clone(), self.nested(value)?));
        }

        let mut calls = Vec::with_capacity(definition.method_calls.len());
        for call in &definition.method_calls {
            let method = class
                .method_info(&call.method)
                .ok_or_else(|| skip(format!("the class '{class_name}' has no method '{}'", call.method)))?;
            calls.push(CallExpr {
                method: call.method.clone(),
                arguments: self.arguments(&class, &call.method, &method.parameters, Some(call))?,
            });
        }

        Ok(Expr::New {
            class: class_name.to_string(),
            arguments,
            properties,
            calls,
        })
    }

    /// Spells out every argument, lowering defaults to literals.
    fn arguments(
        &mut self,
        class: &ClassInfo,
        method: &str,
        signature: &[Parameter],
        injection: Option<&MethodInjection>,
    ) -> Result<Vec<Expr>, CompileError> {
        if let Some(injection) = injection {
            if injection.unexpected(signature).is_some() {
                return Err(skip(format!("{}::{method}() is given arguments it does not take", class.name())));
            }
        }

        let mut arguments = Vec::with_capacity(signature.len());
        for (index, parameter) in signature.iter().enumerate() {
            let explicit = injection.and_then(|injection| injection.argument(index, parameter));
            let argument = match (explicit, &parameter.default) {
                (Some(definition), _) => self.nested(definition)?,
                (None, Some(default)) => Expr::Literal {
                    value: Literal::from_value(default).ok_or_else(|| {
                        skip(format!("the default of ${} cannot be written out", parameter.name))
                    })?,
                },
                (None, None) => {
                    return Err(skip(format!(
                        "parameter ${} of {}::{method}() has no value",
                        parameter.name,
                        class.name()
                    )));
                }
            };
            arguments.push(argument);
        }
        Ok(arguments)
    }
}
