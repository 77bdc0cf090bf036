//! Running compiled routines.

use std::sync::Arc;

use crate::container::Container;
use crate::definition::string::TemplatePart;
use crate::error::{DiError, Result};
use crate::proxy::Thunk;
use crate::resolver::object::{instantiate, invoke};
use crate::resolver::{DefinitionResolver, missing_variable};
use crate::value::{ArrayValue, Value};

use super::ir::{CompiledModule, Expr, Part};

/// Evaluates routines of one module against a container.
pub(crate) struct Executor<'c> {
    container: &'c Container,
    module: &'c Arc<CompiledModule>,
}

impl<'c> Executor<'c> {
    pub(crate) fn new(container: &'c Container, module: &'c Arc<CompiledModule>) -> Self {
        Self { container, module }
    }

    pub(crate) fn run(&self, id: &str) -> Result<Value> {
        let routine = self.module.routine(id).ok_or_else(|| {
            DiError::invalid(
                "",
                format!("compiled module '{}' has no routine '{id}'", self.module.name),
            )
        })?;
        self.eval(&routine.entry, &routine.body)
    }

    fn eval(&self, entry: &str, expr: &Expr) -> Result<Value> {
        match expr {
            Expr::Literal { value } => Ok(value.to_value()),
            Expr::Get { entry: target } => DefinitionResolver::new(self.container).reference(target),
            Expr::Call { routine } => self.run(routine),
            Expr::Array { items } => {
                let mut array = ArrayValue::new();
                for (key, item) in items {
                    array.insert(key.clone(), self.eval(entry, item)?);
                }
                Ok(Value::from(array))
            }
            Expr::Env {
                variable,
                optional,
                default,
            } => match self.container.environment().var(variable) {
                Some(value) => Ok(Value::string(value)),
                None if !optional => Err(missing_variable(entry, variable)),
                None => match default {
                    Some(default) => self.eval(entry, default),
                    None => Ok(Value::Null),
                },
            },
            Expr::New {
                class,
                arguments,
                properties,
                calls,
            } => {
                let info = self.container.classes().get(class).ok_or_else(|| {
                    DiError::invalid(entry, format!("the class '{class}' does not exist"))
                })?;

                let arguments = arguments
                    .iter()
                    .map(|argument| self.eval(entry, argument))
                    .collect::<Result<Vec<_>>>()?;
                let instance = instantiate(entry, &info, arguments)?;

                for (property, value) in properties {
                    instance.set_property(property.clone(), self.eval(entry, value)?);
                }
                for call in calls {
                    let arguments = call
                        .arguments
                        .iter()
                        .map(|argument| self.eval(entry, argument))
                        .collect::<Result<Vec<_>>>()?;
                    invoke(entry, &info, &instance, &call.method, arguments)?;
                }
                Ok(Value::Object(instance))
            }
            Expr::Lazy {
                class,
                entry: owner,
                routine,
            } => {
                let weak = self.container.downgrade();
                let module = Arc::clone(self.module);
                let owner = owner.clone();
                let routine = routine.clone();
                let thunk: Thunk = Arc::new(move || {
                    let container = weak.upgrade().ok_or_else(|| DiError::ContainerDropped {
                        entry: owner.clone(),
                    })?;
                    let executor = Executor::new(&container, &module);
                    if owner.is_empty() {
                        return executor.run(&routine);
                    }
                    let _guard = container.stack().enter(&owner)?;
                    executor.run(&routine).map_err(|err| err.within(&owner))
                });
                self.container.proxy_factory().create_proxy(class, thunk)
            }
            Expr::Interpolate { template, parts } => DefinitionResolver::new(self.container).render_template(
                entry,
                template,
                parts.iter().map(|part| match part {
                    Part::Text(text) => TemplatePart::Text(text.clone()),
                    Part::Entry(name) => TemplatePart::Entry(name.clone()),
                }),
            ),
        }
    }
}
