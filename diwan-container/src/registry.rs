//! Class registry — what the container knows about constructible types.
//!
//! Rust has no runtime reflection, so the shape autowiring needs
//! (constructor parameters and their declared types, injectable
//! methods and properties) is described up front with [`ClassInfo`],
//! either explicitly or through link-time [`ClassRegistration`]s.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::BoxError;
use crate::value::{Instance, Native, Value};

/// Builds the native payload of an object from its resolved arguments.
pub type ConstructorFn = Arc<dyn Fn(&[Value]) -> Result<Native, BoxError> + Send + Sync>;

/// Runs when an injected method call is applied to an object.
pub type MethodHook = Arc<dyn Fn(&Instance, &[Value]) -> Result<(), BoxError> + Send + Sync>;

/// Declared type of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHint {
    /// No declared type
    None,
    /// A scalar/builtin type (`int`, `string`, `bool`, ...)
    Builtin(String),
    /// A class or interface; autowiring injects the entry of that name
    Class(String),
    /// Several alternatives; never autowired
    Union(Vec<String>),
}

impl TypeHint {
    /// The entry name autowiring may inject for this type, if any.
    pub fn autowirable(&self) -> Option<&str> {
        match self {
            TypeHint::Class(class) => Some(class),
            _ => None,
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeHint::None => write!(f, "mixed"),
            TypeHint::Builtin(t) | TypeHint::Class(t) => write!(f, "{t}"),
            TypeHint::Union(types) => write!(f, "{}", types.join("|")),
        }
    }
}

/// A constructor or method parameter.
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_hint: TypeHint,
    pub default: Option<Value>,
    /// Entry declared for this parameter by injection metadata.
    pub inject: Option<String>,
}

impl Parameter {
    /// An untyped parameter.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: TypeHint::None,
            default: None,
            inject: None,
        }
    }

    /// A parameter typed with a class or interface.
    pub fn typed(name: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            type_hint: TypeHint::Class(class.into()),
            ..Self::new(name)
        }
    }

    /// A parameter typed with a builtin type.
    pub fn builtin(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            type_hint: TypeHint::Builtin(ty.into()),
            ..Self::new(name)
        }
    }

    /// A parameter typed with a union of types.
    pub fn union(name: impl Into<String>, types: &[&str]) -> Self {
        Self {
            type_hint: TypeHint::Union(types.iter().map(|t| t.to_string()).collect()),
            ..Self::new(name)
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Marks the parameter as explicitly injected with `entry`.
    pub fn inject(mut self, entry: impl Into<String>) -> Self {
        self.inject = Some(entry.into());
        self
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }
}

/// An injectable method.
#[derive(Clone)]
pub struct MethodInfo {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Declared for injection by metadata: autowiring calls it on its own.
    pub inject: bool,
    hook: Option<MethodHook>,
}

impl MethodInfo {
    pub fn new(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            name: name.into(),
            parameters,
            inject: false,
            hook: None,
        }
    }

    pub fn hook(&self) -> Option<&MethodHook> {
        self.hook.as_ref()
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("parameters", &self.parameters)
            .field("inject", &self.inject)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

/// An injectable property.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    pub name: String,
    pub inject: Option<String>,
}

/// Everything the container knows about a class.
///
/// # Examples
/// ```
/// use diwan_container::registry::{ClassInfo, Parameter};
///
/// let info = ClassInfo::new("app::Mailer")
///     .param(Parameter::typed("transport", "app::Transport"))
///     .param(Parameter::builtin("retries", "int").with_default(3))
///     .method("set_logger", vec![Parameter::typed("logger", "app::Logger")])
///     .property("debug");
///
/// assert_eq!(info.constructor().len(), 2);
/// assert!(info.method_info("set_logger").is_some());
/// ```
#[derive(Clone)]
pub struct ClassInfo {
    name: String,
    instantiable: bool,
    constructor: Vec<Parameter>,
    methods: Vec<MethodInfo>,
    properties: Vec<PropertyInfo>,
    builder: Option<ConstructorFn>,
}

impl ClassInfo {
    /// A concrete, instantiable class with no constructor parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instantiable: true,
            constructor: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            builder: None,
        }
    }

    /// An interface or abstract class: known, but never constructed.
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            instantiable: false,
            ..Self::new(name)
        }
    }

    /// Appends a constructor parameter.
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.constructor.push(parameter);
        self
    }

    /// Declares an injectable method.
    pub fn method(mut self, name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        self.methods.push(MethodInfo::new(name, parameters));
        self
    }

    /// Declares a method that injection metadata marks for autowiring.
    pub fn injected_method(mut self, name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        let mut method = MethodInfo::new(name, parameters);
        method.inject = true;
        self.methods.push(method);
        self
    }

    /// Declares an injectable property.
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.properties.push(PropertyInfo {
            name: name.into(),
            inject: None,
        });
        self
    }

    /// Declares a property that injection metadata binds to `entry`.
    pub fn injected_property(mut self, name: impl Into<String>, entry: impl Into<String>) -> Self {
        self.properties.push(PropertyInfo {
            name: name.into(),
            inject: Some(entry.into()),
        });
        self
    }

    /// Sets the hook that builds the native payload.
    pub fn build_with(
        mut self,
        builder: impl Fn(&[Value]) -> Result<Native, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.builder = Some(Arc::new(builder));
        self
    }

    /// Attaches a hook to an already declared method.
    pub fn on_call(
        mut self,
        method: &str,
        hook: impl Fn(&Instance, &[Value]) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        if let Some(info) = self.methods.iter_mut().find(|m| m.name == method) {
            info.hook = Some(Arc::new(hook));
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_instantiable(&self) -> bool {
        self.instantiable
    }

    pub fn constructor(&self) -> &[Parameter] {
        &self.constructor
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    pub fn method_info(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn properties(&self) -> &[PropertyInfo] {
        &self.properties
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.iter().any(|p| p.name == name)
    }

    pub fn builder(&self) -> Option<&ConstructorFn> {
        self.builder.as_ref()
    }

    /// Index of the constructor parameter called `name`.
    pub fn constructor_index(&self, name: &str) -> Option<usize> {
        self.constructor.iter().position(|p| p.name == name)
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("instantiable", &self.instantiable)
            .field("constructor", &self.constructor)
            .field("methods", &self.methods)
            .field("properties", &self.properties)
            .finish()
    }
}

/// A class description submitted at link time.
///
/// Use [`submit_class!`](crate::submit_class) rather than building this directly.
pub struct ClassRegistration {
    pub describe: fn() -> ClassInfo,
}

inventory::collect!(ClassRegistration);

/// Registers a class description with the link-time registry.
///
/// ```rust,ignore
/// fn mailer() -> ClassInfo {
///     ClassInfo::new("app::Mailer").param(Parameter::typed("transport", "app::Transport"))
/// }
/// diwan_container::submit_class!(mailer);
/// ```
#[macro_export]
macro_rules! submit_class {
    ($describe:path) => {
        $crate::inventory::submit! {
            $crate::registry::ClassRegistration { describe: $describe }
        }
    };
}

/// Stores every known class description.
#[derive(Debug, Clone, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, Arc<ClassInfo>>,
}

impl ClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects every class submitted with [`submit_class!`](crate::submit_class).
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for registration in inventory::iter::<ClassRegistration> {
            registry.register((registration.describe)());
        }
        debug!(classes = registry.len(), "Collected link-time class registrations");
        registry
    }

    /// Registers a class, replacing any previous description of the same name.
    pub fn register(&mut self, info: ClassInfo) {
        trace!(class = %info.name, params = info.constructor.len(), "Registered class");
        self.classes.insert(info.name.clone(), Arc::new(info));
    }

    /// Adds every class of `other`, which wins on name clashes.
    pub fn extend(&mut self, other: ClassRegistry) {
        self.classes.extend(other.classes);
    }

    pub fn get(&self, name: &str) -> Option<Arc<ClassInfo>> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// All class names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.classes.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submitted_mailer() -> ClassInfo {
        ClassInfo::new("tests::SubmittedMailer").param(Parameter::typed("logger", "tests::Logger"))
    }

    crate::submit_class!(submitted_mailer);

    #[test]
    fn register_and_get() {
        let mut registry = ClassRegistry::new();
        registry.register(ClassInfo::new("Database"));
        assert!(registry.contains("Database"));
        assert_eq!(registry.get("Database").map(|c| c.name().to_string()), Some("Database".into()));
        assert!(registry.get("Logger").is_none());
    }

    #[test]
    fn register_replaces() {
        let mut registry = ClassRegistry::new();
        registry.register(ClassInfo::new("Database"));
        registry.register(ClassInfo::interface("Database"));
        assert_eq!(registry.len(), 1);
        assert!(!registry.get("Database").unwrap().is_instantiable());
    }

    #[test]
    fn inventory_registrations_are_collected() {
        let registry = ClassRegistry::from_inventory();
        let info = registry.get("tests::SubmittedMailer").unwrap();
        assert_eq!(info.constructor()[0].type_hint, TypeHint::Class("tests::Logger".into()));
    }

    #[test]
    fn only_class_hints_are_autowirable() {
        assert_eq!(TypeHint::Class("Logger".into()).autowirable(), Some("Logger"));
        assert_eq!(TypeHint::Builtin("int".into()).autowirable(), None);
        assert_eq!(TypeHint::Union(vec!["A".into(), "B".into()]).autowirable(), None);
        assert_eq!(TypeHint::None.autowirable(), None);
    }

    #[test]
    fn on_call_attaches_to_declared_method() {
        let info = ClassInfo::new("Mailer")
            .method("send", vec![])
            .on_call("send", |_, _| Ok(()))
            .on_call("missing", |_, _| Ok(()));
        assert!(info.method_info("send").unwrap().hook().is_some());
        assert!(info.method_info("missing").is_none());
    }

    #[test]
    fn constructor_index_by_name() {
        let info = ClassInfo::new("Mailer")
            .param(Parameter::new("host"))
            .param(Parameter::new("port"));
        assert_eq!(info.constructor_index("port"), Some(1));
        assert_eq!(info.constructor_index("user"), None);
    }
}
