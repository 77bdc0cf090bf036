//! # The Container
//!
//! Resolves entries by name and keeps singleton values for its lifetime.
//!
//! # Architecture
//! ```text
//! ContainerBuilder ──build()──> Container ──get(name)──> Value
//!                                   │
//!                     singleton cache │ miss
//!                                   ▼
//!                compiled routine (if compiled and not overridden)
//!                                   │ otherwise
//!                                   ▼
//!                SourceChain ──> DefinitionResolver
//! ```
//!
//! # Examples
//! ```rust
//! use diwan_container::prelude::*;
//!
//! let container = Container::builder()
//!     .register_class(ClassInfo::new("app::Logger"))
//!     .register_class(
//!         ClassInfo::new("app::Mailer")
//!             .param(Parameter::typed("logger", "app::Logger"))
//!             .param(Parameter::builtin("host", "string")),
//!     )
//!     .add_definitions([
//!         ("mail.host", value("smtp.example.com")),
//!         ("app::Mailer", create().constructor_parameter("host", get("mail.host")).into()),
//!     ])
//!     .build()
//!     .expect("Failed to build container");
//!
//! let mailer = container.get("app::Mailer").unwrap();
//! let mailer = mailer.as_object().unwrap();
//! assert_eq!(mailer.argument(1), Some(&Value::from("smtp.example.com")));
//! assert!(container.get("app::Mailer").unwrap().same(&Value::Object(mailer.clone())));
//! ```

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use diwan_support::rendering::suggest_similar;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::autowire::Autowiring;
use crate::compiler::exec::Executor;
use crate::compiler::{CompiledModule, Compiler};
use crate::definition::Definition;
use crate::environment::{Environment, SystemEnvironment};
use crate::error::{DiError, NotFoundError, Result};
use crate::provider::{self, Provider};
use crate::proxy::{LazyProxyFactory, ValueHolderProxyFactory};
use crate::registry::{ClassInfo, ClassRegistry};
use crate::resolver::{DefinitionResolver, Parameters, ResolutionStack};
use crate::source::{DefinitionArray, DefinitionSource, SourceChain};
use crate::value::Value;

const MAX_SUGGESTIONS: usize = 3;

// ═══════════════════════════════════════════
// Settings
// ═══════════════════════════════════════════

/// Container options a host can load from configuration.
///
/// ```
/// use diwan_container::container::ContainerSettings;
///
/// let settings: ContainerSettings = serde_json::from_str(
///     r#"{ "compilation": { "directory": "var/cache/di" } }"#,
/// ).unwrap();
/// assert!(settings.autowiring);
/// assert_eq!(settings.compilation.unwrap().module_name, "CompiledContainer");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Guess missing constructor and method arguments from parameter types.
    pub autowiring: bool,
    /// Apply the injection metadata carried by class descriptions.
    pub declared_dependencies: bool,
    pub compilation: Option<CompilationSettings>,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            autowiring: true,
            declared_dependencies: false,
            compilation: None,
        }
    }
}

/// Where compiled output goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilationSettings {
    pub directory: PathBuf,
    #[serde(default = "default_module_name")]
    pub module_name: String,
}

fn default_module_name() -> String {
    "CompiledContainer".to_string()
}

// ═══════════════════════════════════════════
// ContainerBuilder
// ═══════════════════════════════════════════

/// Builds a [`Container`].
///
/// Every call to [`add_definitions`](ContainerBuilder::add_definitions),
/// [`add_source`](ContainerBuilder::add_source) or
/// [`add_provider`](ContainerBuilder::add_provider) adds one source layer,
/// which takes priority over the layers added before it.
///
/// Classes submitted with [`submit_class!`](crate::submit_class) are known
/// from the start; more can be added with
/// [`register_class`](ContainerBuilder::register_class).
pub struct ContainerBuilder {
    sources: Vec<Arc<dyn DefinitionSource>>,
    classes: ClassRegistry,
    settings: ContainerSettings,
    environment: Arc<dyn Environment>,
    proxy_factory: Arc<dyn LazyProxyFactory>,
    compiled: Option<CompiledModule>,
    errors: Vec<DiError>,
}

impl ContainerBuilder {
    fn new() -> Self {
        Self {
            sources: Vec::new(),
            classes: ClassRegistry::from_inventory(),
            settings: ContainerSettings::default(),
            environment: Arc::new(SystemEnvironment),
            proxy_factory: Arc::new(ValueHolderProxyFactory),
            compiled: None,
            errors: Vec::new(),
        }
    }

    /// Enables or disables autowiring (enabled by default).
    pub fn use_autowiring(mut self, enabled: bool) -> Self {
        self.settings.autowiring = enabled;
        self
    }

    /// Honours injection metadata of classes (disabled by default).
    pub fn use_declared_dependencies(mut self, enabled: bool) -> Self {
        self.settings.declared_dependencies = enabled;
        self
    }

    /// Applies all options of `settings`.
    pub fn settings(mut self, settings: ContainerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Adds every class of `classes` to the builder's registry.
    ///
    /// Classes already known, including submitted ones, are kept unless
    /// `classes` describes the same name.
    pub fn with_classes(mut self, classes: ClassRegistry) -> Self {
        self.classes.extend(classes);
        self
    }

    pub fn register_class(mut self, class: ClassInfo) -> Self {
        self.classes.register(class);
        self
    }

    /// Where environment variable definitions read from.
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Arc::new(environment);
        self
    }

    pub fn with_proxy_factory(mut self, factory: impl LazyProxyFactory + 'static) -> Self {
        self.proxy_factory = Arc::new(factory);
        self
    }

    /// Adds a layer of `(name, definition)` pairs.
    pub fn add_definitions<N, D, I>(mut self, definitions: I) -> Self
    where
        N: Into<String>,
        D: Into<Definition>,
        I: IntoIterator<Item = (N, D)>,
    {
        match DefinitionArray::from_definitions(definitions) {
            Ok(array) => self.sources.push(Arc::new(array)),
            Err(err) => self.errors.push(err),
        }
        self
    }

    /// Adds a custom source layer.
    pub fn add_source(mut self, source: impl DefinitionSource + 'static) -> Self {
        self.sources.push(Arc::new(source));
        self
    }

    /// Adds the definitions of a [`Provider`] as one layer.
    pub fn add_provider(mut self, provider: &dyn Provider) -> Self {
        match provider::collect(provider) {
            Ok(array) => self.sources.push(Arc::new(array)),
            Err(err) => self.errors.push(err),
        }
        self
    }

    /// Compiles definitions into `directory` on build, unless already
    /// compiled there, and serves compiled entries from the result.
    pub fn enable_compilation(mut self, directory: impl Into<PathBuf>, module_name: impl Into<String>) -> Self {
        self.settings.compilation = Some(CompilationSettings {
            directory: directory.into(),
            module_name: module_name.into(),
        });
        self
    }

    /// Serves compiled entries from an already loaded module.
    pub fn with_compiled_module(mut self, module: CompiledModule) -> Self {
        self.compiled = Some(module);
        self
    }

    /// Builds the container.
    ///
    /// Fails with the first definition error met while adding layers, or
    /// with a compilation error when compilation is enabled.
    #[instrument(skip(self), name = "container_build")]
    pub fn build(self) -> Result<Container> {
        if let Some(err) = self.errors.into_iter().next() {
            return Err(err);
        }

        let classes = Arc::new(self.classes);
        let layers = self.sources.len();
        let mut sources: Vec<Arc<dyn DefinitionSource>> = self.sources;
        sources.reverse();

        let mut chain = SourceChain::new(sources);
        if self.settings.autowiring {
            chain = chain.with_autowiring(
                Autowiring::new(classes.clone())
                    .with_declared_dependencies(self.settings.declared_dependencies),
            );
        }

        let compiled = match (self.compiled, &self.settings.compilation) {
            (Some(module), _) => Some(module),
            (None, Some(compilation)) => {
                let outcome = Compiler::new(classes.clone()).compile(
                    &chain,
                    &compilation.directory,
                    &compilation.module_name,
                )?;
                Some(CompiledModule::load(outcome.path())?)
            }
            (None, None) => None,
        };

        info!(
            layers,
            classes = classes.len(),
            autowiring = self.settings.autowiring,
            compiled = compiled.as_ref().map_or(0, |m| m.entries.len()),
            "Container built"
        );
        Ok(Container {
            inner: Arc::new(ContainerState {
                sources: chain,
                classes,
                environment: self.environment,
                proxy_factory: self.proxy_factory,
                compiled: compiled.map(Arc::new),
                singletons: DashMap::new(),
                definitions: DashMap::new(),
                stack: ResolutionStack::new(),
            }),
        })
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBuilder")
            .field("layers", &self.sources.len())
            .field("classes", &self.classes.len())
            .field("settings", &self.settings)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Container
// ═══════════════════════════════════════════

struct ContainerState {
    sources: SourceChain,
    classes: Arc<ClassRegistry>,
    environment: Arc<dyn Environment>,
    proxy_factory: Arc<dyn LazyProxyFactory>,
    compiled: Option<Arc<CompiledModule>>,
    singletons: DashMap<String, Value>,
    definitions: DashMap<String, Definition>,
    stack: ResolutionStack,
}

/// Dependency injection container.
///
/// Cloning is cheap and clones share the same state, singleton cache
/// included. Created by [`ContainerBuilder::build()`].
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerState>,
}

/// A handle that does not keep the container alive.
#[derive(Clone)]
pub(crate) struct WeakContainer {
    inner: Weak<ContainerState>,
}

impl WeakContainer {
    pub(crate) fn upgrade(&self) -> Option<Container> {
        self.inner.upgrade().map(|inner| Container { inner })
    }
}

impl Container {
    /// Create a new builder.
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Returns the value of `name`, building it if needed.
    ///
    /// Singleton values are built once and returned as the same value on
    /// every later call.
    pub fn get(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.inner.singletons.get(name) {
            trace!(entry = name, "Singleton cache hit");
            return Ok(value.value().clone());
        }

        if let Some(module) = &self.inner.compiled {
            if !self.inner.sources.is_overridden(name) {
                if let Some(routine) = module.entry(name) {
                    return self.resolve_compiled(name, module, &routine.id, routine.shared);
                }
            }
        }

        let definition = self.definition(name)?.ok_or_else(|| self.not_found(name))?;
        self.resolve(name, &definition, &[], true)
    }

    /// Resolves `name` and downcasts its native value.
    ///
    /// Lazy stand-ins are forced; objects yield their native payload.
    pub fn get_native<T: std::any::Any + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        let value = self.get(name)?.resolve_lazy()?;
        value.as_native::<T>().ok_or_else(|| {
            DiError::construction(
                name,
                format!(
                    "Type mismatch: expected {}, got a {}",
                    std::any::type_name::<T>(),
                    value.kind()
                )
                .into(),
            )
        })
    }

    /// Whether `name` can be resolved.
    ///
    /// `true` does not guarantee that building the value succeeds.
    pub fn has(&self, name: &str) -> bool {
        if self.inner.singletons.contains_key(name) {
            return true;
        }
        if let Some(module) = &self.inner.compiled {
            if module.has_entry(name) && !self.inner.sources.is_overridden(name) {
                return true;
            }
        }
        match self.definition(name) {
            Ok(Some(definition)) => DefinitionResolver::new(self).is_resolvable(&definition),
            Ok(None) => false,
            Err(err) => {
                debug!(entry = name, error = %err, "Entry has an invalid definition");
                false
            }
        }
    }

    /// Defines (or redefines) `name` at runtime.
    ///
    /// The new definition takes priority over every source and the cached
    /// singleton of `name`, if any, is dropped. Compiled code no longer
    /// serves `name`.
    pub fn set(&self, name: &str, definition: impl Into<Definition>) -> Result<()> {
        let definition = definition.into().named(name);
        debug!(entry = name, kind = definition.kind(), "Setting entry");
        self.inner.sources.set_definition(definition)?;
        self.inner.definitions.clear();
        self.inner.singletons.remove(name);
        Ok(())
    }

    /// Builds a new value of `name`, bypassing the singleton cache.
    ///
    /// `parameters` override constructor arguments by parameter name; any
    /// other name is assigned as a property. Factories receive them as
    /// named parameters.
    pub fn make(&self, name: &str, parameters: Parameters) -> Result<Value> {
        let definition = self.definition(name)?.ok_or_else(|| self.not_found(name))?;
        self.resolve(name, &definition, &parameters, false)
    }

    /// Every entry name the container knows, sorted.
    ///
    /// Classes that would only be autowired on demand are not listed.
    pub fn known_entry_names(&self) -> Vec<String> {
        let mut names = self.inner.sources.definition_names();
        names.extend(self.inner.singletons.iter().map(|e| e.key().clone()));
        if let Some(module) = &self.inner.compiled {
            names.extend(module.entries.keys().cloned());
        }
        names.sort();
        names.dedup();
        names
    }

    /// A readable description of the definition of `name`.
    pub fn debug_entry(&self, name: &str) -> Result<String> {
        if let Some(definition) = self.definition(name)? {
            return Ok(definition.to_string());
        }
        match self.inner.singletons.get(name) {
            Some(value) => Ok(format!("Value ({:?})", value.value())),
            None => Err(self.not_found(name)),
        }
    }

    /// Entries currently being resolved on this thread, outermost first.
    pub fn resolving_path(&self) -> Vec<String> {
        self.inner.stack.path()
    }

    pub(crate) fn classes(&self) -> &ClassRegistry {
        &self.inner.classes
    }

    pub(crate) fn environment(&self) -> &dyn Environment {
        self.inner.environment.as_ref()
    }

    pub(crate) fn proxy_factory(&self) -> &dyn LazyProxyFactory {
        self.inner.proxy_factory.as_ref()
    }

    pub(crate) fn stack(&self) -> &ResolutionStack {
        &self.inner.stack
    }

    pub(crate) fn downgrade(&self) -> WeakContainer {
        WeakContainer {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// The merged definition of `name`, memoized until the next `set`.
    fn definition(&self, name: &str) -> Result<Option<Definition>> {
        if let Some(definition) = self.inner.definitions.get(name) {
            return Ok(Some(definition.value().clone()));
        }
        let definition = self.inner.sources.get_definition(name)?;
        if let Some(definition) = &definition {
            self.inner.definitions.insert(name.to_string(), definition.clone());
        }
        Ok(definition)
    }

    fn resolve(
        &self,
        name: &str,
        definition: &Definition,
        parameters: &[(String, Value)],
        cache: bool,
    ) -> Result<Value> {
        trace!(entry = name, kind = definition.kind(), scope = %definition.scope(), "Resolving");
        let _guard = self.inner.stack.enter(name)?;
        let value = DefinitionResolver::new(self)
            .resolve(definition, parameters)
            .map_err(|err| err.within(name))?;

        if cache && definition.is_cacheable() {
            return Ok(self.store(name, value));
        }
        Ok(value)
    }

    fn resolve_compiled(
        &self,
        name: &str,
        module: &Arc<CompiledModule>,
        routine: &str,
        shared: bool,
    ) -> Result<Value> {
        trace!(entry = name, routine, "Resolving compiled entry");
        let _guard = self.inner.stack.enter(name)?;
        let value = Executor::new(self, module)
            .run(routine)
            .map_err(|err| err.within(name))?;

        if shared {
            return Ok(self.store(name, value));
        }
        Ok(value)
    }

    /// Caches a singleton. If another thread stored one first, that one wins.
    fn store(&self, name: &str, value: Value) -> Value {
        self.inner
            .singletons
            .entry(name.to_string())
            .or_insert(value)
            .value()
            .clone()
    }

    fn not_found(&self, name: &str) -> DiError {
        let known = self.known_entry_names();
        let known: Vec<&str> = known.iter().map(String::as_str).collect();
        DiError::NotFound(NotFoundError {
            requested: name.to_string(),
            suggestions: suggest_similar(name, &known, MAX_SUGGESTIONS),
        })
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("sources", &self.inner.sources)
            .field("singletons", &self.inner.singletons.len())
            .field(
                "compiled",
                &self.inner.compiled.as_ref().map(|m| m.name.as_str()),
            )
            .finish()
    }
}

// ═══════════════════════════════════════════
// ServiceLocator
// ═══════════════════════════════════════════

/// A read-only view over a fixed set of entries.
///
/// Services are looked up by alias; an alias not in the map is not found
/// even if the container has an entry of that name.
pub struct ServiceLocator {
    container: WeakContainer,
    subscriber: String,
    services: Vec<(String, String)>,
}

impl ServiceLocator {
    pub(crate) fn new(container: &Container, subscriber: String, services: Vec<(String, String)>) -> Self {
        Self {
            container: container.downgrade(),
            subscriber,
            services,
        }
    }

    /// The entry the locator was built for.
    pub fn subscriber(&self) -> &str {
        &self.subscriber
    }

    /// `(alias, entry)` pairs.
    pub fn services(&self) -> &[(String, String)] {
        &self.services
    }

    pub fn has(&self, alias: &str) -> bool {
        self.services.iter().any(|(a, _)| a == alias)
    }

    pub fn get(&self, alias: &str) -> Result<Value> {
        let Some((_, entry)) = self.services.iter().find(|(a, _)| a == alias) else {
            let aliases: Vec<&str> = self.services.iter().map(|(a, _)| a.as_str()).collect();
            return Err(DiError::NotFound(NotFoundError {
                requested: alias.to_string(),
                suggestions: suggest_similar(alias, &aliases, MAX_SUGGESTIONS),
            }));
        };
        let container = self.container.upgrade().ok_or_else(|| DiError::ContainerDropped {
            entry: entry.clone(),
        })?;
        container.get(entry)
    }
}

impl fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("subscriber", &self.subscriber)
            .field("services", &self.services)
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::{CompilationSettings, Container, ContainerBuilder, ContainerSettings, ServiceLocator};
    pub use crate::definition::Definition;
    pub use crate::definition::helpers::*;
    pub use crate::environment::{Environment, MapEnvironment};
    pub use crate::error::{DiError, Result};
    pub use crate::provider::{Provider, ProviderRegistry};
    pub use crate::registry::{ClassInfo, ClassRegistry, Parameter};
    pub use crate::resolver::Parameters;
    pub use crate::scope::Scope;
    pub use crate::value::Value;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{create, factory, get, value};
    use crate::registry::Parameter;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn builder() -> ContainerBuilder {
        Container::builder()
            .register_class(ClassInfo::new("Logger").property("level"))
            .register_class(ClassInfo::new("Mailer").param(Parameter::typed("logger", "Logger")))
    }

    #[test]
    fn with_classes_adds_to_the_registry() {
        let mut extra = ClassRegistry::new();
        extra.register(ClassInfo::new("Cache"));
        extra.register(ClassInfo::new("Logger"));

        let container = builder().with_classes(extra).build().unwrap();
        let classes = container.classes();
        assert!(classes.contains("Mailer"));
        assert!(classes.contains("Cache"));
        // The later description of a name wins.
        assert!(classes.get("Logger").is_some_and(|logger| !logger.has_property("level")));
    }

    #[test]
    fn resolve_value() {
        let container = builder().add_definitions([("answer", value(42))]).build().unwrap();
        assert_eq!(container.get("answer").unwrap(), Value::Int(42));
    }

    #[test]
    fn singleton_factory_called_once() {
        let counter = Arc::new(AtomicU32::new(0));
        let container = builder()
            .add_definitions([(
                "counter",
                factory({
                    let counter = counter.clone();
                    move |_| Ok(Value::Int(counter.fetch_add(1, Ordering::SeqCst).into()))
                }),
            )])
            .build()
            .unwrap();

        let a = container.get("counter").unwrap();
        let b = container.get("counter").unwrap();
        assert_eq!(a, b);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn autowired_object_graph() {
        let container = builder().build().unwrap();

        let mailer = container.get("Mailer").unwrap();
        let logger = container.get("Logger").unwrap();
        let mailer = mailer.as_object().unwrap();
        assert!(mailer.argument(0).unwrap().same(&logger));
    }

    #[test]
    fn resolve_not_found() {
        let container = builder().add_definitions([("app.mailer", value(1))]).build().unwrap();

        match container.get("mailer") {
            Err(DiError::NotFound(e)) => {
                assert_eq!(e.requested, "mailer");
                assert!(e.suggestions.contains(&"app.mailer".to_string()));
            }
            other => panic!("Expected NotFound, got: {other:?}"),
        }
    }

    #[test]
    fn set_replaces_cached_singleton() {
        let container = builder().add_definitions([("name", factory(|_| Ok(Value::from("a"))))]).build().unwrap();
        assert_eq!(container.get("name").unwrap(), Value::from("a"));

        container.set("name", "b").unwrap();
        assert_eq!(container.get("name").unwrap(), Value::from("b"));
    }

    #[test]
    fn make_bypasses_the_cache() {
        let container = builder().build().unwrap();
        let logger = container.get("Logger").unwrap();

        let made = container
            .make("Logger", vec![("level".into(), Value::from("debug"))])
            .unwrap();
        assert!(!made.same(&logger));
        assert_eq!(made.as_object().unwrap().property("level"), Some(Value::from("debug")));
        assert!(container.get("Logger").unwrap().same(&logger));
    }

    #[test]
    fn has_checks_instantiability() {
        let container = builder()
            .register_class(ClassInfo::interface("Transport"))
            .add_definitions([("mailer", get("Mailer"))])
            .build()
            .unwrap();

        assert!(container.has("mailer"));
        assert!(container.has("Mailer"));
        assert!(!container.has("Transport"));
        assert!(!container.has("Nope"));
    }

    #[test]
    fn service_locator_is_restricted() {
        let container = builder()
            .add_definitions([
                ("secret", value("s3cr3t")),
                (
                    "locator",
                    crate::definition::helpers::service_locator("Mailer")
                        .service("Logger")
                        .alias("log", "Logger")
                        .into(),
                ),
            ])
            .build()
            .unwrap();

        let locator = container.get("locator").unwrap();
        let locator = locator.as_locator().unwrap();
        assert!(locator.has("log"));
        assert!(!locator.has("secret"));
        assert!(locator.get("log").unwrap().same(&container.get("Logger").unwrap()));
        assert!(matches!(locator.get("secret"), Err(DiError::NotFound(_))));
    }

    #[test]
    fn debug_entry_describes_definition() {
        let container = builder().add_definitions([("mailer", get("Mailer"))]).build().unwrap();
        assert!(container.debug_entry("mailer").unwrap().contains("get(Mailer)"));
        assert!(container.debug_entry("missing").is_err());
    }

    #[test]
    fn known_entry_names_are_sorted() {
        let container = builder()
            .add_definitions([("b", value(1)), ("a", value(2))])
            .build()
            .unwrap();
        container.get("Logger").unwrap();
        assert_eq!(container.known_entry_names(), ["Logger", "a", "b"]);
    }

    #[test]
    fn debug_display() {
        let container = builder().build().unwrap();
        let debug = format!("{container:?}");
        assert!(debug.contains("Container"));
    }
}
