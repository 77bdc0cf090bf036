//! Ordered lookup over several definition sources.

use std::sync::Arc;

use tracing::{debug, trace};

use super::{DefinitionArray, DefinitionSource, MutableDefinitionSource};
use crate::autowire::Autowiring;
use crate::definition::Definition;
use crate::error::{DiError, Result};

/// Sources consulted by priority.
///
/// The head of the chain is a mutable overlay that receives runtime
/// definitions; the registered sources follow in priority order; the
/// autowiring source, when enabled, comes last.
///
/// A definition that extends another one (an object extending its class
/// definition, an array extension, a decorator) is merged with the base
/// found by a new lookup. When the base has the same name, the lookup
/// starts right after the source the definition came from; otherwise it
/// starts from the head.
pub struct SourceChain {
    overlay: Arc<DefinitionArray>,
    sources: Vec<Arc<dyn DefinitionSource>>,
    autowiring: Option<Autowiring>,
}

impl SourceChain {
    /// A chain over `sources`, highest priority first.
    pub fn new(sources: Vec<Arc<dyn DefinitionSource>>) -> Self {
        let overlay = Arc::new(DefinitionArray::new());
        let mut chain: Vec<Arc<dyn DefinitionSource>> = Vec::with_capacity(sources.len() + 2);
        chain.push(overlay.clone());
        chain.extend(sources);
        Self {
            overlay,
            sources: chain,
            autowiring: None,
        }
    }

    /// Appends the autowiring fallback and completes autowired definitions.
    pub fn with_autowiring(mut self, autowiring: Autowiring) -> Self {
        self.sources.push(Arc::new(autowiring.clone()));
        self.autowiring = Some(autowiring);
        self
    }

    pub fn autowiring(&self) -> Option<&Autowiring> {
        self.autowiring.as_ref()
    }

    /// Adds a definition to the mutable overlay, ahead of every source.
    pub fn set_definition(&self, definition: Definition) -> Result<()> {
        self.overlay.add_definition(definition)
    }

    /// Whether `name` was defined at runtime through the overlay.
    pub fn is_overridden(&self, name: &str) -> bool {
        self.overlay.contains(name)
    }

    /// Resolves the fully merged definition of `name`.
    pub fn get_definition(&self, name: &str) -> Result<Option<Definition>> {
        let Some(mut definition) = self.lookup(name, 0, &mut Vec::new())? else {
            return Ok(None);
        };
        if let Some(autowiring) = &self.autowiring {
            autowiring.apply(&mut definition)?;
        }
        Ok(Some(definition))
    }

    /// Resolves `name` starting at source `start`, without the final
    /// autowiring pass.
    pub fn get_definition_from(&self, name: &str, start: usize) -> Result<Option<Definition>> {
        self.lookup(name, start, &mut Vec::new())
    }

    fn lookup(
        &self,
        name: &str,
        start: usize,
        visiting: &mut Vec<(String, usize)>,
    ) -> Result<Option<Definition>> {
        if visiting.iter().any(|(n, s)| n == name && *s == start) {
            let mut chain: Vec<&str> = visiting.iter().map(|(n, _)| n.as_str()).collect();
            chain.push(name);
            return Err(DiError::invalid(
                name,
                format!(
                    "its definition extends itself: {}",
                    diwan_support::rendering::render_chain(&chain)
                ),
            ));
        }

        for (index, source) in self.sources.iter().enumerate().skip(start) {
            let Some(mut definition) = source.get_definition(name)? else {
                continue;
            };

            if let Some(target) = definition.extension_target().map(str::to_string) {
                let from = if target == name { index + 1 } else { 0 };
                visiting.push((name.to_string(), start));
                let base = self.lookup(&target, from, visiting);
                visiting.pop();

                match base? {
                    Some(base) => {
                        debug!(entry = %name, base = %target, source = index, "Extending definition");
                        definition.extend_with(base)?;
                    }
                    None if definition.requires_extension() => {
                        return Err(DiError::invalid(
                            name,
                            format!("it extends '{target}' but no such definition exists"),
                        ));
                    }
                    None => {}
                }
            }

            trace!(entry = %name, source = index, kind = definition.kind(), "Found definition");
            return Ok(Some(definition));
        }
        Ok(None)
    }

    /// Every name the sources can enumerate, without duplicates.
    pub fn definition_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for source in &self.sources {
            for name in source.definition_names() {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// The merged definition of every enumerable name.
    pub fn definitions(&self) -> Result<Vec<Definition>> {
        let mut definitions = Vec::new();
        for name in self.definition_names() {
            if let Some(definition) = self.get_definition(&name)? {
                definitions.push(definition);
            }
        }
        Ok(definitions)
    }
}

impl std::fmt::Debug for SourceChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceChain")
            .field("sources", &self.sources.len())
            .field("overlay", &self.overlay)
            .field("autowiring", &self.autowiring)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{add, array, autowire, create, decorate, get, value};
    use crate::registry::{ClassInfo, ClassRegistry, Parameter};
    use crate::value::ArrayKey;

    fn source<const N: usize>(definitions: [(&str, Definition); N]) -> Arc<dyn DefinitionSource> {
        Arc::new(DefinitionArray::from_definitions(definitions).unwrap())
    }

    fn object(definition: Option<Definition>) -> crate::definition::ObjectDefinition {
        match definition {
            Some(Definition::Object(object)) => object,
            other => panic!("Expected object definition, got: {other:?}"),
        }
    }

    #[test]
    fn first_source_wins() {
        let chain = SourceChain::new(vec![
            source([("a", value(1))]),
            source([("a", value(2)), ("b", value(3))]),
        ]);

        match chain.get_definition("a").unwrap() {
            Some(Definition::Value(v)) => assert_eq!(v.value.as_int(), Some(1)),
            other => panic!("Expected value, got: {other:?}"),
        }
        assert!(chain.get_definition("b").unwrap().is_some());
        assert!(chain.get_definition("c").unwrap().is_none());
    }

    #[test]
    fn overlay_shadows_sources() {
        let chain = SourceChain::new(vec![source([("a", value(1))])]);
        chain.set_definition(value(9).named("a")).unwrap();

        assert!(chain.is_overridden("a"));
        match chain.get_definition("a").unwrap() {
            Some(Definition::Value(v)) => assert_eq!(v.value.as_int(), Some(9)),
            other => panic!("Expected value, got: {other:?}"),
        }
    }

    #[test]
    fn object_extends_previous_definition_of_same_name() {
        let chain = SourceChain::new(vec![
            source([("Mailer", create().property("debug", true).into())]),
            source([(
                "Mailer",
                create().constructor(vec![value("smtp")]).property("debug", false).into(),
            )]),
        ]);

        let mailer = object(chain.get_definition("Mailer").unwrap());
        assert!(mailer.constructor.is_some());
        assert_eq!(mailer.properties.len(), 1);
        match &mailer.properties[0].1 {
            Definition::Value(v) => assert_eq!(v.value.as_bool(), Some(true)),
            other => panic!("Expected value, got: {other:?}"),
        }
    }

    #[test]
    fn object_extends_its_class_definition() {
        let chain = SourceChain::new(vec![source([
            ("mailer", create().class("Mailer").property("debug", true).into()),
            ("Mailer", create().method("setHost", vec![value("smtp")]).into()),
        ])]);

        let mailer = object(chain.get_definition("mailer").unwrap());
        assert_eq!(mailer.class_name(), "Mailer");
        assert_eq!(mailer.method_calls.len(), 1);
        assert_eq!(mailer.properties.len(), 1);
    }

    #[test]
    fn explicit_extension_needs_a_base() {
        let chain = SourceChain::new(vec![source([("a", create().extends("missing").into())])]);
        let err = chain.get_definition("a").unwrap_err();
        assert!(matches!(err, DiError::InvalidDefinition(_)), "got: {err:?}");
    }

    #[test]
    fn extension_loops_are_reported() {
        let chain = SourceChain::new(vec![source([
            ("a", create().class("b").into()),
            ("b", create().class("a").into()),
        ])]);
        let err = chain.get_definition("a").unwrap_err();
        assert!(matches!(err, DiError::InvalidDefinition(_)), "got: {err:?}");
    }

    #[test]
    fn array_extension_appends_to_previous() {
        let chain = SourceChain::new(vec![
            source([("listeners", add(vec![value("c")]).into())]),
            source([("listeners", add(vec![value("b")]).into())]),
            source([("listeners", array(vec![value("a")]).into())]),
        ]);

        match chain.get_definition("listeners").unwrap() {
            Some(Definition::Array(array)) => {
                let keys: Vec<_> = array.values.iter().map(|(k, _)| k.clone()).collect();
                assert_eq!(keys, [ArrayKey::Index(0), ArrayKey::Index(1), ArrayKey::Index(2)]);
                let values: Vec<_> = array
                    .values
                    .iter()
                    .map(|(_, d)| match d {
                        Definition::Value(v) => v.value.as_str().map(str::to_string),
                        _ => None,
                    })
                    .collect();
                assert_eq!(values, [Some("a".into()), Some("b".into()), Some("c".into())]);
            }
            other => panic!("Expected array, got: {other:?}"),
        }
    }

    #[test]
    fn decorator_links_previous_definition() {
        let chain = SourceChain::new(vec![
            source([("greeting", decorate(|v, _| Ok(v)))]),
            source([("greeting", value("hello"))]),
        ]);

        match chain.get_definition("greeting").unwrap() {
            Some(Definition::Decorator(decorator)) => {
                assert!(matches!(decorator.previous.as_deref(), Some(Definition::Value(_))))
            }
            other => panic!("Expected decorator, got: {other:?}"),
        }
    }

    #[test]
    fn autowiring_is_the_fallback() {
        let mut classes = ClassRegistry::new();
        classes.register(ClassInfo::new("Logger"));
        classes.register(ClassInfo::new("Mailer").param(Parameter::typed("logger", "Logger")));
        let chain = SourceChain::new(vec![source([("mailer", get("Mailer"))])])
            .with_autowiring(Autowiring::new(Arc::new(classes)));

        let mailer = object(chain.get_definition("Mailer").unwrap());
        assert!(mailer.autowired);
        assert!(mailer.constructor.is_some());

        // `create()` inherits the autowired constructor through its class.
        chain
            .set_definition(Definition::from(create().property("x", 1)).named("Mailer"))
            .unwrap();
        let mailer = object(chain.get_definition("Mailer").unwrap());
        assert!(mailer.constructor.is_some());
        assert_eq!(mailer.properties.len(), 1);

        // Autowiring never enumerates classes.
        assert_eq!(chain.definition_names(), ["Mailer", "mailer"]);
    }

    #[test]
    fn autowire_definition_is_completed() {
        let mut classes = ClassRegistry::new();
        classes.register(ClassInfo::new("Mailer").param(Parameter::typed("logger", "Logger")));
        let chain = SourceChain::new(vec![source([("mailer", autowire().class("Mailer").into())])])
            .with_autowiring(Autowiring::new(Arc::new(classes)));

        let mailer = object(chain.get_definition("mailer").unwrap());
        let constructor = mailer.constructor.unwrap();
        assert!(matches!(constructor.parameter(0), Some(Definition::Reference(_))));
    }
}
