//! Providers: groups of related definitions.
//!
//! A provider registers the definitions of one concern (storage, mail,
//! HTTP clients) in one place. Each provider added to a
//! [`ContainerBuilder`](crate::container::ContainerBuilder) becomes its
//! own source layer, ranked above the layers added before it.
//!
//! # Examples
//! ```
//! use diwan_container::definition::helpers::{create, env_or, get};
//! use diwan_container::error::Result;
//! use diwan_container::provider::{Provider, ProviderRegistry};
//!
//! struct MailProvider;
//!
//! impl Provider for MailProvider {
//!     fn register(&self, definitions: &mut dyn ProviderRegistry) -> Result<()> {
//!         definitions.define("mail.host", env_or("MAIL_HOST", "localhost").into())?;
//!         definitions.define("app::Mailer", create().constructor(vec![get("mail.host")]).into())?;
//!         definitions.define("mailer", get("app::Mailer"))
//!     }
//! }
//! ```

use crate::definition::Definition;
use crate::error::Result;
use crate::source::{DefinitionArray, MutableDefinitionSource};

/// A module of related definitions.
pub trait Provider: Send + Sync {
    /// Registers the definitions. Called once while the container is built.
    fn register(&self, definitions: &mut dyn ProviderRegistry) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// What a provider can register into.
///
/// Kept separate from [`DefinitionArray`] so providers can be tested
/// against a recording registry.
pub trait ProviderRegistry {
    fn define(&mut self, name: &str, definition: Definition) -> Result<()>;
}

impl ProviderRegistry for DefinitionArray {
    fn define(&mut self, name: &str, definition: Definition) -> Result<()> {
        self.add_definition(definition.named(name))
    }
}

/// Runs `provider` into a fresh source.
pub(crate) fn collect(provider: &dyn Provider) -> Result<DefinitionArray> {
    let mut definitions = DefinitionArray::new();
    provider.register(&mut definitions)?;
    tracing::debug!(provider = provider.name(), definitions = definitions.len(), "Registered provider");
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::helpers::{create, get, value};
    use crate::source::DefinitionSource;

    struct RecordingRegistry {
        names: Vec<String>,
    }

    impl ProviderRegistry for RecordingRegistry {
        fn define(&mut self, name: &str, _definition: Definition) -> Result<()> {
            self.names.push(name.to_string());
            Ok(())
        }
    }

    struct StorageProvider;

    impl Provider for StorageProvider {
        fn register(&self, definitions: &mut dyn ProviderRegistry) -> Result<()> {
            definitions.define("storage.root", value("/var/lib/app"))?;
            definitions.define("Storage", create().constructor(vec![get("storage.root")]).into())
        }
    }

    #[test]
    fn provider_registers_definitions() {
        let mut registry = RecordingRegistry { names: Vec::new() };
        StorageProvider.register(&mut registry).unwrap();
        assert_eq!(registry.names, ["storage.root", "Storage"]);
    }

    #[test]
    fn collect_builds_a_source() {
        let definitions = collect(&StorageProvider).unwrap();
        assert_eq!(definitions.definition_names(), ["storage.root", "Storage"]);
        assert_eq!(definitions.get_definition("Storage").unwrap().unwrap().name(), "Storage");
    }

    #[test]
    fn provider_has_name() {
        assert!(StorageProvider.name().contains("StorageProvider"));
    }
}
