//! Core of the Diwan dependency injection container.
//!
//! Entries are described by [`Definition`]s, looked up through a
//! [`SourceChain`](source::SourceChain), completed by
//! [`Autowiring`](autowire::Autowiring) and turned into [`Value`]s by the
//! [`DefinitionResolver`](resolver::DefinitionResolver) or by routines the
//! [`Compiler`](compiler::Compiler) produced ahead of time.

pub mod autowire;
pub mod compiler;
pub mod container;
pub mod definition;
pub mod environment;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod registry;
pub mod resolver;
pub mod scope;
pub mod source;
pub mod value;

#[doc(hidden)]
pub use inventory;

pub use container::{Container, ContainerBuilder, prelude};
pub use definition::Definition;
pub use error::{DiError, Result};
pub use scope::Scope;
pub use value::Value;
