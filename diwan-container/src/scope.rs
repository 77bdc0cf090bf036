//! Lifetime policies for resolved entries.
//!
//! - [`Scope::Singleton`] — resolved once, cached for the container's life
//! - [`Scope::Prototype`] — resolved again on every request
use std::fmt;

use serde::{Deserialize, Serialize};

/// Defines how long a resolved value is reused by the container.
///
/// # Examples
/// ```
/// use diwan_container::scope::Scope;
///
/// assert!(Scope::Singleton.is_cached());
/// assert!(!Scope::Prototype.is_cached());
/// assert_eq!(Scope::default(), Scope::Singleton);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// One value per container.
    ///
    /// Created on the first `get()`, kept until the container is dropped.
    /// `make()` still builds a fresh value.
    #[default]
    Singleton,

    /// New value on every request.
    ///
    /// Never cached. Aliases are always prototype-scoped because the
    /// entry they point to applies its own scope.
    Prototype,
}

impl Scope {
    /// Returns `true` if values of this scope are kept in the container cache.
    #[inline]
    pub fn is_cached(&self) -> bool {
        matches!(self, Scope::Singleton)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Singleton => write!(f, "singleton"),
            Scope::Prototype => write!(f, "prototype"),
        }
    }
}
