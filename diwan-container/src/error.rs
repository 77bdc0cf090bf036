//! Error types for Diwan container operations.
//!
//! Resolution errors carry the entry that failed and the chain of
//! entries that were being resolved around it, so a failure deep in the
//! graph still tells you how you got there.

use std::fmt;
use std::path::PathBuf;

use diwan_support::rendering::{render_chain, render_path};

/// Error type returned by user callables (factories, decorators, hooks).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all Diwan operations.
#[derive(Debug, thiserror::Error)]
pub enum DiError {
    /// No definition exists anywhere in the source chain.
    ///
    /// Only raised by the public entry points; a missing reference
    /// target inside a definition is an [`DiError::InvalidDefinition`].
    #[error("{}", .0)]
    NotFound(NotFoundError),

    /// An entry was requested while it was already being resolved.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// A definition is malformed or cannot be satisfied.
    #[error("{}", .0)]
    InvalidDefinition(InvalidDefinitionError),

    /// A constructor, method hook, factory or decorator returned an error.
    #[error("Failed to construct '{entry}': {source}{}", path_suffix(.path))]
    ConstructionFailed {
        entry: String,
        path: Vec<String>,
        #[source]
        source: BoxError,
    },

    /// Compiled output could not be written or read.
    #[error("{}", .0)]
    Compilation(CompilationError),

    /// A lazy stand-in was forced after its container went away.
    #[error("Lazy entry '{entry}' was initialized after its container was dropped")]
    ContainerDropped { entry: String },
}

impl DiError {
    /// Creates an [`DiError::InvalidDefinition`] for `entry`.
    pub fn invalid(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        DiError::InvalidDefinition(InvalidDefinitionError {
            entry: entry.into(),
            reason: reason.into(),
            path: Vec::new(),
        })
    }

    /// Creates a [`DiError::ConstructionFailed`] for `entry`.
    pub fn construction(entry: impl Into<String>, source: BoxError) -> Self {
        DiError::ConstructionFailed {
            entry: entry.into(),
            path: Vec::new(),
            source,
        }
    }

    /// Records that this error surfaced while resolving `entry`.
    ///
    /// Called once per resolution level while the error unwinds, so the
    /// outermost entry ends up first in [`DiError::path`]. Circular
    /// dependency errors already hold the whole path and are left as is.
    pub fn within(mut self, entry: &str) -> Self {
        let path = match &mut self {
            DiError::InvalidDefinition(err) => Some(&mut err.path),
            DiError::ConstructionFailed { path, .. } => Some(path),
            _ => None,
        };
        if let Some(path) = path {
            if path.first().map(String::as_str) != Some(entry) {
                path.insert(0, entry.to_string());
            }
        }
        self
    }

    /// The resolution path recorded so far (outermost entry first).
    pub fn path(&self) -> &[String] {
        match self {
            DiError::InvalidDefinition(err) => &err.path,
            DiError::ConstructionFailed { path, .. } => path,
            DiError::CircularDependency(err) => &err.chain,
            _ => &[],
        }
    }

    /// Returns `true` for [`DiError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiError::NotFound(_))
    }
}

fn path_suffix(path: &[String]) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("\n  While resolving: {}", render_path(path))
    }
}

/// Error when no definition exists for the requested name.
#[derive(Debug)]
pub struct NotFoundError {
    /// The entry that was requested
    pub requested: String,
    /// Known entries with a similar name
    pub suggestions: Vec<String>,
}

impl fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "No entry or class found for '{}'", self.requested)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        Ok(())
    }
}

/// Error when an entry depends on itself, directly or indirectly.
///
/// The chain is the whole resolution path, outermost first, ending with the
/// entry that was requested again, e.g. `["x", "a", "b", "a"]`.
#[derive(Debug)]
pub struct CircularDependencyError {
    pub chain: Vec<String>,
}

impl CircularDependencyError {
    /// The entry that closed the cycle.
    pub fn entry(&self) -> &str {
        self.chain.last().map(String::as_str).unwrap_or_default()
    }

    /// The part of the chain that loops, from the first occurrence of
    /// [`entry`](Self::entry) to the end.
    pub fn cycle(&self) -> &[String] {
        let entry = self.entry();
        let start = self.chain.iter().position(|e| e == entry).unwrap_or(0);
        &self.chain[start..]
    }
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Circular dependency detected while trying to resolve entry '{}':\n  {}",
            self.entry(),
            render_chain(&self.chain)
        )?;
        write!(
            f,
            "\n  Hint: Consider making one of the entries lazy or restructuring the definitions"
        )
    }
}

/// Error when a definition cannot be turned into a value.
#[derive(Debug)]
pub struct InvalidDefinitionError {
    /// The entry whose definition is at fault
    pub entry: String,
    /// What is wrong with it
    pub reason: String,
    /// Entries being resolved when the error occurred (outermost first)
    pub path: Vec<String>,
}

impl fmt::Display for InvalidDefinitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entry.is_empty() {
            write!(f, "Invalid definition: {}", self.reason)?;
        } else {
            write!(f, "Entry '{}' cannot be resolved: {}", self.entry, self.reason)?;
        }
        write!(f, "{}", path_suffix(&self.path))
    }
}

/// Error while writing or loading compiled output.
#[derive(Debug, thiserror::Error)]
pub enum CompilationError {
    #[error("Cannot write compiled module {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compiled module {} is malformed: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl From<CompilationError> for DiError {
    fn from(err: CompilationError) -> Self {
        DiError::Compilation(err)
    }
}

/// Convenient Result type for Diwan operations.
pub type Result<T> = std::result::Result<T, DiError>;
