//! Alias definitions.

use std::fmt;

/// Points an entry at another entry.
///
/// Resolution defers entirely to the target, which applies its own
/// scope; the alias itself is never cached.
#[derive(Debug, Clone)]
pub struct Reference {
    pub(crate) name: String,
    pub target: String,
}

impl Reference {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            target: target.into(),
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "get({})", self.target)
    }
}
