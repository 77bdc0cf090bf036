//! Definition of an entry whose value is already built.

use std::fmt;

use crate::value::Value;

/// Wraps a ready value: a literal, a shared native object, an array.
#[derive(Clone, Default)]
pub struct ValueDefinition {
    pub(crate) name: String,
    pub value: Value,
}

impl ValueDefinition {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            name: String::new(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ValueDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Value ({:?})", self.value)
    }
}
