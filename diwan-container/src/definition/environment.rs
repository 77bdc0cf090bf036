//! Definitions reading the process environment.

use std::fmt;

use diwan_support::rendering::indent;

use super::Definition;

/// Reads an environment variable.
///
/// A present variable resolves to its string value. An absent optional
/// variable resolves its default (which may itself reference another
/// entry); an absent required variable is an invalid definition.
#[derive(Clone)]
pub struct EnvironmentVariableDefinition {
    pub(crate) name: String,
    pub variable: String,
    pub optional: bool,
    pub default: Option<Box<Definition>>,
}

impl EnvironmentVariableDefinition {
    /// A required variable.
    pub fn new(variable: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            variable: variable.into(),
            optional: false,
            default: None,
        }
    }

    /// An optional variable falling back to `default`.
    pub fn with_default(variable: impl Into<String>, default: impl Into<Definition>) -> Self {
        Self {
            optional: true,
            default: Some(Box::new(default.into())),
            ..Self::new(variable)
        }
    }

    /// An optional variable resolving to null when absent.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl fmt::Display for EnvironmentVariableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Environment variable (")?;
        writeln!(f, "    variable = {}", self.variable)?;
        writeln!(f, "    optional = {}", if self.optional { "yes" } else { "no" })?;
        if let Some(default) = &self.default {
            writeln!(f, "    default = {}", indent(&default.to_string(), 1).trim_start())?;
        }
        write!(f, ")")
    }
}
