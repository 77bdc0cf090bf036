//! The compiled form of definitions.
//!
//! A [`CompiledModule`] is a set of routines plus a dispatch table from
//! entry names to routine ids. Routine bodies are plain expression trees:
//! every argument is spelled out, so running them needs no signature
//! inspection.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::definition::string::TemplatePart;
use crate::error::{CompilationError, Result};
use crate::value::{ArrayKey, ArrayValue, Value};

/// A value that can be written out as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<(ArrayKey, Literal)>),
}

impl Literal {
    /// The literal form of `value`, if it has one.
    ///
    /// Objects, natives, lazy stand-ins and locators have none.
    pub fn from_value(value: &Value) -> Option<Literal> {
        Some(match value {
            Value::Null => Literal::Null,
            Value::Bool(b) => Literal::Bool(*b),
            Value::Int(i) => Literal::Int(*i),
            Value::Float(x) => Literal::Float(*x),
            Value::Str(s) => Literal::Str(s.to_string()),
            Value::Array(array) => Literal::Array(
                array
                    .iter()
                    .map(|(key, value)| Some((key.clone(), Literal::from_value(value)?)))
                    .collect::<Option<_>>()?,
            ),
            Value::Object(_) | Value::Lazy(_) | Value::Locator(_) | Value::Native(_) => return None,
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Int(i) => Value::Int(*i),
            Literal::Float(x) => Value::Float(*x),
            Literal::Str(s) => Value::string(s),
            Literal::Array(entries) => Value::from(ArrayValue::from_entries(
                entries.iter().map(|(k, v)| (k.clone(), v.to_value())).collect(),
            )),
        }
    }
}

/// One method call on a freshly built object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    pub method: String,
    pub arguments: Vec<Expr>,
}

/// A piece of an interpolated string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    Text(String),
    Entry(String),
}

impl From<TemplatePart> for Part {
    fn from(part: TemplatePart) -> Self {
        match part {
            TemplatePart::Text(text) => Part::Text(text),
            TemplatePart::Entry(entry) => Part::Entry(entry),
        }
    }
}

/// A routine body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    Literal {
        value: Literal,
    },
    /// Another entry, through the container.
    Get {
        entry: String,
    },
    /// A helper routine of the same module.
    Call {
        routine: String,
    },
    Array {
        items: Vec<(ArrayKey, Expr)>,
    },
    Env {
        variable: String,
        optional: bool,
        default: Option<Box<Expr>>,
    },
    New {
        class: String,
        arguments: Vec<Expr>,
        properties: Vec<(String, Expr)>,
        calls: Vec<CallExpr>,
    },
    /// A stand-in that runs `routine` when forced, as `entry` when the
    /// stand-in belongs to a named entry.
    Lazy {
        class: String,
        entry: String,
        routine: String,
    },
    Interpolate {
        template: String,
        parts: Vec<Part>,
    },
}

/// A named body. `entry` is the entry it was generated for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: String,
    pub entry: String,
    pub body: Expr,
    /// Whether the result goes to the singleton cache.
    pub shared: bool,
}

/// The output of one compilation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledModule {
    pub name: String,
    pub routines: BTreeMap<String, Routine>,
    /// Entry name to routine id.
    pub entries: BTreeMap<String, String>,
}

impl CompiledModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Routine serving `entry`, if it was compiled.
    pub fn entry(&self, entry: &str) -> Option<&Routine> {
        self.routines.get(self.entries.get(entry)?)
    }

    pub fn routine(&self, id: &str) -> Option<&Routine> {
        self.routines.get(id)
    }

    pub fn has_entry(&self, entry: &str) -> bool {
        self.entries.contains_key(entry)
    }

    /// Reads a module written by the compiler.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<CompiledModule> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| CompilationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let module: CompiledModule =
            serde_json::from_slice(&bytes).map_err(|source| CompilationError::Format {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            module = %module.name,
            entries = module.entries.len(),
            routines = module.routines.len(),
            "Loaded compiled module"
        );
        Ok(module)
    }
}
