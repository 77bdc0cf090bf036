//! Runtime values produced by the container.
//!
//! Definitions describe *how* to build an entry; [`Value`] is what comes
//! out. Scalars and strings cover configuration entries, [`Instance`] is
//! the object built from an Object definition, and [`Value::Native`]
//! carries any pre-built Rust value handed to the container.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::container::ServiceLocator;
use crate::error::Result;
use crate::proxy::LazyValue;

/// A type-erased, shareable Rust value.
pub type Native = Arc<dyn Any + Send + Sync>;

/// A resolved entry.
///
/// Cloning is cheap: heap variants are reference counted, so a singleton
/// handed out twice is the *same* allocation (see [`Value::same`]).
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    Array(Arc<ArrayValue>),
    Object(Arc<Instance>),
    Lazy(Arc<LazyValue>),
    Locator(Arc<ServiceLocator>),
    Native(Native),
}

impl Value {
    /// Wraps any Rust value.
    pub fn native<T: Any + Send + Sync>(value: T) -> Self {
        Value::Native(Arc::new(value))
    }

    /// Wraps an already shared Rust value without re-allocating.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Value::Native(value)
    }

    /// Builds a string value.
    pub fn string(value: impl AsRef<str>) -> Self {
        Value::Str(Arc::from(value.as_ref()))
    }

    /// Reference identity for heap values, equality for scalars.
    ///
    /// This is what "the same singleton" means: two `get()` calls for a
    /// singleton entry return values for which `same` is `true`.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => Arc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            (Value::Lazy(a), Value::Lazy(b)) => Arc::ptr_eq(a, b),
            (Value::Locator(a), Value::Locator(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Arc::ptr_eq(a, b),
            _ => self == other,
        }
    }

    /// Short name of the variant, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Lazy(_) => "lazy object",
            Value::Locator(_) => "service locator",
            Value::Native(_) => "native value",
        }
    }

    /// Returns `true` for values that can be written out as literals.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Arc<Instance>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_locator(&self) -> Option<&Arc<ServiceLocator>> {
        match self {
            Value::Locator(l) => Some(l),
            _ => None,
        }
    }

    /// Downcasts a native value, or the native payload of an object.
    pub fn as_native<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            Value::Native(native) => native.clone().downcast::<T>().ok(),
            Value::Object(instance) => instance.native::<T>(),
            _ => None,
        }
    }

    /// Forces a lazy stand-in; any other value is returned unchanged.
    pub fn resolve_lazy(&self) -> Result<Value> {
        match self {
            Value::Lazy(lazy) => lazy.get(),
            other => Ok(other.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b) || a == b,
            (Value::Lazy(a), Value::Lazy(b)) => {
                Arc::ptr_eq(a, b)
                    || match (a.peek(), b.peek()) {
                        (Some(x), Some(y)) => x == y,
                        _ => false,
                    }
            }
            (Value::Locator(a), Value::Locator(b)) => Arc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Array(a) => fmt::Debug::fmt(a, f),
            Value::Object(o) => fmt::Debug::fmt(o, f),
            Value::Lazy(l) => fmt::Debug::fmt(l, f),
            Value::Locator(l) => fmt::Debug::fmt(l, f),
            Value::Native(_) => write!(f, "<native>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(Arc::from(value))
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Arc::new(values.into_iter().collect()))
    }
}

impl From<ArrayValue> for Value {
    fn from(array: ArrayValue) -> Self {
        Value::Array(Arc::new(array))
    }
}

impl From<Arc<Instance>> for Value {
    fn from(instance: Arc<Instance>) -> Self {
        Value::Object(instance)
    }
}

// ═══════════════════════════════════════════
// Arrays
// ═══════════════════════════════════════════

/// Key of an array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrayKey {
    Index(i64),
    Key(String),
}

impl fmt::Display for ArrayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Index(i) => write!(f, "{i}"),
            ArrayKey::Key(k) => write!(f, "{k:?}"),
        }
    }
}

impl From<&str> for ArrayKey {
    fn from(key: &str) -> Self {
        ArrayKey::Key(key.to_string())
    }
}

impl From<i64> for ArrayKey {
    fn from(index: i64) -> Self {
        ArrayKey::Index(index)
    }
}

/// An ordered array whose keys are indices or strings.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayValue {
    entries: Vec<(ArrayKey, Value)>,
}

impl ArrayValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<(ArrayKey, Value)>) -> Self {
        Self { entries }
    }

    /// Appends a value under the next free index.
    pub fn push(&mut self, value: Value) {
        let index = next_index(&self.entries);
        self.entries.push((ArrayKey::Index(index), value));
    }

    /// Sets `key`, replacing an existing entry in place.
    pub fn insert(&mut self, key: ArrayKey, value: Value) {
        upsert(&mut self.entries, key, value);
    }

    pub fn get(&self, key: &ArrayKey) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| matches!(k, ArrayKey::Key(name) if name == key))
            .map(|(_, v)| v)
    }

    pub fn get_index(&self, index: i64) -> Option<&Value> {
        self.get(&ArrayKey::Index(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ArrayKey, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn entries(&self) -> &[(ArrayKey, Value)] {
        &self.entries
    }

    /// Merges `extension` onto this array.
    ///
    /// Indexed entries of both sides are renumbered from zero in order,
    /// keyed entries of the extension overwrite same-key entries in place.
    pub fn merged_with(&self, extension: &ArrayValue) -> ArrayValue {
        ArrayValue {
            entries: merge_entries(&self.entries, &extension.entries),
        }
    }
}

impl FromIterator<Value> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        let mut array = ArrayValue::new();
        for value in iter {
            array.push(value);
        }
        array
    }
}

impl FromIterator<(ArrayKey, Value)> for ArrayValue {
    fn from_iter<I: IntoIterator<Item = (ArrayKey, Value)>>(iter: I) -> Self {
        let mut array = ArrayValue::new();
        for (key, value) in iter {
            array.insert(key, value);
        }
        array
    }
}

fn next_index<T>(entries: &[(ArrayKey, T)]) -> i64 {
    entries
        .iter()
        .filter_map(|(k, _)| match k {
            ArrayKey::Index(i) => Some(*i + 1),
            ArrayKey::Key(_) => None,
        })
        .max()
        .unwrap_or(0)
        .max(0)
}

fn upsert<T>(entries: &mut Vec<(ArrayKey, T)>, key: ArrayKey, value: T) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

/// Array merge shared by values and array definitions.
pub(crate) fn merge_entries<T: Clone>(
    base: &[(ArrayKey, T)],
    extension: &[(ArrayKey, T)],
) -> Vec<(ArrayKey, T)> {
    let mut merged: Vec<(ArrayKey, T)> = Vec::with_capacity(base.len() + extension.len());
    let mut index = 0;

    for (key, value) in base.iter().chain(extension.iter()) {
        match key {
            ArrayKey::Index(_) => {
                merged.push((ArrayKey::Index(index), value.clone()));
                index += 1;
            }
            ArrayKey::Key(_) => upsert(&mut merged, key.clone(), value.clone()),
        }
    }

    merged
}

// ═══════════════════════════════════════════
// Objects
// ═══════════════════════════════════════════

/// A method call recorded on an [`Instance`].
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub method: String,
    pub arguments: Vec<Value>,
}

/// An object built from an Object definition.
///
/// Holds the constructor arguments it was built with, its injected
/// properties, every injected method call in order, and the native
/// payload produced by the class's constructor hook, if any.
pub struct Instance {
    class: String,
    arguments: Vec<Value>,
    properties: RwLock<Vec<(String, Value)>>,
    calls: RwLock<Vec<MethodCall>>,
    native: Option<Native>,
}

impl Instance {
    pub fn new(class: impl Into<String>, arguments: Vec<Value>, native: Option<Native>) -> Self {
        Self {
            class: class.into(),
            arguments,
            properties: RwLock::new(Vec::new()),
            calls: RwLock::new(Vec::new()),
            native,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class
    }

    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    pub fn argument(&self, index: usize) -> Option<&Value> {
        self.arguments.get(index)
    }

    pub fn property(&self, name: &str) -> Option<Value> {
        self.properties
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn set_property(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut properties = self.properties.write();
        match properties.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => properties.push((name, value)),
        }
    }

    pub fn properties(&self) -> Vec<(String, Value)> {
        self.properties.read().clone()
    }

    pub fn calls(&self) -> Vec<MethodCall> {
        self.calls.read().clone()
    }

    /// Arguments of every recorded call to `method`, in call order.
    pub fn calls_to(&self, method: &str) -> Vec<Vec<Value>> {
        self.calls
            .read()
            .iter()
            .filter(|c| c.method == method)
            .map(|c| c.arguments.clone())
            .collect()
    }

    pub(crate) fn record_call(&self, call: MethodCall) {
        self.calls.write().push(call);
    }

    pub fn native<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.native.clone()?.downcast::<T>().ok()
    }

    pub fn has_native(&self) -> bool {
        self.native.is_some()
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        let natives_match = match (&self.native, &other.native) {
            (None, None) => true,
            (Some(_), Some(_)) => true,
            _ => false,
        };
        natives_match
            && self.class == other.class
            && self.arguments == other.arguments
            && *self.properties.read() == *other.properties.read()
            && *self.calls.read() == *other.calls.read()
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("class", &self.class)
            .field("arguments", &self.arguments)
            .field("properties", &*self.properties.read())
            .field("calls", &*self.calls.read())
            .field("native", &self.native.is_some())
            .finish()
    }
}
