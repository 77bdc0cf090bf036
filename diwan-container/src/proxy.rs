//! Lazy stand-ins for objects whose construction is deferred.
//!
//! A lazy object definition resolves to a stand-in instead of the object.
//! The real object is built the first time the stand-in is forced and the
//! result is kept for every later use.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::error::Result;
use crate::value::Value;

/// Builds the real value of a lazy stand-in.
pub type Thunk = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

/// Produces stand-ins for lazy object definitions.
pub trait LazyProxyFactory: Send + Sync {
    fn create_proxy(&self, class_name: &str, thunk: Thunk) -> Result<Value>;
}

/// Wraps the deferred value in a [`LazyValue`] holder.
#[derive(Debug, Default, Clone, Copy)]
pub struct ValueHolderProxyFactory;

impl LazyProxyFactory for ValueHolderProxyFactory {
    fn create_proxy(&self, class_name: &str, thunk: Thunk) -> Result<Value> {
        trace!(class = %class_name, "Creating lazy stand-in");
        Ok(Value::Lazy(Arc::new(LazyValue::new(class_name, thunk))))
    }
}

/// A value built on first access.
///
/// The thunk runs outside the cell, so a thunk that forces the same
/// stand-in again is reported by the container as a circular dependency
/// instead of deadlocking. If two threads race, the first stored value
/// wins and both get it.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use diwan_container::proxy::LazyValue;
/// use diwan_container::value::Value;
///
/// let lazy = LazyValue::new("app::Report", Arc::new(|| Ok(Value::from("built"))));
/// assert!(!lazy.is_initialized());
/// assert_eq!(lazy.get().unwrap(), Value::from("built"));
/// assert!(lazy.is_initialized());
/// ```
pub struct LazyValue {
    class_name: String,
    cell: OnceCell<Value>,
    thunk: Thunk,
}

impl LazyValue {
    pub fn new(class_name: impl Into<String>, thunk: Thunk) -> Self {
        Self {
            class_name: class_name.into(),
            cell: OnceCell::new(),
            thunk,
        }
    }

    /// Class of the deferred object.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Builds the value if needed and returns it.
    pub fn get(&self) -> Result<Value> {
        if let Some(value) = self.cell.get() {
            return Ok(value.clone());
        }
        trace!(class = %self.class_name, "Initializing lazy stand-in");
        let value = (self.thunk)()?;
        match self.cell.try_insert(value) {
            Ok(stored) => Ok(stored.clone()),
            Err((stored, _)) => Ok(stored.clone()),
        }
    }

    /// The value, if it was already built.
    pub fn peek(&self) -> Option<&Value> {
        self.cell.get()
    }
}

impl fmt::Debug for LazyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => write!(f, "lazy {}({value:?})", self.class_name),
            None => write!(f, "lazy {}(<uninitialized>)", self.class_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn thunk_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let lazy = LazyValue::new("Report", {
            let calls = calls.clone();
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from(42))
            })
        });

        assert!(lazy.peek().is_none());
        assert_eq!(lazy.get().unwrap(), Value::from(42));
        assert_eq!(lazy.get().unwrap(), Value::from(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_initialization_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let lazy = LazyValue::new("Report", {
            let calls = calls.clone();
            Arc::new(move || {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(crate::error::DiError::invalid("report", "not yet"))
                } else {
                    Ok(Value::Null)
                }
            })
        });

        assert!(lazy.get().is_err());
        assert!(!lazy.is_initialized());
        assert_eq!(lazy.get().unwrap(), Value::Null);
    }

    #[test]
    fn factory_produces_uninitialized_stand_in() {
        let proxy = ValueHolderProxyFactory
            .create_proxy("Report", Arc::new(|| Ok(Value::from("ok"))))
            .unwrap();
        match &proxy {
            Value::Lazy(lazy) => {
                assert_eq!(lazy.class_name(), "Report");
                assert!(!lazy.is_initialized());
            }
            other => panic!("Expected lazy value, got: {other:?}"),
        }
        assert_eq!(proxy.resolve_lazy().unwrap(), Value::from("ok"));
        assert!(format!("{proxy:?}").contains("\"ok\""));
    }
}
