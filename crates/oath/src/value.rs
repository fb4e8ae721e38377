//! Settlement Payload
//!
//! Dynamic value a promise fulfills or rejects with.

use std::fmt;
use std::sync::Arc;

use crate::error::PromiseError;
use crate::promise::Promise;
use crate::thenable::Thenable;

/// Value carried by a settled promise
#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<Value>),
    Error(PromiseError),
    /// A promise; adopted during resolution, stored verbatim as a reason.
    Promise(Promise),
    /// Any other adoptable async source.
    Thenable(Arc<dyn Thenable>),
}

impl Default for Value {
    fn default() -> Self {
        Self::Undefined
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("Undefined"),
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Value::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(e).finish(),
            // Shallow on purpose: a reason may reference the promise that
            // holds it, and printing through would re-enter its lock.
            Value::Promise(_) => f.write_str("Promise"),
            Value::Thenable(_) => f.write_str("Thenable"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            // Identity, not structure: two promises are equal only when
            // they are the same instance.
            (Value::Promise(a), Value::Promise(b)) => a.same_instance(b),
            (Value::Thenable(a), Value::Thenable(b)) => {
                Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<PromiseError> for Value {
    fn from(e: PromiseError) -> Self {
        Value::Error(e)
    }
}

impl From<Promise> for Value {
    fn from(p: Promise) -> Self {
        Value::Promise(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Scheduler;

    #[test]
    fn test_scalar_equality() {
        assert_eq!(Value::from(1.5), Value::Number(1.5));
        assert_eq!(Value::from("abc"), Value::Text("abc".into()));
        assert_ne!(Value::Undefined, Value::Null);
        assert_ne!(Value::from(false), Value::Null);
    }

    #[test]
    fn test_promise_equality_is_identity() {
        let scheduler = Scheduler::new();
        let a = Promise::resolved(&scheduler, Value::Undefined);
        let b = Promise::resolved(&scheduler, Value::Undefined);

        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn test_list_equality() {
        let a = Value::List(vec![Value::Number(1.0), Value::Null]);
        let b = Value::List(vec![Value::Number(1.0), Value::Null]);
        assert_eq!(a, b);
    }
}
