//! Thenable Capability
//!
//! Anything exposing `then` is an adoptable async source, regardless of its
//! concrete type. The resolution engine treats implementors uniformly.

use crate::value::Value;

/// Callback handed to a thenable; settles the adopting promise.
pub type SettleFn = Box<dyn FnOnce(Value) + Send>;

/// An adoptable async source.
///
/// Implementors are untrusted: the adopting promise guards against both
/// callbacks firing. Returning `Err` is the analogue of `then` itself
/// throwing and rejects the adopting promise unless a callback already ran.
pub trait Thenable: Send + Sync {
    fn then(&self, on_fulfilled: SettleFn, on_rejected: SettleFn) -> Result<(), Value>;
}

/// Does this value expose an adoptable `then` capability?
pub fn is_thenable(value: &Value) -> bool {
    matches!(value, Value::Promise(_) | Value::Thenable(_))
}
