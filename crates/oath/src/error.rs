//! Promise errors

/// Errors the resolution engine can reject with on its own
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PromiseError {
    #[error("chaining cycle detected: a promise cannot be resolved with itself")]
    SelfResolution,
}
