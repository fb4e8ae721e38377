//! Oath Deferred-Value Primitive
//!
//! Promises/A+ style promise: a container that starts empty, settles
//! exactly once, and runs registered continuations exactly once,
//! asynchronously, in registration order.
//!
//! Features:
//! - Settlement state machine with first-settlement-wins semantics
//! - Thenable adoption with cycle and double-settle guards
//! - `then`/`catch` continuation chaining
//! - `all`/`race` combinators built on the public contract
//! - Deferred-invocation scheduler standing in for the host microtask queue

mod combinators;
mod error;
mod global;
mod promise;
mod scheduler;
mod thenable;
mod value;

pub use error::PromiseError;
pub use global::{default_scheduler, install, set_default_scheduler, uninstall};
pub use promise::{Deferred, Handler, Promise, Resolver, State, handler};
pub use scheduler::{Job, Scheduler};
pub use thenable::{SettleFn, Thenable, is_thenable};
pub use value::Value;
