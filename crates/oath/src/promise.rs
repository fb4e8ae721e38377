//! Promise Core
//!
//! Settlement state machine, resolution engine (thenable adoption), and the
//! continuation chain (`then`/`catch`).

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::PromiseError;
use crate::scheduler::Scheduler;
use crate::thenable::{SettleFn, Thenable};
use crate::value::Value;

/// Settlement state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Pending,
    /// Resolution claimed; blocks re-entrant settlement until the deferred
    /// terminal transition runs.
    Fulfilling,
    /// Rejection claimed; same transient role as `Fulfilling`.
    Rejecting,
    Fulfilled,
    Rejected,
}

impl State {
    pub fn is_terminal(self) -> bool {
        matches!(self, State::Fulfilled | State::Rejected)
    }
}

/// A continuation handler. Returning `Err` rejects the child promise, the
/// analogue of a thrown exception.
pub type Handler = Box<dyn FnOnce(Value) -> Result<Value, Value> + Send>;

/// Box a closure as a continuation handler.
pub fn handler<F>(f: F) -> Handler
where
    F: FnOnce(Value) -> Result<Value, Value> + Send + 'static,
{
    Box::new(f)
}

/// Terminal outcome handed to continuations during a flush
#[derive(Clone)]
enum Settled {
    Fulfilled(Value),
    Rejected(Value),
}

struct Continuation {
    on_fulfilled: Option<Handler>,
    on_rejected: Option<Handler>,
    child: Promise,
}

impl Continuation {
    fn run(self, settled: Settled) {
        match settled {
            Settled::Fulfilled(value) => match self.on_fulfilled {
                Some(f) => match f(value) {
                    Ok(out) => self.child.resolve(out),
                    Err(reason) => self.child.reject(reason),
                },
                None => self.child.resolve(value),
            },
            Settled::Rejected(reason) => match self.on_rejected {
                Some(f) => match f(reason) {
                    // A caught rejection becomes a fulfillment.
                    Ok(out) => self.child.resolve(out),
                    Err(reason) => self.child.reject(reason),
                },
                None => self.child.reject(reason),
            },
        }
    }
}

struct Inner {
    state: State,
    outcome: Option<Value>,
    subscribers: Vec<Continuation>,
}

/// Deferred value with Promises/A+ resolution semantics
#[derive(Clone)]
pub struct Promise {
    inner: Arc<Mutex<Inner>>,
    scheduler: Scheduler,
}

impl Promise {
    pub(crate) fn pending(scheduler: &Scheduler) -> Promise {
        Promise {
            inner: Arc::new(Mutex::new(Inner {
                state: State::Pending,
                outcome: None,
                subscribers: Vec::new(),
            })),
            scheduler: scheduler.clone(),
        }
    }

    /// Create a promise and run `executor` synchronously. An `Err` return
    /// rejects the promise; first settlement wins either way.
    pub fn new<F>(scheduler: &Scheduler, executor: F) -> Promise
    where
        F: FnOnce(Resolver) -> Result<(), Value>,
    {
        let promise = Promise::pending(scheduler);
        let resolver = Resolver {
            promise: promise.clone(),
        };
        if let Err(reason) = executor(resolver) {
            promise.reject(reason);
        }
        promise
    }

    pub fn state(&self) -> State {
        self.inner.lock().unwrap().state
    }

    /// Fulfillment value, if fulfilled
    pub fn value(&self) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        match inner.state {
            State::Fulfilled => inner.outcome.clone(),
            _ => None,
        }
    }

    /// Rejection reason, if rejected
    pub fn reason(&self) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        match inner.state {
            State::Rejected => inner.outcome.clone(),
            _ => None,
        }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub(crate) fn same_instance(&self, other: &Promise) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Register continuation handlers; returns the child promise whose
    /// settlement depends on the handler outcome. Handlers never run
    /// synchronously within this call, settled parent or not.
    pub fn then(&self, on_fulfilled: Option<Handler>, on_rejected: Option<Handler>) -> Promise {
        let child = Promise::pending(&self.scheduler);
        let settled = {
            let mut inner = self.inner.lock().unwrap();
            inner.subscribers.push(Continuation {
                on_fulfilled,
                on_rejected,
                child: child.clone(),
            });
            inner.state.is_terminal()
        };
        if settled {
            let target = self.clone();
            self.scheduler.defer(move || target.flush());
        }
        child
    }

    /// `then` with only a failure handler
    pub fn catch(&self, on_rejected: Handler) -> Promise {
        self.then(None, Some(on_rejected))
    }

    /// First resolve-or-reject wins; later calls are no-ops.
    pub(crate) fn resolve(&self, value: Value) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != State::Pending {
                return;
            }
            inner.state = State::Fulfilling;
        }
        self.resolve_value(value);
    }

    pub(crate) fn reject(&self, reason: Value) {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.state != State::Pending {
                return;
            }
            inner.state = State::Rejecting;
        }
        // Reasons are stored verbatim, thenable or not.
        self.finalize(State::Rejected, reason);
    }

    /// Resolution algorithm. The caller holds the `Fulfilling` claim; no
    /// lock is held here so adoption may call back into this promise.
    fn resolve_value(&self, value: Value) {
        match value {
            Value::Promise(p) if self.same_instance(&p) => {
                self.finalize(State::Rejected, PromiseError::SelfResolution.into());
            }
            Value::Promise(p) => self.adopt(Arc::new(p)),
            Value::Thenable(t) => self.adopt(t),
            plain => self.finalize(State::Fulfilled, plain),
        }
    }

    /// Adopt a thenable's eventual outcome. Only the first inner callback
    /// to fire has effect, and a failure from `then` itself is ignored once
    /// a callback has fired.
    fn adopt(&self, thenable: Arc<dyn Thenable>) {
        let fired = Arc::new(AtomicBool::new(false));

        let target = self.clone();
        let guard = fired.clone();
        let on_fulfilled: SettleFn = Box::new(move |value| {
            if !guard.swap(true, Ordering::SeqCst) {
                // Recursive adoption: the inner value may itself be thenable.
                target.resolve_value(value);
            }
        });

        let target = self.clone();
        let guard = fired.clone();
        let on_rejected: SettleFn = Box::new(move |reason| {
            if !guard.swap(true, Ordering::SeqCst) {
                target.finalize(State::Rejected, reason);
            }
        });

        if let Err(reason) = thenable.then(on_fulfilled, on_rejected) {
            if !fired.swap(true, Ordering::SeqCst) {
                self.finalize(State::Rejected, reason);
            }
        }
    }

    /// Defer the terminal transition plus the flush of subscribers present
    /// at that moment.
    fn finalize(&self, terminal: State, outcome: Value) {
        debug_assert!(terminal.is_terminal());
        let target = self.clone();
        self.scheduler
            .defer(move || target.settle_now(terminal, outcome));
    }

    fn settle_now(&self, terminal: State, outcome: Value) {
        let batch = {
            let mut inner = self.inner.lock().unwrap();
            if inner.state.is_terminal() {
                return;
            }
            inner.state = terminal;
            inner.outcome = Some(outcome.clone());
            std::mem::take(&mut inner.subscribers)
        };
        tracing::trace!(state = ?terminal, subscribers = batch.len(), "promise settled");
        let settled = match terminal {
            State::Rejected => Settled::Rejected(outcome),
            _ => Settled::Fulfilled(outcome),
        };
        for continuation in batch {
            continuation.run(settled.clone());
        }
    }

    /// Flush subscribers registered after settlement; each batch is taken
    /// atomically, so anything added while running goes to a later pass.
    fn flush(&self) {
        let (settled, batch) = {
            let mut inner = self.inner.lock().unwrap();
            let settled = match (inner.state, inner.outcome.clone()) {
                (State::Fulfilled, Some(value)) => Settled::Fulfilled(value),
                (State::Rejected, Some(reason)) => Settled::Rejected(reason),
                _ => return,
            };
            if inner.subscribers.is_empty() {
                return;
            }
            (settled, std::mem::take(&mut inner.subscribers))
        };
        for continuation in batch {
            continuation.run(settled.clone());
        }
    }
}

impl fmt::Debug for Promise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock().unwrap();
        f.debug_struct("Promise")
            .field("state", &inner.state)
            .field("outcome", &inner.outcome)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl Thenable for Promise {
    fn then(&self, on_fulfilled: SettleFn, on_rejected: SettleFn) -> Result<(), Value> {
        Promise::then(
            self,
            Some(Box::new(move |value| {
                on_fulfilled(value);
                Ok(Value::Undefined)
            })),
            Some(Box::new(move |reason| {
                on_rejected(reason);
                Ok(Value::Undefined)
            })),
        );
        Ok(())
    }
}

/// Settle handle passed to the executor
#[derive(Clone)]
pub struct Resolver {
    promise: Promise,
}

impl Resolver {
    pub fn resolve(&self, value: Value) {
        self.promise.resolve(value);
    }

    pub fn reject(&self, reason: Value) {
        self.promise.reject(reason);
    }
}

/// A pending promise paired with its resolver, for producers that settle a
/// promise they hand out.
pub struct Deferred {
    pub promise: Promise,
    pub resolver: Resolver,
}

impl Deferred {
    pub fn new(scheduler: &Scheduler) -> Deferred {
        let promise = Promise::pending(scheduler);
        let resolver = Resolver {
            promise: promise.clone(),
        };
        Deferred { promise, resolver }
    }
}
