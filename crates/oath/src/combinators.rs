//! Combinators
//!
//! `resolved`, `rejected`, `all`, and `race`, built purely on the public
//! executor/`then` contract; none of them touch promise internals.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::promise::{Promise, handler};
use crate::scheduler::Scheduler;
use crate::value::Value;

impl Promise {
    /// An immediately resolving promise. A promise input is returned
    /// unchanged; a thenable input is adopted.
    pub fn resolved(scheduler: &Scheduler, value: Value) -> Promise {
        match value {
            Value::Promise(p) => p,
            other => Promise::new(scheduler, move |resolver| {
                resolver.resolve(other);
                Ok(())
            }),
        }
    }

    /// An immediately rejecting promise. Reasons are never adopted.
    pub fn rejected(scheduler: &Scheduler, reason: Value) -> Promise {
        Promise::new(scheduler, move |resolver| {
            resolver.reject(reason);
            Ok(())
        })
    }

    /// Fulfills with every input's result in input order, or rejects with
    /// the first rejection's reason. Inputs that settle after that first
    /// rejection still run to completion but no longer affect the outcome.
    /// Empty input fulfills with an empty list.
    pub fn all<I>(scheduler: &Scheduler, items: I) -> Promise
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        let sched = scheduler.clone();
        Promise::new(scheduler, move |resolver| {
            if items.is_empty() {
                resolver.resolve(Value::List(Vec::new()));
                return Ok(());
            }

            let results = Arc::new(Mutex::new(vec![None::<Value>; items.len()]));
            let remaining = Arc::new(AtomicUsize::new(items.len()));

            for (index, item) in items.into_iter().enumerate() {
                let results = results.clone();
                let remaining = remaining.clone();
                let on_fulfilled = resolver.clone();
                let on_rejected = resolver.clone();

                Promise::resolved(&sched, item).then(
                    Some(handler(move |value| {
                        results.lock().unwrap()[index] = Some(value);
                        if remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
                            let collected: Vec<Value> = results
                                .lock()
                                .unwrap()
                                .iter_mut()
                                .map(|slot| slot.take().unwrap_or(Value::Undefined))
                                .collect();
                            on_fulfilled.resolve(Value::List(collected));
                        }
                        Ok(Value::Undefined)
                    })),
                    Some(handler(move |reason| {
                        on_rejected.reject(reason);
                        Ok(Value::Undefined)
                    })),
                );
            }
            Ok(())
        })
    }

    /// Settles with the first input to settle, either way; later
    /// settlements are observed but discarded.
    pub fn race<I>(scheduler: &Scheduler, items: I) -> Promise
    where
        I: IntoIterator<Item = Value>,
    {
        let items: Vec<Value> = items.into_iter().collect();
        let sched = scheduler.clone();
        Promise::new(scheduler, move |resolver| {
            for item in items {
                let win = resolver.clone();
                let lose = resolver.clone();

                Promise::resolved(&sched, item).then(
                    Some(handler(move |value| {
                        win.resolve(value);
                        Ok(Value::Undefined)
                    })),
                    Some(handler(move |reason| {
                        lose.reject(reason);
                        Ok(Value::Undefined)
                    })),
                );
            }
            Ok(())
        })
    }
}
