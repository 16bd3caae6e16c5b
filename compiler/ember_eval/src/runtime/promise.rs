//! Promises.
//!
//! A [`Promise`] is a one-shot cell: the first `resolve` or `reject` wins and
//! every later settlement is a no-op. Tasks that `await` block on the
//! promise's condvar; code that must run on settlement (`then` reactions,
//! adoption, combinators) subscribes a callback instead of parking a thread.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::{Condvar, Mutex};
use tracing::{trace, warn};

use crate::errors::{error_object, stray_control_flow, EvalResult, Signal};
use crate::interpreter::Interpreter;
use crate::value::Value;

static NEXT_PROMISE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug)]
pub enum PromiseState {
    Pending,
    Fulfilled(Value),
    Rejected(Value),
}

impl PromiseState {
    pub fn is_pending(&self) -> bool {
        matches!(self, PromiseState::Pending)
    }

    /// `"pending"`, `"fulfilled"` or `"rejected"`.
    pub fn label(&self) -> &'static str {
        match self {
            PromiseState::Pending => "pending",
            PromiseState::Fulfilled(_) => "fulfilled",
            PromiseState::Rejected(_) => "rejected",
        }
    }

    fn into_outcome(self) -> Option<Result<Value, Value>> {
        match self {
            PromiseState::Pending => None,
            PromiseState::Fulfilled(v) => Some(Ok(v)),
            PromiseState::Rejected(r) => Some(Err(r)),
        }
    }
}

type Reaction = Box<dyn FnOnce(&PromiseState) + Send>;

struct Inner {
    state: PromiseState,
    /// Set once the promise has been resolved with another promise; only
    /// that promise's settlement may settle this one afterwards.
    adopting: bool,
    reactions: Vec<Reaction>,
}

pub struct Promise {
    id: u64,
    inner: Mutex<Inner>,
    settled: Condvar,
}

impl Promise {
    pub fn new() -> Self {
        Promise {
            id: NEXT_PROMISE_ID.fetch_add(1, Ordering::Relaxed),
            inner: Mutex::new(Inner {
                state: PromiseState::Pending,
                adopting: false,
                reactions: Vec::new(),
            }),
            settled: Condvar::new(),
        }
    }

    pub fn fulfilled(value: Value) -> Self {
        let promise = Promise::new();
        promise.settle(PromiseState::Fulfilled(value), false);
        promise
    }

    pub fn rejected(reason: Value) -> Self {
        let promise = Promise::new();
        promise.settle(PromiseState::Rejected(reason), false);
        promise
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> PromiseState {
        self.inner.lock().state.clone()
    }

    /// Fulfil with `value`, or adopt its eventual state if it is a promise.
    /// Returns `false` if this promise was already settled or adopting.
    pub fn resolve(self: &Arc<Self>, value: Value) -> bool {
        let other = match value {
            Value::Promise(other) => other,
            value => return self.settle(PromiseState::Fulfilled(value), false),
        };
        if Arc::ptr_eq(self, &other) {
            return self.reject(error_object(
                "TypeError",
                "promise cannot be resolved with itself",
                "",
            ));
        }
        {
            let mut inner = self.inner.lock();
            if !inner.state.is_pending() || inner.adopting {
                return false;
            }
            inner.adopting = true;
        }
        trace!(promise = self.id, adopted = other.id, "adopting promise");
        let this = Arc::clone(self);
        other.subscribe(move |state| {
            this.settle(state.clone(), true);
        });
        true
    }

    pub fn reject(&self, reason: Value) -> bool {
        self.settle(PromiseState::Rejected(reason), false)
    }

    /// Settle from an evaluation result: a value fulfils, a throw or engine
    /// error rejects with the thrown value or error object.
    pub(crate) fn settle_result(self: &Arc<Self>, result: EvalResult) {
        match result {
            Ok(value) | Err(Signal::Return(value)) => {
                self.resolve(value);
            }
            Err(Signal::Break) => {
                self.reject(stray_control_flow("break").to_value());
            }
            Err(Signal::Continue) => {
                self.reject(stray_control_flow("continue").to_value());
            }
            Err(Signal::Error(err)) => {
                self.reject(err.to_value());
            }
            Err(Signal::Throw(value)) => {
                self.reject(value);
            }
        }
    }

    fn settle(&self, state: PromiseState, from_adoption: bool) -> bool {
        let reactions = {
            let mut inner = self.inner.lock();
            if !inner.state.is_pending() || (inner.adopting && !from_adoption) {
                return false;
            }
            inner.state = state.clone();
            std::mem::take(&mut inner.reactions)
        };
        trace!(promise = self.id, state = state.label(), "promise settled");
        self.settled.notify_all();
        for reaction in reactions {
            reaction(&state);
        }
        true
    }

    /// Run `reaction` once this promise settles; immediately, on the calling
    /// thread, if it already has.
    pub fn subscribe(&self, reaction: impl FnOnce(&PromiseState) + Send + 'static) {
        let state = {
            let mut inner = self.inner.lock();
            if inner.state.is_pending() {
                inner.reactions.push(Box::new(reaction));
                return;
            }
            inner.state.clone()
        };
        reaction(&state);
    }

    /// Block the calling thread until settled. `Ok` is the fulfilment
    /// value, `Err` the rejection reason.
    pub fn wait(&self) -> Result<Value, Value> {
        let mut inner = self.inner.lock();
        loop {
            if let Some(outcome) = inner.state.clone().into_outcome() {
                return outcome;
            }
            self.settled.wait(&mut inner);
        }
    }
}

impl Default for Promise {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn `body` as a task; if the task cannot start, reject `promise`.
fn spawn_settling(
    interp: &Interpreter,
    kind: &'static str,
    promise: &Arc<Promise>,
    body: impl FnOnce(Interpreter) + Send + 'static,
) {
    if let Err(err) = interp.spawn_task(kind, body) {
        warn!(error = %err, "could not spawn promise task");
        promise.reject(err.to_value());
    }
}

/// `p.then(on_fulfilled, on_rejected)`: a derived promise settled by a
/// reaction task once `source` settles. A missing handler passes the
/// outcome through.
pub(crate) fn then(
    interp: &Interpreter,
    source: &Promise,
    on_fulfilled: Option<Value>,
    on_rejected: Option<Value>,
) -> Arc<Promise> {
    let derived = Arc::new(Promise::new());
    let settle = Arc::clone(&derived);
    let interp = interp.clone();
    source.subscribe(move |state| {
        let state = state.clone();
        let target = Arc::clone(&settle);
        spawn_settling(&interp, "then", &settle, move |interp| {
            let result = match state {
                PromiseState::Fulfilled(value) => match on_fulfilled {
                    Some(callback) => interp.invoke(&callback, vec![value]),
                    None => Ok(value),
                },
                PromiseState::Rejected(reason) => match on_rejected {
                    Some(callback) => interp.invoke(&callback, vec![reason]),
                    None => Err(Signal::Throw(reason)),
                },
                PromiseState::Pending => return,
            };
            target.settle_result(result);
        });
    });
    derived
}

/// `p.finally(callback)`: runs `callback` with no arguments, then settles
/// like `source` unless the callback itself throws.
pub(crate) fn finally(interp: &Interpreter, source: &Promise, callback: Value) -> Arc<Promise> {
    let derived = Arc::new(Promise::new());
    let settle = Arc::clone(&derived);
    let interp = interp.clone();
    source.subscribe(move |state| {
        let state = state.clone();
        let target = Arc::clone(&settle);
        spawn_settling(&interp, "finally", &settle, move |interp| {
            if let Err(signal) = interp.invoke(&callback, Vec::new()) {
                target.settle_result(Err(signal));
                return;
            }
            match state {
                PromiseState::Fulfilled(value) => {
                    target.resolve(value);
                }
                PromiseState::Rejected(reason) => {
                    target.reject(reason);
                }
                PromiseState::Pending => {}
            }
        });
    });
    derived
}

/// Wait for every input concurrently, one waiter thread per pending
/// promise; outcomes come back in input order. Non-promise inputs count as
/// already fulfilled.
fn wait_all(items: &[Value]) -> Vec<Result<Value, Value>> {
    thread::scope(|scope| {
        let waiters: Vec<_> = items
            .iter()
            .map(|item| match item {
                Value::Promise(p) if p.state().is_pending() => {
                    let p = Arc::clone(p);
                    Some(scope.spawn(move || p.wait()))
                }
                _ => None,
            })
            .collect();
        items
            .iter()
            .zip(waiters)
            .map(|(item, waiter)| match (item, waiter) {
                (_, Some(handle)) => handle.join().unwrap_or_else(|_| {
                    Err(error_object("Error", "promise waiter panicked", ""))
                }),
                (Value::Promise(p), None) => p.wait(),
                (other, None) => Ok(other.clone()),
            })
            .collect()
    })
}

/// `Promise.all`: fulfils with every value in input order, or rejects with
/// the first rejection by index.
pub(crate) fn all(interp: &Interpreter, items: Vec<Value>) -> Arc<Promise> {
    let combined = Arc::new(Promise::new());
    let settle = Arc::clone(&combined);
    spawn_settling(interp, "promise-all", &combined, move |_| {
        let outcomes = wait_all(&items);
        let mut values = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            match outcome {
                Ok(value) => values.push(value),
                Err(reason) => {
                    settle.reject(reason);
                    return;
                }
            }
        }
        settle.resolve(Value::array(values));
    });
    combined
}

/// `Promise.allSettled`: `{status, value}` / `{status, reason}` maps in
/// input order; never rejects.
pub(crate) fn all_settled(interp: &Interpreter, items: Vec<Value>) -> Arc<Promise> {
    let combined = Arc::new(Promise::new());
    let settle = Arc::clone(&combined);
    spawn_settling(interp, "promise-all-settled", &combined, move |_| {
        let results = wait_all(&items)
            .into_iter()
            .map(|outcome| match outcome {
                Ok(value) => Value::map_from([
                    ("status", Value::from("fulfilled")),
                    ("value", value),
                ]),
                Err(reason) => Value::map_from([
                    ("status", Value::from("rejected")),
                    ("reason", reason),
                ]),
            })
            .collect();
        settle.resolve(Value::array(results));
    });
    combined
}

/// `Promise.race`: settles like whichever input settles first.
pub(crate) fn race(items: Vec<Value>) -> Arc<Promise> {
    let combined = Arc::new(Promise::new());
    for item in items {
        match item {
            Value::Promise(p) => {
                let settle = Arc::clone(&combined);
                p.subscribe(move |state| match state {
                    PromiseState::Fulfilled(value) => {
                        settle.resolve(value.clone());
                    }
                    PromiseState::Rejected(reason) => {
                        settle.reject(reason.clone());
                    }
                    PromiseState::Pending => {}
                });
            }
            value => {
                combined.resolve(value);
            }
        }
    }
    combined
}

/// `await value`: the fulfilment value, or the rejection rethrown in the
/// calling task. Non-promises pass through.
pub(crate) fn await_value(value: Value) -> EvalResult {
    match value {
        Value::Promise(p) => p.wait().map_err(Signal::Throw),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn first_settlement_wins() {
        let p = Arc::new(Promise::new());
        assert!(p.resolve(Value::Number(1.0)));
        assert!(!p.resolve(Value::Number(2.0)));
        assert!(!p.reject(Value::from("late")));
        assert_eq!(p.wait(), Ok(Value::Number(1.0)));
    }

    #[test]
    fn wait_blocks_until_settled_from_another_thread() {
        let p = Arc::new(Promise::new());
        let settler = Arc::clone(&p);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            settler.reject(Value::from("boom"));
        });
        assert_eq!(p.wait(), Err(Value::from("boom")));
        handle.join().unwrap();
    }

    #[test]
    fn subscribe_after_settlement_runs_immediately() {
        let p = Promise::fulfilled(Value::Bool(true));
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        p.subscribe(move |state| {
            assert!(matches!(state, PromiseState::Fulfilled(Value::Bool(true))));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn resolving_with_a_promise_adopts_its_state() {
        let inner = Arc::new(Promise::new());
        let outer = Arc::new(Promise::new());
        assert!(outer.resolve(Value::Promise(Arc::clone(&inner))));
        assert!(outer.state().is_pending());
        assert!(!outer.resolve(Value::Number(9.0)));
        inner.reject(Value::from("inner failed"));
        assert_eq!(outer.wait(), Err(Value::from("inner failed")));
    }

    #[test]
    fn resolving_with_itself_rejects() {
        let p = Arc::new(Promise::new());
        p.resolve(Value::Promise(Arc::clone(&p)));
        let reason = p.wait().unwrap_err();
        let Value::Map(fields) = reason else {
            panic!("expected error object");
        };
        assert_eq!(fields.read().get("name"), Some(&Value::from("TypeError")));
    }

    #[test]
    fn race_takes_first_in_time() {
        let slow = Arc::new(Promise::new());
        let fast = Arc::new(Promise::new());
        let raced = race(vec![
            Value::Promise(Arc::clone(&slow)),
            Value::Promise(Arc::clone(&fast)),
        ]);
        fast.resolve(Value::from("fast"));
        slow.resolve(Value::from("slow"));
        assert_eq!(raced.wait(), Ok(Value::from("fast")));
    }

    #[test]
    fn wait_all_preserves_index_order() {
        let promises: Vec<Arc<Promise>> = (0..3).map(|_| Arc::new(Promise::new())).collect();
        let items: Vec<Value> = promises.iter().cloned().map(Value::Promise).collect();
        let settlers = promises.clone();
        let handle = thread::spawn(move || {
            for (i, p) in settlers.iter().enumerate().rev() {
                thread::sleep(Duration::from_millis(5));
                p.resolve(Value::from(i));
            }
        });
        let outcomes = wait_all(&items);
        handle.join().unwrap();
        assert_eq!(
            outcomes,
            vec![
                Ok(Value::Number(0.0)),
                Ok(Value::Number(1.0)),
                Ok(Value::Number(2.0)),
            ]
        );
    }

    #[test]
    fn await_passes_non_promises_through() {
        assert_eq!(await_value(Value::Number(3.0)).unwrap(), Value::Number(3.0));
    }
}
