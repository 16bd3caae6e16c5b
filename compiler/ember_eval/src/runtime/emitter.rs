//! `EventEmitter`.
//!
//! Listeners live in a lock-protected registry. `emit` copies the listener
//! list for the event, releases the lock and then invokes each listener, so
//! a listener may add or remove listeners (on this or any emitter) without
//! deadlocking. Once-listeners from that copy are removed afterwards by id.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::errors::Signal;
use crate::interpreter::Invoker;
use crate::value::Value;

#[derive(Clone)]
struct Listener {
    id: u64,
    callback: Value,
    once: bool,
}

#[derive(Default)]
pub struct EventEmitter {
    listeners: RwLock<FxHashMap<String, Vec<Listener>>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&self, event: &str, callback: Value, once: bool) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .write()
            .entry(event.to_owned())
            .or_default()
            .push(Listener { id, callback, once });
    }

    pub fn on(&self, event: &str, callback: Value) {
        self.add(event, callback, false);
    }

    pub fn once(&self, event: &str, callback: Value) {
        self.add(event, callback, true);
    }

    /// Remove the first listener for `event` whose callback is `callback`
    /// (by identity).
    pub fn off(&self, event: &str, callback: &Value) -> bool {
        let mut listeners = self.listeners.write();
        let Some(list) = listeners.get_mut(event) else {
            return false;
        };
        let Some(pos) = list.iter().position(|l| &l.callback == callback) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            listeners.remove(event);
        }
        true
    }

    /// Clear listeners for `event`, or for every event.
    pub fn remove_all(&self, event: Option<&str>) {
        let mut listeners = self.listeners.write();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.read().get(event).map_or(0, Vec::len)
    }

    /// Events with at least one listener, sorted.
    pub fn event_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .listeners
            .read()
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Invoke every listener for `event` in registration order. Returns
    /// whether any listener was registered. A listener that throws stops
    /// the dispatch and the error propagates to the emitter's caller.
    pub fn emit(
        &self,
        invoker: &impl Invoker,
        event: &str,
        args: &[Value],
    ) -> Result<bool, Signal> {
        let snapshot = match self.listeners.read().get(event) {
            Some(list) if !list.is_empty() => list.clone(),
            _ => return Ok(false),
        };
        trace!(event, listeners = snapshot.len(), "emit");
        let mut outcome = Ok(true);
        for listener in &snapshot {
            if let Err(signal) = invoker.invoke(&listener.callback, args.to_vec()) {
                outcome = Err(signal);
                break;
            }
        }
        let fired_once: Vec<u64> = snapshot.iter().filter(|l| l.once).map(|l| l.id).collect();
        if !fired_once.is_empty() {
            let mut listeners = self.listeners.write();
            if let Some(list) = listeners.get_mut(event) {
                list.retain(|l| !fired_once.contains(&l.id));
                if list.is_empty() {
                    listeners.remove(event);
                }
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::sync::Arc;

    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::errors::EvalResult;
    use crate::value::BuiltinValue;

    /// Records every invocation as `(callee name, args)`.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, Vec<Value>)>>,
    }

    impl Invoker for Recorder {
        fn invoke(&self, callee: &Value, args: Vec<Value>) -> EvalResult {
            let Value::Builtin(b) = callee else {
                panic!("test listeners are builtins");
            };
            self.calls.lock().push((b.name.to_string(), args));
            if &*b.name == "thrower" {
                return Err(Signal::Throw(Value::from("listener failed")));
            }
            Ok(Value::Null)
        }
    }

    fn listener(name: &str) -> Value {
        fn noop(_: &crate::Interpreter, _: Vec<Value>) -> EvalResult {
            Ok(Value::Null)
        }
        Value::Builtin(Arc::new(BuiltinValue::new(name, noop)))
    }

    fn names(recorder: &Recorder) -> Vec<String> {
        recorder.calls.lock().iter().map(|(n, _)| n.clone()).collect()
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let emitter = EventEmitter::new();
        let recorder = Recorder::default();
        emitter.on("data", listener("first"));
        emitter.on("data", listener("second"));
        assert!(emitter.emit(&recorder, "data", &[Value::Number(1.0)]).unwrap());
        assert_eq!(names(&recorder), vec!["first", "second"]);
        assert_eq!(recorder.calls.lock()[0].1, vec![Value::Number(1.0)]);
    }

    #[test]
    fn emitting_without_listeners_is_not_an_error() {
        let emitter = EventEmitter::new();
        assert!(!emitter.emit(&Recorder::default(), "nothing", &[]).unwrap());
    }

    #[test]
    fn once_listener_fires_exactly_once() {
        let emitter = EventEmitter::new();
        let recorder = Recorder::default();
        emitter.once("tick", listener("once"));
        emitter.on("tick", listener("always"));
        for _ in 0..3 {
            emitter.emit(&recorder, "tick", &[]).unwrap();
        }
        assert_eq!(names(&recorder), vec!["once", "always", "always", "always"]);
        assert_eq!(emitter.listener_count("tick"), 1);
    }

    #[test]
    fn off_removes_by_identity_first_match() {
        let emitter = EventEmitter::new();
        let cb = listener("cb");
        emitter.on("e", cb.clone());
        emitter.on("e", cb.clone());
        emitter.on("e", listener("cb"));
        assert!(emitter.off("e", &cb));
        assert_eq!(emitter.listener_count("e"), 2);
        assert!(emitter.off("e", &cb));
        assert!(!emitter.off("e", &cb));
        assert_eq!(emitter.listener_count("e"), 1);
    }

    #[test]
    fn remove_all_with_and_without_name() {
        let emitter = EventEmitter::new();
        emitter.on("a", listener("x"));
        emitter.on("b", listener("y"));
        assert_eq!(emitter.event_names(), vec!["a", "b"]);
        emitter.remove_all(Some("a"));
        assert_eq!(emitter.event_names(), vec!["b"]);
        emitter.remove_all(None);
        assert!(emitter.event_names().is_empty());
    }

    #[test]
    fn throwing_listener_stops_dispatch_but_once_listeners_are_consumed() {
        let emitter = EventEmitter::new();
        let recorder = Recorder::default();
        emitter.once("e", listener("thrower"));
        emitter.on("e", listener("after"));
        assert!(emitter.emit(&recorder, "e", &[]).is_err());
        assert_eq!(names(&recorder), vec!["thrower"]);
        assert_eq!(emitter.listener_count("e"), 1);
    }
}
