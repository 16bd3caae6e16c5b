//! Workers.
//!
//! A worker runs a function body on its own task, in a fresh frame of the
//! environment the function closed over. Host and body talk over two
//! one-way crossbeam channels: `postMessage` on the host handle feeds the
//! inbound queue, and `postMessage` on the handle bound inside the body
//! feeds the outbound queue. Once the body returns, its task drains the
//! inbound queue into the body's `onMessage` handlers until the worker is
//! terminated. The host's `onMessage` handlers run on a dispatcher task
//! that drains the outbound queue until the body's task ends.
//!
//! Termination is cooperative: it clears the running flag and wakes the
//! task, but never interrupts a body that is still executing.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use ember_ir::Name;
use parking_lot::RwLock;
use tracing::{debug, trace};

use super::promise::Promise;
use crate::environment::Environment;
use crate::errors::{type_mismatch, EvalError};
use crate::interpreter::Interpreter;
use crate::value::Value;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

enum Mailbox {
    Message(Value),
    /// Wakes a blocked receiver and ends its loop.
    Close,
}

/// Which end of the worker a handle is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    /// The `Worker` value returned by `new Worker(..)`.
    Host,
    /// The `worker` value seen by the body.
    Body,
}

/// State shared by both ends.
struct Link {
    id: u64,
    running: AtomicBool,
    inbound_tx: Sender<Mailbox>,
    inbound_rx: Receiver<Mailbox>,
    outbound_tx: Sender<Mailbox>,
    outbound_rx: Receiver<Mailbox>,
    body_handlers: RwLock<Vec<Value>>,
    host_handlers: RwLock<Vec<Value>>,
    dispatching: AtomicBool,
    done: Arc<Promise>,
}

pub struct Worker {
    link: Arc<Link>,
    side: Side,
}

impl Worker {
    fn new() -> Self {
        let (inbound_tx, inbound_rx) = channel::unbounded();
        let (outbound_tx, outbound_rx) = channel::unbounded();
        Worker {
            link: Arc::new(Link {
                id: NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed),
                running: AtomicBool::new(true),
                inbound_tx,
                inbound_rx,
                outbound_tx,
                outbound_rx,
                body_handlers: RwLock::new(Vec::new()),
                host_handlers: RwLock::new(Vec::new()),
                dispatching: AtomicBool::new(false),
                done: Arc::new(Promise::new()),
            }),
            side: Side::Host,
        }
    }

    /// The handle bound inside the body.
    fn body_end(&self) -> Self {
        Worker {
            link: Arc::clone(&self.link),
            side: Side::Body,
        }
    }

    pub fn id(&self) -> u64 {
        self.link.id
    }

    pub fn is_running(&self) -> bool {
        self.link.running.load(Ordering::Acquire)
    }

    /// Send `message` to the other end. Returns `false` once the worker has
    /// stopped.
    pub fn post_message(&self, message: Value) -> bool {
        if !self.is_running() {
            return false;
        }
        let queue = match self.side {
            Side::Host => &self.link.inbound_tx,
            Side::Body => &self.link.outbound_tx,
        };
        queue.send(Mailbox::Message(message)).is_ok()
    }

    /// Register a handler for messages from the other end. The first host
    /// handler starts the dispatcher task.
    pub(crate) fn on_message(&self, interp: &Interpreter, handler: Value) -> Result<(), EvalError> {
        match self.side {
            Side::Body => self.link.body_handlers.write().push(handler),
            Side::Host => {
                self.link.host_handlers.write().push(handler);
                if !self.link.dispatching.swap(true, Ordering::AcqRel) {
                    let link = Arc::clone(&self.link);
                    let spawned =
                        interp.spawn_task("worker dispatch", move |interp| link.dispatch(&interp));
                    if let Err(err) = spawned {
                        self.link.dispatching.store(false, Ordering::Release);
                        return Err(err);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn terminate(&self) {
        if self.link.running.swap(false, Ordering::AcqRel) {
            debug!(worker = self.link.id, "worker terminated");
            let _ = self.link.inbound_tx.send(Mailbox::Close);
        }
    }

    /// Settled with the body's outcome once the worker's task ends.
    pub fn done(&self) -> Arc<Promise> {
        Arc::clone(&self.link.done)
    }
}

impl Link {
    /// Body side: deliver inbound messages until terminated.
    fn drain(&self, interp: &Interpreter) {
        while self.running.load(Ordering::Acquire) {
            match self.inbound_rx.recv() {
                Ok(Mailbox::Message(message)) => {
                    trace!(worker = self.id, "worker message in");
                    let handlers = self.body_handlers.read().clone();
                    deliver(interp, &handlers, &message, "worker message handler");
                }
                Ok(Mailbox::Close) | Err(_) => break,
            }
        }
    }

    /// Host side: deliver outbound messages until the body's task closes
    /// the queue.
    fn dispatch(&self, interp: &Interpreter) {
        loop {
            match self.outbound_rx.recv() {
                Ok(Mailbox::Message(message)) => {
                    trace!(worker = self.id, "worker message out");
                    let handlers = self.host_handlers.read().clone();
                    deliver(interp, &handlers, &message, "worker host handler");
                }
                Ok(Mailbox::Close) | Err(_) => break,
            }
        }
    }
}

fn deliver(interp: &Interpreter, handlers: &[Value], message: &Value, context: &str) {
    for handler in handlers {
        if let Err(signal) = interp.invoke(handler, vec![message.clone()]) {
            interp.report_background(signal, context);
        }
    }
}

/// `new Worker(body, data)`: start `body` on its own task.
///
/// The body sees `workerData` and `worker` in its own frame; its first
/// parameter (if any) receives `data` and its second the worker.
pub(crate) fn spawn(
    interp: &Interpreter,
    body: &Value,
    data: Value,
) -> Result<Arc<Worker>, EvalError> {
    let Value::Function(function) = body else {
        return Err(type_mismatch("FUNCTION", body.type_name()));
    };
    let function = Arc::clone(function);
    let worker = Arc::new(Worker::new());
    let inside = Arc::new(worker.body_end());
    interp.runtime().register_worker(&inside);

    let spawned = interp.spawn_task("worker", move |interp| {
        let link = Arc::clone(&inside.link);
        debug!(worker = link.id, "worker started");
        let env = Environment::new_enclosed(&function.env);
        let this_worker = Value::Worker(Arc::clone(&inside));
        env.define(Name::from("workerData"), data.clone());
        env.define(Name::from("worker"), this_worker.clone());
        let mut params = function.decl.params.iter().map(|p| Name::clone(&p.name));
        if let Some(name) = params.next() {
            env.define(name, data);
        }
        if let Some(name) = params.next() {
            env.define(name, this_worker);
        }

        let outcome = interp.exec_function_body(&function.decl.body, &env);
        if let Err(signal) = &outcome {
            interp.report_background(signal.clone(), "worker body");
        }
        if !link.body_handlers.read().is_empty() {
            link.drain(&interp);
        }
        link.running.store(false, Ordering::Release);
        let _ = link.outbound_tx.send(Mailbox::Close);
        link.done.settle_result(outcome);
        debug!(worker = link.id, "worker finished");
    });
    if let Err(err) = spawned {
        worker.link.running.store(false, Ordering::Release);
        return Err(err);
    }
    Ok(worker)
}
