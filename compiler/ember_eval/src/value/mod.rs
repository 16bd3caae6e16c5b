//! Runtime values.
//!
//! `Value` is a closed enum; every operation matches on the variant. Scalars
//! are stored inline, aggregates behind [`Shared`] (mutated in place, shared
//! by reference), callables and concurrency objects behind `Arc`.
//!
//! Signals (`return`, `break`, `throw`, ...) are not values:
//! they are the `Err` side of [`crate::EvalResult`].

mod callable;
mod collections;
mod display;
mod shared;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use rustc_hash::FxHashMap;

pub use callable::{BuiltinFn, BuiltinValue, ClassValue, FunctionValue, InstanceValue};
pub use collections::{HashKey, OrderedMap, OrderedSet};
pub use shared::Shared;

use crate::runtime::{EventEmitter, Promise, TimerHandle, Worker};

#[derive(Clone)]
pub enum Value {
    Number(f64),
    Str(Arc<str>),
    Bool(bool),
    Null,

    /// Ordered, mutable, shared sequence.
    Array(Shared<Vec<Value>>),
    /// String-keyed object; key order is not significant.
    Map(Shared<FxHashMap<String, Value>>),
    /// Insertion-ordered `Map` keyed by content.
    OrderedMap(Shared<OrderedMap>),
    /// Insertion-ordered `Set` keyed by content.
    Set(Shared<OrderedSet>),

    Function(Arc<FunctionValue>),
    Builtin(Arc<BuiltinValue>),
    Class(Arc<ClassValue>),
    Instance(Arc<InstanceValue>),

    Promise(Arc<Promise>),
    Emitter(Arc<EventEmitter>),
    Worker(Arc<Worker>),
    Timer(TimerHandle),
}

impl Value {
    // Factory methods

    pub fn string(s: impl Into<Arc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn array(items: Vec<Value>) -> Value {
        Value::Array(Shared::new(items))
    }

    pub fn map(fields: FxHashMap<String, Value>) -> Value {
        Value::Map(Shared::new(fields))
    }

    pub fn map_from<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::map(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn ordered_map(map: OrderedMap) -> Value {
        Value::OrderedMap(Shared::new(map))
    }

    pub fn set(set: OrderedSet) -> Value {
        Value::Set(Shared::new(set))
    }

    pub fn builtin(builtin: BuiltinValue) -> Value {
        Value::Builtin(Arc::new(builtin))
    }

    /// Upper-case kind name used in error messages and by `typeof`.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "NUMBER",
            Value::Str(_) => "STRING",
            Value::Bool(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Map(_) => "MAP",
            Value::OrderedMap(_) => "ES6MAP",
            Value::Set(_) => "SET",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::Class(_) => "CLASS",
            Value::Instance(_) => "INSTANCE",
            Value::Promise(_) => "PROMISE",
            Value::Emitter(_) => "EVENT_EMITTER",
            Value::Worker(_) => "WORKER",
            Value::Timer(_) => "TIMER",
        }
    }

    /// `0`, `""`, `null` and `false` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Builtin(_) | Value::Class(_)
        )
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Address of a mutable aggregate's storage.
    pub(crate) fn aggregate_addr(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.addr()),
            Value::Map(m) => Some(m.addr()),
            Value::OrderedMap(m) => Some(m.addr()),
            Value::Set(s) => Some(s.addr()),
            _ => None,
        }
    }

    /// Identity of a reference value; `0` for scalars.
    pub(crate) fn identity(&self) -> usize {
        fn addr<T>(arc: &Arc<T>) -> usize {
            Arc::as_ptr(arc).cast::<()>() as usize
        }
        match self {
            Value::Number(_) | Value::Str(_) | Value::Bool(_) | Value::Null => 0,
            Value::Array(a) => a.addr(),
            Value::Map(m) => m.addr(),
            Value::OrderedMap(m) => m.addr(),
            Value::Set(s) => s.addr(),
            Value::Function(f) => addr(f),
            Value::Builtin(b) => addr(b),
            Value::Class(c) => addr(c),
            Value::Instance(i) => addr(i),
            Value::Promise(p) => addr(p),
            Value::Emitter(e) => addr(e),
            Value::Worker(w) => addr(w),
            Value::Timer(t) => t.id as usize,
        }
    }

    /// Deep content equality: aggregates compare element-wise, `NaN` equals
    /// `NaN`, everything else falls back to `==`.
    pub fn structural_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Array(_), Value::Array(_))
            | (Value::Map(_), Value::Map(_))
            | (Value::OrderedMap(_), Value::OrderedMap(_))
            | (Value::Set(_), Value::Set(_)) => HashKey::of(self) == HashKey::of(other),
            _ => self == other,
        }
    }
}

/// Structural for scalars, identity for everything else.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Timer(a), Value::Timer(b)) => a.id == b.id,
            (Value::Array(a), Value::Array(b)) => a.ptr_eq(b),
            (Value::Map(a), Value::Map(b)) => a.ptr_eq(b),
            (Value::OrderedMap(a), Value::OrderedMap(b)) => a.ptr_eq(b),
            (Value::Set(a), Value::Set(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => Arc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Arc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            (Value::Promise(a), Value::Promise(b)) => Arc::ptr_eq(a, b),
            (Value::Emitter(a), Value::Emitter(b)) => Arc::ptr_eq(a, b),
            (Value::Worker(a), Value::Worker(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}
