//! Global builtin functions.
//!
//! Every builtin is a plain [`BuiltinFn`](crate::value::BuiltinFn) bound
//! into the global environment by [`register`]. Constructors (`Promise`,
//! `Map`, ...) are ordinary builtins: `new` on a builtin simply calls it.

mod collections;
mod concurrency;
mod general;

use ember_ir::Name;

use crate::environment::Environment;
use crate::value::{BuiltinFn, BuiltinValue, Value};

/// Error constructors; each builds a `{name, message, stack}` map.
const ERROR_CONSTRUCTORS: [&str; 5] = [
    "Error",
    "TypeError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
];

/// Bind every global builtin into `globals`.
pub(crate) fn register(globals: &Environment) {
    let plain: [(&str, BuiltinFn); 14] = [
        ("print", general::print),
        ("len", general::len),
        ("typeof", general::type_of),
        ("str", general::to_str),
        ("keys", general::keys),
        ("sleep", concurrency::sleep),
        ("setTimeout", concurrency::set_timeout),
        ("setInterval", concurrency::set_interval),
        ("clearTimeout", concurrency::clear_timer),
        ("clearInterval", concurrency::clear_timer),
        ("EventEmitter", concurrency::event_emitter),
        ("Worker", concurrency::new_worker),
        ("Map", collections::map),
        ("Set", collections::set),
    ];
    for (name, func) in plain {
        globals.define(Name::from(name), Value::builtin(BuiltinValue::new(name, func)));
    }

    for name in ERROR_CONSTRUCTORS {
        let ctor = BuiltinValue::new(name, general::error).with_bound(vec![Value::from(name)]);
        globals.define(Name::from(name), Value::builtin(ctor));
    }

    globals.define(Name::from("Promise"), concurrency::promise_constructor());
}
