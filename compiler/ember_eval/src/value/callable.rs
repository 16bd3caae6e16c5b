//! Functions, builtins, classes and instances.

use std::fmt;
use std::sync::Arc;

use ember_ir::{ClassDecl, FunctionDecl, Name};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Shared, Value};
use crate::environment::Environment;
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;

/// User-defined function: the declaration plus the environment it closes
/// over. Every closure created in the same scope shares that environment.
pub struct FunctionValue {
    pub decl: Arc<FunctionDecl>,
    pub env: Environment,
    /// Receiver for methods taken off an instance (`let f = obj.method`).
    pub this: Option<Value>,
}

impl FunctionValue {
    pub fn new(decl: Arc<FunctionDecl>, env: Environment) -> Self {
        FunctionValue {
            decl,
            env,
            this: None,
        }
    }

    /// Same function with `this` fixed to `receiver`.
    pub fn bind(&self, receiver: Value) -> Self {
        FunctionValue {
            decl: Arc::clone(&self.decl),
            env: self.env.clone(),
            this: Some(receiver),
        }
    }

    pub fn name(&self) -> &str {
        self.decl.display_name()
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FunctionValue({})", self.name())
    }
}

/// Native function signature. Receives the interpreter, so callback-taking
/// builtins can call back into user code.
pub type BuiltinFn = fn(&Interpreter, Vec<Value>) -> EvalResult;

/// Native function, optionally with leading arguments already bound.
///
/// Bound arguments are prepended on each call; `resolve`/`reject` callables
/// for a promise and methods taken off native values (`let push = xs.push`)
/// are both built this way.
pub struct BuiltinValue {
    pub name: Name,
    pub func: BuiltinFn,
    pub bound: Vec<Value>,
    /// Static members, e.g. `Promise.all`.
    pub statics: FxHashMap<Name, Value>,
}

impl BuiltinValue {
    pub fn new(name: &str, func: BuiltinFn) -> Self {
        BuiltinValue {
            name: Name::from(name),
            func,
            bound: Vec::new(),
            statics: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn with_bound(mut self, bound: Vec<Value>) -> Self {
        self.bound = bound;
        self
    }

    #[must_use]
    pub fn with_static(mut self, name: &str, value: Value) -> Self {
        self.statics.insert(Name::from(name), value);
        self
    }

    /// Bound arguments followed by `args`.
    pub fn full_args(&self, args: Vec<Value>) -> Vec<Value> {
        if self.bound.is_empty() {
            return args;
        }
        let mut all = Vec::with_capacity(self.bound.len() + args.len());
        all.extend(self.bound.iter().cloned());
        all.extend(args);
        all
    }
}

impl fmt::Debug for BuiltinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BuiltinValue({})", self.name)
    }
}

/// Class: method tables, accessors and static members.
pub struct ClassValue {
    pub name: Name,
    pub decl: Arc<ClassDecl>,
    /// Environment the class was declared in; methods close over it.
    pub env: Environment,
    pub methods: FxHashMap<Name, Arc<FunctionDecl>>,
    pub getters: FxHashMap<Name, Arc<FunctionDecl>>,
    pub setters: FxHashMap<Name, Arc<FunctionDecl>>,
    pub static_getters: FxHashMap<Name, Arc<FunctionDecl>>,
    pub static_setters: FxHashMap<Name, Arc<FunctionDecl>>,
    /// Static fields and static methods, keyed by name.
    pub statics: RwLock<FxHashMap<Name, Value>>,
}

impl ClassValue {
    /// Instance method `name` as a function bound to `receiver`.
    pub fn bound_method(&self, name: &str, receiver: Value) -> Option<Value> {
        self.methods.get(name).map(|decl| {
            Value::Function(Arc::new(FunctionValue {
                decl: Arc::clone(decl),
                env: self.env.clone(),
                this: Some(receiver),
            }))
        })
    }

    pub fn static_member(&self, name: &str) -> Option<Value> {
        self.statics.read().get(name).cloned()
    }
}

impl fmt::Debug for ClassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassValue({})", self.name)
    }
}

/// Object created by `new Class(...)`.
pub struct InstanceValue {
    pub class: Arc<ClassValue>,
    pub class_name: Name,
    pub props: Shared<FxHashMap<String, Value>>,
}

impl InstanceValue {
    pub fn new(class: &Arc<ClassValue>) -> Self {
        InstanceValue {
            class: Arc::clone(class),
            class_name: Arc::clone(&class.name),
            props: Shared::new(FxHashMap::default()),
        }
    }
}

impl fmt::Debug for InstanceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InstanceValue({})", self.class_name)
    }
}
