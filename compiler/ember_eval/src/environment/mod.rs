//! Lexical environments.
//!
//! An [`Environment`] is a cheap handle to one frame of a scope chain. Frames
//! are created per function call, per block and per loop iteration, and once
//! for the globals. Closures and spawned tasks hold handles, so a frame lives
//! as long as its longest-lived referent.
//!
//! Each frame guards its bindings with its own `RwLock`. Chain walks lock one
//! frame at a time and release it before moving outward, so two tasks walking
//! overlapping chains can never deadlock.

use std::fmt;
use std::sync::Arc;

use ember_ir::Name;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::{constant_reassignment, EvalError};
use crate::value::Value;

/// Bindings of a single frame.
#[derive(Default)]
struct Scope {
    bindings: FxHashMap<Name, Value>,
    constants: FxHashSet<Name>,
}

struct Frame {
    scope: RwLock<Scope>,
    outer: Option<Environment>,
}

/// Handle to a frame of the scope chain.
#[derive(Clone)]
pub struct Environment(Arc<Frame>);

impl Environment {
    /// Root frame; it is its own global.
    pub fn new_global() -> Self {
        Environment(Arc::new(Frame {
            scope: RwLock::new(Scope::default()),
            outer: None,
        }))
    }

    /// Child frame whose lookups fall back to `outer`.
    pub fn new_enclosed(outer: &Environment) -> Self {
        Environment(Arc::new(Frame {
            scope: RwLock::new(Scope::default()),
            outer: Some(outer.clone()),
        }))
    }

    pub fn outer(&self) -> Option<&Environment> {
        self.0.outer.as_ref()
    }

    /// Root of the chain.
    pub fn global(&self) -> Environment {
        let mut env = self;
        while let Some(outer) = env.outer() {
            env = outer;
        }
        env.clone()
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Look `name` up, walking outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut env = self;
        loop {
            if let Some(value) = env.0.scope.read().bindings.get(name) {
                return Some(value.clone());
            }
            env = env.outer()?;
        }
    }

    /// Bind `name` in this frame. Fails only if this frame already holds a
    /// constant of that name; an outer constant is shadowed.
    pub fn set(&self, name: Name, value: Value) -> Result<(), EvalError> {
        let mut scope = self.0.scope.write();
        if scope.constants.contains(&name) {
            return Err(constant_reassignment(&name));
        }
        scope.bindings.insert(name, value);
        Ok(())
    }

    /// Bind `name` in this frame and mark it constant.
    pub fn set_constant(&self, name: Name, value: Value) -> Result<(), EvalError> {
        let mut scope = self.0.scope.write();
        if scope.constants.contains(&name) {
            return Err(constant_reassignment(&name));
        }
        scope.constants.insert(Name::clone(&name));
        scope.bindings.insert(name, value);
        Ok(())
    }

    /// Bind `name` in this frame, ignoring constness. Used for parameters,
    /// `this` and hoisted declarations, which always target a frame the
    /// caller just created or owns.
    pub(crate) fn define(&self, name: Name, value: Value) {
        self.0.scope.write().bindings.insert(name, value);
    }

    /// Bind `name` in the root frame, whatever frame this is.
    pub fn set_global(&self, name: Name, value: Value) -> Result<(), EvalError> {
        self.global().set(name, value)
    }

    /// Assign to the nearest existing binding of `name`.
    ///
    /// Fails if that binding is constant. If no frame binds `name`, it is
    /// created in this frame.
    pub fn update(&self, name: &str, value: Value) -> Result<(), EvalError> {
        let mut env = self;
        loop {
            {
                let mut scope = env.0.scope.write();
                if scope.bindings.contains_key(name) {
                    if scope.constants.contains(name) {
                        return Err(constant_reassignment(name));
                    }
                    if let Some(slot) = scope.bindings.get_mut(name) {
                        *slot = value;
                    }
                    return Ok(());
                }
            }
            match env.outer() {
                Some(outer) => env = outer,
                None => break,
            }
        }
        self.set(Name::from(name), value)
    }

    /// Whether the nearest binding of `name` is constant.
    pub fn is_constant(&self, name: &str) -> bool {
        let mut env = self;
        loop {
            {
                let scope = env.0.scope.read();
                if scope.bindings.contains_key(name) {
                    return scope.constants.contains(name);
                }
            }
            match env.outer() {
                Some(outer) => env = outer,
                None => return false,
            }
        }
    }

    /// Whether this frame itself binds `name`.
    pub fn has_own(&self, name: &str) -> bool {
        self.0.scope.read().bindings.contains_key(name)
    }

    /// Names bound in this frame, sorted.
    pub fn own_names(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.0.scope.read().bindings.keys().cloned().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut depth = 0;
        let mut env = self;
        while let Some(outer) = env.outer() {
            depth += 1;
            env = outer;
        }
        f.debug_struct("Environment")
            .field("names", &self.own_names())
            .field("depth", &depth)
            .finish()
    }
}
