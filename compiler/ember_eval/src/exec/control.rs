//! Statements: declarations, control flow, `try`, classes.

use std::sync::Arc;

use ember_ir::{ClassDecl, MemberKind, Name, Pattern, Stmt, StmtKind};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::errors::{type_mismatch, EvalResult, Signal};
use crate::interpreter::Interpreter;
use crate::value::{ClassValue, FunctionValue, Value};

/// What a loop does after one run of its body.
enum LoopAction {
    Next,
    Exit,
}

impl Interpreter {
    pub(super) fn exec_stmt(&self, stmt: &Stmt, env: &Environment) -> EvalResult {
        match &stmt.kind {
            StmtKind::Let {
                pattern,
                value,
                constant,
            } => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                self.bind_pattern(pattern, value, env, *constant)
                    .map_err(|signal| with_span(signal, stmt))?;
                Ok(Value::Null)
            }
            StmtKind::Expr(expr) => self.eval_expr(expr, env),
            StmtKind::Block(stmts) => self.exec_block(stmts, &Environment::new_enclosed(env)),
            StmtKind::If {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.exec_stmt(then, env)
                } else if let Some(otherwise) = otherwise {
                    self.exec_stmt(otherwise, env)
                } else {
                    Ok(Value::Null)
                }
            }
            StmtKind::While { cond, body } => {
                while self.eval_expr(cond, env)?.is_truthy() {
                    if let LoopAction::Exit = self.loop_body(body, env)? {
                        break;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::DoWhile { body, cond } => {
                loop {
                    if let LoopAction::Exit = self.loop_body(body, env)? {
                        break;
                    }
                    if !self.eval_expr(cond, env)?.is_truthy() {
                        break;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::For {
                init,
                cond,
                update,
                body,
            } => {
                // One frame for the loop variables, shared by every iteration.
                let loop_env = Environment::new_enclosed(env);
                if let Some(init) = init {
                    self.exec_stmt(init, &loop_env)?;
                }
                loop {
                    if let Some(cond) = cond {
                        if !self.eval_expr(cond, &loop_env)?.is_truthy() {
                            break;
                        }
                    }
                    if let LoopAction::Exit = self.loop_body(body, &loop_env)? {
                        break;
                    }
                    if let Some(update) = update {
                        self.eval_expr(update, &loop_env)?;
                    }
                }
                Ok(Value::Null)
            }
            StmtKind::ForIn {
                pattern,
                iterable,
                body,
            } => {
                let source = self.eval_expr(iterable, env)?;
                let keys = iteration_keys(&source).map_err(|signal| with_span(signal, stmt))?;
                self.iterate(pattern, keys, body, env)
            }
            StmtKind::ForOf {
                pattern,
                iterable,
                body,
            } => {
                let source = self.eval_expr(iterable, env)?;
                let items = iteration_values(&source).map_err(|signal| with_span(signal, stmt))?;
                self.iterate(pattern, items, body, env)
            }
            StmtKind::Break => Err(Signal::Break),
            StmtKind::Continue => Err(Signal::Continue),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                Err(Signal::Return(value))
            }
            StmtKind::Throw(expr) => Err(Signal::Throw(self.eval_expr(expr, env)?)),
            StmtKind::Try {
                block,
                catch,
                finally,
            } => self.exec_try(block, catch.as_ref(), finally.as_deref(), env),
            StmtKind::Function(decl) => {
                // Reached only when not directly inside a statement list,
                // e.g. the body of an `if` without braces.
                if let Some(name) = &decl.name {
                    let closure = FunctionValue::new(Arc::clone(decl), env.clone());
                    env.set(Name::clone(name), Value::Function(Arc::new(closure)))?;
                }
                Ok(Value::Null)
            }
            StmtKind::Class(decl) => {
                let class = self.declare_class(decl, env)?;
                env.set(Name::clone(&decl.name), class)?;
                Ok(Value::Null)
            }
        }
    }

    fn loop_body(&self, body: &Stmt, env: &Environment) -> Result<LoopAction, Signal> {
        match self.exec_stmt(body, env) {
            Ok(_) | Err(Signal::Continue) => Ok(LoopAction::Next),
            Err(Signal::Break) => Ok(LoopAction::Exit),
            Err(other) => Err(other),
        }
    }

    /// `for-in` / `for-of`: a fresh frame per iteration, so closures
    /// created in the body each capture their own loop variable.
    fn iterate(
        &self,
        pattern: &Pattern,
        items: Vec<Value>,
        body: &Stmt,
        env: &Environment,
    ) -> EvalResult {
        for item in items {
            let iteration = Environment::new_enclosed(env);
            self.bind_pattern(pattern, item, &iteration, false)?;
            if let LoopAction::Exit = self.loop_body(body, &iteration)? {
                break;
            }
        }
        Ok(Value::Null)
    }

    /// `finally` always runs; a signal it raises replaces the outcome of
    /// the `try`/`catch` part.
    fn exec_try(
        &self,
        block: &[Stmt],
        catch: Option<&(Option<Pattern>, Vec<Stmt>)>,
        finally: Option<&[Stmt]>,
        env: &Environment,
    ) -> EvalResult {
        let outcome = match (self.exec_block(block, &Environment::new_enclosed(env)), catch) {
            (Err(signal), Some((param, handler))) => match signal.into_thrown() {
                Ok(thrown) => {
                    let catch_env = Environment::new_enclosed(env);
                    match param {
                        Some(param) => self
                            .bind_pattern(param, thrown, &catch_env, false)
                            .and_then(|()| self.exec_block(handler, &catch_env)),
                        None => self.exec_block(handler, &catch_env),
                    }
                }
                Err(other) => Err(other),
            },
            (outcome, _) => outcome,
        };
        if let Some(finally) = finally {
            self.exec_block(finally, &Environment::new_enclosed(env))?;
        }
        outcome
    }

    /// Build a class value: method tables, accessors, then static fields,
    /// which are initialised in order with `this` bound to the class.
    fn declare_class(&self, decl: &Arc<ClassDecl>, env: &Environment) -> EvalResult {
        let mut methods = FxHashMap::default();
        let mut getters = FxHashMap::default();
        let mut setters = FxHashMap::default();
        let mut static_getters = FxHashMap::default();
        let mut static_setters = FxHashMap::default();
        let mut statics = FxHashMap::default();
        for member in &decl.members {
            let name = Name::clone(&member.name);
            match (&member.kind, member.is_static) {
                (MemberKind::Method(f), false) => {
                    methods.insert(name, Arc::clone(f));
                }
                (MemberKind::Method(f), true) => {
                    let method = FunctionValue::new(Arc::clone(f), env.clone());
                    statics.insert(name, Value::Function(Arc::new(method)));
                }
                (MemberKind::Getter(f), false) => {
                    getters.insert(name, Arc::clone(f));
                }
                (MemberKind::Getter(f), true) => {
                    static_getters.insert(name, Arc::clone(f));
                }
                (MemberKind::Setter(f), false) => {
                    setters.insert(name, Arc::clone(f));
                }
                (MemberKind::Setter(f), true) => {
                    static_setters.insert(name, Arc::clone(f));
                }
                (MemberKind::Field(_), _) => {}
            }
        }
        let class = Arc::new(ClassValue {
            name: Name::clone(&decl.name),
            decl: Arc::clone(decl),
            env: env.clone(),
            methods,
            getters,
            setters,
            static_getters,
            static_setters,
            statics: RwLock::new(statics),
        });
        let class_value = Value::Class(Arc::clone(&class));

        let init_env = Environment::new_enclosed(env);
        init_env.define(Name::from("this"), class_value.clone());
        for member in &decl.members {
            if let (MemberKind::Field(init), true) = (&member.kind, member.is_static) {
                let value = match init {
                    Some(expr) => self.eval_expr(expr, &init_env)?,
                    None => Value::Null,
                };
                class.statics.write().insert(Name::clone(&member.name), value);
            }
        }
        Ok(class_value)
    }
}

fn with_span(signal: Signal, stmt: &Stmt) -> Signal {
    match signal {
        Signal::Error(err) => Signal::Error(err.or_span(stmt.span)),
        other => other,
    }
}

/// Keys visited by `for-in`: map keys (sorted), ordered-map keys, array and
/// string indices.
fn iteration_keys(source: &Value) -> Result<Vec<Value>, Signal> {
    let keys = match source {
        Value::Map(fields) => sorted_keys(&fields.read()),
        Value::Instance(inst) => sorted_keys(&inst.props.read()),
        Value::OrderedMap(map) => map.read().entries().iter().map(|(k, _)| k.clone()).collect(),
        Value::Array(items) => (0..items.read().len()).map(Value::from).collect(),
        Value::Str(s) => (0..s.chars().count()).map(Value::from).collect(),
        other => return Err(type_mismatch("MAP", other.type_name()).into()),
    };
    Ok(keys)
}

fn sorted_keys(fields: &FxHashMap<String, Value>) -> Vec<Value> {
    let mut keys: Vec<&String> = fields.keys().collect();
    keys.sort();
    keys.into_iter().map(|k| Value::string(k.as_str())).collect()
}

/// Elements visited by `for-of`.
fn iteration_values(source: &Value) -> Result<Vec<Value>, Signal> {
    let values = match source {
        Value::Array(items) => items.snapshot(),
        Value::Str(s) => s.chars().map(|c| Value::string(c.to_string())).collect(),
        Value::Set(set) => set.read().values().to_vec(),
        Value::OrderedMap(map) => map
            .read()
            .entries()
            .iter()
            .map(|(k, v)| Value::array(vec![k.clone(), v.clone()]))
            .collect(),
        other => return Err(type_mismatch("ARRAY", other.type_name()).into()),
    };
    Ok(values)
}
