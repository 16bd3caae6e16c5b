//! Calls, parameter binding, async calls and `new`.

use std::sync::Arc;

use ember_ir::{Element, Expr, ExprKind, FunctionDecl, MemberKind, Name, Span};
use tracing::trace;

use crate::diagnostics::{CallFrame, CallStack};
use crate::environment::Environment;
use crate::errors::{arity_mismatch, not_callable, not_constructible, EvalResult, Signal};
use crate::interpreter::Interpreter;
use crate::runtime::Promise;
use crate::value::{ClassValue, FunctionValue, InstanceValue, Value};

impl Interpreter {
    /// Call any callable value with already-evaluated arguments. This is
    /// the hook native code uses to call back into user functions.
    pub fn invoke(&self, callee: &Value, args: Vec<Value>) -> EvalResult {
        self.call_value(callee, args, None, None)
    }

    /// `new callee(args)`.
    pub fn construct(&self, callee: &Value, args: Vec<Value>) -> EvalResult {
        match callee {
            Value::Class(class) => self.instantiate(class, args),
            Value::Builtin(builtin) => (builtin.func)(self, builtin.full_args(args)),
            other => Err(not_constructible(other.type_name()).into()),
        }
    }

    pub(super) fn eval_call(
        &self,
        callee: &Expr,
        args: &[Element],
        span: Span,
        env: &Environment,
    ) -> EvalResult {
        match &callee.kind {
            ExprKind::Member { object, property } => {
                let receiver = self.eval_expr(object, env)?;
                let args = self.eval_elements(args, env)?;
                self.call_method(&receiver, property, args, span)
            }
            ExprKind::Index { object, index } => {
                let receiver = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                let function = self.get_index(&receiver, &index)?;
                let args = self.eval_elements(args, env)?;
                self.call_value(&function, args, Some(receiver), Some(span))
            }
            _ => {
                let function = self.eval_expr(callee, env)?;
                let args = self.eval_elements(args, env)?;
                self.call_value(&function, args, None, Some(span))
            }
        }
    }

    /// `this_value` is the receiver at the call site; a function that
    /// already carries a bound receiver keeps its own.
    pub(crate) fn call_value(
        &self,
        callee: &Value,
        args: Vec<Value>,
        this_value: Option<Value>,
        span: Option<Span>,
    ) -> EvalResult {
        match callee {
            Value::Function(function) => {
                let this_value = function.this.clone().or(this_value);
                if function.decl.is_async {
                    self.call_async(function, args, this_value, span)
                } else {
                    self.call_function(&function.decl, &function.env, args, this_value, span)
                }
            }
            Value::Builtin(builtin) => (builtin.func)(self, builtin.full_args(args)),
            Value::Class(class) => self.instantiate(class, args),
            other => Err(not_callable(other.type_name()).into()),
        }
    }

    /// Run a user function synchronously on the current task.
    pub(crate) fn call_function(
        &self,
        decl: &FunctionDecl,
        closure_env: &Environment,
        args: Vec<Value>,
        this_value: Option<Value>,
        span: Option<Span>,
    ) -> EvalResult {
        let frame = CallFrame {
            name: decl
                .name
                .clone()
                .unwrap_or_else(|| Name::from(decl.display_name())),
            call_span: span,
        };
        let _guard = CallStack::enter(frame, self.max_call_depth())?;
        let env = Environment::new_enclosed(closure_env);
        if let Some(this_value) = this_value {
            env.define(Name::from("this"), this_value);
        }
        self.bind_params(decl, args, &env)?;
        self.exec_function_body(&decl.body, &env)
            .map_err(|signal| match signal {
                Signal::Error(err) => Signal::Error(err.with_backtrace(CallStack::capture())),
                other => other,
            })
    }

    /// Positional binding: missing arguments take their default or fail
    /// with an arity error; extra arguments are ignored; a rest parameter
    /// always receives an array.
    fn bind_params(
        &self,
        decl: &FunctionDecl,
        args: Vec<Value>,
        env: &Environment,
    ) -> Result<(), Signal> {
        let supplied = args.len();
        let mut args = args.into_iter();
        for param in &decl.params {
            if param.rest {
                env.define(Name::clone(&param.name), Value::array(args.by_ref().collect()));
                break;
            }
            let value = match (args.next(), &param.default) {
                (Some(value), _) => value,
                (None, Some(default)) => self.eval_expr(default, env)?,
                (None, None) => {
                    return Err(arity_mismatch(
                        decl.display_name(),
                        decl.required_params(),
                        supplied,
                    )
                    .into())
                }
            };
            env.define(Name::clone(&param.name), value);
        }
        Ok(())
    }

    /// Start the body on a new task and hand back its promise at once.
    fn call_async(
        &self,
        function: &FunctionValue,
        args: Vec<Value>,
        this_value: Option<Value>,
        span: Option<Span>,
    ) -> EvalResult {
        let promise = Arc::new(Promise::new());
        let settle = Arc::clone(&promise);
        let decl = Arc::clone(&function.decl);
        let closure_env = function.env.clone();
        trace!(function = decl.display_name(), promise = promise.id(), "async call");
        let spawned = self.spawn_task("async", move |interp| {
            let result = interp.call_function(&decl, &closure_env, args, this_value, span);
            settle.settle_result(result);
        });
        if let Err(err) = spawned {
            promise.reject(err.to_value());
        }
        Ok(Value::Promise(promise))
    }

    /// Allocate an instance, run instance field initialisers, then the
    /// constructor, with `this` bound to the new instance.
    fn instantiate(&self, class: &Arc<ClassValue>, args: Vec<Value>) -> EvalResult {
        let inst = Arc::new(InstanceValue::new(class));
        let instance = Value::Instance(Arc::clone(&inst));
        let field_env = Environment::new_enclosed(&class.env);
        field_env.define(Name::from("this"), instance.clone());
        for member in &class.decl.members {
            if let (MemberKind::Field(init), false) = (&member.kind, member.is_static) {
                let value = match init {
                    Some(expr) => self.eval_expr(expr, &field_env)?,
                    None => Value::Null,
                };
                inst.props.write().insert(member.name.to_string(), value);
            }
        }
        if let Some(constructor) = class.decl.constructor() {
            self.call_function(constructor, &class.env, args, Some(instance.clone()), None)?;
        }
        Ok(instance)
    }
}
