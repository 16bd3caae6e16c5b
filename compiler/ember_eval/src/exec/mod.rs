//! Evaluation of statements and expressions.
//!
//! Every entry point returns [`EvalResult`]; `return`, `break`,
//! `continue`, throws and engine errors travel on the `Err` side and each
//! construct either absorbs the signals it owns (loops absorb `break` and
//! `continue`, calls absorb `return`, `try` absorbs throws) or passes them
//! on with `?`.

mod call;
mod control;
mod expr;
mod member;
mod pattern;

use std::sync::Arc;

use ember_ir::{Expr, Stmt, StmtKind};
use ember_stack::ensure_sufficient_stack;

use crate::environment::Environment;
use crate::errors::{stray_control_flow, EvalResult, Signal};
use crate::interpreter::Interpreter;
use crate::value::{FunctionValue, Value};

impl Interpreter {
    /// Evaluate an expression. Engine errors without a location get this
    /// expression's span.
    pub fn eval_expr(&self, expr: &Expr, env: &Environment) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env)).map_err(|signal| match signal {
            Signal::Error(err) => Signal::Error(err.or_span(expr.span)),
            other => other,
        })
    }

    /// Execute statements in `env` (no new scope). Function declarations
    /// are hoisted to the top of the list. The result is the last
    /// statement's value.
    pub fn exec_block(&self, stmts: &[Stmt], env: &Environment) -> EvalResult {
        self.hoist_functions(stmts, env)?;
        let mut last = Value::Null;
        for stmt in stmts {
            if matches!(stmt.kind, StmtKind::Function(_)) {
                continue;
            }
            last = self.exec_stmt(stmt, env)?;
        }
        Ok(last)
    }

    /// Execute a function body: `return` becomes the result, falling off
    /// the end yields `null`, and loop signals escaping the body are errors.
    pub(crate) fn exec_function_body(&self, body: &[Stmt], env: &Environment) -> EvalResult {
        match self.exec_block(body, env) {
            Ok(_) => Ok(Value::Null),
            Err(Signal::Return(value)) => Ok(value),
            Err(Signal::Break) => Err(stray_control_flow("break").into()),
            Err(Signal::Continue) => Err(stray_control_flow("continue").into()),
            Err(other) => Err(other),
        }
    }

    fn hoist_functions(&self, stmts: &[Stmt], env: &Environment) -> Result<(), Signal> {
        for stmt in stmts {
            if let StmtKind::Function(decl) = &stmt.kind {
                if let Some(name) = &decl.name {
                    let closure = FunctionValue::new(Arc::clone(decl), env.clone());
                    env.set(Arc::clone(name), Value::Function(Arc::new(closure)))
                        .map_err(|err| err.or_span(stmt.span))?;
                }
            }
        }
        Ok(())
    }
}
