//! Expressions: literals, identifiers, operators, assignment.

use std::sync::Arc;

use ember_ir::{BinaryOp, Element, Expr, ExprKind, FunctionDecl, Name};
use rustc_hash::FxHashMap;

use crate::environment::Environment;
use crate::errors::{invalid_spread, undefined_variable, EvalError, EvalResult, Signal};
use crate::interpreter::Interpreter;
use crate::operators::evaluate_binary;
use crate::runtime::promise::await_value;
use crate::unary_operators::evaluate_unary;
use crate::value::{FunctionValue, Value};

impl Interpreter {
    pub(super) fn eval_expr_inner(&self, expr: &Expr, env: &Environment) -> EvalResult {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(*n)),
            ExprKind::Str(s) => Ok(Value::Str(Arc::clone(s))),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Ident(name) => env
                .get(name)
                .ok_or_else(|| undefined_variable(name).into()),
            ExprKind::This => Ok(env.get("this").unwrap_or(Value::Null)),
            ExprKind::Array(elements) => Ok(Value::array(self.eval_elements(elements, env)?)),
            ExprKind::Map(entries) => {
                let mut fields = FxHashMap::default();
                for (key, value) in entries {
                    fields.insert(key.to_string(), self.eval_expr(value, env)?);
                }
                Ok(Value::map(fields))
            }
            ExprKind::Unary { op, operand } => {
                evaluate_unary(self.eval_expr(operand, env)?, *op)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right, env),
            ExprKind::Conditional {
                cond,
                then,
                otherwise,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.eval_expr(then, env)
                } else {
                    self.eval_expr(otherwise, env)
                }
            }
            ExprKind::Assign { target, op, value } => self.eval_assign(target, *op, value, env),
            ExprKind::Call { callee, args } => self.eval_call(callee, args, expr.span, env),
            ExprKind::Member { object, property } => {
                let object = self.eval_expr(object, env)?;
                self.get_member(&object, property)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                self.get_index(&object, &index)
            }
            ExprKind::Function(decl) => Ok(self.make_closure(decl, env)),
            ExprKind::New { callee, args } => {
                let callee = self.eval_expr(callee, env)?;
                let args = self.eval_elements(args, env)?;
                self.construct(&callee, args)
            }
            ExprKind::Await(operand) => await_value(self.eval_expr(operand, env)?),
        }
    }

    /// A function literal closes over `env`. A named literal can also see
    /// itself, through a frame holding just its name.
    fn make_closure(&self, decl: &Arc<FunctionDecl>, env: &Environment) -> Value {
        match &decl.name {
            Some(name) => {
                let own = Environment::new_enclosed(env);
                let closure =
                    Value::Function(Arc::new(FunctionValue::new(Arc::clone(decl), own.clone())));
                own.define(Name::clone(name), closure.clone());
                closure
            }
            None => Value::Function(Arc::new(FunctionValue::new(Arc::clone(decl), env.clone()))),
        }
    }

    /// `&&`/`||` return the deciding operand without evaluating the other.
    fn eval_binary(
        &self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        env: &Environment,
    ) -> EvalResult {
        let left = self.eval_expr(left, env)?;
        match op {
            BinaryOp::And if !left.is_truthy() => Ok(left),
            BinaryOp::Or if left.is_truthy() => Ok(left),
            BinaryOp::And | BinaryOp::Or => self.eval_expr(right, env),
            _ => {
                let right = self.eval_expr(right, env)?;
                evaluate_binary(left, right, op)
            }
        }
    }

    /// Array literal elements or call arguments, left to right, with
    /// `...spread` of arrays.
    pub(crate) fn eval_elements(
        &self,
        elements: &[Element],
        env: &Environment,
    ) -> Result<Vec<Value>, Signal> {
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match element {
                Element::Single(expr) => values.push(self.eval_expr(expr, env)?),
                Element::Spread(expr) => match self.eval_expr(expr, env)? {
                    Value::Array(items) => values.extend(items.snapshot()),
                    other => {
                        return Err(invalid_spread(other.type_name()).or_span(expr.span).into())
                    }
                },
            }
        }
        Ok(values)
    }

    /// `target = value` and `target op= value`. Evaluates to the stored
    /// value.
    fn eval_assign(
        &self,
        target: &Expr,
        op: Option<BinaryOp>,
        value: &Expr,
        env: &Environment,
    ) -> EvalResult {
        match &target.kind {
            ExprKind::Ident(name) => {
                let new = match op {
                    Some(op) => {
                        let current = env.get(name).ok_or_else(|| undefined_variable(name))?;
                        evaluate_binary(current, self.eval_expr(value, env)?, op)?
                    }
                    None => self.eval_expr(value, env)?,
                };
                env.update(name, new.clone())?;
                Ok(new)
            }
            ExprKind::Member { object, property } => {
                let object = self.eval_expr(object, env)?;
                let new = match op {
                    Some(op) => {
                        let current = self.get_member(&object, property)?;
                        evaluate_binary(current, self.eval_expr(value, env)?, op)?
                    }
                    None => self.eval_expr(value, env)?,
                };
                self.set_member(&object, property, new.clone())?;
                Ok(new)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                let new = match op {
                    Some(op) => {
                        let current = self.get_index(&object, &index)?;
                        evaluate_binary(current, self.eval_expr(value, env)?, op)?
                    }
                    None => self.eval_expr(value, env)?,
                };
                self.set_index(&object, &index, new.clone())?;
                Ok(new)
            }
            // The parser only builds assignments to the three forms above.
            _ => Err(EvalError::new("invalid assignment target").into()),
        }
    }
}
