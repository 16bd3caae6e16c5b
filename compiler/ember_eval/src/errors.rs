//! Error types for evaluation.
//!
//! Two layers:
//! - [`EvalError`] is an engine-raised error (type mismatch, undefined
//!   variable, division by zero, ...) with a structured [`EvalErrorKind`].
//! - [`Signal`] is everything that unwinds the evaluator: `return`, `break`,
//!   `continue`, engine errors and user `throw`s. It travels as the `Err`
//!   side of [`EvalResult`], so `?` is the propagation mechanism.
//!
//! Factory functions (e.g. `division_by_zero()`) are the construction API.

use std::fmt;

use ember_ir::{BinaryOp, Span, UnaryOp};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::value::Value;

/// Result of evaluating a node.
pub type EvalResult = Result<Value, Signal>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalErrorKind {
    #[error("undefined variable: {name}")]
    UndefinedVariable { name: String },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("type mismatch: cannot apply `{}` to {left} and {right}", .op.as_symbol())]
    BinaryTypeMismatch {
        op: BinaryOp,
        left: String,
        right: String,
    },

    #[error("type mismatch: cannot apply unary `{}` to {operand}", .op.as_symbol())]
    UnaryTypeMismatch { op: UnaryOp, operand: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot reassign constant: {name}")]
    ConstantReassignment { name: String },

    #[error("{name} expects {expected} argument{}, got {got}", plural(*.expected))]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: String, len: usize },

    #[error("{type_name} is not callable")]
    NotCallable { type_name: String },

    #[error("{type_name} is not a constructor")]
    NotConstructible { type_name: String },

    #[error("spread argument must be an ARRAY, got {got}")]
    InvalidSpread { got: String },

    #[error("cannot access property `{property}` on {type_name}")]
    UndefinedProperty { property: String, type_name: String },

    #[error("`{keyword}` outside of a loop")]
    StrayControlFlow { keyword: String },

    #[error("maximum call depth exceeded (limit: {depth})")]
    StackOverflow { depth: usize },

    #[error("{message}")]
    Custom { message: String },
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

impl EvalErrorKind {
    /// Name of the language-level error constructor this kind surfaces as.
    pub fn error_name(&self) -> &'static str {
        match self {
            Self::UndefinedVariable { .. } => "ReferenceError",
            Self::TypeMismatch { .. }
            | Self::BinaryTypeMismatch { .. }
            | Self::UnaryTypeMismatch { .. }
            | Self::ArityMismatch { .. }
            | Self::NotCallable { .. }
            | Self::NotConstructible { .. }
            | Self::InvalidSpread { .. }
            | Self::UndefinedProperty { .. }
            | Self::ConstantReassignment { .. } => "TypeError",
            Self::IndexOutOfBounds { .. } | Self::StackOverflow { .. } => "RangeError",
            Self::DivisionByZero | Self::StrayControlFlow { .. } | Self::Custom { .. } => "Error",
        }
    }

    /// Any flavour of operand type error.
    pub fn is_type_mismatch(&self) -> bool {
        matches!(
            self,
            Self::TypeMismatch { .. }
                | Self::BinaryTypeMismatch { .. }
                | Self::UnaryTypeMismatch { .. }
                | Self::InvalidSpread { .. }
        )
    }
}

/// One frame of a captured call stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BacktraceFrame {
    pub name: String,
    pub span: Option<Span>,
}

/// Snapshot of the call stack at an error site, most recent call first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, frame) in self.frames.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "    at {}", frame.name)?;
            if let Some(span) = frame.span {
                write!(f, " ({span})")?;
            }
        }
        Ok(())
    }
}

/// Engine-raised evaluation error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Innermost expression that raised the error.
    pub span: Option<Span>,
    pub backtrace: EvalBacktrace,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        Self::from_kind(EvalErrorKind::Custom {
            message: message.into(),
        })
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        EvalError {
            kind,
            span: None,
            backtrace: EvalBacktrace::default(),
        }
    }

    /// Attach `span` unless a more precise one is already set.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        self.span.get_or_insert(span);
        self
    }

    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_empty() {
            self.backtrace = backtrace;
        }
        self
    }

    /// Structured error object as seen by `catch` and promise rejections:
    /// a map with `name`, `message` and `stack`.
    pub fn to_value(&self) -> Value {
        error_object(
            self.kind.error_name(),
            &self.kind.to_string(),
            &self.backtrace.to_string(),
        )
    }
}

/// Build a `{name, message, stack}` error map.
pub fn error_object(name: &str, message: &str, stack: &str) -> Value {
    let mut fields = FxHashMap::default();
    fields.insert("name".to_owned(), Value::string(name));
    fields.insert("message".to_owned(), Value::string(message));
    fields.insert("stack".to_owned(), Value::string(stack));
    Value::map(fields)
}

/// Everything that unwinds the evaluator.
#[derive(Clone, Debug)]
pub enum Signal {
    Return(Value),
    Break,
    Continue,
    /// Engine-raised error.
    Error(EvalError),
    /// User `throw` of an arbitrary value.
    Throw(Value),
}

impl Signal {
    /// Value a `catch` clause or promise rejection observes, if this signal
    /// is catchable.
    pub fn into_thrown(self) -> Result<Value, Signal> {
        match self {
            Signal::Throw(value) => Ok(value),
            Signal::Error(err) => Ok(err.to_value()),
            other => Err(other),
        }
    }
}

impl From<EvalError> for Signal {
    fn from(err: EvalError) -> Self {
        Signal::Error(err)
    }
}

/// Outcome of a program that did not complete normally.
#[derive(Clone, Debug, Error)]
pub enum RuntimeError {
    #[error("{0}")]
    Eval(EvalError),
    #[error("uncaught exception: {}", describe_thrown(.0))]
    Uncaught(Value),
}

impl RuntimeError {
    /// Source location, when the error came from the engine.
    pub fn span(&self) -> Option<Span> {
        match self {
            RuntimeError::Eval(err) => err.span,
            RuntimeError::Uncaught(_) => None,
        }
    }
}

/// `Name: message` for error objects, the inspected value otherwise.
pub fn describe_thrown(value: &Value) -> String {
    if let Value::Map(map) = value {
        let fields = map.read();
        if let (Some(Value::Str(name)), Some(message)) = (fields.get("name"), fields.get("message"))
        {
            return format!("{name}: {message}");
        }
    }
    value.inspect()
}

// Factory functions

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_owned(),
    })
}

pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_owned(),
        got: got.to_owned(),
    })
}

pub fn binary_type_mismatch(op: BinaryOp, left: &str, right: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BinaryTypeMismatch {
        op,
        left: left.to_owned(),
        right: right.to_owned(),
    })
}

pub fn unary_type_mismatch(op: UnaryOp, operand: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnaryTypeMismatch {
        op,
        operand: operand.to_owned(),
    })
}

pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

pub fn constant_reassignment(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstantReassignment {
        name: name.to_owned(),
    })
}

pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_owned(),
        expected,
        got,
    })
}

pub fn index_out_of_bounds(index: f64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds {
        index: Value::Number(index).to_string(),
        len,
    })
}

pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        type_name: type_name.to_owned(),
    })
}

pub fn not_constructible(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotConstructible {
        type_name: type_name.to_owned(),
    })
}

pub fn invalid_spread(got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidSpread {
        got: got.to_owned(),
    })
}

pub fn undefined_property(property: &str, type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedProperty {
        property: property.to_owned(),
        type_name: type_name.to_owned(),
    })
}

pub fn stray_control_flow(keyword: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StrayControlFlow {
        keyword: keyword.to_owned(),
    })
}

pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}
