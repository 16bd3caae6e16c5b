//! Diagnostic rendering with `ariadne`.

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};
use ember_eval::errors::describe_thrown;
use ember_eval::{EvalBacktrace, RuntimeError, Value};
use ember_ir::Span;
use ember_parse::ParseError;

/// Byte range of `span`, clamped to the source.
fn range(span: Span, source: &str) -> Range<usize> {
    let end = (span.end as usize).min(source.len());
    let start = (span.start as usize).min(end);
    start..end
}

fn emit(path: &str, source: &str, message: &str, span: Span, label: &str) {
    let range = range(span, source);
    let report = Report::build(ReportKind::Error, path, range.start)
        .with_message(message)
        .with_label(
            Label::new((path, range))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish();
    if report.eprint((path, Source::from(source))).is_err() {
        eprintln!("error: {message}");
    }
}

pub fn parse_error(path: &str, source: &str, err: &ParseError) {
    emit(path, source, &err.to_string(), err.span(), "here");
}

pub fn runtime_error(path: &str, source: &str, err: &RuntimeError) {
    match err.span() {
        Some(span) => {
            let label = match err {
                RuntimeError::Eval(eval) => eval.kind.error_name(),
                RuntimeError::Uncaught(_) => "thrown here",
            };
            emit(path, source, &err.to_string(), span, label);
        }
        None => eprintln!("error: {err}"),
    }
}

/// Call frames, innermost first, as `at name (file:line:col)`.
pub fn backtrace(path: &str, source: &str, backtrace: &EvalBacktrace) {
    for frame in backtrace.frames() {
        match frame.span {
            Some(span) => {
                let (line, col) = span.line_col(source);
                eprintln!("    at {} ({path}:{line}:{col})", frame.name);
            }
            None => eprintln!("    at {}", frame.name),
        }
    }
}

pub fn background_error(thrown: &Value) {
    eprintln!("error in background task: {}", describe_thrown(thrown));
}
