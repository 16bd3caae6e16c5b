//! Stringification.
//!
//! `Display` is what `print` and string concatenation use: a top-level string
//! prints raw. [`Value::inspect`] quotes strings at every level and is the
//! form that re-parses as a literal for null, booleans, finite numbers,
//! strings, arrays and maps. An aggregate already on the rendering path
//! prints as `[...]` or `{...}` instead of recursing forever.

use std::fmt::{self, Write};

use super::Value;
use crate::runtime::PromiseState;

/// Integral finite numbers print without a fraction, `-0` prints `0`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n == 0.0 {
        "0".to_owned()
    } else {
        n.to_string()
    }
}

/// Double-quoted string literal with escapes the lexer understands.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

impl Value {
    /// Quoted, recursive rendering.
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        self.render(&mut out, &mut Vec::new(), true);
        out
    }

    fn render(&self, out: &mut String, path: &mut Vec<usize>, quoted: bool) {
        if let Some(addr) = self.aggregate_addr() {
            if path.contains(&addr) {
                out.push_str(if matches!(self, Value::Array(_)) {
                    "[...]"
                } else {
                    "{...}"
                });
                return;
            }
            path.push(addr);
            self.render_aggregate(out, path);
            path.pop();
            return;
        }
        match self {
            Value::Number(n) => out.push_str(&format_number(*n)),
            Value::Str(s) if quoted => out.push_str(&quote(s)),
            Value::Str(s) => out.push_str(s),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Null => out.push_str("null"),
            Value::Function(f) => {
                let params: Vec<String> = f
                    .decl
                    .params
                    .iter()
                    .map(|p| {
                        if p.rest {
                            format!("...{}", p.name)
                        } else {
                            p.name.to_string()
                        }
                    })
                    .collect();
                let prefix = if f.decl.is_async { "async fn" } else { "fn" };
                let _ = write!(out, "{prefix} {}({})", f.name(), params.join(", "));
            }
            Value::Builtin(b) => {
                let _ = write!(out, "<builtin {}>", b.name);
            }
            Value::Class(c) => {
                let _ = write!(out, "<class {}>", c.name);
            }
            Value::Instance(inst) => {
                out.push_str(&inst.class_name);
                out.push(' ');
                let addr = inst.props.addr();
                if path.contains(&addr) {
                    out.push_str("{...}");
                    return;
                }
                path.push(addr);
                let props = inst.props.snapshot();
                render_fields(out, path, props.into_iter());
                path.pop();
            }
            Value::Promise(p) => match p.state() {
                PromiseState::Pending => out.push_str("Promise { <pending> }"),
                PromiseState::Fulfilled(v) => {
                    out.push_str("Promise { ");
                    v.render(out, path, true);
                    out.push_str(" }");
                }
                PromiseState::Rejected(v) => {
                    out.push_str("Promise { <rejected> ");
                    v.render(out, path, true);
                    out.push_str(" }");
                }
            },
            Value::Emitter(e) => {
                let _ = write!(out, "EventEmitter {{ events: {} }}", e.event_names().len());
            }
            Value::Worker(w) => {
                let _ = write!(out, "Worker {{ running: {} }}", w.is_running());
            }
            Value::Timer(t) => {
                let _ = write!(out, "Timer({})", t.id);
            }
            Value::Array(_) | Value::Map(_) | Value::OrderedMap(_) | Value::Set(_) => {}
        }
    }

    /// Contents are copied out before rendering, so no lock is held while
    /// nested values lock their own storage.
    fn render_aggregate(&self, out: &mut String, path: &mut Vec<usize>) {
        match self {
            Value::Array(items) => {
                let items = items.snapshot();
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.render(out, path, true);
                }
                out.push(']');
            }
            Value::Map(fields) => {
                let fields = fields.snapshot();
                render_fields(out, path, fields.into_iter());
            }
            Value::OrderedMap(map) => {
                let entries = map.read().entries().to_vec();
                let _ = write!(out, "Map({}) {{", entries.len());
                for (i, (k, v)) in entries.iter().enumerate() {
                    out.push_str(if i > 0 { ", " } else { " " });
                    k.render(out, path, true);
                    out.push_str(" => ");
                    v.render(out, path, true);
                }
                out.push_str(if entries.is_empty() { "}" } else { " }" });
            }
            Value::Set(set) => {
                let values = set.read().values().to_vec();
                let _ = write!(out, "Set({}) {{", values.len());
                for (i, v) in values.iter().enumerate() {
                    out.push_str(if i > 0 { ", " } else { " " });
                    v.render(out, path, true);
                }
                out.push_str(if values.is_empty() { "}" } else { " }" });
            }
            _ => {}
        }
    }
}

/// `{"a": 1, "b": 2}` with keys sorted.
fn render_fields(
    out: &mut String,
    path: &mut Vec<usize>,
    fields: impl Iterator<Item = (String, Value)>,
) {
    let mut fields: Vec<(String, Value)> = fields.collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));
    out.push('{');
    for (i, (k, v)) in fields.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&quote(k));
        out.push_str(": ");
        v.render(out, path, true);
    }
    out.push('}');
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.render(&mut out, &mut Vec::new(), false);
        f.write_str(&out)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inspect())
    }
}
