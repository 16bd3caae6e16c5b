//! Ember CLI
//!
//! Runs a script, waits for the tasks it started, and reports the outcome.

mod report;

use std::process::ExitCode;
use std::sync::Once;
use std::time::Duration;

use ember_eval::{Interpreter, RuntimeError};
use tracing::{debug, warn};

static TRACING_INIT: Once = Once::new();

/// Install the global subscriber. Only when `RUST_LOG` is set; with
/// `EMBER_LOG_TREE` the output is the indented span tree.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var("EMBER_LOG_TREE").is_ok() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_thread_names(true))
                .with(filter)
                .init();
        }
    });
}

/// `EMBER_EXIT_TIMEOUT_MS`: how long to wait for outstanding tasks at exit.
/// Unset means wait for as long as they run.
fn exit_timeout() -> Option<Duration> {
    let raw = std::env::var("EMBER_EXIT_TIMEOUT_MS").ok()?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(_) => {
            warn!(value = %raw, "ignoring malformed EMBER_EXIT_TIMEOUT_MS");
            None
        }
    }
}

fn print_usage() {
    eprintln!("Usage: ember <file.em>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RUST_LOG               Enable logging (e.g. RUST_LOG=ember_eval=debug)");
    eprintln!("  EMBER_LOG_TREE         Render logs as an indented tree");
    eprintln!("  EMBER_EXIT_TIMEOUT_MS  Wait at most this long for background tasks");
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let Some(path) = args.get(1).filter(|a| !a.starts_with('-')) else {
        print_usage();
        return ExitCode::from(2);
    };

    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("error: cannot read {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let program = match ember_parse::parse(&source) {
        Ok(program) => program,
        Err(err) => {
            report::parse_error(path, &source, &err);
            return ExitCode::FAILURE;
        }
    };

    let interpreter = Interpreter::new();
    let outcome = interpreter.run(&program);
    debug!(ok = outcome.is_ok(), "main body finished");

    let finished = interpreter.wait_for_tasks(exit_timeout());
    if !finished {
        eprintln!("warning: background tasks were still running at exit and were cancelled");
    }
    let background = interpreter.background_errors();
    for thrown in &background {
        report::background_error(thrown);
    }

    match outcome {
        Ok(_) if background.is_empty() => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(err) => {
            report::runtime_error(path, &source, &err);
            if let RuntimeError::Eval(eval) = &err {
                report::backtrace(path, &source, &eval.backtrace);
            }
            ExitCode::FAILURE
        }
    }
}
