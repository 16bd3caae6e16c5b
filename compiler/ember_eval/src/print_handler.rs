//! Where `print` writes.
//!
//! One handler is shared by the main program and every task it spawns.
//! Each call hands over a complete line, written in one piece, so lines from
//! concurrent tasks may interleave but a single line is never split.

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

pub enum PrintHandlerImpl {
    /// Process stdout, used by the `ember` binary.
    Stdout,
    /// In-memory capture for tests and embedders.
    Buffer(Mutex<String>),
    /// Output is dropped.
    Silent,
}

impl PrintHandlerImpl {
    /// Write `line` followed by a newline.
    pub fn println(&self, line: &str) {
        match self {
            Self::Stdout => {
                let mut text = String::with_capacity(line.len() + 1);
                text.push_str(line);
                text.push('\n');
                // Write errors (a closed pipe) are ignored.
                let _ = std::io::stdout().lock().write_all(text.as_bytes());
            }
            Self::Buffer(buffer) => {
                let mut buffer = buffer.lock();
                buffer.push_str(line);
                buffer.push('\n');
            }
            Self::Silent => {}
        }
    }

    /// Everything captured so far. Empty unless this is a buffer.
    pub fn get_output(&self) -> String {
        match self {
            Self::Buffer(buffer) => buffer.lock().clone(),
            Self::Stdout | Self::Silent => String::new(),
        }
    }

    pub fn clear(&self) {
        if let Self::Buffer(buffer) = self {
            buffer.lock().clear();
        }
    }
}

pub type SharedPrintHandler = Arc<PrintHandlerImpl>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Stdout)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Buffer(Mutex::new(String::new())))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandlerImpl::Silent)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn buffer_appends_lines() {
        let handler = buffer_handler();
        handler.println("one");
        handler.println("");
        handler.println("three");
        assert_eq!(handler.get_output(), "one\n\nthree\n");
    }

    #[test]
    fn clear_resets_buffer() {
        let handler = buffer_handler();
        handler.println("gone");
        handler.clear();
        handler.println("kept");
        assert_eq!(handler.get_output(), "kept\n");
    }

    #[test]
    fn silent_and_stdout_capture_nothing() {
        let silent = silent_handler();
        silent.println("dropped");
        assert_eq!(silent.get_output(), "");
        assert_eq!(stdout_handler().get_output(), "");
    }

    #[test]
    fn lines_from_threads_stay_whole() {
        let handler = buffer_handler();
        let writers: Vec<_> = (0..4)
            .map(|t| {
                let handler = Arc::clone(&handler);
                thread::spawn(move || {
                    for i in 0..50 {
                        handler.println(&format!("writer {t} line {i}"));
                    }
                })
            })
            .collect();
        for writer in writers {
            let _ = writer.join();
        }
        let output = handler.get_output();
        assert_eq!(output.lines().count(), 200);
        assert!(output
            .lines()
            .all(|l| l.starts_with("writer ") && l.contains(" line ")));
    }
}
