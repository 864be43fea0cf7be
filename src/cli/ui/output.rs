use std::fmt::Display;
use std::io::{self, Write};
use std::sync::Mutex;

use console::style;

use crate::types::Message;

type Sink = Box<dyn Write + Send>;

/// Terminal output.
///
/// Status lines go to stderr and documents to stdout, so
/// `readmecraft show > README.md` captures only the README.
pub struct Output {
    status: Mutex<Sink>,
    document: Mutex<Sink>,
}

impl Output {
    pub fn new() -> Self {
        Self::with_sinks(Box::new(io::stderr()), Box::new(io::stdout()))
    }

    pub fn with_sinks(status: Sink, document: Sink) -> Self {
        Self {
            status: Mutex::new(status),
            document: Mutex::new(document),
        }
    }

    fn status_line(&self, line: impl Display) {
        if let Ok(mut sink) = self.status.lock() {
            let _ = writeln!(sink, "{}", line);
        }
    }

    pub fn success(&self, message: &str) {
        self.status_line(format!("{} {}", style("✓").for_stderr().green(), message));
    }

    pub fn error(&self, message: &str) {
        self.status_line(format!("{} {}", style("✗").for_stderr().red(), message));
    }

    pub fn warning(&self, message: &str) {
        self.status_line(format!("{} {}", style("⚠").for_stderr().yellow(), message));
    }

    pub fn info(&self, message: &str) {
        self.status_line(format!("{} {}", style("ℹ").for_stderr().blue(), message));
    }

    pub fn header(&self, message: &str) {
        self.status_line(format!("\n{}", style(message).for_stderr().bold().underlined()));
    }

    pub fn section(&self, message: &str) {
        self.status_line(format!("\n{}", style(message).for_stderr().bold()));
        self.status_line("─".repeat(40));
    }

    /// One-line description of an envelope
    pub fn envelope(&self, message: &Message) {
        let line = style(message.to_string()).for_stderr();
        if message.is_error() {
            self.status_line(format!("  {}", line.red()));
        } else {
            self.status_line(format!("  {}", line.dim()));
        }
    }

    /// Document body, undecorated so it can be piped
    pub fn document(&self, text: &str) {
        if let Ok(mut sink) = self.document.lock() {
            let _ = writeln!(sink, "{}", text);
            let _ = sink.flush();
        }
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}
