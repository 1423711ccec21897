//! Destinations for the output of `print`.
//!
//! The thread owns one handler and every `print` call goes through it, so a
//! host decides whether script output reaches stdout, is shown as a debug
//! message on stderr, is captured for inspection, or is dropped.

use std::sync::Arc;

use lark_ir::Location;
use parking_lot::Mutex;

/// One captured `print` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintEvent {
    pub location: Location,
    pub message: String,
}

/// Buffer of captured `print` calls.
#[derive(Default)]
pub struct PrintBuffer {
    events: Mutex<Vec<PrintEvent>>,
}

impl PrintBuffer {
    pub fn new() -> Self {
        PrintBuffer::default()
    }

    fn push(&self, location: &Location, message: &str) {
        self.events.lock().push(PrintEvent {
            location: location.clone(),
            message: message.to_string(),
        });
    }

    pub fn events(&self) -> Vec<PrintEvent> {
        self.events.lock().clone()
    }

    /// The printed messages, one per line.
    pub fn output(&self) -> String {
        let mut out = String::new();
        for event in self.events.lock().iter() {
            out.push_str(&event.message);
            out.push('\n');
        }
        out
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

/// Where `print` writes.
pub enum PrintHandler {
    /// The message alone, on stdout.
    Stdout,
    /// `DEBUG <location>: <message>` on stderr.
    Debug,
    Buffer(PrintBuffer),
    Silent,
}

impl PrintHandler {
    pub fn print(&self, location: &Location, message: &str) {
        match self {
            PrintHandler::Stdout => println!("{message}"),
            PrintHandler::Debug => eprintln!("DEBUG {location}: {message}"),
            PrintHandler::Buffer(buffer) => buffer.push(location, message),
            PrintHandler::Silent => {}
        }
    }

    /// Everything captured so far; empty unless buffering.
    pub fn output(&self) -> String {
        match self {
            PrintHandler::Buffer(buffer) => buffer.output(),
            _ => String::new(),
        }
    }

    pub fn events(&self) -> Vec<PrintEvent> {
        match self {
            PrintHandler::Buffer(buffer) => buffer.events(),
            _ => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let PrintHandler::Buffer(buffer) = self {
            buffer.clear();
        }
    }
}

/// Print handler shared between a thread and its host.
pub type SharedPrintHandler = Arc<PrintHandler>;

pub fn stdout_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Stdout)
}

pub fn debug_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Debug)
}

pub fn buffer_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Buffer(PrintBuffer::new()))
}

pub fn silent_handler() -> SharedPrintHandler {
    Arc::new(PrintHandler::Silent)
}

#[cfg(test)]
mod tests;
