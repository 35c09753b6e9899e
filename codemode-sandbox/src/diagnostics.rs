//! Diagnostics bridge - ordered, leveled log capture from guest code
//!
//! Guest `console` calls cross the boundary through a synchronous op into a
//! per-execution buffer, so entries are totally ordered by emission time and
//! interleave correctly with tool-call activity.

use deno_core::{op2, OpState};
use std::cell::RefCell;
use std::rc::Rc;

/// Severity attached to a guest log call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Plain,
    Error,
    Warn,
    Info,
}

impl LogLevel {
    /// Parse the level tag sent by the bootstrap script; unknown tags are
    /// treated as plain.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "info" => Self::Info,
            _ => Self::Plain,
        }
    }

    /// Marker prepended to the message text; plain entries have none.
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Plain => "",
            Self::Error => "[error] ",
            Self::Warn => "[warn] ",
            Self::Info => "[info] ",
        }
    }
}

/// Per-execution ordered log buffer, shared with the isolate's op state.
///
/// Single-threaded by construction: it lives on the isolate thread and is
/// only touched from sync ops and the final report.
#[derive(Clone, Default)]
pub struct LogBuffer(Rc<RefCell<Vec<String>>>);

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, level: LogLevel, text: &str) {
        self.0.borrow_mut().push(format!("{}{}", level.prefix(), text));
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }
}

/// Sync op backing the guest `console` functions.
#[op2(fast)]
pub fn op_sandbox_log(state: &mut OpState, #[string] level: String, #[string] message: String) {
    let buffer = state.borrow::<LogBuffer>().clone();
    buffer.push(LogLevel::parse(&level), &message);
}
