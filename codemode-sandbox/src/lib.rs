//! Codemode sandbox - bounded V8 execution with a synchronous tool bridge
//!
//! Runs untrusted generated scripts inside a memory-capped V8 isolate under a
//! wall-clock timeout. Guest code sees per-tool callables that behave like
//! ordinary synchronous functions while the host resolves each call
//! asynchronously, plus a captured `console` and the generated interface
//! text for the current tool snapshot.
//!
//! The only bridge to the host is through explicitly registered ops; the
//! isolate has no filesystem, network, or environment access.

mod bootstrap;
mod bridge;
mod client;
mod diagnostics;
mod limits;
mod runner;
mod types;

pub use client::CodeModeClient;
pub use diagnostics::LogLevel;
pub use limits::ExecutionLimits;
pub use types::{ExecutionRequest, ExecutionResult};

/// Re-export common error types
pub type Result<T> = anyhow::Result<T>;
