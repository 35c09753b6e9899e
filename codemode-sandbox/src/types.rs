//! Request and result types crossing the sandbox boundary

use crate::limits::ExecutionLimits;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_memory_limit_mb() -> usize {
    128
}

/// Request to execute guest code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The guest code to execute
    pub code: String,

    /// Wall-clock timeout in milliseconds for the whole execution
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// V8 heap ceiling in megabytes
    #[serde(default = "default_memory_limit_mb")]
    pub memory_limit_mb: usize,
}

impl ExecutionRequest {
    /// Create a request with default limits (30s, 128 MB)
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            timeout_ms: default_timeout_ms(),
            memory_limit_mb: default_memory_limit_mb(),
        }
    }

    /// Set the timeout in milliseconds
    pub fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the memory limit in megabytes
    pub fn with_memory_limit_mb(mut self, mb: usize) -> Self {
        self.memory_limit_mb = mb;
        self
    }

    pub(crate) fn limits(&self) -> ExecutionLimits {
        ExecutionLimits {
            timeout: Duration::from_millis(self.timeout_ms),
            max_heap_bytes: self.memory_limit_mb * 1024 * 1024,
        }
    }
}

/// Result of one guest execution
///
/// Always produced: internal failures become a terminal log entry with a
/// null result, never an error raised to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// The guest's final value, or null on any failure
    pub result: Value,

    /// Ordered log entries captured during the execution
    pub logs: Vec<String>,
}

impl ExecutionResult {
    /// Whether the execution produced a value without a terminal failure
    pub fn is_failure(&self) -> bool {
        self.result.is_null()
            && self
                .logs
                .last()
                .is_some_and(|entry| entry.starts_with("[error] "))
    }
}
