//! Resource limits for guest execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Limits applied to one isolate run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLimits {
    /// Wall-clock budget for the entire guest execution, including any time
    /// spent parked on tool calls
    pub timeout: Duration,

    /// V8 heap ceiling in bytes
    pub max_heap_bytes: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),           // 30 seconds default
            max_heap_bytes: 128 * 1024 * 1024,          // 128 MB default
        }
    }
}

impl ExecutionLimits {
    /// Create strict limits for untrusted code
    pub fn strict() -> Self {
        Self {
            timeout: Duration::from_secs(5), // 5 seconds
            max_heap_bytes: 16 * 1024 * 1024, // 16 MB
        }
    }

    /// Create permissive limits for trusted code
    pub fn permissive() -> Self {
        Self {
            timeout: Duration::from_secs(300),  // 5 minutes
            max_heap_bytes: 512 * 1024 * 1024,  // 512 MB
        }
    }

    /// Heap ceiling in whole megabytes, for reporting
    pub fn max_heap_mb(&self) -> usize {
        self.max_heap_bytes / (1024 * 1024)
    }
}
