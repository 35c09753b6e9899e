//! Client surface - typed interfaces plus bounded guest execution
//!
//! Composes the sandbox bridge around a [`ToolInvoker`] capability: the
//! client depends only on `list_tools`/`invoke_tool`, never on a concrete
//! registry type.

use crate::bootstrap::bootstrap_script;
use crate::bridge::{spawn_tool_service, ToolBridge};
use crate::diagnostics::LogLevel;
use crate::runner::{self, IsolateRun, RunFailure, RunReport};
use crate::types::{ExecutionRequest, ExecutionResult};
use codemode_core::{InvokeError, Tool, ToolInterfaceGenerator, ToolInvoker};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::oneshot;

/// Sandbox-bridge client over an external tool registry
pub struct CodeModeClient {
    invoker: Arc<dyn ToolInvoker>,
    interfaces: ToolInterfaceGenerator,
}

impl CodeModeClient {
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            invoker,
            interfaces: ToolInterfaceGenerator::new(),
        }
    }

    /// Cached typed-interface text for one tool. Deterministic: repeated
    /// calls for an unchanged tool return the identical cached text.
    pub fn generate_interface(&self, tool: &Tool) -> Arc<str> {
        self.interfaces.generate(tool)
    }

    /// Interfaces for a fresh snapshot of the whole tool set.
    pub async fn generate_all_interfaces(&self) -> Result<String, InvokeError> {
        let tools = self.invoker.list_tools().await?;
        Ok(self.interfaces.generate_all(&tools))
    }

    /// Execute guest code under the request's limits.
    ///
    /// Never raises: any internal failure (compile error, runtime error,
    /// timeout, memory exhaustion, registry failure) is converted into a
    /// terminal log entry with a null result.
    pub async fn run(&self, request: ExecutionRequest) -> ExecutionResult {
        let execution_id = uuid::Uuid::new_v4();
        tracing::info!(
            execution_id = %execution_id,
            code_len = request.code.len(),
            timeout_ms = request.timeout_ms,
            memory_limit_mb = request.memory_limit_mb,
            "executing guest code"
        );

        // One snapshot per execution: stubs, descriptors, and the blob all
        // derive from it
        let tools = match self.invoker.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                tracing::warn!(execution_id = %execution_id, error = %e, "tool snapshot failed");
                return failure_result(Vec::new(), &format!("Tool snapshot failed: {e}"));
            }
        };

        let mut per_tool = BTreeMap::new();
        for tool in &tools {
            per_tool.insert(tool.name.clone(), self.interfaces.generate(tool).to_string());
        }
        let blob = self.interfaces.generate_all(&tools);

        let (bridge, requests) = ToolBridge::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let service = spawn_tool_service(Arc::clone(&self.invoker), requests, shutdown_rx);

        let run = IsolateRun {
            code: request.code.clone(),
            limits: request.limits(),
            bootstrap: bootstrap_script(&tools, &per_tool, &blob),
            bridge,
        };
        let done = runner::spawn_isolate(run, shutdown_tx);

        let report = match done.await {
            Ok(report) => report,
            Err(_) => RunReport {
                value: None,
                failure: Some(RunFailure::Host("sandbox thread panicked".to_string())),
                logs: Vec::new(),
            },
        };

        // The service loop ends on its own once the isolate thread (and with
        // it every bridge sender) is gone
        let _ = service.await;

        match report.failure {
            Some(failure) => {
                tracing::warn!(
                    execution_id = %execution_id,
                    error = %failure,
                    "guest execution failed"
                );
                failure_result(report.logs, &failure.to_string())
            }
            None => {
                tracing::info!(execution_id = %execution_id, "guest execution completed");
                ExecutionResult {
                    result: report.value.unwrap_or(Value::Null),
                    logs: report.logs,
                }
            }
        }
    }
}

/// Terminal failure entry: error-prefixed, appended after whatever the guest
/// already logged
fn failure_result(mut logs: Vec<String>, message: &str) -> ExecutionResult {
    logs.push(format!("{}{}", LogLevel::Error.prefix(), message));
    ExecutionResult {
        result: Value::Null,
        logs,
    }
}
