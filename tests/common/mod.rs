//! Common test utilities shared across integration tests

use async_trait::async_trait;
use codemode_core::{InvokeError, Tool, ToolInvoker};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Setup logging for tests
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Scripted outcome for one tool in a [`StubInvoker`]
#[derive(Clone)]
pub enum ToolBehavior {
    /// Reply with this value
    Reply(Value),
    /// Reply after a delay (still resolves)
    SlowReply(Value, Duration),
    /// Fail with this message
    Fail(String),
    /// Never resolve
    Hang,
}

/// Test invoker with a fixed tool set, scripted replies, and a call recorder
pub struct StubInvoker {
    tools: Vec<Tool>,
    behaviors: HashMap<String, ToolBehavior>,
    calls: Mutex<Vec<String>>,
}

impl StubInvoker {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            behaviors: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_tool(mut self, tool: Tool, behavior: ToolBehavior) -> Self {
        self.behaviors.insert(tool.name.clone(), behavior);
        self.tools.push(tool);
        self
    }

    /// Raw tool names in the order they were invoked
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().expect("call recorder poisoned").clone()
    }
}

impl Default for StubInvoker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolInvoker for StubInvoker {
    async fn list_tools(&self) -> Result<Vec<Tool>, InvokeError> {
        Ok(self.tools.clone())
    }

    async fn invoke_tool(&self, name: &str, _args: Value) -> Result<Value, InvokeError> {
        self.calls
            .lock()
            .expect("call recorder poisoned")
            .push(name.to_string());
        match self.behaviors.get(name) {
            Some(ToolBehavior::Reply(value)) => Ok(value.clone()),
            Some(ToolBehavior::SlowReply(value, delay)) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
            Some(ToolBehavior::Fail(message)) => Err(InvokeError::Invocation {
                tool: name.to_string(),
                message: message.clone(),
            }),
            Some(ToolBehavior::Hang) => std::future::pending().await,
            None => Err(InvokeError::Invocation {
                tool: name.to_string(),
                message: "unknown tool".to_string(),
            }),
        }
    }
}

/// An invoker that actually computes `math.add`, for end-to-end arithmetic
pub struct AddInvoker;

#[async_trait]
impl ToolInvoker for AddInvoker {
    async fn list_tools(&self) -> Result<Vec<Tool>, InvokeError> {
        Ok(vec![math_add_tool()])
    }

    async fn invoke_tool(&self, name: &str, args: Value) -> Result<Value, InvokeError> {
        match name {
            "math.add" => {
                let a = args["a"].as_i64().unwrap_or(0);
                let b = args["b"].as_i64().unwrap_or(0);
                Ok(json!(a + b))
            }
            other => Err(InvokeError::Invocation {
                tool: other.to_string(),
                message: "unknown tool".to_string(),
            }),
        }
    }
}

/// The canonical `math.add` tool definition used across tests
pub fn math_add_tool() -> Tool {
    Tool::new("math.add")
        .with_description("Adds two numbers")
        .with_tags(vec!["math".to_string()])
        .with_input_schema(json!({
            "type": "object",
            "properties": {
                "a": { "type": "number" },
                "b": { "type": "number" }
            },
            "required": ["a", "b"]
        }))
        .with_output_schema(json!({ "type": "number" }))
}

pub fn shared(invoker: StubInvoker) -> Arc<StubInvoker> {
    Arc::new(invoker)
}
