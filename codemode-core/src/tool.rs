//! Tool data model and the external invoker contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A named, schema-described capability backed by an external implementation.
///
/// Immutable once fetched: the sandbox takes one snapshot of the tool set per
/// execution and derives interfaces and guest stubs from that snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Dot-separated `<namespace>.<leaf>` or flat name
    pub name: String,

    /// Human-readable description, rendered into the interface doc block
    #[serde(default)]
    pub description: String,

    /// Free-form tags, rendered into the interface doc block
    #[serde(default)]
    pub tags: Vec<String>,

    /// Structural schema of the single arguments object
    #[serde(default)]
    pub input_schema: Value,

    /// Structural schema of the return value
    #[serde(default)]
    pub output_schema: Value,
}

impl Tool {
    /// Create a tool with empty description, tags, and schemas
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            tags: Vec::new(),
            input_schema: Value::Null,
            output_schema: Value::Null,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Set the input schema
    pub fn with_input_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Set the output schema
    pub fn with_output_schema(mut self, schema: Value) -> Self {
        self.output_schema = schema;
        self
    }

    /// Split the name into `(namespace, leaf)` at the first dot, if any
    pub fn namespace_split(&self) -> Option<(&str, &str)> {
        self.name.split_once('.')
    }
}

/// Errors reported by the tool registry / invoker collaborator
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("tool registry error: {0}")]
    Registry(String),

    #[error("tool '{tool}' failed: {message}")]
    Invocation { tool: String, message: String },
}

/// External collaborator performing tool discovery and the actual
/// (possibly networked) tool calls.
///
/// The sandbox bridge depends only on this capability, never on a concrete
/// registry or client type.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// List the current tool set. Called once per execution to snapshot it.
    async fn list_tools(&self) -> Result<Vec<Tool>, InvokeError>;

    /// Invoke a tool by its raw (unsanitized) name with a JSON arguments
    /// object, returning the tool's JSON output.
    async fn invoke_tool(&self, name: &str, args: Value) -> Result<Value, InvokeError>;
}
