//! Tool-call bridge - synchronous guest stubs over asynchronous host calls
//!
//! A guest tool stub calls a synchronous op that parks the isolate thread on
//! a channel while a per-execution host task awaits the actual invocation.
//! From the guest's perspective the call is an ordinary blocking function;
//! tool calls from one execution are therefore strictly sequential.

use codemode_core::ToolInvoker;
use deno_core::{op2, OpState};
use deno_error::JsErrorBox;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// One parked guest tool call awaiting its host-side resolution
pub(crate) struct ToolCallRequest {
    pub name: String,
    pub args: Value,
    pub reply: oneshot::Sender<Result<Value, String>>,
}

/// Guest-side handle to the host service task, stored in the isolate's
/// op state. One bridge per isolate instance; concurrent executions each
/// get their own.
#[derive(Clone)]
pub(crate) struct ToolBridge {
    requests: mpsc::Sender<ToolCallRequest>,
}

impl ToolBridge {
    /// Create a bridge and the receiving end for the service task.
    ///
    /// Capacity 1 is sufficient: the single-threaded guest can have at most
    /// one call in flight.
    pub fn channel() -> (Self, mpsc::Receiver<ToolCallRequest>) {
        let (tx, rx) = mpsc::channel(1);
        (Self { requests: tx }, rx)
    }

    /// Park the calling thread until the host resolves the invocation.
    ///
    /// Must be called off the tokio runtime (the isolate thread). A closed
    /// channel on either side means the bridge was shut down, typically by
    /// the watchdog at the deadline.
    fn call(&self, name: String, args: Value) -> Result<Value, String> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.requests
            .blocking_send(ToolCallRequest {
                name,
                args,
                reply: reply_tx,
            })
            .map_err(|_| "tool bridge is closed".to_string())?;
        match reply_rx.blocking_recv() {
            Ok(outcome) => outcome,
            Err(_) => Err("tool bridge is closed".to_string()),
        }
    }
}

/// Spawn the host-side service loop for one execution.
///
/// Requests are serviced strictly one at a time. Firing `shutdown` (or the
/// sender being dropped once the isolate is done) stops the loop and drops
/// any in-flight invocation, which unparks a blocked stub with a
/// bridge-closed error.
pub(crate) fn spawn_tool_service(
    invoker: Arc<dyn ToolInvoker>,
    mut requests: mpsc::Receiver<ToolCallRequest>,
    shutdown: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let serve = async move {
            while let Some(request) = requests.recv().await {
                tracing::debug!(tool = %request.name, "dispatching guest tool call");
                let outcome = invoker
                    .invoke_tool(&request.name, request.args)
                    .await
                    .map_err(|e| e.to_string());
                if request.reply.send(outcome).is_err() {
                    tracing::warn!("guest abandoned a tool call before its reply");
                }
            }
        };
        tokio::select! {
            _ = serve => {}
            _ = shutdown => {
                tracing::debug!("tool bridge shut down before guest completion");
            }
        }
    })
}

/// Blocking op behind every guest tool stub.
///
/// Success returns the tool output as JSON text for the stub to parse;
/// failure raises a normal catchable error carrying the invoker's message.
#[op2]
#[string]
pub(crate) fn op_tool_call(
    state: &mut OpState,
    #[string] name: String,
    #[string] args: String,
) -> Result<String, JsErrorBox> {
    let bridge = state.borrow::<ToolBridge>().clone();
    let args: Value = serde_json::from_str(&args)
        .map_err(|e| JsErrorBox::type_error(format!("invalid tool arguments: {e}")))?;
    match bridge.call(name, args) {
        Ok(value) => Ok(value.to_string()),
        Err(message) => Err(JsErrorBox::type_error(message)),
    }
}
