//! Isolate lifecycle - create, configure, run under limits, always dispose
//!
//! V8 isolates are `!Send`, so each execution runs on a dedicated thread.
//! Only sync ops are installed and guest code never awaits, so the thread
//! runs without a tokio context; the blocking channel calls inside the tool
//! bridge require exactly that.

use crate::bridge::{op_tool_call, ToolBridge};
use crate::diagnostics::{op_sandbox_log, LogBuffer};
use crate::limits::ExecutionLimits;
use deno_core::{v8, JsRuntime, RuntimeOptions};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;

/// Everything one isolate run needs, handed to the dedicated thread
pub(crate) struct IsolateRun {
    pub code: String,
    pub limits: ExecutionLimits,
    pub bootstrap: String,
    pub bridge: ToolBridge,
}

/// What one isolate run produced, before the client folds it into an
/// [`crate::ExecutionResult`]
#[derive(Debug)]
pub(crate) struct RunReport {
    pub value: Option<Value>,
    pub failure: Option<RunFailure>,
    pub logs: Vec<String>,
}

#[derive(Debug, Error)]
pub(crate) enum RunFailure {
    /// Compile error or uncaught runtime error, message as the guest saw it
    #[error("{0}")]
    Guest(String),

    #[error("Execution timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Memory limit of {0} MB exceeded")]
    MemoryExceeded(usize),

    #[error("Sandbox failure: {0}")]
    Host(String),
}

/// State for the near-heap-limit callback
struct HeapLimitState {
    handle: v8::IsolateHandle,
    /// AtomicBool so the callback can use a shared reference even if V8
    /// re-enters it
    triggered: AtomicBool,
}

/// V8 near-heap-limit callback. Terminates execution and grants 1MB of grace
/// so the termination exception can propagate.
extern "C" fn near_heap_limit_callback(
    data: *mut std::ffi::c_void,
    current_heap_limit: usize,
    _initial_heap_limit: usize,
) -> usize {
    // SAFETY: `data` points to the HeapLimitState box owned by `execute`,
    // which outlives the isolate: the runtime is dropped before the box, and
    // V8 only invokes this callback while the isolate is executing.
    let state = unsafe { &*(data as *const HeapLimitState) };
    if !state.triggered.swap(true, Ordering::SeqCst) {
        state.handle.terminate_execution();
    }
    current_heap_limit + 1024 * 1024
}

/// Run guest code on a dedicated isolate thread, reporting back when done.
///
/// `shutdown` is handed to the watchdog: at the deadline it terminates V8
/// and fires the signal so the host can close the tool bridge and unpark a
/// stub blocked mid-call.
pub(crate) fn spawn_isolate(
    run: IsolateRun,
    shutdown: oneshot::Sender<()>,
) -> oneshot::Receiver<RunReport> {
    let (done_tx, done_rx) = oneshot::channel();
    std::thread::spawn(move || {
        let report = execute(run, shutdown);
        if done_tx.send(report).is_err() {
            tracing::warn!("sandbox result receiver dropped before completion");
        }
    });
    done_rx
}

fn execute(run: IsolateRun, shutdown: oneshot::Sender<()>) -> RunReport {
    let logs = LogBuffer::new();

    let extension = deno_core::Extension {
        name: "codemode_bridge",
        ops: Cow::Owned(vec![op_sandbox_log(), op_tool_call()]),
        ..Default::default()
    };

    // Heap ceiling at isolate creation; initial size is 10MB or a tenth of
    // the ceiling, whichever is smaller
    let max_bytes = run.limits.max_heap_bytes;
    let initial_bytes = (max_bytes / 10).min(10 * 1024 * 1024);
    let create_params = v8::CreateParams::default().heap_limits(initial_bytes, max_bytes);

    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![extension],
        create_params: Some(create_params),
        ..Default::default()
    });

    {
        let state = runtime.op_state();
        let mut state = state.borrow_mut();
        state.put(logs.clone());
        state.put(run.bridge.clone());
    }

    let heap_state = Box::new(HeapLimitState {
        handle: runtime.v8_isolate().thread_safe_handle(),
        triggered: AtomicBool::new(false),
    });
    runtime.v8_isolate().add_near_heap_limit_callback(
        near_heap_limit_callback,
        &*heap_state as *const HeapLimitState as *mut std::ffi::c_void,
    );

    // Watchdog: at the deadline, terminate V8 and close the tool bridge so a
    // parked tool call unblocks
    let watchdog_handle = runtime.v8_isolate().thread_safe_handle();
    let timed_out = Arc::new(AtomicBool::new(false));
    let watchdog_timed_out = timed_out.clone();
    let timeout = run.limits.timeout;
    let (cancel_tx, cancel_rx) = std::sync::mpsc::channel::<()>();
    let watchdog = std::thread::spawn(move || {
        if let Err(std::sync::mpsc::RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(timeout) {
            watchdog_timed_out.store(true, Ordering::SeqCst);
            watchdog_handle.terminate_execution();
            let _ = shutdown.send(());
        }
    });

    let mut failure = None;
    let mut value = None;

    match runtime.execute_script("[codemode:bootstrap]", run.bootstrap) {
        Ok(_) => {
            let wrapped = wrap_guest_code(&run.code);
            match runtime.execute_script("[codemode:guest]", wrapped) {
                Ok(global) => {
                    // Only text crosses the isolation boundary: the wrapper
                    // evaluates to a JSON envelope string
                    let scope = &mut runtime.handle_scope();
                    let local = v8::Local::new(scope, global);
                    let envelope = local.to_rust_string_lossy(scope);
                    match serde_json::from_str::<Value>(&envelope) {
                        Ok(env) => {
                            if let Some(message) = env.get("error").and_then(Value::as_str) {
                                failure = Some(RunFailure::Guest(message.to_string()));
                            } else {
                                value = Some(env.get("ok").cloned().unwrap_or(Value::Null));
                            }
                        }
                        Err(e) => {
                            failure = Some(RunFailure::Host(format!(
                                "unreadable result envelope: {e}"
                            )));
                        }
                    }
                }
                Err(e) => failure = Some(RunFailure::Guest(e.to_string())),
            }
        }
        Err(e) => failure = Some(RunFailure::Host(format!("bootstrap failed: {e}"))),
    }

    // Cancel the watchdog and wait for it before dropping the runtime, so
    // its IsolateHandle never outlives the isolate
    let _ = cancel_tx.send(());
    let _ = watchdog.join();
    drop(runtime);

    // Failure causes in priority order: the termination exception surfaces
    // as a guest error, so the real cause wins over it
    if heap_state.triggered.load(Ordering::SeqCst) {
        failure = Some(RunFailure::MemoryExceeded(run.limits.max_heap_mb()));
    } else if timed_out.load(Ordering::SeqCst) {
        failure = Some(RunFailure::Timeout(timeout));
    }

    RunReport {
        value,
        failure,
        logs: logs.entries(),
    }
}

/// Wrap guest code so its `return` value is captured and serialized to a
/// transportable envelope; uncaught guest errors become the error arm.
fn wrap_guest_code(code: &str) -> String {
    format!(
        r#"(() => {{
  try {{
    const __value = (() => {{
{code}
    }})();
    return JSON.stringify({{ ok: __value === undefined ? null : __value }}) ?? "{{\"ok\":null}}";
  }} catch (err) {{
    return JSON.stringify({{
      error: err && err.message ? err.message : String(err)
    }});
  }}
}})()"#
    )
}
