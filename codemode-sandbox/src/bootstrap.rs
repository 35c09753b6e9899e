//! Generated bootstrap script installing the guest-visible globals
//!
//! Built once per execution from the tool snapshot: a captured `console`,
//! one callable stub per tool (namespace objects created once and reused),
//! the concatenated interface blob, an interface lookup function, and a
//! self-referencing `global` handle. The `Deno` global is removed after the
//! ops are captured.

use codemode_core::{sanitize_identifier, Tool};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Embed text as a JS string literal (JSON string encoding is a subset of JS).
fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

pub(crate) fn bootstrap_script(
    tools: &[Tool],
    interfaces: &BTreeMap<String, String>,
    blob: &str,
) -> String {
    let mut stubs = String::new();
    let mut seen_namespaces = HashSet::new();
    for tool in tools {
        match tool.namespace_split() {
            Some((ns_raw, leaf_raw)) => {
                let ns = sanitize_identifier(ns_raw);
                let leaf = sanitize_identifier(leaf_raw);
                if seen_namespaces.insert(ns.clone()) {
                    stubs.push_str(&format!(
                        "  globalThis.{ns} = globalThis.{ns} ?? {{}};\n"
                    ));
                }
                stubs.push_str(&format!(
                    "  globalThis.{ns}.{leaf} = invoke({});\n",
                    js_string(&tool.name)
                ));
            }
            None => {
                let name = sanitize_identifier(&tool.name);
                stubs.push_str(&format!(
                    "  globalThis.{name} = invoke({});\n",
                    js_string(&tool.name)
                ));
            }
        }
    }

    let lookup = {
        let mut map = serde_json::Map::new();
        for (name, text) in interfaces {
            map.insert(name.clone(), Value::String(text.clone()));
        }
        Value::Object(map).to_string()
    };

    format!(
        r#"((ops) => {{
  const format = (value) => {{
    if (value === null || typeof value !== "object") {{
      return String(value);
    }}
    try {{
      return JSON.stringify(value, null, 2);
    }} catch (_) {{
      return String(value);
    }}
  }};
  const emit = (level) => (...args) => {{
    ops.op_sandbox_log(level, args.map(format).join(" "));
  }};
  globalThis.console = Object.freeze({{
    log: emit("plain"),
    error: emit("error"),
    warn: emit("warn"),
    info: emit("info"),
  }});
  const invoke = (name) => (args) => {{
    const payload = JSON.stringify(args ?? {{}}) ?? "{{}}";
    return JSON.parse(ops.op_tool_call(name, payload));
  }};
{stubs}  globalThis.TOOL_INTERFACES = {blob_literal};
  const interfaces = {lookup};
  globalThis.getToolInterface = (name) =>
    Object.prototype.hasOwnProperty.call(interfaces, name) ? interfaces[name] : null;
  globalThis.global = globalThis;
  delete globalThis.Deno;
}})(Deno.core.ops);
"#,
        stubs = stubs,
        blob_literal = js_string(blob),
        lookup = lookup,
    )
}
