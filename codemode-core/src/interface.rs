//! Schema-to-interface generation with a process-lifetime cache
//!
//! Maps a tool's structural schemas to a readable TypeScript-style interface
//! description that guest authors (and the LLM generating guest code) can
//! consume. Generated text is cached per `(tool name, schema fingerprint)`
//! so a changed schema re-renders instead of serving stale text; entries are
//! immutable and never evicted.

use crate::ident::sanitize_identifier;
use crate::tool::Tool;
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::{Arc, RwLock};

/// Generates and caches typed-interface text for tools.
///
/// The cache is append-only and shared process-wide; entries are immutable
/// `Arc<str>` values, so repeated requests for the same tool return the
/// identical cached text without recomputation.
#[derive(Default)]
pub struct ToolInterfaceGenerator {
    cache: RwLock<HashMap<CacheKey, Arc<str>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    name: String,
    fingerprint: u64,
}

impl ToolInterfaceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached interface text for one tool.
    pub fn generate(&self, tool: &Tool) -> Arc<str> {
        let key = CacheKey {
            name: tool.name.clone(),
            fingerprint: schema_fingerprint(tool),
        };

        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(hit) = cache.get(&key) {
                return Arc::clone(hit);
            }
        }

        tracing::debug!(tool = %tool.name, "rendering tool interface");
        let rendered: Arc<str> = render_interface(tool).into();
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(cache.entry(key).or_insert(rendered))
    }

    /// Concatenated interfaces for a snapshot of the tool set.
    pub fn generate_all(&self, tools: &[Tool]) -> String {
        tools
            .iter()
            .map(|tool| self.generate(tool))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Fingerprint over both schemas so cache entries track schema content.
fn schema_fingerprint(tool: &Tool) -> u64 {
    let mut hasher = DefaultHasher::new();
    tool.input_schema.to_string().hash(&mut hasher);
    tool.output_schema.to_string().hash(&mut hasher);
    hasher.finish()
}

fn render_interface(tool: &Tool) -> String {
    let mut out = String::new();
    match tool.namespace_split() {
        Some((ns_raw, leaf_raw)) => {
            let ns = sanitize_identifier(ns_raw);
            let leaf = sanitize_identifier(leaf_raw);
            let ty = type_name(&leaf);
            out.push_str(&format!("declare namespace {ns} {{\n"));
            out.push_str(&format!(
                "  export type {ty}Input = {};\n",
                ts_type(&tool.input_schema, 1)
            ));
            out.push_str(&format!(
                "  export type {ty}Output = {};\n",
                ts_type(&tool.output_schema, 1)
            ));
            out.push_str("}\n");
            out.push_str(&doc_block(tool, &format!("{ns}.{leaf}(args)")));
        }
        None => {
            let name = sanitize_identifier(&tool.name);
            let ty = type_name(&name);
            out.push_str(&format!(
                "export type {ty}Input = {};\n",
                ts_type(&tool.input_schema, 0)
            ));
            out.push_str(&format!(
                "export type {ty}Output = {};\n",
                ts_type(&tool.output_schema, 0)
            ));
            out.push_str(&doc_block(tool, &format!("{name}(args)")));
        }
    }
    out
}

/// Capitalize the first alphabetic character for a type-name spelling.
fn type_name(ident: &str) -> String {
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => "Tool".to_string(),
    }
}

/// Documentation block listing description, tags, and the call pattern.
fn doc_block(tool: &Tool, call: &str) -> String {
    let mut out = String::from("/**\n");
    if !tool.description.is_empty() {
        out.push_str(&format!(" * {}\n", escape_comment(&tool.description)));
    }
    if !tool.tags.is_empty() {
        out.push_str(&format!(
            " * Tags: {}\n",
            escape_comment(&tool.tags.join(", "))
        ));
    }
    out.push_str(&format!(" * Usage: {call}\n"));
    out.push_str(" */\n");
    out
}

/// Escape the comment terminator and flatten newlines so schema text cannot
/// break out of the generated doc block.
fn escape_comment(text: &str) -> String {
    text.replace("*/", "*\\/").replace('\n', " ").replace('\r', " ")
}

/// Recursive schema-to-type mapping. Malformed input falls back to `any`,
/// never fails.
fn ts_type(schema: &Value, indent: usize) -> String {
    let Some(obj) = schema.as_object() else {
        return "any".to_string();
    };

    // An enum wins over the declared base type
    if let Some(variants) = obj.get("enum").and_then(Value::as_array) {
        if variants.is_empty() {
            return "any".to_string();
        }
        return variants
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" | ");
    }

    match obj.get("type") {
        Some(Value::String(ty)) => match ty.as_str() {
            "object" => object_type(obj, indent),
            "array" => array_type(obj, indent),
            other => primitive(other),
        },
        Some(Value::Array(types)) => {
            let parts: Vec<String> = types
                .iter()
                .filter_map(Value::as_str)
                .map(primitive)
                .collect();
            if parts.is_empty() {
                "any".to_string()
            } else {
                parts.join(" | ")
            }
        }
        _ => "any".to_string(),
    }
}

fn primitive(name: &str) -> String {
    match name {
        "string" => "string",
        "number" | "integer" => "number",
        "boolean" => "boolean",
        "null" => "null",
        _ => "any",
    }
    .to_string()
}

fn object_type(obj: &Map<String, Value>, indent: usize) -> String {
    let props = match obj.get("properties").and_then(Value::as_object) {
        Some(props) if !props.is_empty() => props,
        // No declared properties: arbitrary string-keyed fields
        _ => return "{ [key: string]: any }".to_string(),
    };

    let required: HashSet<&str> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let pad = "  ".repeat(indent + 1);
    let mut out = String::from("{\n");
    for (key, sub) in props {
        if let Some(desc) = sub.get("description").and_then(Value::as_str) {
            out.push_str(&format!("{pad}/** {} */\n", escape_comment(desc)));
        }
        let marker = if required.contains(key.as_str()) { "" } else { "?" };
        out.push_str(&format!("{pad}{key}{marker}: {};\n", ts_type(sub, indent + 1)));
    }
    out.push_str(&format!("{}}}", "  ".repeat(indent)));
    out
}

fn array_type(obj: &Map<String, Value>, indent: usize) -> String {
    match obj.get("items") {
        // A list of schemas means the element type is their union
        Some(Value::Array(items)) => {
            let parts: Vec<String> = items.iter().map(|s| ts_type(s, indent)).collect();
            if parts.is_empty() {
                "any[]".to_string()
            } else {
                format!("({})[]", parts.join(" | "))
            }
        }
        Some(item) => {
            let inner = ts_type(item, indent);
            if !inner.starts_with('{') && inner.contains('|') {
                format!("({inner})[]")
            } else {
                format!("{inner}[]")
            }
        }
        None => "any[]".to_string(),
    }
}
