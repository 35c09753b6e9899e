//! Interface generation tests at the client boundary

use crate::common::{math_add_tool, setup_test_logging, AddInvoker};
use codemode_core::Tool;
use codemode_sandbox::CodeModeClient;
use serde_json::json;
use std::sync::Arc;

fn client() -> CodeModeClient {
    CodeModeClient::new(Arc::new(AddInvoker))
}

#[tokio::test]
async fn test_namespaced_interface_and_call_pattern() {
    setup_test_logging();
    let text = client().generate_interface(&math_add_tool());
    assert!(text.contains("declare namespace math {"));
    assert!(text.contains("export type AddInput"));
    assert!(text.contains("export type AddOutput = number;"));
    assert!(text.contains("Usage: math.add(args)"));
    assert!(text.contains("Adds two numbers"));
    assert!(text.contains("Tags: math"));
}

#[tokio::test]
async fn test_required_and_optional_fields() {
    setup_test_logging();
    let tool = Tool::new("search").with_input_schema(json!({
        "type": "object",
        "properties": {
            "a": { "type": "string" },
            "b": { "type": "string" }
        },
        "required": ["a"]
    }));
    let text = client().generate_interface(&tool);
    assert!(text.contains("a: string;"));
    assert!(text.contains("b?: string;"));
}

#[tokio::test]
async fn test_repeated_generation_is_byte_identical() {
    setup_test_logging();
    let client = client();
    let tool = math_add_tool();
    let first = client.generate_interface(&tool);
    let second = client.generate_interface(&tool);
    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_generate_all_interfaces_covers_snapshot() {
    setup_test_logging();
    let blob = client().generate_all_interfaces().await.unwrap();
    assert!(blob.contains("declare namespace math"));
    assert!(blob.contains("Usage: math.add(args)"));
}

#[tokio::test]
async fn test_sanitized_access_pattern_for_awkward_names() {
    setup_test_logging();
    let tool = Tool::new("2nd-ns.do-it!");
    let text = client().generate_interface(&tool);
    assert!(text.contains("declare namespace _2nd_ns {"));
    assert!(text.contains("Usage: _2nd_ns.do_it_(args)"));
}
