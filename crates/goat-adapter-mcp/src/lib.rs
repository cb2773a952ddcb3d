//! Model Context Protocol adapter: exposes aggregated tools through the
//! `tools/list` and `tools/call` result shapes.
//!
//! Tool-level failures (bad arguments, execution errors) are reported
//! in-band as `isError` results so the model can see and react to them;
//! only protocol-level problems (unknown tool) surface as errors.

use std::collections::HashMap;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use goat_core::{InvocationError, ToolDescriptor};

#[derive(Debug, Error)]
pub enum McpError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
}

fn tool_ok(payload: &Value) -> Value {
    json!({
        "content": [{ "type": "text", "text": payload.to_string() }],
        "isError": false
    })
}

fn tool_err(code: &str, message: &str) -> Value {
    json!({
        "content": [{ "type": "text", "text": format!("{code}: {message}") }],
        "isError": true
    })
}

/// An aggregated tool list served over MCP.
pub struct McpToolkit {
    tools: Vec<ToolDescriptor>,
    by_name: HashMap<String, usize>,
}

impl McpToolkit {
    /// Duplicate names resolve to the last occurrence.
    pub fn new(tools: Vec<ToolDescriptor>) -> Self {
        let mut by_name = HashMap::new();
        for (i, tool) in tools.iter().enumerate() {
            by_name.insert(tool.name().to_string(), i);
        }
        Self { tools, by_name }
    }

    /// `tools/list` result.
    pub fn list_tools(&self) -> Value {
        let tools: Vec<Value> = self
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "inputSchema": tool.parameters().to_json_schema(),
                })
            })
            .collect();
        json!({ "tools": tools })
    }

    /// `tools/call` result. Validation and execution failures come back as
    /// `isError` payloads, not `Err`.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<Value, McpError> {
        let Some(&index) = self.by_name.get(name) else {
            return Err(McpError::UnknownTool(name.to_string()));
        };

        debug!(tool = name, "handling tools/call");
        match self.tools[index].execute(arguments).await {
            Ok(value) => Ok(tool_ok(&value)),
            Err(InvocationError::Validation(e)) => {
                Ok(tool_err("invalid_params", &e.to_string()))
            }
            Err(InvocationError::Execution(e)) => {
                Ok(tool_err("execution_failed", &e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goat_core::{define_tool, ExecutionError, Field, Schema};

    fn greet_tool() -> ToolDescriptor {
        define_tool(
            "greet",
            "Greet someone by name",
            Schema::new().field(Field::string("name").required()),
            |args| async move {
                let name = args["name"].as_str().unwrap_or("world");
                Ok(json!({"greeting": format!("hello {name}")}))
            },
        )
    }

    fn failing_tool() -> ToolDescriptor {
        define_tool("fail", "Always fails", Schema::new(), |_| async {
            Err(ExecutionError::new("boom"))
        })
    }

    #[test]
    fn list_matches_the_protocol_shape() {
        let toolkit = McpToolkit::new(vec![greet_tool()]);
        let listed = toolkit.list_tools();
        assert_eq!(listed["tools"][0]["name"], "greet");
        assert_eq!(listed["tools"][0]["inputSchema"]["type"], "object");
        assert_eq!(listed["tools"][0]["inputSchema"]["required"], json!(["name"]));
    }

    #[tokio::test]
    async fn successful_calls_return_text_content() {
        let toolkit = McpToolkit::new(vec![greet_tool()]);
        let result = toolkit
            .call_tool("greet", json!({"name": "ada"}))
            .await
            .unwrap();
        assert_eq!(result["isError"], json!(false));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("hello ada"));
    }

    #[tokio::test]
    async fn invalid_arguments_come_back_in_band() {
        let toolkit = McpToolkit::new(vec![greet_tool()]);
        let result = toolkit.call_tool("greet", json!({})).await.unwrap();
        assert_eq!(result["isError"], json!(true));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("invalid_params"));
    }

    #[tokio::test]
    async fn execution_failures_come_back_in_band() {
        let toolkit = McpToolkit::new(vec![failing_tool()]);
        let result = toolkit.call_tool("fail", json!({})).await.unwrap();
        assert_eq!(result["isError"], json!(true));
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("execution_failed"));
    }

    #[tokio::test]
    async fn unknown_tools_are_protocol_errors() {
        let toolkit = McpToolkit::new(vec![greet_tool()]);
        let err = toolkit.call_tool("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, McpError::UnknownTool(_)));
    }
}
