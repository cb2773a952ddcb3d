//! OpenAI function-calling adapter: converts tool descriptors into the
//! `tools` array shape of the chat completions API and routes tool calls
//! back through validated execution.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use goat_core::{ExecutionError, ToolDescriptor, ValidationError};

/// One entry of the `tools` array in a chat completions request.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub def_type: &'static str,
    pub function: ToolFunctionDef,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolFunctionDef {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Where tool calls actually run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Execute in this process when the model requests a call.
    Server,
    /// Calls are forwarded to a client process; this toolkit only provides
    /// definitions and refuses to execute.
    ClientDeferred,
}

#[derive(Debug, Error)]
pub enum OpenAiToolError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("tool '{0}' is deferred to the client and cannot run here")]
    ClientDeferred(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// An aggregated tool list prepared for the OpenAI API.
pub struct OpenAiToolkit {
    tools: Vec<ToolDescriptor>,
    by_name: HashMap<String, usize>,
    mode: ExecutionMode,
}

impl OpenAiToolkit {
    /// Duplicate names resolve to the last occurrence, matching how a chat
    /// API deduplicates its `tools` array.
    pub fn new(tools: Vec<ToolDescriptor>, mode: ExecutionMode) -> Self {
        let mut by_name = HashMap::new();
        for (i, tool) in tools.iter().enumerate() {
            if by_name.insert(tool.name().to_string(), i).is_some() {
                warn!(tool = tool.name(), "duplicate tool name, keeping the later one");
            }
        }
        Self {
            tools,
            by_name,
            mode,
        }
    }

    /// Tool definitions in aggregation order, ready to serialize into a
    /// chat completions request.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                def_type: "function",
                function: ToolFunctionDef {
                    name: tool.name().to_string(),
                    description: tool.description().to_string(),
                    parameters: tool.parameters().to_json_schema(),
                },
            })
            .collect()
    }

    /// Run a tool call requested by the model.
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, OpenAiToolError> {
        let Some(&index) = self.by_name.get(name) else {
            return Err(OpenAiToolError::UnknownTool(name.to_string()));
        };
        if self.mode == ExecutionMode::ClientDeferred {
            return Err(OpenAiToolError::ClientDeferred(name.to_string()));
        }

        debug!(tool = name, "executing tool call");
        match self.tools[index].execute(args).await {
            Ok(value) => Ok(value),
            Err(goat_core::InvocationError::Validation(e)) => Err(e.into()),
            Err(goat_core::InvocationError::Execution(e)) => Err(e.into()),
        }
    }

    /// Run a tool call and flatten the outcome into the string content of a
    /// `tool` role message. Errors become `"Error: ..."` so the model can
    /// read and recover from them.
    pub async fn execute_to_string(&self, name: &str, args: Value) -> String {
        match self.execute(name, args).await {
            Ok(value) => value.to_string(),
            Err(e) => format!("Error: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goat_core::{define_tool, Field, Schema};
    use serde_json::json;

    fn add_tool() -> ToolDescriptor {
        define_tool(
            "add",
            "Add two integers",
            Schema::new()
                .field(Field::integer("a").required())
                .field(Field::integer("b").required()),
            |args| async move {
                let sum = args["a"].as_i64().unwrap_or(0) + args["b"].as_i64().unwrap_or(0);
                Ok(json!({"sum": sum}))
            },
        )
    }

    #[test]
    fn definitions_follow_the_function_calling_shape() {
        let toolkit = OpenAiToolkit::new(vec![add_tool()], ExecutionMode::Server);
        let defs = toolkit.definitions();
        assert_eq!(defs.len(), 1);

        let serialized = serde_json::to_value(&defs[0]).unwrap();
        assert_eq!(serialized["type"], "function");
        assert_eq!(serialized["function"]["name"], "add");
        assert_eq!(serialized["function"]["parameters"]["type"], "object");
    }

    #[tokio::test]
    async fn tool_calls_round_trip_through_the_adapter() {
        let toolkit = OpenAiToolkit::new(vec![add_tool()], ExecutionMode::Server);
        let result = toolkit.execute("add", json!({"a": 2, "b": 3})).await.unwrap();
        assert_eq!(result, json!({"sum": 5}));
    }

    #[tokio::test]
    async fn unknown_tools_are_rejected() {
        let toolkit = OpenAiToolkit::new(vec![add_tool()], ExecutionMode::Server);
        let err = toolkit.execute("subtract", json!({})).await.unwrap_err();
        assert!(matches!(err, OpenAiToolError::UnknownTool(_)));
    }

    #[tokio::test]
    async fn deferred_mode_refuses_to_execute() {
        let toolkit = OpenAiToolkit::new(vec![add_tool()], ExecutionMode::ClientDeferred);
        assert_eq!(toolkit.definitions().len(), 1);
        let err = toolkit
            .execute("add", json!({"a": 1, "b": 1}))
            .await
            .unwrap_err();
        assert!(matches!(err, OpenAiToolError::ClientDeferred(_)));
    }

    #[tokio::test]
    async fn invalid_arguments_fail_validation_inside_the_adapter() {
        let toolkit = OpenAiToolkit::new(vec![add_tool()], ExecutionMode::Server);
        let err = toolkit.execute("add", json!({"a": 2})).await.unwrap_err();
        assert!(matches!(err, OpenAiToolError::Validation(_)));
    }

    #[tokio::test]
    async fn errors_flatten_to_readable_strings() {
        let toolkit = OpenAiToolkit::new(vec![add_tool()], ExecutionMode::Server);
        let out = toolkit.execute_to_string("add", json!({"a": 2})).await;
        assert!(out.starts_with("Error: "));

        let ok = toolkit
            .execute_to_string("add", json!({"a": 2, "b": 2}))
            .await;
        assert_eq!(ok, json!({"sum": 4}).to_string());
    }

    #[tokio::test]
    async fn duplicate_names_resolve_to_the_last_tool() {
        let first = define_tool("dup", "first", Schema::new(), |_| async {
            Ok(json!("first"))
        });
        let second = define_tool("dup", "second", Schema::new(), |_| async {
            Ok(json!("second"))
        });
        let toolkit = OpenAiToolkit::new(vec![first, second], ExecutionMode::Server);

        // Both definitions are still advertised in order.
        assert_eq!(toolkit.definitions().len(), 2);
        let result = toolkit.execute("dup", json!({})).await.unwrap();
        assert_eq!(result, json!("second"));
    }
}
