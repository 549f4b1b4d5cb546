use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use todo_gateway_core::TraceContext;

use crate::result::CallResult;

/// Describes a tool's interface for agent consumption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name (e.g. "todos-add").
    pub name: String,
    /// Human-readable description for the agent.
    pub description: String,
    /// JSON Schema describing the expected input.
    pub input_schema: Value,
    /// JSON Schema describing the result content.
    pub output_schema: Value,
}

/// One handler per tool, resolved by name in the registry at startup.
///
/// `execute` always produces a well-formed `CallResult`: argument problems
/// and backend failures come back as `is_error` results, never as panics or
/// fallible returns.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn definition(&self) -> ToolDefinition;

    async fn execute(&self, arguments: Value, ctx: &TraceContext) -> CallResult;
}

impl fmt::Display for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.description)
    }
}

/// Deserialize a tool's arguments into its input struct.
///
/// Absent arguments arrive as `Null`; those are treated as an empty object
/// so per-field validation can name what is missing instead of reporting a
/// type mismatch on the whole payload.
pub fn parse_arguments<T: serde::de::DeserializeOwned>(arguments: Value) -> Result<T, CallResult> {
    let arguments = match arguments {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(arguments)
        .map_err(|e| CallResult::error(format!("Error: invalid arguments: {e}")))
}

/// Schema stub for tools whose result is a single text part.
pub fn text_output_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "kind": {"type": "string", "enum": ["text"]},
                        "value": {"type": "string"}
                    }
                }
            },
            "isError": {"type": "boolean"}
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_serialization_uses_camel_case() {
        let def = ToolDefinition {
            name: "todos-add".to_string(),
            description: "Add a todo".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
            output_schema: text_output_schema(),
        };
        let json = serde_json::to_value(&def).unwrap();
        assert!(json.get("inputSchema").is_some());
        assert!(json.get("outputSchema").is_some());
        assert!(json.get("input_schema").is_none());
    }
}
