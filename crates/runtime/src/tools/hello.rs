use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use todo_gateway_core::TraceContext;

use crate::result::CallResult;
use crate::tool::{parse_arguments, text_output_schema, ToolDefinition, ToolHandler};

/// Greeting tool; makes no backend calls.
pub struct HelloTool;

#[derive(Debug, Deserialize)]
struct HelloInput {
    #[serde(default)]
    name: Option<String>,
}

#[async_trait]
impl ToolHandler for HelloTool {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: "hello".to_string(),
            description: "A simple hello world tool that greets you and says hello back"
                .to_string(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "The name to greet"
                    }
                },
                "required": ["name"]
            }),
            output_schema: text_output_schema(),
        }
    }

    async fn execute(&self, arguments: Value, _ctx: &TraceContext) -> CallResult {
        let input: HelloInput = match parse_arguments(arguments) {
            Ok(input) => input,
            Err(result) => return result,
        };

        let name = match input.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => {
                return CallResult::error(
                    "Error: name parameter is required and must be a non-empty string",
                )
            }
        };

        CallResult::text(format!(
            "Hello, {name}! Welcome to the Todo MCP server. Hello back to you!"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ContentPart;

    #[tokio::test]
    async fn test_greets_by_name() {
        let result = HelloTool
            .execute(serde_json::json!({"name": "Ada"}), &TraceContext::new())
            .await;
        assert!(!result.is_error);
        let ContentPart::Text { value } = &result.content[0];
        assert!(value.contains("Hello, Ada!"));
    }

    #[tokio::test]
    async fn test_missing_name_is_error_result() {
        let result = HelloTool
            .execute(serde_json::json!({}), &TraceContext::new())
            .await;
        assert!(result.is_error);
        let ContentPart::Text { value } = &result.content[0];
        assert!(value.contains("name parameter is required"));
    }

    #[tokio::test]
    async fn test_empty_name_is_error_result() {
        let result = HelloTool
            .execute(serde_json::json!({"name": ""}), &TraceContext::new())
            .await;
        assert!(result.is_error);
    }
}
