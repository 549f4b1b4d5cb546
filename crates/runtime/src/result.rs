use serde::{Deserialize, Serialize};

/// Result envelope for one tool invocation.
///
/// Business-level failures (bad arguments, backend rejections) live inside
/// this envelope with `is_error = true`; they are never transport errors.
/// Ownership passes to whichever transport serializes the response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallResult {
    pub content: Vec<ContentPart>,
    #[serde(
        rename = "isError",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub is_error: bool,
}

/// One content block within a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentPart {
    Text { value: String },
}

impl CallResult {
    /// Successful result with a single text part.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text {
                value: value.into(),
            }],
            is_error: false,
        }
    }

    /// Error result with a single text part.
    pub fn error(value: impl Into<String>) -> Self {
        Self {
            content: vec![ContentPart::Text {
                value: value.into(),
            }],
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_wire_shape() {
        let result = CallResult::text("Added todo: Buy milk");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "content": [{"kind": "text", "value": "Added todo: Buy milk"}]
            })
        );
    }

    #[test]
    fn test_error_wire_shape() {
        let result = CallResult::error("boom");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], serde_json::json!(true));
    }

    #[test]
    fn test_is_error_omitted_when_false() {
        let json = serde_json::to_string(&CallResult::text("ok")).unwrap();
        assert!(!json.contains("isError"));
    }

    #[test]
    fn test_deserialize_defaults_is_error() {
        let result: CallResult =
            serde_json::from_str(r#"{"content":[{"kind":"text","value":"hi"}]}"#).unwrap();
        assert!(!result.is_error);
    }
}
