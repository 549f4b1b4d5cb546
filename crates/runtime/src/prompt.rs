//! Prompt templates: fixed messages with named argument substitution.
//!
//! Rendering is pure and cannot fail. A missing required argument renders as
//! an empty placeholder and logs a warning; prompts are advisory text for an
//! agent, so a template hole is diagnosable without aborting the call (see
//! DESIGN.md).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::result::ContentPart;

/// Describes a prompt in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptDefinition {
    pub name: String,
    pub description: String,
    pub arguments: Vec<PromptArgument>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    pub title: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: String,
    pub content: ContentPart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetPromptResult {
    pub messages: Vec<PromptMessage>,
}

/// A registered prompt: definition plus the template it renders.
///
/// Placeholders are `{argument-name}`; each declared argument is substituted
/// with its supplied value (numbers render bare, strings unquoted).
pub struct PromptTemplate {
    definition: PromptDefinition,
    role: String,
    template: String,
}

impl PromptTemplate {
    pub fn new(
        definition: PromptDefinition,
        role: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            definition,
            role: role.into(),
            template: template.into(),
        }
    }

    pub fn definition(&self) -> PromptDefinition {
        self.definition.clone()
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Substitute arguments into the template.
    pub fn render(&self, arguments: &Map<String, Value>) -> GetPromptResult {
        let mut text = self.template.clone();
        for arg in &self.definition.arguments {
            let value = arguments.get(&arg.name).map(render_value).unwrap_or_default();
            if value.is_empty() && arg.required {
                tracing::warn!(
                    prompt = %self.definition.name,
                    argument = %arg.name,
                    "required prompt argument missing, rendering empty"
                );
            }
            text = text.replace(&format!("{{{}}}", arg.name), &value);
        }

        GetPromptResult {
            messages: vec![PromptMessage {
                role: self.role.clone(),
                content: ContentPart::Text { value: text },
            }],
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Prompt guiding the agent toward the todos-add tool.
pub fn add_todo_prompt() -> PromptTemplate {
    PromptTemplate::new(
        PromptDefinition {
            name: "todos-add".to_string(),
            description: "Phrase a request to create a todo item".to_string(),
            arguments: vec![
                PromptArgument {
                    name: "title".to_string(),
                    title: "Title of the todo item".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "due_date".to_string(),
                    title: "Due date of the todo item (optional)".to_string(),
                    required: false,
                },
            ],
        },
        "system",
        "#todos-add({title}, {due_date})",
    )
}

/// Prompt guiding the agent toward the todos-update tool.
pub fn update_todo_prompt() -> PromptTemplate {
    PromptTemplate::new(
        PromptDefinition {
            name: "todos-update".to_string(),
            description: "Phrase a request to update a todo item".to_string(),
            arguments: vec![
                PromptArgument {
                    name: "id".to_string(),
                    title: "ID of the todo item".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "title".to_string(),
                    title: "Title of the todo item".to_string(),
                    required: true,
                },
                PromptArgument {
                    name: "due_date".to_string(),
                    title: "Due date of the todo item (optional)".to_string(),
                    required: false,
                },
            ],
        },
        "system",
        "#todos-update({id}, {title}, {due_date})",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_render_substitutes_all_arguments() {
        let prompt = add_todo_prompt();
        let result = prompt.render(&args(&[
            ("title", Value::String("Buy milk".to_string())),
            ("due_date", Value::String("2025-02-01".to_string())),
        ]));
        let ContentPart::Text { value } = &result.messages[0].content;
        assert_eq!(value, "#todos-add(Buy milk, 2025-02-01)");
        assert_eq!(result.messages[0].role, "system");
    }

    #[test]
    fn test_render_numeric_argument() {
        let prompt = update_todo_prompt();
        let result = prompt.render(&args(&[
            ("id", Value::Number(7.into())),
            ("title", Value::String("New".to_string())),
        ]));
        let ContentPart::Text { value } = &result.messages[0].content;
        assert_eq!(value, "#todos-update(7, New, )");
    }

    #[test]
    fn test_missing_required_argument_renders_empty() {
        let prompt = add_todo_prompt();
        let result = prompt.render(&args(&[]));
        let ContentPart::Text { value } = &result.messages[0].content;
        assert_eq!(value, "#todos-add(, )");
    }
}
