//! Tool, resource, and prompt runtime for the todo gateway.
//!
//! - **result**: the `CallResult` envelope every tool invocation produces
//! - **tool**: the `ToolHandler` trait and `ToolDefinition`
//! - **tools**: one handler per tool (hello, todos-add/list/update/delete)
//! - **resource**: locator parsing and readable views over backend data
//! - **prompt**: fixed message templates with argument substitution
//! - **registry**: name → handler lookup, built once at startup

pub mod prompt;
pub mod registry;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
pub mod resource;
pub mod result;
pub mod tool;
pub mod tools;

pub use prompt::{GetPromptResult, PromptArgument, PromptDefinition, PromptMessage, PromptTemplate};
pub use registry::{Registry, RegistryError};
pub use resource::{ReadResult, ResourceContents, ResourceDefinition, ResourceError, ResourceHandler};
pub use result::{CallResult, ContentPart};
pub use tool::{ToolDefinition, ToolHandler};
