pub mod note_reader;
pub mod note_writer;

pub use note_reader::{ReadNote, ReadNoteArgs};
pub use note_writer::{WriteNote, WriteNoteArgs};

use crate::conversation::ToolCall;
use crate::ollama::ToolDefinition;

/// Tool trait for agent-orchestrated operations.
///
/// `run` is infallible: failures are reported as text in `Output` so the
/// agent loop can show them to the model.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    type Input: Send;
    type Output: Send;

    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments the model must supply.
    fn parameters(&self) -> serde_json::Value;
    async fn run(&self, input: Self::Input) -> Self::Output;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition::function(self.name(), self.description(), self.parameters())
    }
}

/// Reasons a model tool call could not be turned into a [`NoteTool`].
#[derive(Debug, thiserror::Error)]
pub enum ToolCallError {
    #[error("unknown tool '{0}'. Available tools: read_note, write_note")]
    Unknown(String),
    #[error("invalid arguments for '{tool}': {source}")]
    InvalidArguments {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One invocation of a note tool, with typed arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteTool {
    ReadNote(ReadNoteArgs),
    WriteNote(WriteNoteArgs),
}

impl NoteTool {
    /// Definitions of every note tool, as advertised to the model.
    pub fn definitions() -> Vec<ToolDefinition> {
        vec![ReadNote.definition(), WriteNote.definition()]
    }

    pub fn from_call(call: &ToolCall) -> Result<Self, ToolCallError> {
        let name = call.function.name.as_str();
        let arguments = call.function.arguments.clone();
        let invalid = |source| ToolCallError::InvalidArguments {
            tool: name.to_string(),
            source,
        };

        match name {
            note_reader::NAME => serde_json::from_value(arguments)
                .map(NoteTool::ReadNote)
                .map_err(invalid),
            note_writer::NAME => serde_json::from_value(arguments)
                .map(NoteTool::WriteNote)
                .map_err(invalid),
            other => Err(ToolCallError::Unknown(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NoteTool::ReadNote(_) => note_reader::NAME,
            NoteTool::WriteNote(_) => note_writer::NAME,
        }
    }

    pub async fn invoke(self) -> String {
        match self {
            NoteTool::ReadNote(args) => ReadNote.run(args).await,
            NoteTool::WriteNote(args) => WriteNote.run(args).await,
        }
    }

    /// Run a raw model tool call, turning dispatch failures into error text.
    pub async fn dispatch(call: &ToolCall) -> String {
        match Self::from_call(call) {
            Ok(tool) => {
                log::debug!("Dispatching {}", tool.name());
                tool.invoke().await
            }
            Err(e) => {
                log::warn!("Tool dispatch failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::FunctionCall;
    use serde_json::json;

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall {
            function: FunctionCall {
                name: name.to_string(),
                arguments,
            },
        }
    }

    #[test]
    fn test_definitions_cover_both_tools() {
        let defs = NoteTool::definitions();
        let names: Vec<&str> = defs.iter().map(|d| d.function.name.as_str()).collect();
        assert_eq!(names, vec!["read_note", "write_note"]);
        assert_eq!(defs[0].function.description, "Read the contents of a text file.");
        assert_eq!(defs[1].function.parameters["required"], json!(["filepath", "content"]));
    }

    #[test]
    fn test_from_call_read_note() {
        let tool = NoteTool::from_call(&call("read_note", json!({ "filepath": "a.txt" }))).unwrap();
        assert_eq!(
            tool,
            NoteTool::ReadNote(ReadNoteArgs {
                filepath: "a.txt".to_string()
            })
        );
        assert_eq!(tool.name(), "read_note");
    }

    #[test]
    fn test_from_call_write_note() {
        let tool = NoteTool::from_call(&call(
            "write_note",
            json!({ "filepath": "b.txt", "content": "hi" }),
        ))
        .unwrap();
        assert_eq!(
            tool,
            NoteTool::WriteNote(WriteNoteArgs {
                filepath: "b.txt".to_string(),
                content: "hi".to_string(),
            })
        );
    }

    #[test]
    fn test_from_call_unknown_tool() {
        let err = NoteTool::from_call(&call("delete_note", json!({}))).unwrap_err();
        assert!(matches!(err, ToolCallError::Unknown(ref name) if name == "delete_note"));
    }

    #[test]
    fn test_from_call_missing_argument() {
        let err = NoteTool::from_call(&call("write_note", json!({ "filepath": "b.txt" }))).unwrap_err();
        assert!(err.to_string().contains("write_note"));
        assert!(err.to_string().contains("content"));
    }

    #[tokio::test]
    async fn test_dispatch_reports_errors_as_text() {
        let result = NoteTool::dispatch(&call("read_note", json!({ "path": "x" }))).await;
        assert!(result.starts_with("Error: invalid arguments for 'read_note'"));

        let result = NoteTool::dispatch(&call("rm", json!({}))).await;
        assert!(result.starts_with("Error: unknown tool 'rm'"));
    }

    #[tokio::test]
    async fn test_dispatch_runs_tool() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        let path = path.to_str().unwrap();

        let written = NoteTool::dispatch(&call(
            "write_note",
            json!({ "filepath": path, "content": "buy milk" }),
        ))
        .await;
        assert_eq!(written, format!("Successfully wrote 8 characters to '{}'.", path));

        let read = NoteTool::dispatch(&call("read_note", json!({ "filepath": path }))).await;
        assert_eq!(read, format!("Contents of '{}':\nbuy milk", path));
    }
}
