use serde::Deserialize;
use std::io::ErrorKind;
use super::Tool;

pub const NAME: &str = "read_note";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReadNoteArgs {
    pub filepath: String,
}

/// Reads a UTF-8 text file and returns its contents.
pub struct ReadNote;

/// Read `filepath` as UTF-8 text. Never fails: errors are returned as text.
///
/// The whole file is loaded into memory, whatever its size.
pub fn read_note(filepath: &str) -> String {
    match std::fs::read_to_string(filepath) {
        Ok(content) => {
            log::info!("ReadNote: read {} chars from {}", content.chars().count(), filepath);
            format!("Contents of '{}':\n{}", filepath, content)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("ReadNote: {} not found", filepath);
            format!("Error: File '{}' not found.", filepath)
        }
        Err(e) => {
            log::warn!("ReadNote: failed to read {}: {}", filepath, e);
            format!("Error reading file: {}", e)
        }
    }
}

#[async_trait::async_trait]
impl Tool for ReadNote {
    type Input = ReadNoteArgs;
    type Output = String;

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Read the contents of a text file."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filepath": {
                    "type": "string",
                    "description": "Path of the file to read"
                }
            },
            "required": ["filepath"]
        })
    }

    async fn run(&self, args: ReadNoteArgs) -> String {
        read_note(&args.filepath)
    }
}
