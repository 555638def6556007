use serde::Deserialize;
use super::Tool;

pub const NAME: &str = "write_note";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WriteNoteArgs {
    pub filepath: String,
    pub content: String,
}

/// Writes a UTF-8 text file, replacing any existing content.
pub struct WriteNote;

/// Create or truncate `filepath` and write `content` to it.
///
/// Reports the number of characters (not bytes) written. The write is not
/// atomic: a crash mid-write can leave a partial file.
pub fn write_note(filepath: &str, content: &str) -> String {
    match std::fs::write(filepath, content) {
        Ok(()) => {
            let chars = content.chars().count();
            log::info!("WriteNote: wrote {} chars to {}", chars, filepath);
            format!("Successfully wrote {} characters to '{}'.", chars, filepath)
        }
        Err(e) => {
            log::warn!("WriteNote: failed to write {}: {}", filepath, e);
            format!("Error writing file: {}", e)
        }
    }
}

#[async_trait::async_trait]
impl Tool for WriteNote {
    type Input = WriteNoteArgs;
    type Output = String;

    fn name(&self) -> &str {
        NAME
    }

    fn description(&self) -> &str {
        "Write content to a text file. This will overwrite the file if it exists."
    }

    fn parameters(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "filepath": {
                    "type": "string",
                    "description": "Path of the file to write"
                },
                "content": {
                    "type": "string",
                    "description": "Full text to store in the file"
                }
            },
            "required": ["filepath", "content"]
        })
    }

    async fn run(&self, args: WriteNoteArgs) -> String {
        write_note(&args.filepath, &args.content)
    }
}
