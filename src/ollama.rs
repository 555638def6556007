use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversation::Message;

/// Tool definition advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: ToolFunction,
}

/// Function specification for a tool
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolFunction {
    pub name: String,
    pub description: String,
    /// JSON schema
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn function(name: &str, description: &str, parameters: serde_json::Value) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: ToolFunction {
                name: name.to_string(),
                description: description.to_string(),
                parameters,
            },
        }
    }
}

/// A chat-capable model the agent loop can consult.
#[async_trait::async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the conversation so far and return the model's next message.
    async fn chat(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message>;
}

/// Check that an Ollama server answers at `endpoint`.
///
/// Returns the body of `GET /`, which is `Ollama is running` on a healthy
/// server. Any HTTP status counts as reachable; only transport failures are
/// errors.
pub async fn probe(endpoint: &str) -> Result<String, reqwest::Error> {
    let response = reqwest::get(endpoint).await?;
    let status = response.status();
    let text = response.text().await?;
    log::debug!("Ollama: probe {} answered {}", endpoint, status);
    Ok(text)
}

/// HTTP client bound to one Ollama endpoint and model.
pub struct OllamaClient {
    pub endpoint: String,
    pub model: String,
    pub temperature: f32,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    tools: &'a [ToolDefinition],
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<Message>,
}

impl OllamaClient {
    pub fn new(endpoint: &str, model: &str, temperature: f32) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/');
        reqwest::Url::parse(endpoint)
            .with_context(|| format!("Invalid Ollama endpoint '{}'", endpoint))?;

        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            model: model.to_string(),
            temperature,
            client,
        })
    }
}

#[async_trait::async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, messages: &[Message], tools: &[ToolDefinition]) -> Result<Message> {
        let body = ChatRequest {
            model: &self.model,
            messages,
            tools,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };

        log::debug!("Ollama: chat with {} message(s)", messages.len());

        let response = self.client
            .post(format!("{}/api/chat", self.endpoint))
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Ollama API error ({}): {}", status, error_text);
        }

        let response: ChatResponse = response.json().await
            .context("Failed to parse Ollama response")?;

        response.message.context("No message in Ollama response")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_probe_returns_status_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .with_status(200)
            .with_body("Ollama is running")
            .create_async()
            .await;

        let text = probe(&server.url()).await.unwrap();
        assert_eq!(text, "Ollama is running");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_probe_unreachable() {
        assert!(probe("http://127.0.0.1:1").await.is_err());
    }

    #[test]
    fn test_new_rejects_invalid_endpoint() {
        assert!(OllamaClient::new("not a url", "llama3.2", 0.0).is_err());
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.2", 0.0).unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_chat_sends_model_tools_and_temperature() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama3.2",
                "stream": false,
                "options": { "temperature": 0.0 },
                "messages": [
                    { "role": "system", "content": "persona" },
                    { "role": "user", "content": "hi" }
                ],
                "tools": [
                    {
                        "type": "function",
                        "function": {
                            "name": "read_note",
                            "description": "Read the contents of a text file.",
                            "parameters": { "type": "object" }
                        }
                    }
                ]
            })))
            .with_status(200)
            .with_body(r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hello!"},"done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), "llama3.2", 0.0).unwrap();
        let tools = vec![ToolDefinition::function(
            "read_note",
            "Read the contents of a text file.",
            serde_json::json!({ "type": "object" }),
        )];
        let reply = client
            .chat(&[Message::system("persona"), Message::user("hi")], &tools)
            .await
            .unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.content, "Hello!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_chat_surfaces_api_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(404)
            .with_body(r#"{"error":"model 'llama3.2' not found"}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), "llama3.2", 0.0).unwrap();
        let err = client.chat(&[Message::user("hi")], &[]).await.unwrap_err();
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("not found"));
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(200)
            .with_body(r#"{"done":true}"#)
            .create_async()
            .await;

        let client = OllamaClient::new(&server.url(), "llama3.2", 0.0).unwrap();
        let err = client.chat(&[Message::user("hi")], &[]).await.unwrap_err();
        assert!(err.to_string().contains("No message"));
    }
}
