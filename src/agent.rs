use anyhow::{Context, Result};

use crate::conversation::{Conversation, FunctionCall, Message, ToolCall};
use crate::ollama::{ChatModel, ToolDefinition};
use crate::tools::NoteTool;

/// Reasoning loop that turns a conversation into a finished one.
///
/// The runner only depends on this trait, so any engine that can drive the
/// note tools can be plugged in.
#[async_trait::async_trait]
pub trait AgentLoop: Send + Sync {
    async fn invoke(&self, conversation: Conversation) -> Result<Conversation>;
}

/// Tool-calling loop over a [`ChatModel`] with the note tools registered.
pub struct OllamaAgentLoop<M> {
    model: M,
    tools: Vec<ToolDefinition>,
    max_iterations: usize,
}

impl<M: ChatModel> OllamaAgentLoop<M> {
    pub fn new(model: M, max_iterations: usize) -> Self {
        Self {
            model,
            tools: NoteTool::definitions(),
            max_iterations,
        }
    }

    /// Tool calls in `message`, including ones the model wrote as plain JSON
    /// text instead of using the native `tool_calls` field.
    fn requested_calls(message: &Message) -> Vec<ToolCall> {
        if !message.tool_calls().is_empty() {
            return message.tool_calls().to_vec();
        }
        parse_tool_call_from_text(&message.content)
            .into_iter()
            .collect()
    }
}

#[async_trait::async_trait]
impl<M: ChatModel> AgentLoop for OllamaAgentLoop<M> {
    async fn invoke(&self, mut conversation: Conversation) -> Result<Conversation> {
        for iteration in 1..=self.max_iterations {
            log::info!("Agent: iteration {} - consulting model", iteration);

            let reply = self
                .model
                .chat(conversation.messages(), &self.tools)
                .await
                .context("Agent: model call failed")?;

            let calls = Self::requested_calls(&reply);
            conversation.push(reply);

            if calls.is_empty() {
                log::info!(
                    "Agent: final answer after {} iteration(s), {} message(s)",
                    iteration,
                    conversation.len()
                );
                return Ok(conversation);
            }

            for call in &calls {
                log::info!("Agent: invoking tool {}", call.function.name);
                let result = NoteTool::dispatch(call).await;
                conversation.push(Message::tool(result));
            }
        }

        anyhow::bail!(
            "Agent: no final answer after {} iterations",
            self.max_iterations
        )
    }
}

/// Recognise a whole-message JSON tool call for one of the note tools.
///
/// Accepts `{"name": ..., "arguments": {...}}` and the `"parameters"` spelling
/// some models use.
fn parse_tool_call_from_text(content: &str) -> Option<ToolCall> {
    let value: serde_json::Value = serde_json::from_str(content.trim()).ok()?;
    let name = value.get("name")?.as_str()?;

    if !NoteTool::definitions().iter().any(|d| d.function.name == name) {
        return None;
    }

    let arguments = value
        .get("arguments")
        .or_else(|| value.get("parameters"))
        .filter(|args| args.is_object())?
        .clone();

    Some(ToolCall {
        function: FunctionCall {
            name: name.to_string(),
            arguments,
        },
    })
}

/// Runs one user query through an agent loop and returns the final text.
pub struct AgentRunner {
    agent: Box<dyn AgentLoop>,
    system_prompt: String,
}

impl AgentRunner {
    pub fn new(agent: Box<dyn AgentLoop>, system_prompt: impl Into<String>) -> Self {
        Self {
            agent,
            system_prompt: system_prompt.into(),
        }
    }

    /// Never fails: any error from the loop is returned as `Error: ...` text.
    pub async fn run(&self, user_input: &str) -> String {
        let conversation = Conversation::new(self.system_prompt.clone(), user_input);

        match self.invoke(conversation).await {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("Agent failed: {:#}", e);
                format!("Error: {:#}", e)
            }
        }
    }

    async fn invoke(&self, conversation: Conversation) -> Result<String> {
        let result = self.agent.invoke(conversation).await?;
        let last = result
            .last()
            .context("Agent returned an empty conversation")?;
        Ok(last.content.clone())
    }
}
