use anyhow::Result;
use futures::stream::BoxStream;
use futures::TryStreamExt;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, ToolRequest};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};
use crate::prompt_template::load_prompt_file;
use crate::providers::base::Provider;
use crate::registry::ToolRegistry;

#[derive(Clone, Debug, Serialize)]
struct AgentInfo<'a> {
    name: &'a str,
    description: &'a str,
    instruction: &'a str,
    tools: Vec<Tool>,
}

/// Agent couples a backend with the tools it may call and a persona instruction
pub struct Agent {
    name: String,
    description: String,
    instruction: String,
    provider: Box<dyn Provider>,
    registry: ToolRegistry,
}

impl Agent {
    /// Create a new Agent with the specified provider and no tools
    pub fn new<S: Into<String>>(name: S, provider: Box<dyn Provider>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            instruction: String::new(),
            provider,
            registry: ToolRegistry::new(),
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_instruction<S: Into<String>>(mut self, instruction: S) -> Self {
        self.instruction = instruction.into();
        self
    }

    pub fn with_tools(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Declarations of the tools offered to the backend
    pub fn tools(&self) -> Vec<Tool> {
        self.registry.tools()
    }

    /// Render the persona instruction, name and description into the system prompt
    pub fn system_prompt(&self) -> AgentResult<String> {
        let info = AgentInfo {
            name: &self.name,
            description: &self.description,
            instruction: &self.instruction,
            tools: self.registry.tools(),
        };
        load_prompt_file("agent.md", &info).map_err(|e| AgentError::Internal(e.to_string()))
    }

    /// Dispatch a single tool call to the registry
    fn dispatch_tool_call(&self, tool_call: &AgentResult<ToolCall>) -> AgentResult<Value> {
        let call = tool_call.as_ref().map_err(Clone::clone)?;
        self.registry.call(call)
    }

    /// Create a stream that yields each message as it's generated by the agent.
    /// This includes both the assistant's responses and any tool responses.
    ///
    /// The first failing tool call ends the stream with its [`AgentError`].
    pub async fn reply(&self, messages: &[Message]) -> Result<BoxStream<'_, Result<Message>>> {
        let tools = self.registry.tools();
        let mut messages = messages.to_vec();
        messages.insert(0, Message::system().with_text(self.system_prompt()?));

        Ok(Box::pin(async_stream::try_stream! {
            loop {
                let (response, usage) = self.provider.complete(&messages, &tools).await?;
                debug!(agent = %self.name, ?usage, "agent turn");

                yield response.clone();

                // Ensure the response is yielded before tools start running
                tokio::task::yield_now().await;

                let tool_requests: Vec<&ToolRequest> = response.tool_requests();
                if tool_requests.is_empty() {
                    break;
                }

                // Tools run one at a time in the order the backend asked for them
                let mut message_tool_response = Message::user();
                for request in &tool_requests {
                    let output = self.dispatch_tool_call(&request.tool_call)?;
                    message_tool_response =
                        message_tool_response.with_tool_response(request.id.clone(), output);
                }

                yield message_tool_response.clone();

                messages.push(response.clone());
                messages.push(message_tool_response);
            }
        }))
    }

    /// Run one exchange for `user_text` and return the backend's final answer
    pub async fn handle(&self, user_text: &str) -> Result<String> {
        let messages = vec![Message::user().with_text(user_text)];
        let mut stream = self.reply(&messages).await?;

        let mut answer = String::new();
        while let Some(message) = stream.try_next().await? {
            if message.role == Role::Assistant {
                answer = message.text();
            }
        }
        Ok(answer)
    }
}
