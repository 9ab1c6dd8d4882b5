use anyhow::Result;
use tracing::debug;

use crate::models::message::Message;
use crate::providers::base::Provider;
use crate::providers::streaming::{collect_text, FragmentStream};

/// The answer to one user turn
pub enum ChatResponse {
    /// The whole answer as a single value
    Complete(String),
    /// Text fragments in emission order; dropping the stream cancels the request
    Streaming(FragmentStream),
}

impl ChatResponse {
    /// Wait for the full answer, draining the stream if there is one
    pub async fn into_text(self) -> Result<String> {
        match self {
            ChatResponse::Complete(text) => Ok(text),
            ChatResponse::Streaming(stream) => collect_text(stream).await,
        }
    }
}

/// A chat with a fixed persona instruction and optional static context.
///
/// Every turn is independent: the backend sees the instruction, the context and the new user
/// text, nothing from earlier turns.
pub struct ChatSession {
    provider: Box<dyn Provider>,
    instruction: Option<String>,
    context: Option<String>,
    streaming: bool,
}

impl ChatSession {
    pub fn new(provider: Box<dyn Provider>) -> Self {
        Self {
            provider,
            instruction: None,
            context: None,
            streaming: true,
        }
    }

    pub fn with_instruction<S: Into<String>>(mut self, instruction: S) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// The messages sent for `user_text`: instruction, context, then the user turn
    pub fn request_messages(&self, user_text: &str) -> Vec<Message> {
        self.instruction
            .iter()
            .chain(self.context.iter())
            .map(|text| Message::system().with_text(text.as_str()))
            .chain(std::iter::once(Message::user().with_text(user_text)))
            .collect()
    }

    /// Send one user turn in the session's configured mode
    pub async fn send(&self, user_text: &str) -> Result<ChatResponse> {
        if self.streaming {
            Ok(ChatResponse::Streaming(self.stream(user_text).await?))
        } else {
            Ok(ChatResponse::Complete(self.complete(user_text).await?))
        }
    }

    pub async fn complete(&self, user_text: &str) -> Result<String> {
        let messages = self.request_messages(user_text);
        debug!(messages = messages.len(), "chat completion");
        let (message, _usage) = self.provider.complete(&messages, &[]).await?;
        Ok(message.text())
    }

    pub async fn stream(&self, user_text: &str) -> Result<FragmentStream> {
        let messages = self.request_messages(user_text);
        debug!(messages = messages.len(), "chat stream");
        self.provider.stream(&messages).await
    }
}
