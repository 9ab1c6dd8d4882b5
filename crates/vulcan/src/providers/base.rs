use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::streaming::FragmentStream;
use crate::models::message::Message;
use crate::models::tool::Tool;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// Base trait for LLM backends (OpenAI-compatible servers, Ollama, ...)
///
/// `messages` is the full ordered request: system messages first, then the conversation.
/// The model identifier and generation options come from the provider's configuration.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Generate the next message, offering `tools` to the model
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<(Message, Usage)>;

    /// Generate the next message as an ordered stream of text fragments
    async fn stream(&self, messages: &[Message]) -> Result<FragmentStream>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_usage_creation() {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        assert_eq!(usage.input_tokens, Some(10));
        assert_eq!(usage.output_tokens, Some(20));
        assert_eq!(usage.total_tokens, Some(30));
        assert_eq!(Usage::default().total_tokens, None);
    }

    #[test]
    fn test_usage_serialization() -> Result<()> {
        let usage = Usage::new(Some(10), Some(20), Some(30));
        let json_value = serde_json::to_value(&usage)?;
        assert_eq!(json_value["input_tokens"], json!(10));
        assert_eq!(json_value["output_tokens"], json!(20));
        assert_eq!(json_value["total_tokens"], json!(30));
        Ok(())
    }
}
