use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::debug;

use super::base::{Provider, Usage};
use super::configs::OllamaProviderConfig;
use super::streaming::{line_fragments, parse_ndjson_line, FragmentStream};
use super::utils::{messages_to_ollama_spec, ollama_response_to_message, tools_to_openai_spec};
use crate::errors::BackendError;
use crate::models::message::Message;
use crate::models::tool::Tool;

/// A local Ollama server, spoken to through its native `/api/chat` endpoint
pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let input_tokens = data
            .get("prompt_eval_count")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let output_tokens = data
            .get("eval_count")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);
        let total_tokens = match (input_tokens, output_tokens) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    fn payload(&self, messages: &[Message], tools: &[Tool], stream: bool) -> Result<Value> {
        let mut options = Map::new();
        if let Some(temp) = self.config.temperature {
            options.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            options.insert("num_predict".to_string(), json!(tokens));
        }

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_to_ollama_spec(messages),
            "stream": stream,
        });
        let object = payload
            .as_object_mut()
            .ok_or_else(|| anyhow!("payload is not an object"))?;

        if !options.is_empty() {
            object.insert("options".to_string(), Value::Object(options));
        }
        if !tools.is_empty() {
            object.insert("tools".to_string(), json!(tools_to_openai_spec(tools)?));
        }

        Ok(payload)
    }

    async fn post(&self, payload: &Value) -> Result<Response, BackendError> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));
        debug!(url = %url, model = %self.config.model, "ollama chat request");

        let response = self.client.post(&url).json(payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(BackendError::ServerError(status.as_u16()))
            }
            status => Err(BackendError::RequestFailed {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> Result<(Message, Usage)> {
        let payload = self.payload(messages, tools, false)?;

        let response: Value = self
            .post(&payload)
            .await?
            .json()
            .await
            .map_err(BackendError::from)?;

        if let Some(error) = response.get("error").and_then(|e| e.as_str()) {
            return Err(BackendError::Api(error.to_string()).into());
        }

        let message = ollama_response_to_message(&response)?;
        Ok((message, Self::get_usage(&response)))
    }

    async fn stream(&self, messages: &[Message]) -> Result<FragmentStream> {
        let payload = self.payload(messages, &[], true)?;
        let response = self.post(&payload).await?;
        Ok(line_fragments(response.bytes_stream(), parse_ndjson_line))
    }
}
