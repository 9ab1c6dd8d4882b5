use anyhow::{anyhow, Result};
use regex::Regex;
use serde_json::{json, Value};

use crate::errors::{AgentError, BackendError};
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role
        });

        let mut output = Vec::new();

        let text = message.text();
        if !text.is_empty() {
            converted["content"] = json!(text);
        }

        for content in &message.content {
            match content {
                MessageContent::Text(_) => {}
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => {
                        let sanitized_name = sanitize_function_name(&tool_call.name);
                        push_tool_call(
                            &mut converted,
                            json!({
                                "id": request.id,
                                "type": "function",
                                "function": {
                                    "name": sanitized_name,
                                    "arguments": tool_call.arguments.to_string(),
                                }
                            }),
                        );
                    }
                    Err(e) => {
                        output.push(json!({
                            "role": "tool",
                            "content": format!("Error: {}", e),
                            "tool_call_id": request.id
                        }));
                    }
                },
                MessageContent::ToolResponse(response) => {
                    output.push(json!({
                        "role": "tool",
                        "content": tool_result_text(&response.tool_result),
                        "tool_call_id": response.id
                    }));
                }
            }
        }

        if converted.get("content").is_some() || converted.get("tool_calls").is_some() {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Message format to Ollama's native chat message specification
pub fn messages_to_ollama_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = json!({
            "role": message.role,
            "content": message.text(),
        });

        let mut output = Vec::new();
        let mut has_tool_calls = false;

        for content in &message.content {
            match content {
                MessageContent::Text(_) => {}
                MessageContent::ToolRequest(request) => match &request.tool_call {
                    Ok(tool_call) => {
                        has_tool_calls = true;
                        push_tool_call(
                            &mut converted,
                            json!({
                                "function": {
                                    "name": sanitize_function_name(&tool_call.name),
                                    "arguments": tool_call.arguments,
                                }
                            }),
                        );
                    }
                    Err(e) => output.push(json!({
                        "role": "tool",
                        "content": format!("Error: {}", e),
                    })),
                },
                MessageContent::ToolResponse(response) => output.push(json!({
                    "role": "tool",
                    "content": tool_result_text(&response.tool_result),
                })),
            }
        }

        // A message holding only tool responses is replaced by the tool messages
        let only_tool_responses = !message.content.is_empty()
            && message
                .content
                .iter()
                .all(|content| content.as_tool_response().is_some());
        if has_tool_calls || !only_tool_responses {
            output.insert(0, converted);
        }
        messages_spec.extend(output);
    }

    messages_spec
}

fn push_tool_call(converted: &mut Value, tool_call: Value) {
    if let Some(object) = converted.as_object_mut() {
        let tool_calls = object.entry("tool_calls").or_insert_with(|| json!([]));
        if let Some(array) = tool_calls.as_array_mut() {
            array.push(tool_call);
        }
    }
}

/// Render a tool result the way a model reads it: strings verbatim, everything else as JSON
pub fn tool_result_text(result: &Value) -> String {
    match result {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Convert internal Tool format to OpenAI's API tool specification.
/// Ollama accepts the same shape.
pub fn tools_to_openai_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = std::collections::HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.input_schema,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
pub fn openai_response_to_message(response: &Value) -> Result<Message> {
    let original = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| {
            BackendError::MalformedResponse(format!("No choices in response: {}", response))
        })?;

    let mut message = Message::assistant();

    if let Some(text) = original.get("content").and_then(|text| text.as_str()) {
        message = message.with_text(text);
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|calls| calls.as_array()) {
        for tool_call in tool_calls {
            let id = tool_call["id"].as_str().unwrap_or_default().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let arguments = tool_call["function"]["arguments"]
                .as_str()
                .unwrap_or_default();

            let parsed = if arguments.trim().is_empty() {
                Ok(json!({}))
            } else {
                serde_json::from_str::<Value>(arguments).map_err(|e| e.to_string())
            };
            message = message.with_content(tool_request_content(id, function_name, parsed));
        }
    }

    Ok(message)
}

/// Convert Ollama's native chat response to internal Message format
pub fn ollama_response_to_message(response: &Value) -> Result<Message> {
    let original = response.get("message").ok_or_else(|| {
        BackendError::MalformedResponse(format!("No message in response: {}", response))
    })?;

    let mut message = Message::assistant();

    if let Some(text) = original.get("content").and_then(|text| text.as_str()) {
        if !text.is_empty() {
            message = message.with_text(text);
        }
    }

    if let Some(tool_calls) = original.get("tool_calls").and_then(|calls| calls.as_array()) {
        for tool_call in tool_calls {
            // Ollama does not assign call ids
            let id = uuid::Uuid::new_v4().to_string();
            let function_name = tool_call["function"]["name"]
                .as_str()
                .unwrap_or_default()
                .to_string();
            let parsed = match &tool_call["function"]["arguments"] {
                Value::String(raw) => serde_json::from_str::<Value>(raw).map_err(|e| e.to_string()),
                Value::Null => Ok(json!({})),
                other => Ok(other.clone()),
            };
            message = message.with_content(tool_request_content(id, function_name, parsed));
        }
    }

    Ok(message)
}

fn tool_request_content(
    id: String,
    function_name: String,
    arguments: std::result::Result<Value, String>,
) -> MessageContent {
    if !is_valid_function_name(&function_name) {
        let error = AgentError::ToolNotFound(format!(
            "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
            function_name
        ));
        return MessageContent::tool_request(id, Err(error));
    }

    match arguments {
        Ok(params) => MessageContent::tool_request(id, Ok(ToolCall::new(function_name, params))),
        Err(e) => {
            let error = AgentError::InvalidParameters(format!(
                "Could not interpret tool use parameters for id {}: {}",
                id, e
            ));
            MessageContent::tool_request(id, Err(error))
        }
    }
}

pub fn sanitize_function_name(name: &str) -> String {
    let re = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    re.replace_all(name, "_").to_string()
}

pub fn is_valid_function_name(name: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
    re.is_match(name)
}

pub fn check_openai_context_length_error(error: &Value) -> Option<BackendError> {
    let code = error.get("code")?.as_str()?;
    if code == "context_length_exceeded" || code == "string_above_max_length" {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error")
            .to_string();
        Some(BackendError::ContextLengthExceeded(message))
    } else {
        None
    }
}
