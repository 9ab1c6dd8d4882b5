use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;
use tracing::info;

use crate::errors::{AgentError, AgentResult};
use crate::models::tool::{Tool, ToolCall};
use crate::providers::utils::is_valid_function_name;

type Handler = Arc<dyn Fn(Value) -> AgentResult<Value> + Send + Sync>;

/// A tool declaration paired with the function that runs it
#[derive(Clone)]
pub struct RegisteredTool {
    pub tool: Tool,
    handler: Handler,
}

impl RegisteredTool {
    pub fn call(&self, arguments: Value) -> AgentResult<Value> {
        (self.handler)(arguments)
    }
}

/// The tools an agent may offer to its model, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a typed handler.
    ///
    /// The model's JSON arguments are deserialized into `A` before the handler runs, and the
    /// handler's output is serialized back to JSON. Deserialization failures surface as
    /// [`AgentError::InvalidParameters`], handler failures as [`AgentError::ExecutionError`].
    pub fn register<A, R, E, F>(&mut self, tool: Tool, handler: F) -> AgentResult<()>
    where
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
        E: Display + 'static,
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        if !is_valid_function_name(&tool.name) {
            return Err(AgentError::InvalidToolName(tool.name));
        }
        if self.get(&tool.name).is_some() {
            return Err(AgentError::DuplicateTool(tool.name));
        }

        let name = tool.name.clone();
        let handler: Handler = Arc::new(move |arguments: Value| {
            let args: A = serde_json::from_value(arguments).map_err(|e| {
                AgentError::InvalidParameters(format!("{} received bad arguments: {}", name, e))
            })?;
            let output = handler(args).map_err(|e| AgentError::ExecutionError(e.to_string()))?;
            serde_json::to_value(output).map_err(|e| AgentError::Internal(e.to_string()))
        });

        self.tools.push(RegisteredTool { tool, handler });
        Ok(())
    }

    /// Builder form of [`ToolRegistry::register`]
    pub fn with_tool<A, R, E, F>(mut self, tool: Tool, handler: F) -> AgentResult<Self>
    where
        A: DeserializeOwned + 'static,
        R: Serialize + 'static,
        E: Display + 'static,
        F: Fn(A) -> Result<R, E> + Send + Sync + 'static,
    {
        self.register(tool, handler)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|registered| registered.tool.name == name)
    }

    /// Declarations of every registered tool, as offered to the model
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.iter().map(|registered| registered.tool.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the tool named by `tool_call` with the call's arguments
    pub fn call(&self, tool_call: &ToolCall) -> AgentResult<Value> {
        let registered = self
            .get(&tool_call.name)
            .ok_or_else(|| AgentError::ToolNotFound(tool_call.name.clone()))?;

        info!(tool = %tool_call.name, arguments = %tool_call.arguments, "calling tool");
        registered.call(tool_call.arguments.clone())
    }
}
