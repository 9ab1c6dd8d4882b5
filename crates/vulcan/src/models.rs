//! These models represent the objects passed between a chat session, an agent and a backend.
//!
//! Two wire formats are involved: the OpenAI-compatible chat completions API and the native
//! Ollama chat API. Both are converted to and from these internal structs in
//! `providers::utils`, so the models do not match either format exactly.
pub mod message;
pub mod role;
pub mod tool;
