//! Ready-made personas: the Spock chat and agent, and Bob the pizza expert.
pub mod bob;
pub mod spock;

pub use bob::bob_agent;
pub use spock::{spock_agent, spock_chat};
