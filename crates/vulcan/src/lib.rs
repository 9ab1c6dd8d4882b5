pub mod agent;
pub mod chat;
pub mod errors;
pub mod models;
pub mod personas;
pub mod pizza;
pub mod prompt_template;
pub mod providers;
pub mod registry;
