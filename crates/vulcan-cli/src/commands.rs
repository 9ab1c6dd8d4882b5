pub mod agent;
pub mod ask;
pub mod chat;
