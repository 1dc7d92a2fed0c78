//! Concierge — a tool-using chat agent with persisted threads.

pub mod agent;
pub mod channels;
pub mod config;
pub mod error;
pub mod llm;
pub mod store;
pub mod tools;
