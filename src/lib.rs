pub mod commands;
pub mod config;
pub mod database;
pub mod document;
pub mod llm;
pub mod prompts;
pub mod providers;

// Re-export commonly used items
pub use config::AppConfig;
pub use llm::{ConversationHandler, DocumentIndex};
pub use providers::openai::OpenAIProvider;
