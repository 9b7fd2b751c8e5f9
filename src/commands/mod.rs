use colored::Colorize;
use std::path::Path;

use crate::llm::{ConversationHandler, DocumentIndex};
use crate::prompts;
use crate::providers::traits::CompletionProvider;

mod document;
mod system;

/// Dispatches REPL input: explicit commands first, anything else is treated
/// as a question about the loaded document.
pub struct CommandHandler {
    provider: Box<dyn CompletionProvider + Send + Sync>,
    index: DocumentIndex,
    conversation: ConversationHandler,
    role: String,
}

impl CommandHandler {
    pub async fn new(
        provider: Box<dyn CompletionProvider + Send + Sync>,
        index: DocumentIndex,
        max_history: usize,
        role: &str,
    ) -> Result<Self, String> {
        let role = if prompts::is_known_role(role) {
            role.to_string()
        } else {
            "standard".to_string()
        };

        provider
            .update_system_message(prompts::get_system_prompt(&role).to_string())
            .await
            .map_err(|e| format!("Failed to set system prompt: {}", e))?;

        Ok(Self {
            provider,
            index,
            conversation: ConversationHandler::new(max_history),
            role,
        })
    }

    pub async fn handle_command(&mut self, input: &str) -> Result<(), String> {
        if input.is_empty() {
            return Ok(());
        }

        let input = input.trim();

        match input.to_lowercase().as_str() {
            "help" | "exit" | "quit" => return system::handle_command(input),
            "roles" => return self.list_roles(),
            "info" => return document::handle_info(&self.index),
            "clear" => return self.handle_clear().await,
            "save" => return self.handle_save(),
            _ => {}
        }

        // Commands with an argument match their verb case-insensitively too
        if let Some((verb, rest)) = input.split_once(char::is_whitespace) {
            match verb.to_lowercase().as_str() {
                "load" => {
                    let result = document::handle_load(&mut self.index, rest.trim()).await;
                    if result.is_ok() {
                        // New document, old dialogue no longer applies
                        self.conversation.clear();
                    }
                    return result;
                }
                "role" => return self.switch_role(&rest.trim().to_lowercase()).await,
                _ => {}
            }
        }

        self.handle_question(input).await
    }

    fn list_roles(&self) -> Result<(), String> {
        println!("\n🎭 Available perspectives:");
        for (name, display) in prompts::AVAILABLE_ROLES {
            let marker = if *name == self.role { "▶" } else { " " };
            println!("  {} {:<20} - {}", marker, name, display);
        }
        Ok(())
    }

    async fn switch_role(&mut self, role: &str) -> Result<(), String> {
        if !prompts::is_known_role(role) {
            return Err(format!(
                "Unknown role '{}'. Type 'roles' to list the available perspectives.",
                role
            ));
        }

        self.provider
            .update_system_message(prompts::get_system_prompt(role).to_string())
            .await
            .map_err(|e| format!("Failed to switch role: {}", e))?;

        self.role = role.to_string();
        println!("🎭 Now answering as: {}", role.bright_cyan());
        Ok(())
    }

    async fn handle_clear(&mut self) -> Result<(), String> {
        document::handle_clear(&mut self.index).await?;
        self.conversation.clear();
        Ok(())
    }

    fn handle_save(&self) -> Result<(), String> {
        if self.conversation.is_empty() {
            println!("No conversation to save yet.");
            return Ok(());
        }

        let path = self
            .conversation
            .save_to_file(Path::new("."))
            .map_err(|e| format!("Failed to save conversation: {}", e))?;

        println!("💾 Conversation saved to {}", path.display().to_string().bright_green());
        Ok(())
    }

    /// The question pipeline: retrieve, assemble the prompt (conversational
    /// for follow-ups), call the model, show the answer with its sources.
    async fn handle_question(&mut self, query: &str) -> Result<(), String> {
        if self.index.document().is_none() {
            println!("Please load and process a PDF document first.");
            return Ok(());
        }

        let retrieved = self
            .index
            .search(query)
            .await
            .map_err(|e| format!("Search failed: {}", e))?;

        if retrieved.is_empty() {
            println!("No relevant information found in the document.");
            return Ok(());
        }

        let context = prompts::format_retrieved_context(&retrieved);

        let prompt = if self.conversation.detect_follow_up_question(query) {
            log::debug!("Treating query as a follow-up question");
            self.conversation.format_conversational_prompt(query, &context)
        } else {
            prompts::format_user_prompt(query, &context)
        };

        let answer = match self.provider.complete(&prompt).await {
            Ok(answer) => answer,
            Err(e) => {
                // Degrade to showing the raw excerpts rather than nothing
                println!(
                    "Error generating response: {}\n\nHere are the relevant excerpts:\n\n{}",
                    e, context
                );
                return Ok(());
            }
        };

        println!("\n💬 Answer:");
        println!("{}", answer.bright_green());

        println!("\n📑 Sources:");
        for (i, chunk) in retrieved.iter().enumerate() {
            let preview: String = chunk.text.chars().take(120).collect();
            println!(
                "  {}. (Relevance: {}%, chunk {}) {}",
                i + 1,
                prompts::relevance_percent(chunk.score),
                chunk.chunk_position,
                preview.replace('\n', " ")
            );
        }

        self.conversation.add_exchange(query, &answer, Some(context));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::database::{ChunkStore, VectorDBError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct FixedProvider;

    #[async_trait]
    impl CompletionProvider for FixedProvider {
        async fn new(_api_key: String, _system_message: String) -> anyhow::Result<Self> {
            Ok(Self)
        }

        async fn complete(&self, _prompt: &str) -> anyhow::Result<String> {
            Ok("answer".to_string())
        }

        async fn generate_embedding(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
            Ok(vec![0.1; 4])
        }

        async fn generate_embeddings(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| vec![0.1; 4]).collect())
        }

        async fn update_system_message(&self, _system_message: String) -> anyhow::Result<()> {
            Ok(())
        }

        async fn get_model_info(&self) -> anyhow::Result<String> {
            Ok("fixed".to_string())
        }

        fn get_system_message(&self) -> String {
            String::new()
        }

        fn clone_box(&self) -> Box<dyn CompletionProvider + Send + Sync> {
            Box::new(FixedProvider)
        }
    }

    struct EmptyStore;

    #[async_trait]
    impl ChunkStore for EmptyStore {
        async fn recreate_collection(&self, _name: &str, _vector_size: u64) -> Result<(), VectorDBError> {
            Ok(())
        }

        async fn store_points(
            &self,
            _collection: &str,
            _points: Vec<(Vec<f32>, HashMap<String, serde_json::Value>)>,
        ) -> Result<Vec<String>, VectorDBError> {
            Ok(Vec::new())
        }

        async fn search_vectors(
            &self,
            _collection: &str,
            _query_vector: Vec<f32>,
            _limit: u64,
        ) -> Result<Vec<(String, f32, HashMap<String, serde_json::Value>)>, VectorDBError> {
            Ok(Vec::new())
        }

        async fn delete_collection(&self, _name: &str) -> Result<(), VectorDBError> {
            Ok(())
        }
    }

    async fn test_handler() -> CommandHandler {
        let config = AppConfig::default();
        let index = DocumentIndex::new(Arc::new(EmptyStore), Arc::new(FixedProvider), &config);
        CommandHandler::new(Box::new(FixedProvider), index, config.max_history, "standard")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn load_verb_matches_case_insensitively() {
        let mut handler = test_handler().await;

        // A mixed-case verb must reach the load path, whose missing-file
        // error is distinguishable from the question pipeline
        for input in ["Load missing-file.pdf", "LOAD missing-file.pdf"] {
            let err = handler.handle_command(input).await.unwrap_err();
            assert!(err.contains("Error processing PDF"), "input {:?} gave {:?}", input, err);
        }
    }

    #[tokio::test]
    async fn role_verb_and_name_match_case_insensitively() {
        let mut handler = test_handler().await;

        handler.handle_command("Role Economist").await.unwrap();
        assert_eq!(handler.role, "economist");

        handler.handle_command("ROLE theologian").await.unwrap();
        assert_eq!(handler.role, "theologian");

        assert!(handler.handle_command("role pirate").await.is_err());
    }

    #[tokio::test]
    async fn questions_without_a_document_are_answered_with_a_hint() {
        let mut handler = test_handler().await;
        // Not a command, no document loaded: handled as a user-facing
        // message rather than an error
        handler
            .handle_command("What is the main conclusion of the report?")
            .await
            .unwrap();
    }
}
