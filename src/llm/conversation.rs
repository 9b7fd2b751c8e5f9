use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

/// One question/answer turn, together with the document context that was
/// fed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exchange {
    pub user_query: String,
    pub assistant_response: String,
    pub context_used: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Bounded conversation memory. Holds the last `max_history` exchanges,
/// evicting the oldest first.
pub struct ConversationHandler {
    history: VecDeque<Exchange>,
    max_history: usize,
}

/// Openers that signal the user is continuing the previous thread,
/// in English and Dutch. Matched as case-insensitive prefixes.
const FOLLOW_UP_INDICATORS: &[&str] = &[
    "what about", "how about", "and", "also", "what else",
    "can you", "tell me more", "additionally", "furthermore",
    "why", "how come", "when did", "where is", "who is",
    "wat dacht je van", "hoe zit het met", "en", "ook",
    "wat nog meer", "kun je", "vertel me meer", "daarnaast",
    "bovendien", "waarom", "hoe komt het dat", "wanneer heeft",
    "waar is", "wie is",
];

/// Pronouns that usually refer back to something already discussed,
/// in English and Dutch. Matched as whole words.
const CONTEXT_PRONOUNS: &[&str] = &[
    "it", "they", "them", "this", "that", "these", "those", "he", "she",
    "het", "zij", "hen", "dit", "dat", "deze", "die", "hij",
];

/// Heuristic follow-up classifier. True when the query opens with a
/// continuation phrase, contains a context-referring pronoun as a whole
/// word, or is at most three tokens long. Pure and total.
pub fn looks_like_follow_up(query: &str) -> bool {
    let query_lower = query.to_lowercase();

    if FOLLOW_UP_INDICATORS.iter().any(|ind| query_lower.starts_with(ind)) {
        return true;
    }

    let words: Vec<&str> = query_lower
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .collect();

    if words.iter().any(|w| CONTEXT_PRONOUNS.contains(w)) {
        return true;
    }

    query.split_whitespace().count() <= 3
}

impl ConversationHandler {
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history: max_history.max(1),
        }
    }

    pub fn add_exchange(
        &mut self,
        user_query: &str,
        assistant_response: &str,
        context_used: Option<String>,
    ) {
        self.history.push_back(Exchange {
            user_query: user_query.to_string(),
            assistant_response: assistant_response.to_string(),
            context_used,
            timestamp: Utc::now(),
        });

        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn exchanges(&self) -> impl Iterator<Item = &Exchange> {
        self.history.iter()
    }

    /// Conversation history formatted for inclusion in a prompt. Empty
    /// string when there is no history.
    pub fn conversation_context(&self) -> String {
        if self.history.is_empty() {
            return String::new();
        }

        let mut context = String::from("Previous conversation:\n\n");
        for exchange in &self.history {
            context.push_str(&format!("User: {}\n", exchange.user_query));
            context.push_str(&format!("Assistant: {}\n\n", exchange.assistant_response));
        }

        context
    }

    /// Prompt for a follow-up question: current query, retrieved excerpts,
    /// and the bounded conversation history spliced in for reference.
    pub fn format_conversational_prompt(&self, current_query: &str, retrieved_context: &str) -> String {
        let mut prompt = format!(
            "I have a question about a document: {}\n\n\
             Here are the most relevant excerpts from the document:\n\n\
             {}\n\n",
            current_query, retrieved_context
        );

        let conversation_context = self.conversation_context();
        if !conversation_context.is_empty() {
            prompt.push_str(&format!(
                "\nFor reference, here is our previous conversation:\n{}\n",
                conversation_context
            ));
        }

        prompt.push_str(
            "\nBased on the document excerpts and our conversation history (if relevant), \
             please answer my current question.",
        );

        prompt
    }

    /// A query can only be a follow-up once there is something to follow up
    /// on; otherwise defers to the lexical classifier.
    pub fn detect_follow_up_question(&self, query: &str) -> bool {
        if self.history.is_empty() {
            return false;
        }

        looks_like_follow_up(query)
    }

    /// Writes the history to `conversation_YYYYMMDD_HHMMSS.json` under the
    /// given directory and returns the path.
    pub fn save_to_file(&self, dir: &Path) -> Result<PathBuf> {
        let filename = format!("conversation_{}.json", Local::now().format("%Y%m%d_%H%M%S"));
        let path = dir.join(filename);

        let exchanges: Vec<&Exchange> = self.history.iter().collect();
        let json = serde_json::to_string_pretty(&exchanges)
            .context("Failed to serialize conversation history")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }
}
