use crate::llm::document_index::RetrievedChunk;

pub const STANDARD_SYSTEM_PROMPT: &str = "\
You are a helpful assistant answering questions about a document.
Use ONLY the provided excerpts to answer the user's question.
If the information needed is not in the excerpts, say that you don't have enough information.
Don't make up or infer information that isn't explicitly stated in the excerpts.";

const CORPORATE_LAWYER_PROMPT: &str = "\
You are a corporate lawyer analyzing a document.
Use ONLY the provided excerpts to answer the user's question.
Focus on legal implications, regulatory compliance, potential liabilities, and contractual obligations.
Highlight any legal risks or opportunities present in the document.
If the information needed is not in the excerpts, say that you don't have enough information for legal analysis.
Don't make up or infer information that isn't explicitly stated in the excerpts.";

const ECONOMIST_PROMPT: &str = "\
You are an economist analyzing a document.
Use ONLY the provided excerpts to answer the user's question.
Focus on financial data, market trends, economic indicators, and business performance metrics.
Provide insights on economic implications, market positioning, and financial outlook when present in the data.
If the information needed is not in the excerpts, say that you don't have enough information for economic analysis.
Don't make up or infer information that isn't explicitly stated in the excerpts.";

const CRITICAL_JOURNALIST_PROMPT: &str = "\
You are a critical investigative journalist analyzing a document.
Use ONLY the provided excerpts to answer the user's question.
Look for inconsistencies, questionable claims, or areas that lack transparency.
Ask probing questions about the information and consider what might be missing from the narrative.
If the information needed is not in the excerpts, say that you don't have enough information for journalistic analysis.
Don't make up or infer information that isn't explicitly stated in the excerpts.";

const THEOLOGIAN_PROMPT: &str = "\
You are a theologian analyzing a document.
Use ONLY the provided excerpts to answer the user's question.
Consider ethical implications, moral frameworks, and values represented in the content.
Reflect on how the information relates to broader questions of purpose, meaning, and social responsibility.
If the information needed is not in the excerpts, say that you don't have enough information for theological analysis.
Don't make up or infer information that isn't explicitly stated in the excerpts.";

/// Role identifiers with human-readable display names, in menu order.
pub const AVAILABLE_ROLES: &[(&str, &str)] = &[
    ("standard", "Standard Assistant"),
    ("corporate_lawyer", "Corporate Lawyer"),
    ("economist", "Economist"),
    ("critical_journalist", "Critical Journalist"),
    ("theologian", "Theologian"),
];

/// System prompt for an answering perspective. Unknown roles fall back to
/// the standard assistant.
pub fn get_system_prompt(role: &str) -> &'static str {
    match role {
        "corporate_lawyer" => CORPORATE_LAWYER_PROMPT,
        "economist" => ECONOMIST_PROMPT,
        "critical_journalist" => CRITICAL_JOURNALIST_PROMPT,
        "theologian" => THEOLOGIAN_PROMPT,
        _ => STANDARD_SYSTEM_PROMPT,
    }
}

pub fn is_known_role(role: &str) -> bool {
    AVAILABLE_ROLES.iter().any(|(name, _)| *name == role)
}

pub fn format_user_prompt(query: &str, context: &str) -> String {
    format!(
        "I have a question about a document: {}\n\n\
         Here are the most relevant excerpts from the document:\n\n\
         {}\n\n\
         Based ONLY on these excerpts, please answer my question concisely.",
        query, context
    )
}

/// Renders retrieved chunks as numbered excerpts with a relevance
/// percentage derived from the cosine similarity score.
pub fn format_retrieved_context(chunks: &[RetrievedChunk]) -> String {
    let mut context = String::new();

    for (i, chunk) in chunks.iter().enumerate() {
        context.push_str(&format!(
            "EXCERPT {} (Relevance: {}%):\n{}\n\n",
            i + 1,
            relevance_percent(chunk.score),
            chunk.text
        ));
    }

    context
}

pub fn relevance_percent(score: f32) -> i32 {
    ((score * 100.0).round() as i32).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_falls_back_to_standard() {
        assert_eq!(get_system_prompt("pirate"), STANDARD_SYSTEM_PROMPT);
        assert_eq!(get_system_prompt(""), STANDARD_SYSTEM_PROMPT);
    }

    #[test]
    fn known_roles_have_distinct_prompts() {
        for (role, _) in AVAILABLE_ROLES.iter().skip(1) {
            assert_ne!(get_system_prompt(role), STANDARD_SYSTEM_PROMPT, "role {}", role);
        }
    }

    #[test]
    fn empty_retrieval_formats_to_empty_context() {
        assert_eq!(format_retrieved_context(&[]), "");
    }

    #[test]
    fn context_lists_numbered_excerpts() {
        let chunks = vec![
            RetrievedChunk {
                text: "First excerpt.".to_string(),
                score: 0.92,
                chunk_position: "1/2".to_string(),
            },
            RetrievedChunk {
                text: "Second excerpt.".to_string(),
                score: 0.45,
                chunk_position: "2/2".to_string(),
            },
        ];

        let context = format_retrieved_context(&chunks);
        assert!(context.contains("EXCERPT 1 (Relevance: 92%):\nFirst excerpt."));
        assert!(context.contains("EXCERPT 2 (Relevance: 45%):\nSecond excerpt."));
    }

    #[test]
    fn relevance_is_clamped() {
        assert_eq!(relevance_percent(1.3), 100);
        assert_eq!(relevance_percent(-0.2), 0);
    }

    #[test]
    fn user_prompt_embeds_query_and_context() {
        let prompt = format_user_prompt("What is the revenue?", "EXCERPT 1 ...");
        assert!(prompt.contains("What is the revenue?"));
        assert!(prompt.contains("EXCERPT 1 ..."));
    }
}
