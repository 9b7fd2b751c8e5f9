use std::env;

/// Runtime settings for chunking, retrieval and conversation memory.
/// Every knob can be overridden from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: u64,
    pub max_history: usize,
    pub embedding_dim: u64,
    pub qdrant_url: String,
    pub collection_name: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let chunk_size = env::var("CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1000);

        let chunk_overlap = env::var("CHUNK_OVERLAP")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100);

        let top_k = env::var("TOP_K")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        let max_history = env::var("MAX_HISTORY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let embedding_dim = env::var("EMBEDDING_DIM")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1536);

        let qdrant_url = env::var("QDRANT_URL")
            .unwrap_or_else(|_| "http://localhost:6333".to_string());

        let collection_name = env::var("COLLECTION_NAME")
            .unwrap_or_else(|_| "pdf_chunks".to_string());

        Self {
            chunk_size,
            chunk_overlap,
            top_k,
            max_history,
            embedding_dim,
            qdrant_url,
            collection_name,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 3,
            max_history: 5,
            embedding_dim: 1536,
            qdrant_url: "http://localhost:6333".to_string(),
            collection_name: "pdf_chunks".to_string(),
        }
    }
}
