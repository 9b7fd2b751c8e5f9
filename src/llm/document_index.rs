use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::database::ChunkStore;
use crate::document::{self, TextChunker};
use crate::providers::traits::CompletionProvider;

/// Metadata captured when a PDF is indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub filename: String,
    pub file_path: String,
    pub processed_date: DateTime<Utc>,
    pub total_chunks: usize,
}

/// One chunk returned by a similarity search.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub text: String,
    pub score: f32,
    pub chunk_position: String,
}

/// Owns the index for the single active document: extraction, chunking,
/// embedding and retrieval. Indexing a new PDF replaces the previous one
/// wholesale.
pub struct DocumentIndex {
    vector_db: Arc<dyn ChunkStore + Send + Sync>,
    provider: Arc<dyn CompletionProvider + Send + Sync>,
    chunker: TextChunker,
    collection_name: String,
    embedding_dim: u64,
    top_k: u64,
    document: Option<DocumentInfo>,
}

impl DocumentIndex {
    pub fn new(
        vector_db: Arc<dyn ChunkStore + Send + Sync>,
        provider: Arc<dyn CompletionProvider + Send + Sync>,
        config: &AppConfig,
    ) -> Self {
        Self {
            vector_db,
            provider,
            chunker: TextChunker::new(config.chunk_size, config.chunk_overlap),
            collection_name: config.collection_name.clone(),
            embedding_dim: config.embedding_dim,
            top_k: config.top_k,
            document: None,
        }
    }

    pub fn document(&self) -> Option<&DocumentInfo> {
        self.document.as_ref()
    }

    /// Extracts, chunks, embeds and indexes a PDF. The collection is
    /// recreated first so nothing from a previously indexed document leaks
    /// into search results.
    pub async fn process_pdf(&mut self, path: &Path) -> Result<DocumentInfo> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap(),
        );

        spinner.set_message(format!("Extracting text from {}", path.display()));
        let text = document::pdf::extract_text(path)?;

        spinner.set_message("Indexing document");
        let result = self.index_text(path, &text).await;
        spinner.finish_and_clear();

        let info = result?;
        log::info!("Indexed {} into {} chunks", info.filename, info.total_chunks);
        Ok(info)
    }

    /// Chunks, embeds and indexes already-extracted text. The collection is
    /// recreated before any chunk is stored.
    async fn index_text(&mut self, path: &Path, text: &str) -> Result<DocumentInfo> {
        let chunks = self.chunker.split(text);
        if chunks.is_empty() {
            return Err(anyhow!("Document produced no chunks: {}", path.display()));
        }

        let embeddings = self.provider.generate_embeddings(&chunks).await?;

        let info = DocumentInfo {
            filename: path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            file_path: path.display().to_string(),
            processed_date: Utc::now(),
            total_chunks: chunks.len(),
        };

        self.vector_db
            .recreate_collection(&self.collection_name, self.embedding_dim)
            .await?;

        let total = chunks.len();
        let points = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(i, (chunk, embedding))| {
                let payload = chunk_payload(&info, i, total, &chunk);
                (embedding, payload)
            })
            .collect();

        self.vector_db.store_points(&self.collection_name, points).await?;

        self.document = Some(info.clone());
        Ok(info)
    }

    /// Embeds the query and returns the most similar chunks.
    pub async fn search(&self, query: &str) -> Result<Vec<RetrievedChunk>> {
        let query_embedding = self.provider.generate_embedding(query).await?;

        let results = self
            .vector_db
            .search_vectors(&self.collection_name, query_embedding, self.top_k)
            .await?;

        let chunks = results
            .into_iter()
            .filter_map(|(_, score, payload)| {
                let text = payload.get("text")?.as_str()?.to_string();
                let chunk_position = payload
                    .get("chunk_position")
                    .and_then(|v| v.as_str())
                    .unwrap_or("?")
                    .to_string();

                Some(RetrievedChunk {
                    text,
                    score,
                    chunk_position,
                })
            })
            .collect();

        Ok(chunks)
    }

    /// Drops the collection and forgets the loaded document.
    pub async fn clear(&mut self) -> Result<()> {
        self.vector_db.delete_collection(&self.collection_name).await?;
        self.document = None;
        Ok(())
    }
}

fn chunk_payload(
    info: &DocumentInfo,
    index: usize,
    total: usize,
    chunk: &str,
) -> HashMap<String, serde_json::Value> {
    let preview = if chunk.chars().count() > 100 {
        let head: String = chunk.chars().take(100).collect();
        format!("{}...", head)
    } else {
        chunk.to_string()
    };

    let mut payload = HashMap::new();
    payload.insert("text".to_string(), serde_json::Value::String(chunk.to_string()));
    payload.insert("chunk_id".to_string(), serde_json::Value::String(format!("chunk_{}", index)));
    payload.insert("chunk_index".to_string(), serde_json::json!(index));
    payload.insert(
        "chunk_position".to_string(),
        serde_json::Value::String(format!("{}/{}", index + 1, total)),
    );
    payload.insert("chunk_size_chars".to_string(), serde_json::json!(chunk.chars().count()));
    payload.insert("content_preview".to_string(), serde_json::Value::String(preview));
    payload.insert("filename".to_string(), serde_json::Value::String(info.filename.clone()));
    payload.insert("file_path".to_string(), serde_json::Value::String(info.file_path.clone()));
    payload.insert(
        "processed_date".to_string(),
        serde_json::Value::String(info.processed_date.to_rfc3339()),
    );
    payload.insert("total_chunks".to_string(), serde_json::json!(info.total_chunks));

    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::VectorDBError;
    use async_trait::async_trait;
    use std::sync::Mutex;

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

    #[derive(Default)]
    struct RecordingStore {
        ops: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ChunkStore for RecordingStore {
        async fn recreate_collection(&self, name: &str, _vector_size: u64) -> Result<(), VectorDBError> {
            self.ops.lock().unwrap().push(format!("recreate {}", name));
            Ok(())
        }

        async fn store_points(
            &self,
            collection: &str,
            points: Vec<(Vec<f32>, HashMap<String, serde_json::Value>)>,
        ) -> Result<Vec<String>, VectorDBError> {
            self.ops
                .lock()
                .unwrap()
                .push(format!("store {} x{}", collection, points.len()));
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

        async fn delete_collection(&self, name: &str) -> Result<(), VectorDBError> {
            self.ops.lock().unwrap().push(format!("delete {}", name));
            Ok(())
        }
    }

    #[tokio::test]
    async fn indexing_recreates_collection_before_storing_chunks() {
        let store = Arc::new(RecordingStore::default());
        let config = AppConfig::default();
        let mut index = DocumentIndex::new(store.clone(), Arc::new(FixedProvider), &config);

        index
            .index_text(Path::new("first.pdf"), "The first document body.")
            .await
            .unwrap();
        index
            .index_text(Path::new("second.pdf"), "The second document body.")
            .await
            .unwrap();

        // Every (re)index run wipes the collection before any upsert, so
        // chunks of the first document cannot leak into the second
        let ops = store.ops.lock().unwrap().clone();
        assert_eq!(
            ops,
            vec![
                "recreate pdf_chunks",
                "store pdf_chunks x1",
                "recreate pdf_chunks",
                "store pdf_chunks x1",
            ]
        );

        assert_eq!(index.document().unwrap().filename, "second.pdf");
    }

    #[tokio::test]
    async fn clearing_drops_the_collection_and_forgets_the_document() {
        let store = Arc::new(RecordingStore::default());
        let config = AppConfig::default();
        let mut index = DocumentIndex::new(store.clone(), Arc::new(FixedProvider), &config);

        index
            .index_text(Path::new("report.pdf"), "Some report body.")
            .await
            .unwrap();
        index.clear().await.unwrap();

        assert!(index.document().is_none());
        let ops = store.ops.lock().unwrap().clone();
        assert_eq!(ops.last().unwrap(), "delete pdf_chunks");
    }

    fn sample_info() -> DocumentInfo {
        DocumentInfo {
            filename: "report.pdf".to_string(),
            file_path: "/tmp/report.pdf".to_string(),
            processed_date: Utc::now(),
            total_chunks: 3,
        }
    }

    #[test]
    fn payload_carries_chunk_and_document_metadata() {
        let info = sample_info();
        let payload = chunk_payload(&info, 1, 3, "Quarterly revenue grew by twelve percent.");

        assert_eq!(payload["chunk_id"], serde_json::json!("chunk_1"));
        assert_eq!(payload["chunk_index"], serde_json::json!(1));
        assert_eq!(payload["chunk_position"], serde_json::json!("2/3"));
        assert_eq!(payload["filename"], serde_json::json!("report.pdf"));
        assert_eq!(payload["total_chunks"], serde_json::json!(3));
        assert_eq!(
            payload["content_preview"],
            serde_json::json!("Quarterly revenue grew by twelve percent.")
        );
    }

    #[test]
    fn long_chunks_get_truncated_previews() {
        let info = sample_info();
        let text = "x".repeat(250);
        let payload = chunk_payload(&info, 0, 1, &text);

        let preview = payload["content_preview"].as_str().unwrap();
        assert_eq!(preview.chars().count(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn chunk_ids_are_unique_within_a_document() {
        let info = sample_info();
        let ids: Vec<String> = (0..5)
            .map(|i| chunk_payload(&info, i, 5, "text")["chunk_id"].as_str().unwrap().to_string())
            .collect();

        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }
}
