use async_trait::async_trait;
use thiserror::Error;
use qdrant_client::{
    qdrant::{
        Distance, PointStruct, SearchPoints,
        VectorParams, Value,
        with_payload_selector::SelectorOptions, WithPayloadSelector,
        point_id::PointIdOptions,
        PointId,
        CreateCollection, VectorsConfig,
        UpsertPoints, DeleteCollection,
    },
    Qdrant,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;
use crate::database::qdrant_config::create_qdrant_client;

#[derive(Error, Debug)]
pub enum VectorDBError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Storage seam for indexed chunks. `DocumentIndex` talks to the store
/// through this trait, same as it talks to the model through
/// `CompletionProvider`.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Drops and recreates the collection. Indexing a new document goes
    /// through here so chunks from a previous document never survive.
    async fn recreate_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDBError>;

    async fn store_points(
        &self,
        collection: &str,
        points: Vec<(Vec<f32>, HashMap<String, serde_json::Value>)>,
    ) -> Result<Vec<String>, VectorDBError>;

    async fn search_vectors(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<(String, f32, HashMap<String, serde_json::Value>)>, VectorDBError>;

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDBError>;
}

/// Thin wrapper around the Qdrant gRPC client for chunk storage and
/// similarity search.
#[derive(Clone)]
pub struct VectorDB {
    client: Arc<Qdrant>,
}

impl VectorDB {
    pub async fn new(url: &str) -> Result<Self, VectorDBError> {
        let client = create_qdrant_client(url)
            .await
            .map_err(|e| VectorDBError::Connection(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn create_collection(
        &self,
        name: &str,
        vector_size: u64,
    ) -> Result<(), VectorDBError> {
        let vectors_config = VectorParams {
            size: vector_size,
            distance: Distance::Cosine.into(),
            ..Default::default()
        };

        let vectors_config = VectorsConfig {
            config: Some(qdrant_client::qdrant::vectors_config::Config::Params(vectors_config)),
        };

        let create_collection = CreateCollection {
            collection_name: name.to_string(),
            vectors_config: Some(vectors_config),
            ..Default::default()
        };

        match self.client.create_collection(create_collection).await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("AlreadyExists") => {
                log::info!("Collection {} already exists, skipping creation", name);
                Ok(())
            }
            Err(e) => Err(VectorDBError::Operation(e.to_string())),
        }
    }
}

#[async_trait]
impl ChunkStore for VectorDB {
    async fn recreate_collection(&self, name: &str, vector_size: u64) -> Result<(), VectorDBError> {
        if let Err(e) = self.delete_collection(name).await {
            log::debug!("Collection {} not deleted before recreate: {}", name, e);
        }
        self.create_collection(name, vector_size).await
    }

    async fn store_points(
        &self,
        collection: &str,
        points: Vec<(Vec<f32>, HashMap<String, serde_json::Value>)>,
    ) -> Result<Vec<String>, VectorDBError> {
        let mut ids = Vec::with_capacity(points.len());

        let points = points
            .into_iter()
            .map(|(vector, payload)| {
                let point_id = Uuid::new_v4().to_string();
                ids.push(point_id.clone());

                let payload: HashMap<String, Value> = payload.into_iter()
                    .map(|(k, v)| (k, Value::from(v)))
                    .collect();

                PointStruct {
                    id: Some(PointId {
                        point_id_options: Some(PointIdOptions::Uuid(point_id)),
                    }),
                    vectors: Some(vector.into()),
                    payload,
                }
            })
            .collect();

        let upsert_points = UpsertPoints {
            collection_name: collection.to_string(),
            points,
            ..Default::default()
        };

        self.client.upsert_points(upsert_points)
            .await
            .map_err(|e| VectorDBError::Operation(e.to_string()))?;

        Ok(ids)
    }

    async fn search_vectors(
        &self,
        collection: &str,
        query_vector: Vec<f32>,
        limit: u64,
    ) -> Result<Vec<(String, f32, HashMap<String, serde_json::Value>)>, VectorDBError> {
        let request = SearchPoints {
            collection_name: collection.to_string(),
            vector: query_vector,
            limit,
            with_payload: Some(WithPayloadSelector {
                selector_options: Some(SelectorOptions::Enable(true)),
            }),
            ..Default::default()
        };

        let results = self.client.search_points(request)
            .await
            .map_err(|e| VectorDBError::Operation(e.to_string()))?;

        let points = results.result
            .into_iter()
            .map(|point| {
                let id = match point.id.and_then(|id| id.point_id_options) {
                    Some(PointIdOptions::Uuid(uuid)) => uuid,
                    _ => String::new(),
                };
                let score = point.score;
                let payload = point.payload
                    .into_iter()
                    .map(|(k, v)| (k, serde_json::Value::try_from(v).unwrap_or(serde_json::Value::Null)))
                    .collect();
                (id, score, payload)
            })
            .collect();

        Ok(points)
    }

    async fn delete_collection(&self, name: &str) -> Result<(), VectorDBError> {
        let request = DeleteCollection {
            collection_name: name.to_string(),
            ..Default::default()
        };

        self.client.delete_collection(request)
            .await
            .map_err(|e| VectorDBError::Operation(e.to_string()))?;

        Ok(())
    }
}
