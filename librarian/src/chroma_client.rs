use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{LibrarianError, Result};

/// Thin client for the Chroma REST API (v1).
#[derive(Clone)]
pub struct ChromaClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
}

/// Raw query payload; Chroma nests one list per query embedding.
#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub ids: Vec<Vec<String>>,
    #[serde(default)]
    pub documents: Option<Vec<Vec<Option<String>>>>,
    #[serde(default)]
    pub metadatas: Option<Vec<Vec<Option<Value>>>>,
}

#[derive(Debug, Serialize)]
pub struct UpsertRequest<'a> {
    pub ids: &'a [String],
    pub embeddings: &'a [Vec<f32>],
    pub documents: &'a [String],
    pub metadatas: &'a [Value],
}

impl ChromaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LibrarianError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up an existing collection. A missing collection is reported as
    /// `RetrievalUnavailable`, same as an unreachable server.
    pub async fn collection(&self, name: &str) -> Result<Collection> {
        let response = self
            .http
            .get(format!("{}/api/v1/collections/{}", self.base_url, name))
            .send()
            .await
            .map_err(LibrarianError::from_retrieval)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibrarianError::RetrievalUnavailable(format!(
                "collection '{}' is not available ({})",
                name, status
            )));
        }
        response.json().await.map_err(LibrarianError::from_retrieval)
    }

    pub async fn get_or_create_collection(&self, name: &str) -> Result<Collection> {
        let response = self
            .http
            .post(format!("{}/api/v1/collections", self.base_url))
            .json(&json!({ "name": name, "get_or_create": true }))
            .send()
            .await
            .map_err(LibrarianError::from_retrieval)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibrarianError::RetrievalUnavailable(format!(
                "could not create collection '{}' ({})",
                name, status
            )));
        }
        response.json().await.map_err(LibrarianError::from_retrieval)
    }

    pub async fn query(
        &self,
        collection_id: &str,
        embedding: &[f32],
        n_results: usize,
    ) -> Result<QueryResponse> {
        debug!("Querying collection {} for {} results", collection_id, n_results);

        let response = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/query",
                self.base_url, collection_id
            ))
            .json(&json!({
                "query_embeddings": [embedding],
                "n_results": n_results,
                "include": ["documents", "metadatas"],
            }))
            .send()
            .await
            .map_err(LibrarianError::from_retrieval)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibrarianError::RetrievalUnavailable(format!(
                "vector query failed ({})",
                status
            )));
        }
        response.json().await.map_err(LibrarianError::from_retrieval)
    }

    pub async fn upsert(&self, collection_id: &str, request: &UpsertRequest<'_>) -> Result<()> {
        let response = self
            .http
            .post(format!(
                "{}/api/v1/collections/{}/upsert",
                self.base_url, collection_id
            ))
            .json(request)
            .send()
            .await
            .map_err(LibrarianError::from_retrieval)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibrarianError::RetrievalUnavailable(format!(
                "upsert of {} documents failed ({})",
                request.ids.len(),
                status
            )));
        }
        Ok(())
    }
}
