// Retriever Agent: semantic nearest-neighbour search over short book descriptions

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::chroma_client::{ChromaClient, QueryResponse};
use crate::error::{LibrarianError, Result};
use crate::models::Candidate;

/// Turns text into vectors. Query time must use the same model the index
/// was built with.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Ranked candidate search. Returns at most `k` candidates, best first.
///
/// Failing to search at all is an error (`RetrievalUnavailable` or
/// `RetrievalTimeout`), never an empty list.
#[async_trait]
pub trait RetrievalIndex: Send + Sync {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Candidate>>;
}

pub struct ChromaIndex {
    chroma: ChromaClient,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl ChromaIndex {
    pub fn new(chroma: ChromaClient, collection: String, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            chroma,
            collection,
            embedder,
        }
    }
}

#[async_trait]
impl RetrievalIndex for ChromaIndex {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<Candidate>> {
        if k == 0 {
            return Ok(vec![]);
        }
        info!("Retriever: Searching '{}' for top {}", self.collection, k);

        let collection = self.chroma.collection(&self.collection).await?;

        let embedding = self
            .embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                LibrarianError::RetrievalUnavailable("embedding service returned no vector".into())
            })?;

        let response = self.chroma.query(&collection.id, &embedding, k).await?;
        let candidates = candidates_from_query(response, k)?;

        info!("Retriever: {} candidates", candidates.len());
        Ok(candidates)
    }
}

/// Zip the first query's ids, documents and metadata by position. A body
/// whose lists disagree is an unusable answer, not "no matches". Single rows
/// that lack a title or a document are dropped.
pub(crate) fn candidates_from_query(response: QueryResponse, k: usize) -> Result<Vec<Candidate>> {
    let ids = response.ids.into_iter().next().unwrap_or_default();
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let documents = response
        .documents
        .and_then(|d| d.into_iter().next())
        .ok_or_else(|| malformed("documents are missing"))?;
    let metadatas = response
        .metadatas
        .and_then(|m| m.into_iter().next())
        .ok_or_else(|| malformed("metadatas are missing"))?;
    if documents.len() != ids.len() || metadatas.len() != ids.len() {
        return Err(malformed(&format!(
            "{} ids, {} documents, {} metadatas",
            ids.len(),
            documents.len(),
            metadatas.len()
        )));
    }

    Ok(ids
        .into_iter()
        .zip(documents)
        .zip(metadatas)
        .filter_map(|((id, document), metadata)| {
            let title = metadata
                .as_ref()
                .and_then(|m| m.get("title"))
                .and_then(Value::as_str)
                .filter(|t| !t.trim().is_empty())
                .map(str::to_string);
            match (title, document) {
                (Some(title), Some(short_summary)) => Some(Candidate {
                    id,
                    title,
                    short_summary,
                }),
                _ => {
                    warn!("Retriever: skipping index row '{}' without title or document", id);
                    None
                }
            }
        })
        .take(k)
        .collect())
}

fn malformed(detail: &str) -> LibrarianError {
    LibrarianError::RetrievalUnavailable(format!("malformed vector query response: {}", detail))
}
