//! Smart Librarian: recommends one book for a free-text query.
//!
//! Retrieval over short descriptions picks candidates, a chat model chooses
//! one of them, and the curated catalog supplies the full summary.

pub mod agents;
pub mod api;
pub mod chroma_client;
pub mod cli;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod openai_client;
pub mod seed;
pub mod telemetry;

use std::sync::Arc;

use crate::agents::{ChromaIndex, KnowledgeStore, LibrarianAgent, SelectorAgent};
use crate::chroma_client::ChromaClient;
use crate::config::Config;
use crate::error::Result;
use crate::openai_client::OpenAiClient;

/// Wire the production service handles. Fails fast on anything that would
/// leave the pipeline unable to serve.
pub fn build_librarian(config: &Config) -> Result<LibrarianAgent> {
    let catalog = Arc::new(KnowledgeStore::load(&config.knowledge_path)?);
    let openai = Arc::new(OpenAiClient::new(config)?);
    let chroma = ChromaClient::new(&config.chroma_url, config.request_timeout())?;

    let index = ChromaIndex::new(chroma, config.collection_name.clone(), openai.clone());
    let selector = SelectorAgent::new(openai);

    Ok(LibrarianAgent::new(Arc::new(index), selector, catalog))
}
