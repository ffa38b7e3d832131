use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::agents::retriever::Embedder;
use crate::agents::selector::ChatModel;
use crate::config::Config;
use crate::error::{LibrarianError, Result};

/// Handle to an OpenAI-compatible API, used for both embeddings and chat.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embedding_model: String,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key()
            .ok_or_else(|| LibrarianError::Configuration("OPENAI_API_KEY must be set".to_string()))?
            .to_string();

        Self::with_endpoint(
            &config.openai_base_url,
            api_key,
            &config.chat_model,
            &config.embedding_model,
            config.chat_temperature,
            config.request_timeout(),
        )
    }

    pub fn with_endpoint(
        base_url: &str,
        api_key: String,
        chat_model: &str,
        embedding_model: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LibrarianError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: chat_model.to_string(),
            embedding_model: embedding_model.to_string(),
            temperature,
        })
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!("Embedding {} texts with {}", texts.len(), self.embedding_model);

        let response = self
            .http
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.embedding_model, "input": texts }))
            .send()
            .await
            .map_err(LibrarianError::from_retrieval)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LibrarianError::RetrievalUnavailable(format!(
                "embedding service returned {}",
                status
            )));
        }

        let mut body: EmbeddingResponse =
            response.json().await.map_err(LibrarianError::from_retrieval)?;
        if body.data.len() != texts.len() {
            return Err(LibrarianError::RetrievalUnavailable(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        body.data.sort_by_key(|d| d.index);
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete_json(&self, system: &str, user: &str) -> anyhow::Result<String> {
        debug!("Requesting structured completion from {}", self.chat_model);

        let messages = [
            ChatMessage { role: "system", content: system },
            ChatMessage { role: "user", content: user },
        ];
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": self.chat_model,
                "messages": messages,
                "response_format": { "type": "json_object" },
                "temperature": self.temperature,
            }))
            .send()
            .await
            .context("chat completion request failed")?
            .error_for_status()
            .context("chat completion returned an error status")?;

        let body: ChatResponse = response
            .json()
            .await
            .context("chat completion body is not valid JSON")?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("chat completion has no message content"))
    }
}
