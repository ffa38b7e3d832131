// Selector Agent: asks a generative model to pick exactly one candidate

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Candidate, Selection};
use crate::telemetry;

pub const SYSTEM_PROMPT: &str = r#"You are an assistant that recommends ONE SINGLE book from the given candidates.
Return STRICTLY JSON in the form:
{"title": "...", "reason": "a short sentence in English"}
If you are not sure, choose the thematically closest title.
"#;

pub const NO_CANDIDATES_REASON: &str = "No candidates found.";
pub const FALLBACK_REASON: &str = "Chose the closest match by relevance.";

/// A generative model constrained to answer with a JSON object.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete_json(&self, system: &str, user: &str) -> anyhow::Result<String>;
}

/// Ways the model can break the `{title, reason}` contract.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("model call failed: {0}")]
    Call(String),
    #[error("output is not valid JSON: {0}")]
    Malformed(String),
    #[error("output is not a JSON object")]
    NotAnObject,
    #[error("field '{0}' is missing or not a string")]
    MissingField(&'static str),
    #[error("title is empty")]
    EmptyTitle,
}

pub struct SelectorAgent {
    model: Arc<dyn ChatModel>,
}

impl SelectorAgent {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Always yields a selection. With no candidates the model is not
    /// called; any contract violation falls back to the top-ranked one.
    pub async fn select(&self, query: &str, candidates: &[Candidate]) -> Selection {
        let Some(top) = candidates.first() else {
            return Selection {
                title: String::new(),
                reason: NO_CANDIDATES_REASON.to_string(),
            };
        };

        match self.ask_model(query, candidates).await {
            Ok(selection) => {
                info!("Selector: Model chose '{}'", selection.title);
                selection
            }
            Err(violation) => {
                warn!("Selector: {}; falling back to '{}'", violation, top.title);
                telemetry::SELECTION_FALLBACKS.inc();
                Selection {
                    title: top.title.clone(),
                    reason: FALLBACK_REASON.to_string(),
                }
            }
        }
    }

    async fn ask_model(
        &self,
        query: &str,
        candidates: &[Candidate],
    ) -> Result<Selection, ContractViolation> {
        let content = build_user_message(query, candidates);
        let raw = self
            .model
            .complete_json(SYSTEM_PROMPT, &content)
            .await
            .map_err(|e| ContractViolation::Call(format!("{:#}", e)))?;
        parse_selection(&raw)
    }
}

pub fn build_user_message(query: &str, candidates: &[Candidate]) -> String {
    let mut lines = vec!["CANDIDATES:".to_string()];
    for c in candidates {
        lines.push(format!("- {}: {}", c.title, c.short_summary));
    }
    lines.push(format!("\nQUESTION: {}", query));
    lines.join("\n")
}

/// Accepts `{"title": <non-empty string>, "reason": <string>}`; extra keys
/// are ignored. The title is not checked against the candidate list.
pub fn parse_selection(raw: &str) -> Result<Selection, ContractViolation> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ContractViolation::Malformed(e.to_string()))?;
    let object = value.as_object().ok_or(ContractViolation::NotAnObject)?;

    let title = object
        .get("title")
        .and_then(Value::as_str)
        .ok_or(ContractViolation::MissingField("title"))?;
    let reason = object
        .get("reason")
        .and_then(Value::as_str)
        .ok_or(ContractViolation::MissingField("reason"))?;

    if title.trim().is_empty() {
        return Err(ContractViolation::EmptyTitle);
    }

    Ok(Selection {
        title: title.to_string(),
        reason: reason.to_string(),
    })
}
