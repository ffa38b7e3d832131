// Librarian Agent: retrieval -> selection -> catalog lookup

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::agents::catalog::KnowledgeStore;
use crate::agents::retriever::RetrievalIndex;
use crate::agents::selector::SelectorAgent;
use crate::error::Result;
use crate::models::{CandidateTitle, RecommendationResult};
use crate::telemetry;

/// The only entry point front ends call. Holds no per-query state, so one
/// instance can serve concurrent queries.
pub struct LibrarianAgent {
    index: Arc<dyn RetrievalIndex>,
    selector: SelectorAgent,
    catalog: Arc<KnowledgeStore>,
}

impl LibrarianAgent {
    pub fn new(
        index: Arc<dyn RetrievalIndex>,
        selector: SelectorAgent,
        catalog: Arc<KnowledgeStore>,
    ) -> Self {
        Self {
            index,
            selector,
            catalog,
        }
    }

    /// Only retrieval failures propagate; selection and lookup always
    /// produce a well-formed result.
    #[instrument(skip(self, query))]
    pub async fn recommend(&self, query: &str, k: usize) -> Result<RecommendationResult> {
        let timer = telemetry::RECOMMEND_SECONDS.start_timer();

        let candidates = self.index.retrieve(query, k).await.map_err(|e| {
            error!("Librarian: retrieval failed: {}", e);
            telemetry::RETRIEVAL_FAILURES.inc();
            e
        })?;

        let choice = self.selector.select(query, &candidates).await;

        let full_summary = self.catalog.lookup(&choice.title);
        if !full_summary.found {
            warn!("Librarian: '{}' has no full summary", choice.title);
            telemetry::TITLE_MISSES.inc();
        }

        info!(
            "Librarian: recommending '{}' out of {} candidates",
            choice.title,
            candidates.len()
        );
        telemetry::RECOMMENDATIONS.inc();
        timer.observe_duration();

        Ok(RecommendationResult {
            query: query.to_string(),
            choice,
            full_summary,
            candidates: candidates
                .into_iter()
                .map(|c| CandidateTitle { title: c.title })
                .collect(),
        })
    }
}
