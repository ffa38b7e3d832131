use serde::{Deserialize, Serialize};

/// A curated book entry held by the knowledge store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub author: Option<String>,
    pub summary: String,
}

/// A single retrieval hit, in the order the index ranked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub short_summary: String,
}

/// The one title picked for a query, with a short justification.
///
/// `title` is not guaranteed to be one of the candidates that were offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub title: String,
    pub reason: String,
}

/// Outcome of an exact-title lookup. A miss is `found == false` with an
/// empty summary, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryLookup {
    pub found: bool,
    pub title: String,
    pub author: Option<String>,
    pub summary: String,
}

impl SummaryLookup {
    pub fn found(record: &BookRecord) -> Self {
        Self {
            found: true,
            title: record.title.clone(),
            author: record.author.clone(),
            summary: record.summary.clone(),
        }
    }

    pub fn missing(title: &str) -> Self {
        Self {
            found: false,
            title: title.to_string(),
            author: None,
            summary: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateTitle {
    pub title: String,
}

/// Everything a front end gets back for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub query: String,
    pub choice: Selection,
    pub full_summary: SummaryLookup,
    /// What retrieval returned, independent of `choice`.
    pub candidates: Vec<CandidateTitle>,
}

impl RecommendationResult {
    pub fn candidate_titles(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.title.as_str()).collect()
    }
}

// API Request models
#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub query: String,
    pub top_k: Option<usize>,
}

// Seeding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub id: String,
    pub title: String,
    pub short_summary: String,
}
