//! Test doubles for the external services behind the pipeline.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use librarian::agents::{ChatModel, KnowledgeStore, LibrarianAgent, RetrievalIndex, SelectorAgent};
use librarian::error::{LibrarianError, Result};
use librarian::models::{BookRecord, Candidate};

pub enum IndexBehaviour {
    Returns(Vec<Candidate>),
    Unavailable,
    TimesOut,
}

pub struct FakeIndex {
    behaviour: IndexBehaviour,
    pub calls: AtomicUsize,
}

impl FakeIndex {
    pub fn new(behaviour: IndexBehaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RetrievalIndex for FakeIndex {
    async fn retrieve(&self, _query: &str, k: usize) -> Result<Vec<Candidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behaviour {
            IndexBehaviour::Returns(candidates) => Ok(candidates.iter().take(k).cloned().collect()),
            IndexBehaviour::Unavailable => Err(LibrarianError::RetrievalUnavailable(
                "connection refused".to_string(),
            )),
            IndexBehaviour::TimesOut => Err(LibrarianError::RetrievalTimeout),
        }
    }
}

pub struct FakeModel {
    reply: std::result::Result<String, String>,
    pub calls: AtomicUsize,
}

impl FakeModel {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            reply: Err("model service unreachable".to_string()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ChatModel for FakeModel {
    async fn complete_json(&self, _system: &str, _user: &str) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().map_err(|e| anyhow::anyhow!(e))
    }
}

pub fn candidate(id: &str, title: &str, short_summary: &str) -> Candidate {
    Candidate {
        id: id.to_string(),
        title: title.to_string(),
        short_summary: short_summary.to_string(),
    }
}

pub fn dystopias() -> Vec<Candidate> {
    vec![
        candidate("doc_0_1984", "1984", "Big Brother watches everyone."),
        candidate("doc_1_Fahrenheit_451", "Fahrenheit 451", "Firemen burn books."),
        candidate("doc_2_Brave_New_World", "Brave New World", "Engineered happiness."),
    ]
}

pub fn catalog() -> Arc<KnowledgeStore> {
    Arc::new(KnowledgeStore::from_records([
        BookRecord {
            title: "1984".to_string(),
            author: Some("George Orwell".to_string()),
            summary: "A dystopian...".to_string(),
        },
        BookRecord {
            title: "Fahrenheit 451".to_string(),
            author: Some("Ray Bradbury".to_string()),
            summary: "Guy Montag stops burning books.".to_string(),
        },
    ]))
}

pub fn librarian(index: Arc<FakeIndex>, model: Arc<FakeModel>) -> LibrarianAgent {
    LibrarianAgent::new(index, SelectorAgent::new(model), catalog())
}
