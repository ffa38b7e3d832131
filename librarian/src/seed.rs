//! Offline indexing of the short-description corpus into Chroma.
//!
//! The corpus is Markdown made of blocks like:
//!
//! ```text
//! ## Title: 1984
//! A surveillance state rewrites history...
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use tracing::info;

use crate::agents::retriever::Embedder;
use crate::chroma_client::{ChromaClient, UpsertRequest};
use crate::error::Result;
use crate::models::CorpusEntry;

const EMBED_BATCH: usize = 50;

static TITLE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^##\s*Title:").expect("valid heading pattern"));

static TITLE_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)\A##\s*Title:\s*(.+?)\s*\n(.*)").expect("valid block pattern")
});

static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W+").expect("valid id pattern"));

/// Replace every run of non-word characters with a single `_`.
pub fn safe_id(title: &str) -> String {
    NON_WORD.replace_all(title, "_").into_owned()
}

/// Cut the text right before every `## Title:` heading that starts a line.
fn split_blocks(text: &str) -> Vec<&str> {
    let mut starts: Vec<usize> = TITLE_HEADING
        .find_iter(text)
        .map(|m| m.start())
        .filter(|&pos| pos > 0)
        .collect();
    starts.insert(0, 0);
    starts.push(text.len());
    starts.windows(2).map(|w| &text[w[0]..w[1]]).collect()
}

/// Split the corpus before every `## Title:` heading. Blocks without a
/// heading or with an empty body are skipped but still count towards the
/// block index used in ids.
pub fn parse_corpus(text: &str) -> Vec<CorpusEntry> {
    split_blocks(text.trim())
        .into_iter()
        .enumerate()
        .filter_map(|(i, block)| {
            let caps = TITLE_BLOCK.captures(block)?;
            let title = caps.get(1)?.as_str().trim();
            let short_summary = caps.get(2)?.as_str().trim();
            if title.is_empty() || short_summary.is_empty() {
                return None;
            }
            Some(CorpusEntry {
                id: format!("doc_{}_{}", i, safe_id(title)),
                title: title.to_string(),
                short_summary: short_summary.to_string(),
            })
        })
        .collect()
}

/// Embed and upsert every entry into `collection`, creating it if needed.
pub async fn seed_collection(
    chroma: &ChromaClient,
    embedder: &dyn Embedder,
    collection: &str,
    entries: &[CorpusEntry],
) -> Result<usize> {
    let target = chroma.get_or_create_collection(collection).await?;
    info!(
        "Upserting {} documents into collection '{}'",
        entries.len(),
        target.name
    );

    for batch in entries.chunks(EMBED_BATCH) {
        let ids: Vec<String> = batch.iter().map(|e| e.id.clone()).collect();
        let documents: Vec<String> = batch.iter().map(|e| e.short_summary.clone()).collect();
        let metadatas: Vec<_> = batch.iter().map(|e| json!({ "title": e.title })).collect();
        let embeddings = embedder.embed(&documents).await?;

        chroma
            .upsert(
                &target.id,
                &UpsertRequest {
                    ids: &ids,
                    embeddings: &embeddings,
                    documents: &documents,
                    metadatas: &metadatas,
                },
            )
            .await?;
    }

    Ok(entries.len())
}
