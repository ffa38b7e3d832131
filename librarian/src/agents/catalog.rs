// Catalog: exact-title lookup into the curated book summaries

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{LibrarianError, Result};
use crate::models::{BookRecord, SummaryLookup};

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(default)]
    author: Option<String>,
    summary: String,
}

/// Immutable title → record map, loaded once at startup and shared by
/// reference.
#[derive(Debug, Default)]
pub struct KnowledgeStore {
    records: HashMap<String, BookRecord>,
}

impl KnowledgeStore {
    /// Read a JSON object keyed by exact title. Any read or parse failure
    /// is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            LibrarianError::Configuration(format!(
                "cannot read knowledge store {}: {}",
                path.display(),
                e
            ))
        })?;
        let store = Self::from_json(&raw).map_err(|e| {
            LibrarianError::Configuration(format!(
                "malformed knowledge store {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Knowledge store loaded: {} books from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn from_json(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        let entries: HashMap<String, CatalogEntry> = serde_json::from_str(raw)?;
        Ok(Self::from_records(entries.into_iter().map(|(title, entry)| BookRecord {
            title,
            author: entry.author,
            summary: entry.summary,
        })))
    }

    pub fn from_records(records: impl IntoIterator<Item = BookRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.title.clone(), record))
                .collect(),
        }
    }

    /// Case-sensitive, no normalization. Unknown titles are a normal miss.
    pub fn lookup(&self, title: &str) -> SummaryLookup {
        match self.records.get(title) {
            Some(record) => SummaryLookup::found(record),
            None => {
                debug!("Catalog: no entry for '{}'", title);
                SummaryLookup::missing(title)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "1984": {"author": "George Orwell", "summary": "A dystopian..."},
        "The Hobbit": {"summary": "Bilbo leaves the Shire."}
    }"#;

    #[test]
    fn exact_match_returns_the_stored_record() {
        let store = KnowledgeStore::from_json(SAMPLE).unwrap();

        let hit = store.lookup("1984");
        assert!(hit.found);
        assert_eq!(hit.title, "1984");
        assert_eq!(hit.author.as_deref(), Some("George Orwell"));
        assert_eq!(hit.summary, "A dystopian...");
    }

    #[test]
    fn unknown_title_is_a_miss_not_an_error() {
        let store = KnowledgeStore::from_json(SAMPLE).unwrap();

        let miss = store.lookup("Brave New World");
        assert_eq!(miss, SummaryLookup::missing("Brave New World"));
        assert!(!miss.found);
        assert_eq!(miss.author, None);
        assert_eq!(miss.summary, "");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let store = KnowledgeStore::from_json(SAMPLE).unwrap();
        assert!(!store.lookup("the hobbit").found);
        assert!(!store.lookup(" The Hobbit").found);
        assert!(!store.lookup("").found);
    }

    #[test]
    fn author_is_optional() {
        let store = KnowledgeStore::from_json(SAMPLE).unwrap();
        let hit = store.lookup("The Hobbit");
        assert!(hit.found);
        assert_eq!(hit.author, None);
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let store = KnowledgeStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = KnowledgeStore::load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LibrarianError::Configuration(_)));
    }

    #[test]
    fn corrupt_file_is_a_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"1984": {"author": "George Orwell"}}"#).unwrap();

        let err = KnowledgeStore::load(file.path()).unwrap_err();
        assert!(matches!(err, LibrarianError::Configuration(_)));
    }

    proptest! {
        #[test]
        fn stored_titles_round_trip_and_others_miss(
            books in prop::collection::hash_map(
                ".{1,16}",
                (proptest::option::of(".{1,12}"), ".{0,40}"),
                0..8,
            ),
            other in ".{0,16}",
        ) {
            let raw = serde_json::to_string(
                &books
                    .iter()
                    .map(|(title, (author, summary))| {
                        (title.clone(), serde_json::json!({ "author": author, "summary": summary }))
                    })
                    .collect::<HashMap<_, _>>(),
            )
            .unwrap();
            let store = KnowledgeStore::from_json(&raw).unwrap();

            prop_assert_eq!(store.len(), books.len());
            for (title, (author, summary)) in &books {
                let hit = store.lookup(title);
                prop_assert!(hit.found);
                prop_assert_eq!(&hit.title, title);
                prop_assert_eq!(&hit.author, author);
                prop_assert_eq!(&hit.summary, summary);
            }
            if !books.contains_key(&other) {
                prop_assert_eq!(store.lookup(&other), SummaryLookup::missing(&other));
            }
        }
    }
}

