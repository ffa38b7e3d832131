pub mod catalog;
pub mod librarian;
pub mod retriever;
pub mod selector;

pub use catalog::KnowledgeStore;
pub use librarian::LibrarianAgent;
pub use retriever::{ChromaIndex, Embedder, RetrievalIndex};
pub use selector::{ChatModel, SelectorAgent};
