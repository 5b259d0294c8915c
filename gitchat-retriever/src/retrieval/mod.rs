//! Retrieval pipeline: indexing, similarity search, and context formatting.

pub mod context;
pub mod indexing_engine;
pub mod retriever;

pub use context::format_matches;
pub use indexing_engine::{IndexOutcome, IndexReport, IndexingEngine, IndexingEngineConfig};
pub use retriever::{RetrievalMatch, Retriever};
