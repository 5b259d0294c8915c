//! Storage contracts for gitchat-retriever.
//!
//! The durable stores are external collaborators: a vector similarity store and
//! a key/value status store. This module specifies their contracts as traits and
//! the record shapes that cross them; the only bundled implementations are the
//! in-memory ones in [`memory`], used by tests and the single-process CLI.
//!
//! Two properties of these contracts matter to the rest of the system:
//!
//! - **Upserts are idempotent by id.** Record ids are deterministic, so a
//!   duplicate indexing run rewrites the same entries instead of growing the
//!   store.
//! - **The vector store does not filter by tenant.** `query` may return
//!   cross-tenant matches; every record's metadata therefore carries its owning
//!   repository id, and the retriever filters on it after the fact.

use anyhow::Result;
use async_trait::async_trait;
use gitchat_context::CodeChunk;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod memory;

/// Vector-store records are upserted in groups of at most this many, to respect
/// store-side batch limits.
pub const UPSERT_BATCH_SIZE: usize = 100;

/// Chunk metadata attached to every stored vector.
///
/// Carries the full chunk content plus the owning repository id, so retrieval
/// can reconstruct context and scope results to a single tenant even when the
/// underlying store performs an unfiltered k-NN search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub repo_id: String,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl ChunkMetadata {
    pub fn from_chunk(repo_id: &str, chunk: &CodeChunk) -> Self {
        Self {
            repo_id: repo_id.to_string(),
            file_path: chunk.file_path.clone(),
            start_line: chunk.start_line,
            end_line: chunk.end_line,
            content: chunk.content.clone(),
            language: chunk.language.clone(),
        }
    }
}

/// A vector plus metadata, keyed by a deterministic id.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// One ranked result from a vector query.
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: ChunkMetadata,
}

/// Nearest-neighbor similarity store. See module docs for the contract.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite records by id.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Return up to `top_k` matches ranked by descending similarity. No tenant
    /// filtering is assumed.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>>;
}

/// Durable key/value store used for per-repository index status.
#[async_trait]
pub trait StatusStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, optionally expiring after `ttl`.
    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()>;

    /// Remove a key. Deleting an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}

/// Per-repository indexing state, stored as a string value in the status store.
/// Absence of the key means [`IndexStatus::Absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Absent,
    Indexing,
    Indexed,
}

impl IndexStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexStatus::Absent => "absent",
            IndexStatus::Indexing => "indexing",
            IndexStatus::Indexed => "indexed",
        }
    }

    /// Decode a stored value; unknown values are treated as absent, so a
    /// corrupted entry degrades to a safe re-index rather than a wedged state.
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("indexed") => IndexStatus::Indexed,
            Some("indexing") => IndexStatus::Indexing,
            _ => IndexStatus::Absent,
        }
    }
}

/// Status-store key for a repository's index state.
pub fn status_key(repo_id: &str) -> String {
    format!("index-status:{repo_id}")
}
