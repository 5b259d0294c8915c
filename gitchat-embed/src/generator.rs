//! Embedding generation over a remote model, with batching and failure isolation.

use crate::error::{EmbedError, Result};
use crate::model::ModelClient;
use crate::response::parse_embedding_response;
use futures::future;
use gitchat_context::CodeChunk;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, warn};

/// Chunks embedded concurrently within one batch. Batches run serially, so this
/// is also the peak number of in-flight calls against the embedding model.
pub const EMBED_BATCH_SIZE: usize = 10;

/// A chunk paired with its vector, ready for upsert into a vector store.
///
/// `id` is deterministically derived from the repository, the chunk's structural
/// identity, and its sequence index, so re-indexing identical content yields
/// identical ids and upserts stay idempotent. Records are written once and only
/// ever superseded by a later re-index.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub chunk: CodeChunk,
}

/// Generates embeddings for chunks and queries through a [`ModelClient`].
#[derive(Clone)]
pub struct EmbeddingGenerator {
    client: Arc<dyn ModelClient>,
    model_id: String,
}

impl std::fmt::Debug for EmbeddingGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingGenerator")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

impl EmbeddingGenerator {
    pub fn new(client: Arc<dyn ModelClient>, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Embed a single text, returning its vector.
    pub async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let response = self
            .client
            .run(&self.model_id, json!({ "text": [text] }))
            .await
            .map_err(EmbedError::model_call)?;
        parse_embedding_response(response)
    }

    /// Embed a user query. Queries use the same representation as raw text.
    pub async fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        self.embed_text(query).await
    }

    /// Embed a sequence of chunks for the given repository.
    ///
    /// Chunks are processed in groups of [`EMBED_BATCH_SIZE`], concurrent within
    /// a group and strictly serial across groups. A failed embedding call drops
    /// that one chunk from the result set; it never aborts the rest of the run.
    pub async fn embed_chunks(&self, chunks: &[CodeChunk], repo_id: &str) -> Vec<EmbeddingRecord> {
        let mut records = Vec::with_capacity(chunks.len());

        for (batch_index, batch) in chunks.chunks(EMBED_BATCH_SIZE).enumerate() {
            let batch_futures = batch.iter().enumerate().map(|(offset, chunk)| {
                let sequence = batch_index * EMBED_BATCH_SIZE + offset;
                let id = record_id(repo_id, chunk, sequence);
                async move {
                    let text = embedding_text(chunk);
                    match self.embed_text(&text).await {
                        Ok(vector) => Some(EmbeddingRecord {
                            id,
                            vector,
                            chunk: chunk.clone(),
                        }),
                        Err(error) => {
                            warn!(%id, %error, "dropping chunk after failed embedding call");
                            None
                        }
                    }
                }
            });

            let batch_records = future::join_all(batch_futures).await;
            records.extend(batch_records.into_iter().flatten());
        }

        debug!(
            requested = chunks.len(),
            embedded = records.len(),
            repo_id,
            "embedded chunk batch"
        );
        records
    }
}

/// Enriched representation submitted to the embedding model: file path and line
/// range ahead of the content, so the vector captures location context too.
pub fn embedding_text(chunk: &CodeChunk) -> String {
    format!(
        "File: {}\nLines: {}-{}\n\n{}",
        chunk.file_path, chunk.start_line, chunk.end_line, chunk.content
    )
}

fn record_id(repo_id: &str, chunk: &CodeChunk, sequence: usize) -> String {
    format!(
        "{}:{}:{}-{}:{}",
        repo_id, chunk.file_path, chunk.start_line, chunk.end_line, sequence
    )
}
