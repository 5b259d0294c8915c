//! gitchat-embed: remote embedding generation for code chunks and queries.
//!
//! This crate wraps an opaque remote embedding model behind [`ModelClient`] and
//! turns [`CodeChunk`](gitchat_context::CodeChunk)s into [`EmbeddingRecord`]s
//! ready for a vector store. The awkward parts of talking to a remote model are
//! handled here:
//!
//! - **Batching**: chunks are embedded in fixed-size groups with bounded
//!   concurrency inside each group ([`EMBED_BATCH_SIZE`]).
//! - **Failure isolation**: one failed call drops one chunk, never the batch.
//! - **Shape polymorphism**: the model's response envelope varies; an ordered
//!   set of detection rules resolves it, with
//!   [`EmbedError::InvalidResponseShape`] as the explicit fallback.

pub mod error;
pub mod generator;
pub mod model;
pub mod response;

pub use error::{EmbedError, Result};
pub use generator::{EMBED_BATCH_SIZE, EmbeddingGenerator, EmbeddingRecord, embedding_text};
pub use model::ModelClient;
pub use response::parse_embedding_response;
