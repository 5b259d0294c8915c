//! Repository indexing and retrieval-augmented chat.
//!
//! This crate wires the chunking and embedding layers into a full pipeline:
//!
//! - [`retrieval::IndexingEngine`] walks a repository, chunks and embeds its
//!   files, and upserts the vectors into a [`storage::VectorStore`].
//! - [`chat::ChatEngine`] answers questions about an indexed repository with
//!   the adaptive two-round retrieval protocol.
//!
//! External collaborators (GitHub, Workers AI, the vector and status stores)
//! sit behind traits, so every pipeline stage is testable with in-process
//! fakes; see `tests/` for end-to-end scenarios.

pub mod chat;
pub mod error;
pub mod github;
pub mod retrieval;
pub mod storage;
pub mod workers_ai;

pub use chat::{ChatEngine, ConversationTurn, Role};
pub use error::RequestError;
pub use github::{GithubClient, RepoBrowser, parse_github_url, split_repo_id};
pub use retrieval::{
    IndexOutcome, IndexReport, IndexingEngine, IndexingEngineConfig, Retriever, format_matches,
};
pub use storage::{IndexStatus, StatusStore, VectorStore};
pub use workers_ai::WorkersAiClient;
