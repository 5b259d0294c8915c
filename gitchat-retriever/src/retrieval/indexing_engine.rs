//! Repository indexing orchestration.
//!
//! Walks a repository's default-branch tree, chunks and embeds the files worth
//! indexing, and upserts the vectors. The engine is file-scoped fault tolerant:
//! a file that cannot be fetched or decoded is skipped with a warning, and the
//! run succeeds with whatever was indexed.

use crate::error::RequestError;
use crate::github::{RepoBrowser, TreeEntry, split_repo_id};
use crate::storage::{
    ChunkMetadata, IndexStatus, StatusStore, UPSERT_BATCH_SIZE, VectorRecord, VectorStore,
    status_key,
};
use gitchat_context::{Chunker, CodeChunk, extract_text};
use gitchat_embed::EmbeddingGenerator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Extensions considered worth indexing: source code plus prose and config
/// files that tend to answer "how does this repo work" questions.
const INDEXABLE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "jsx", "tsx", "go", "java", "c", "cpp", "h", "hpp", "rb", "php",
    "swift", "kt", "md", "markdown", "txt", "toml", "yaml", "yml", "json",
];

/// Tunables for one indexing run.
#[derive(Debug, Clone)]
pub struct IndexingEngineConfig {
    /// Hard cap on files indexed per repository.
    pub max_files: usize,
    /// Files larger than this many bytes are skipped outright.
    pub max_file_size: u64,
    pub max_chunk_size: usize,
    pub overlap: usize,
    pub upsert_batch_size: usize,
    /// Lifetime of the "indexing" marker. A crashed run leaves the marker to
    /// expire, after which the repository becomes indexable again.
    pub indexing_marker_ttl: Duration,
}

impl Default for IndexingEngineConfig {
    fn default() -> Self {
        Self {
            max_files: 100,
            max_file_size: 100_000,
            max_chunk_size: 500,
            overlap: 50,
            upsert_batch_size: UPSERT_BATCH_SIZE,
            indexing_marker_ttl: Duration::from_secs(600),
        }
    }
}

impl IndexingEngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    pub fn with_chunking(mut self, max_chunk_size: usize, overlap: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self.overlap = overlap;
        self
    }
}

/// What a call to [`IndexingEngine::index_repository`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// The repository was indexed earlier; nothing was done.
    AlreadyIndexed,
    /// Another run holds the indexing marker; nothing was done.
    InProgress,
    /// A fresh index was built.
    Completed(IndexReport),
}

/// Counters from a completed indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub files_processed: usize,
    pub chunks_indexed: usize,
}

/// Orchestrates one repository's index build end to end.
pub struct IndexingEngine {
    browser: Arc<dyn RepoBrowser>,
    embedder: EmbeddingGenerator,
    vectors: Arc<dyn VectorStore>,
    status: Arc<dyn StatusStore>,
    config: IndexingEngineConfig,
}

impl IndexingEngine {
    pub fn new(
        browser: Arc<dyn RepoBrowser>,
        embedder: EmbeddingGenerator,
        vectors: Arc<dyn VectorStore>,
        status: Arc<dyn StatusStore>,
        config: IndexingEngineConfig,
    ) -> Self {
        Self {
            browser,
            embedder,
            vectors,
            status,
            config,
        }
    }

    /// Build the index for `repo_id` (an `owner/name` pair).
    ///
    /// No-ops when the repository is already indexed or a run is in progress.
    /// Failures of individual files degrade to skips; failures of the tree
    /// listing, the status store writes, or the upserts abort the run and
    /// clear the in-flight marker so an immediate retry can proceed.
    pub async fn index_repository(&self, repo_id: &str) -> Result<IndexOutcome, RequestError> {
        let (owner, name) = split_repo_id(repo_id)
            .ok_or_else(|| RequestError::invalid_input("repository must be owner/name"))?;

        let key = status_key(repo_id);
        let current = IndexStatus::from_value(self.status.get(&key).await?.as_deref());
        match current {
            IndexStatus::Indexed => return Ok(IndexOutcome::AlreadyIndexed),
            IndexStatus::Indexing => return Ok(IndexOutcome::InProgress),
            IndexStatus::Absent => {}
        }

        self.status
            .put(
                &key,
                IndexStatus::Indexing.as_str(),
                Some(self.config.indexing_marker_ttl),
            )
            .await?;

        match self.build_index(owner, name, repo_id, &key).await {
            Ok(report) => Ok(IndexOutcome::Completed(report)),
            Err(error) => {
                // A handled failure must not block retries behind the marker's
                // TTL; only a crash leaves the marker to expire on its own.
                if let Err(cleanup) = self.status.delete(&key).await {
                    warn!("failed to clear in-flight marker after aborted run: {cleanup:#}");
                }
                Err(error)
            }
        }
    }

    async fn build_index(
        &self,
        owner: &str,
        name: &str,
        repo_id: &str,
        key: &str,
    ) -> Result<IndexReport, RequestError> {
        let branch = self.browser.default_branch(owner, name).await?;
        let tree = self.browser.list_tree(owner, name, &branch).await?;

        let candidates: Vec<&TreeEntry> = tree
            .iter()
            .filter(|entry| entry.is_blob())
            .filter(|entry| has_indexable_extension(&entry.path))
            .filter(|entry| entry.size.is_none_or(|size| size <= self.config.max_file_size))
            .take(self.config.max_files)
            .collect();

        info!(
            repo_id,
            branch,
            candidates = candidates.len(),
            "indexing repository"
        );

        let chunker = Chunker::new(self.config.max_chunk_size, self.config.overlap);
        let mut chunks: Vec<CodeChunk> = Vec::new();
        let mut files_processed = 0usize;

        for entry in candidates {
            let raw = match self.browser.get_blob(owner, name, &entry.sha).await {
                Ok(raw) => raw,
                Err(error) => {
                    warn!(path = %entry.path, "skipping file after fetch failure: {error:#}");
                    continue;
                }
            };

            let Some(text) = extract_text(&raw, &entry.path) else {
                continue;
            };

            chunks.extend(chunker.chunk(&text, &entry.path));
            files_processed += 1;
        }

        let records = self.embedder.embed_chunks(&chunks, repo_id).await;
        let chunks_indexed = records.len();

        let vector_records: Vec<VectorRecord> = records
            .into_iter()
            .map(|record| VectorRecord {
                id: record.id,
                vector: record.vector,
                metadata: ChunkMetadata::from_chunk(repo_id, &record.chunk),
            })
            .collect();

        for batch in vector_records.chunks(self.config.upsert_batch_size) {
            self.vectors.upsert(batch.to_vec()).await?;
        }

        self.status
            .put(key, IndexStatus::Indexed.as_str(), None)
            .await?;

        info!(repo_id, files_processed, chunks_indexed, "indexing complete");
        Ok(IndexReport {
            files_processed,
            chunks_indexed,
        })
    }
}

fn has_indexable_extension(path: &str) -> bool {
    std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let lowered = ext.to_ascii_lowercase();
            INDEXABLE_EXTENSIONS.contains(&lowered.as_str())
        })
}
