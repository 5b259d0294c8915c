//! Similarity search scoped to one repository.

use crate::storage::{ChunkMetadata, VectorStore};
use std::sync::Arc;
use tracing::warn;

/// One retrieved chunk with its similarity score.
#[derive(Debug, Clone)]
pub struct RetrievalMatch {
    pub chunk: ChunkMetadata,
    pub score: f32,
}

/// Queries the vector store and narrows results to a single repository.
///
/// The store itself performs an unfiltered nearest-neighbor search, so the
/// retriever drops any match whose metadata names a different repository.
/// Retrieval is best effort: a store failure yields an empty result rather
/// than an error, and the caller answers without code context.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
}

impl Retriever {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store }
    }

    pub async fn retrieve(
        &self,
        query_vector: &[f32],
        repo_id: &str,
        top_k: usize,
    ) -> Vec<RetrievalMatch> {
        let matches = match self.store.query(query_vector, top_k).await {
            Ok(matches) => matches,
            Err(error) => {
                warn!("vector query failed, continuing without context: {error:#}");
                return Vec::new();
            }
        };

        matches
            .into_iter()
            .filter(|m| m.metadata.repo_id == repo_id)
            .map(|m| RetrievalMatch {
                score: m.score,
                chunk: m.metadata,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::InMemoryVectorStore;
    use crate::storage::{VectorMatch, VectorRecord};
    use anyhow::{Result, anyhow};
    use async_trait::async_trait;
    use tracing_test::traced_test;

    fn record(id: &str, repo_id: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector,
            metadata: ChunkMetadata {
                repo_id: repo_id.to_string(),
                file_path: format!("src/{id}.rs"),
                start_line: 1,
                end_line: 2,
                content: format!("// {id}"),
                language: Some("rs".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn filters_out_other_tenants() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert(vec![
                record("mine", "octocat/hello", vec![1.0, 0.0]),
                record("theirs", "other/repo", vec![1.0, 0.01]),
            ])
            .await
            .unwrap();

        let retriever = Retriever::new(store);
        let matches = retriever.retrieve(&[1.0, 0.0], "octocat/hello", 5).await;

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].chunk.repo_id, "octocat/hello");
        assert_eq!(matches[0].chunk.file_path, "src/mine.rs");
    }

    #[tokio::test]
    async fn preserves_store_ranking() {
        let store = Arc::new(InMemoryVectorStore::new());
        store
            .upsert(vec![
                record("far", "o/r", vec![0.0, 1.0]),
                record("close", "o/r", vec![1.0, 0.1]),
                record("exact", "o/r", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let retriever = Retriever::new(store);
        let matches = retriever.retrieve(&[1.0, 0.0], "o/r", 3).await;

        let files: Vec<&str> = matches.iter().map(|m| m.chunk.file_path.as_str()).collect();
        assert_eq!(files, vec!["src/exact.rs", "src/close.rs", "src/far.rs"]);
    }

    struct FailingStore;

    #[async_trait]
    impl VectorStore for FailingStore {
        async fn upsert(&self, _records: Vec<VectorRecord>) -> Result<()> {
            Err(anyhow!("store offline"))
        }

        async fn query(&self, _vector: &[f32], _top_k: usize) -> Result<Vec<VectorMatch>> {
            Err(anyhow!("store offline"))
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn store_failure_yields_empty_results() {
        let retriever = Retriever::new(Arc::new(FailingStore));
        let matches = retriever.retrieve(&[1.0], "o/r", 5).await;
        assert!(matches.is_empty());
        assert!(logs_contain("vector query failed"));
    }
}
