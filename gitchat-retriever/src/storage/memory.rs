//! In-memory store implementations for tests and the single-process CLI.

use super::{StatusStore, VectorMatch, VectorRecord, VectorStore};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Vector store backed by a hash map, ranking by cosine similarity.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored ids, sorted. Useful for asserting idempotence.
    pub async fn ids(&self) -> Vec<String> {
        let records = self.records.read().await;
        let mut ids: Vec<String> = records.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        let mut stored = self.records.write().await;
        for record in records {
            stored.insert(record.id.clone(), record);
        }
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorMatch>> {
        let records = self.records.read().await;
        let mut scored: Vec<VectorMatch> = records
            .values()
            .map(|record| VectorMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.vector),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Key/value status store with optional per-entry expiry.
#[derive(Debug, Default)]
pub struct InMemoryStatusStore {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

impl InMemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusStore for InMemoryStatusStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).and_then(|(value, expires)| {
            match expires {
                Some(deadline) if *deadline <= Instant::now() => None,
                _ => Some(value.clone()),
            }
        }))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<()> {
        let expires = ttl.map(|ttl| Instant::now() + ttl);
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), (value.to_string(), expires));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ChunkMetadata;

    fn record(id: &str, repo_id: &str, vector: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            vector,
            metadata: ChunkMetadata {
                repo_id: repo_id.to_string(),
                file_path: format!("src/{id}.rs"),
                start_line: 1,
                end_line: 3,
                content: "fn x() {}".to_string(),
                language: Some("rs".to_string()),
            },
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_id() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![record("a", "o/r", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .upsert(vec![record("a", "o/r", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn query_ranks_by_descending_similarity() {
        let store = InMemoryVectorStore::new();
        store
            .upsert(vec![
                record("near", "o/r", vec![1.0, 0.1]),
                record("far", "o/r", vec![0.0, 1.0]),
                record("exact", "o/r", vec![1.0, 0.0]),
            ])
            .await
            .unwrap();

        let matches = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "exact");
        assert_eq!(matches[1].id, "near");
        assert!(matches[0].score >= matches[1].score);
    }

    #[tokio::test]
    async fn status_entries_expire() {
        let store = InMemoryStatusStore::new();
        store
            .put("k", "indexing", Some(Duration::from_secs(0)))
            .await
            .unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.put("k", "indexed", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("indexed"));
    }

    #[tokio::test]
    async fn delete_removes_entries_and_tolerates_absent_keys() {
        let store = InMemoryStatusStore::new();
        store.put("k", "indexing", None).await.unwrap();

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.delete("never-set").await.unwrap();
    }
}
