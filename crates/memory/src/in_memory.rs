//! In-memory store — useful for testing and ephemeral sessions, and the
//! working set behind the file-backed history.

use async_trait::async_trait;
use ait_core::error::StoreError;
use ait_core::experience::{Experience, ExperienceId};
use ait_core::store::ExperienceStore;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::vector::rank_by_similarity;

/// An in-memory store that keeps experiences in insertion order.
pub struct InMemoryStore {
    entries: Arc<RwLock<Vec<Experience>>>,
    seed: Vec<Experience>,
}

impl InMemoryStore {
    /// An empty store whose `reset` also leaves it empty.
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    /// A store holding `seed`, which `reset` restores.
    pub fn with_seed(seed: Vec<Experience>) -> Self {
        Self::from_parts(seed.clone(), seed)
    }

    pub(crate) fn from_parts(entries: Vec<Experience>, seed: Vec<Experience>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
            seed,
        }
    }

    /// A copy of every stored experience, in insertion order.
    pub async fn snapshot(&self) -> Vec<Experience> {
        self.entries.read().await.clone()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExperienceStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn related_ids(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ExperienceId>, StoreError> {
        let entries = self.entries.read().await;
        Ok(rank_by_similarity(&entries, embedding, limit))
    }

    async fn get(&self, id: &ExperienceId) -> Result<Experience, StoreError> {
        let entries = self.entries.read().await;
        entries
            .iter()
            .find(|e| &e.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn push(
        &self,
        query: &str,
        response: &str,
        embedding: Vec<f32>,
        context_ids: Vec<ExperienceId>,
    ) -> Result<ExperienceId, StoreError> {
        let experience = Experience::new(query, response, embedding, context_ids);
        let id = experience.id.clone();

        let mut entries = self.entries.write().await;
        if entries.iter().any(|e| e.id == id) {
            info!(id = %id.short(), "Experience already stored, keeping original");
            return Ok(id);
        }
        entries.push(experience);
        info!(id = %id.short(), total = entries.len(), "Experience stored");
        Ok(id)
    }

    async fn remove(&self, id: &ExperienceId) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;
        entries.retain(|e| &e.id != id);
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn reset(&self) -> Result<(), StoreError> {
        *self.entries.write().await = self.seed.clone();
        Ok(())
    }

    async fn recent(&self, n: usize) -> Result<Vec<Experience>, StoreError> {
        let entries = self.entries.read().await;
        let start = entries.len().saturating_sub(n);
        Ok(entries[start..].to_vec())
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.entries.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_and_get() {
        let store = InMemoryStore::new();
        let id = store
            .push("Is a pear buoyant?", "No.", vec![1.0, 0.0], vec![])
            .await
            .unwrap();

        let exp = store.get(&id).await.unwrap();
        assert_eq!(exp.query, "Is a pear buoyant?");
        assert_eq!(exp.response, "No.");
        assert_eq!(exp.id, ExperienceId::for_content("Is a pear buoyant?", "No."));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = InMemoryStore::new();
        let id = ExperienceId::for_content("never", "stored");
        assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn push_never_overwrites() {
        let store = InMemoryStore::new();
        let first = store.push("q", "r", vec![1.0], vec![]).await.unwrap();
        let context = vec![ExperienceId::for_content("x", "y")];
        let second = store.push("q", "r", vec![0.0], context).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.len().await.unwrap(), 1);
        let kept = store.get(&first).await.unwrap();
        assert_eq!(kept.embedding, vec![1.0]);
        assert!(kept.context_ids.is_empty());
    }

    #[tokio::test]
    async fn same_joined_text_stores_two_experiences() {
        let store = InMemoryStore::new();
        let a = store.push("Hi", "there", vec![1.0], vec![]).await.unwrap();
        let b = store.push("Hit", "here", vec![0.0], vec![a.clone()]).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(store.len().await.unwrap(), 2);
        let second = store.get(&b).await.unwrap();
        assert_eq!(second.query, "Hit");
        assert_eq!(second.response, "here");
        assert_eq!(second.context_ids, vec![a]);
    }

    #[tokio::test]
    async fn push_keeps_context_ids_in_order() {
        let store = InMemoryStore::new();
        let a = store.push("a", "1", vec![], vec![]).await.unwrap();
        let b = store.push("b", "2", vec![], vec![]).await.unwrap();
        let c = store.push("c", "3", vec![], vec![b.clone(), a.clone()]).await.unwrap();
        assert_eq!(store.get(&c).await.unwrap().context_ids, vec![b, a]);
    }

    #[tokio::test]
    async fn related_ids_on_empty_store_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.related_ids(&[1.0, 0.0], 128).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn related_ids_ranks_and_truncates() {
        let store = InMemoryStore::new();
        let far = store.push("far", "r", vec![0.0, 1.0], vec![]).await.unwrap();
        let near = store.push("near", "r", vec![1.0, 0.1], vec![]).await.unwrap();
        let exact = store.push("exact", "r", vec![1.0, 0.0], vec![]).await.unwrap();

        let ranked = store.related_ids(&[1.0, 0.0], 128).await.unwrap();
        assert_eq!(ranked, vec![exact.clone(), near, far]);

        let top = store.related_ids(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(top, vec![exact]);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let store = InMemoryStore::new();
        let id = store.push("q", "r", vec![], vec![]).await.unwrap();
        store.remove(&id).await.unwrap();
        store.remove(&id).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clear_and_reset() {
        let seed = vec![Experience::new("seed q", "seed r", vec![], vec![])];
        let store = InMemoryStore::with_seed(seed);
        store.push("q", "r", vec![], vec![]).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 2);

        store.clear().await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);

        store.reset().await.unwrap();
        let all = store.snapshot().await;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].query, "seed q");
    }

    #[tokio::test]
    async fn recent_returns_last_n_oldest_first() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store.push(&format!("q{i}"), "r", vec![], vec![]).await.unwrap();
        }
        let recent = store.recent(2).await.unwrap();
        let queries: Vec<_> = recent.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(queries, vec!["q3", "q4"]);
        assert_eq!(store.recent(50).await.unwrap().len(), 5);
    }
}
