//! File-backed history — the durable experience store.
//!
//! The history lives in the `ait_history` slot as JSON lines, one
//! `Experience` per line. It is read once by [`HistoryStore::load`]; after
//! that every operation works on the in-memory copy and nothing reaches disk
//! until [`flush`](ExperienceStore::flush) is called.

use async_trait::async_trait;
use ait_core::error::StoreError;
use ait_core::experience::{Experience, ExperienceId};
use ait_core::store::ExperienceStore;
use tracing::{debug, info, warn};

use crate::in_memory::InMemoryStore;
use crate::seed::default_experiences;
use crate::slots::{HISTORY_SLOT, SlotDir};

/// The durable experience store.
pub struct HistoryStore {
    slots: SlotDir,
    inner: InMemoryStore,
}

impl HistoryStore {
    /// Materialize the history from its slot.
    ///
    /// An absent slot means first run: the store starts with the seed dataset
    /// and the slot is written right away. Corrupted lines are skipped.
    pub fn load(slots: SlotDir) -> Result<Self, StoreError> {
        let seed = default_experiences();

        let store = match slots.read(HISTORY_SLOT)? {
            Some(content) => {
                let entries = parse_lines(&content);
                debug!(root = %slots.root().display(), count = entries.len(), "History loaded");
                Self {
                    slots,
                    inner: InMemoryStore::from_parts(entries, seed),
                }
            }
            None => {
                info!(root = %slots.root().display(), count = seed.len(), "No history found, seeding");
                write_slot(&slots, &seed, "seed")?;
                Self {
                    slots,
                    inner: InMemoryStore::with_seed(seed),
                }
            }
        };

        Ok(store)
    }
}

fn write_slot(slots: &SlotDir, entries: &[Experience], reason: &str) -> Result<(), StoreError> {
    let mut content = String::new();
    for entry in entries {
        let line = serde_json::to_string(entry).map_err(|e| {
            StoreError::PersistenceUnavailable(format!("Failed to serialize experience: {e}"))
        })?;
        content.push_str(&line);
        content.push('\n');
    }
    slots.write(HISTORY_SLOT, &content)?;
    debug!(count = entries.len(), reason, "History written");
    Ok(())
}

fn parse_lines(content: &str) -> Vec<Experience> {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Experience>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "Skipping corrupted history entry");
                None
            }
        })
        .collect()
}

#[async_trait]
impl ExperienceStore for HistoryStore {
    fn name(&self) -> &str {
        "history"
    }

    async fn related_ids(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ExperienceId>, StoreError> {
        self.inner.related_ids(embedding, limit).await
    }

    async fn get(&self, id: &ExperienceId) -> Result<Experience, StoreError> {
        self.inner.get(id).await
    }

    async fn push(
        &self,
        query: &str,
        response: &str,
        embedding: Vec<f32>,
        context_ids: Vec<ExperienceId>,
    ) -> Result<ExperienceId, StoreError> {
        self.inner.push(query, response, embedding, context_ids).await
    }

    async fn remove(&self, id: &ExperienceId) -> Result<(), StoreError> {
        self.inner.remove(id).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.inner.clear().await
    }

    async fn reset(&self) -> Result<(), StoreError> {
        self.inner.reset().await
    }

    async fn recent(&self, n: usize) -> Result<Vec<Experience>, StoreError> {
        self.inner.recent(n).await
    }

    async fn len(&self) -> Result<usize, StoreError> {
        self.inner.len().await
    }

    async fn flush(&self) -> Result<(), StoreError> {
        let entries = self.inner.snapshot().await;
        write_slot(&self.slots, &entries, "flush")
    }
}
