//! Experience store trait — ranked retrieval and persistence of experiences.
//!
//! The store is process-wide shared state. The workflow receives it as an
//! `Arc<dyn ExperienceStore>` at construction and never looks it up
//! ambiently. Mutations are in-memory; `flush` writes them to durable state
//! and is only called on an explicit host signal.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::experience::{Experience, ExperienceId};

/// The core ExperienceStore trait.
///
/// Implementations: in-memory (for testing), file-backed history.
#[async_trait]
pub trait ExperienceStore: Send + Sync {
    /// The backend name (e.g., "in_memory", "history").
    fn name(&self) -> &str;

    /// Up to `limit` ids ranked by descending similarity to `embedding`.
    ///
    /// Deterministic for identical inputs against an unchanged store. An empty
    /// store yields an empty list.
    async fn related_ids(
        &self,
        embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ExperienceId>, StoreError>;

    /// Get an experience by id, or `StoreError::NotFound`.
    async fn get(&self, id: &ExperienceId) -> Result<Experience, StoreError>;

    /// Append a new experience and return its id.
    ///
    /// Never overwrites: if the same content is already stored, the existing
    /// record is kept and its id returned.
    async fn push(
        &self,
        query: &str,
        response: &str,
        embedding: Vec<f32>,
        context_ids: Vec<ExperienceId>,
    ) -> Result<ExperienceId, StoreError>;

    /// Forget one experience. Removing an absent id is a no-op.
    async fn remove(&self, id: &ExperienceId) -> Result<(), StoreError>;

    /// Forget every experience.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Replace the contents with the store's seed dataset.
    async fn reset(&self) -> Result<(), StoreError>;

    /// The `n` most recently pushed experiences, oldest first.
    async fn recent(&self, n: usize) -> Result<Vec<Experience>, StoreError>;

    /// Number of stored experiences.
    async fn len(&self) -> Result<usize, StoreError>;

    /// Write in-memory state to durable state.
    async fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
