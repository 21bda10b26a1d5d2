//! Provider traits — the abstraction over embedding and completion backends.
//!
//! The credential is passed on every call rather than baked into the
//! provider, so a credential change takes effect on the next operation while
//! calls already in flight keep the one they started with.
//!
//! Implementations: OpenAI-compatible endpoints (`ait-providers`), scripted
//! stand-ins in tests.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::Turn;

/// Maps text to a fixed-size vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, credential: &str, text: &str) -> Result<Vec<f32>, ProviderError>;
}

/// Maps an ordered conversation history to a generated response.
#[async_trait]
pub trait Completer: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai").
    fn name(&self) -> &str;

    /// Generate the response to the final (pending) turn of `turns`.
    ///
    /// Turns arrive oldest first; the caller guarantees the last one is the
    /// live query.
    async fn complete(&self, credential: &str, turns: &[Turn]) -> Result<String, ProviderError>;
}
